//! Whole-mesh decoding from the raw fields of one tile.

use glam::{DMat4, DVec3, Vec3};
use image::RgbaImage;

use crate::error::{BufferKind, DecodeError, DecodeResult};
use crate::indices::{IndexStrip, unpack_indices};
use crate::normals::{unpack_for_normals, unpack_normals};
use crate::obb::unpack_obb;
use crate::octants::{OctantLayers, unpack_octant_mask_and_layer_bounds};
use crate::texcoords::{TexCoordLayout, unpack_tex_coords_with_layout};
use crate::texture::decode_image;
use crate::vertices::{transform_positions, unpack_vertices};
use crate::{OrientedBoundingBox, UvTransform};

/// An encoded texture and its format tag.
#[derive(Debug, Clone, Copy)]
pub struct TextureField<'a> {
    pub bytes: &'a [u8],
    pub format: u32,
}

/// The already-extracted fields of one tile, borrowed from the container.
#[derive(Debug, Clone, Copy)]
pub struct RawTileRecord<'a> {
    pub vertices: &'a [u8],
    pub indices: &'a [u8],
    pub tex_coords: &'a [u8],
    /// Node-level normal table.
    pub for_normals: Option<&'a [u8]>,
    /// Per-vertex indices into the normal table.
    pub normals: Option<&'a [u8]>,
    /// Packed OBB from the node's bulk metadata.
    pub obb: Option<&'a [u8]>,
    pub texture: Option<TextureField<'a>>,
    pub layer_and_octant_counts: Option<&'a [u8]>,
    /// Explicit `[offset_u, offset_v, scale_u, scale_v]`, when the mesh has one.
    pub uv_offset_and_scale: Option<[f32; 4]>,
    pub tex_coord_layout: TexCoordLayout,
    /// Tile-space to globe transform (`matrix_globe_from_mesh`).
    pub placement: DMat4,
    /// Meters per texel at the node's level.
    pub meters_per_texel: f32,
    pub head_node_center: Vec3,
}

impl<'a> RawTileRecord<'a> {
    /// A record with only the required mesh buffers set.
    #[must_use]
    pub fn new(vertices: &'a [u8], indices: &'a [u8], tex_coords: &'a [u8]) -> Self {
        Self {
            vertices,
            indices,
            tex_coords,
            for_normals: None,
            normals: None,
            obb: None,
            texture: None,
            layer_and_octant_counts: None,
            uv_offset_and_scale: None,
            tex_coord_layout: TexCoordLayout::default(),
            placement: DMat4::IDENTITY,
            meters_per_texel: 1.0,
            head_node_center: Vec3::ZERO,
        }
    }

    /// Every byte buffer present in the record, tagged with its kind.
    pub fn buffers(&self) -> impl Iterator<Item = (BufferKind, &'a [u8])> {
        [
            (BufferKind::Vertices, Some(self.vertices)),
            (BufferKind::Indices, Some(self.indices)),
            (BufferKind::TexCoords, Some(self.tex_coords)),
            (BufferKind::Normals, self.for_normals),
            (BufferKind::NormalIndices, self.normals),
            (BufferKind::OrientedBoundingBox, self.obb),
            (BufferKind::Texture, self.texture.map(|t| t.bytes)),
            (BufferKind::LayerAndOctantCounts, self.layer_and_octant_counts),
        ]
        .into_iter()
        .filter_map(|(kind, bytes)| Some((kind, bytes?)))
    }
}

/// Decoded geometry for one tile.
#[derive(Debug, Clone)]
pub struct DecodedMesh {
    /// Quantized tile-space positions.
    pub positions: Vec<[u8; 3]>,
    pub indices: IndexStrip,
    /// One coordinate per vertex.
    pub tex_coords: Vec<[u16; 2]>,
    pub uv_transform: UvTransform,
    /// The node's normal table; empty when the tile has none.
    pub normals: Vec<[u8; 3]>,
    /// One RGBA normal per vertex.
    pub vertex_normals: Vec<[u8; 4]>,
    pub obb: Option<OrientedBoundingBox>,
    pub texture: Option<RgbaImage>,
    pub octants: Option<OctantLayers>,
    pub placement: DMat4,
}

impl DecodedMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions in the frame of the placement matrix.
    #[must_use]
    pub fn model_positions(&self) -> Vec<DVec3> {
        transform_positions(&self.positions, &self.placement)
    }
}

/// Decode every field of a tile record.
///
/// Errors are wrapped with the [`BufferKind`] of the field that failed.
/// Out-of-range strip indices are logged but tolerated, matching the index
/// decoder's leniency.
pub fn decode_mesh(record: &RawTileRecord<'_>) -> DecodeResult<DecodedMesh> {
    let positions =
        unpack_vertices(record.vertices).map_err(|e| e.in_field(BufferKind::Vertices))?;
    let vertex_count = positions.len();

    let indices = unpack_indices(record.indices).map_err(|e| e.in_field(BufferKind::Indices))?;
    if let Some(&bad) = indices
        .indices
        .iter()
        .find(|&&i| usize::from(i) >= vertex_count)
    {
        tracing::warn!(
            "Strip index {} points past {} vertices",
            bad,
            vertex_count
        );
    }

    let tex = unpack_tex_coords_with_layout(record.tex_coords, record.tex_coord_layout)
        .map_err(|e| e.in_field(BufferKind::TexCoords))?;
    if tex.uvs.len() != vertex_count {
        return Err(DecodeError::InvalidLength {
            what: "texture coordinates (must match vertex count)",
            actual: tex.uvs.len(),
        }
        .in_field(BufferKind::TexCoords));
    }
    let uv_transform = record
        .uv_offset_and_scale
        .map_or(tex.transform, |values| UvTransform::from_offset_and_scale(&values));

    let normals = record
        .for_normals
        .map(unpack_for_normals)
        .transpose()
        .map_err(|e| e.in_field(BufferKind::Normals))?
        .unwrap_or_default();
    let table = record.for_normals.is_some().then_some(normals.as_slice());
    let vertex_normals = unpack_normals(record.normals, table, vertex_count)
        .map_err(|e| e.in_field(BufferKind::NormalIndices))?;
    if vertex_normals.len() != vertex_count {
        return Err(DecodeError::InvalidLength {
            what: "normal indices (must match vertex count)",
            actual: vertex_normals.len(),
        }
        .in_field(BufferKind::NormalIndices));
    }

    let obb = record
        .obb
        .map(|packed| unpack_obb(packed, record.head_node_center, record.meters_per_texel))
        .transpose()
        .map_err(|e| e.in_field(BufferKind::OrientedBoundingBox))?;

    let octants = record
        .layer_and_octant_counts
        .map(|packed| unpack_octant_mask_and_layer_bounds(packed, &indices.indices, vertex_count))
        .transpose()
        .map_err(|e| e.in_field(BufferKind::LayerAndOctantCounts))?;

    let texture = record
        .texture
        .map(|field| decode_image(field.bytes, field.format))
        .transpose()
        .map_err(|e| e.in_field(BufferKind::Texture))?;

    Ok(DecodedMesh {
        positions,
        indices,
        tex_coords: tex.uvs,
        uv_transform,
        normals,
        vertex_normals,
        obb,
        texture,
        octants,
        placement: record.placement,
    })
}

//! Decode packed mesh data from quantized rocktree tiles.
//!
//! This crate provides pure synchronous decoding functions for unpacking
//! the geometry fields of a tile once they have been extracted from their
//! container. All functions are designed to be called from any threading
//! context - the library user controls parallelism.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **User-controlled parallelism**: Client decides how to parallelize
//! - **Fail closed**: Every decoder except [`unpack_indices`] rejects
//!   malformed buffers
//!
//! # Key functions
//!
//! - [`decode_varint`]: Read one base-128 varint
//! - [`unpack_vertices`]: Delta-decode XYZ vertex positions
//! - [`unpack_tex_coords`]: Unpack UV texture coordinates
//! - [`unpack_indices`]: Decode varint-encoded triangle strip indices
//! - [`unpack_for_normals`] / [`unpack_normals`]: Normal table and per-vertex normals
//! - [`unpack_obb`]: Decode oriented bounding box from 15 bytes
//! - [`unpack_path_and_flags`]: Extract octant path and flags from metadata
//! - [`unpack_octant_mask_and_layer_bounds`]: Per-vertex octants and strip layers
//! - [`decode_image`]: Decode a JPEG texture
//! - [`decode_mesh`]: All of the above for one tile

mod error;
mod varint;

pub mod indices;
pub mod mesh;
pub mod normals;
pub mod obb;
pub mod octants;
pub mod path;
pub mod texcoords;
pub mod texture;
pub mod vertices;

pub use error::{BufferKind, DecodeError, DecodeResult};
pub use indices::{IndexStrip, strip_to_triangles, unpack_indices};
pub use mesh::{DecodedMesh, RawTileRecord, TextureField, decode_mesh};
pub use normals::{NO_NORMAL, unpack_for_normals, unpack_normals};
pub use obb::{PACKED_OBB_LEN, unpack_obb};
pub use octants::{LAYER_COUNT, OctantLayers, unpack_octant_mask_and_layer_bounds};
pub use path::unpack_path_and_flags;
pub use texcoords::{TexCoordLayout, TexCoords, unpack_tex_coords, unpack_tex_coords_with_layout};
pub use texture::{FORMAT_JPEG, decode_image};
pub use varint::{decode_varint, encode_varint};
pub use vertices::{transform_positions, unpack_vertices};

/// Maximum octree depth level.
pub const MAX_LEVEL: usize = 20;

/// UV offset and scale for texture coordinate mapping.
///
/// Shaders sample at `(uv + offset) * scale`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UvTransform {
    pub offset: glam::Vec2,
    pub scale: glam::Vec2,
}

impl UvTransform {
    /// Build from a mesh's explicit `[offset_u, offset_v, scale_u, scale_v]`.
    #[must_use]
    pub fn from_offset_and_scale(values: &[f32; 4]) -> Self {
        Self {
            offset: glam::Vec2::new(values[0], values[1]),
            scale: glam::Vec2::new(values[2], values[3]),
        }
    }

    /// Normalized sample position for an integer coordinate.
    #[must_use]
    pub fn apply(&self, uv: [u16; 2]) -> glam::Vec2 {
        (glam::Vec2::new(f32::from(uv[0]), f32::from(uv[1])) + self.offset) * self.scale
    }
}

/// Oriented bounding box for frustum culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    pub center: glam::DVec3,
    /// Half-widths along each local axis.
    pub extents: glam::DVec3,
    pub orientation: glam::DMat3,
}

/// Result of unpacking path and flags from node metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAndFlags {
    /// Octant path string (e.g., "01234567").
    pub path: String,
    /// Flags from the node metadata.
    pub flags: u32,
    /// Path level (1-4 for relative paths).
    pub level: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uv_transform_centers_on_texels() {
        let transform = UvTransform {
            offset: glam::Vec2::splat(0.5),
            scale: glam::Vec2::new(0.25, 0.5),
        };
        assert_eq!(transform.apply([0, 1]), glam::Vec2::new(0.125, 0.75));
        assert_eq!(transform.apply([3, 0]), glam::Vec2::new(0.875, 0.25));
    }
}

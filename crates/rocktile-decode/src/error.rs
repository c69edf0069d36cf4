//! Error types for tile decoding.

use std::fmt;

/// Which field of a tile record a buffer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertices,
    Indices,
    TexCoords,
    /// The per-node normal table (`for_normals`).
    Normals,
    /// Per-vertex indices into the normal table.
    NormalIndices,
    OrientedBoundingBox,
    Texture,
    /// Per-octant index counts, eight per layer.
    LayerAndOctantCounts,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertices => "vertices",
            Self::Indices => "indices",
            Self::TexCoords => "texture coordinates",
            Self::Normals => "normals",
            Self::NormalIndices => "normal indices",
            Self::OrientedBoundingBox => "oriented bounding box",
            Self::Texture => "texture",
            Self::LayerAndOctantCounts => "layer and octant counts",
        };
        f.write_str(name)
    }
}

/// Errors produced while unpacking tile buffers.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended before the structure being read was complete.
    #[error("truncated input: needed {needed} bytes, got {actual}")]
    TruncatedInput { needed: usize, actual: usize },

    /// The buffer has a structurally impossible size.
    #[error("invalid length {actual} for {what}")]
    InvalidLength { what: &'static str, actual: usize },

    /// A varint kept its continuation bit set past 64 bits of payload.
    #[error("varint at offset {offset} does not fit in 64 bits")]
    VarIntOverflow { offset: usize },

    /// Normal quantization shift outside `0..8`.
    #[error("invalid normal quantization shift {0}")]
    InvalidShift(u8),

    /// A per-vertex normal index points past the end of the normal table.
    #[error("normal index {index} out of range for table of {len}")]
    NormalIndexOutOfRange { index: usize, len: usize },

    /// A strip index points past the end of the vertex buffer.
    #[error("vertex index {index} out of range for {len} vertices")]
    VertexIndexOutOfRange { index: usize, len: usize },

    /// Image format tag other than JPEG.
    #[error("unsupported image format {0}")]
    UnsupportedFormat(u32),

    /// The image codec rejected the payload.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// A decoder failed while assembling a mesh.
    #[error("failed to decode {kind}: {source}")]
    Field {
        kind: BufferKind,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Attach the field a nested error came from.
    #[must_use]
    pub fn in_field(self, kind: BufferKind) -> Self {
        Self::Field {
            kind,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any field context.
    #[must_use]
    pub fn root(&self) -> &DecodeError {
        match self {
            Self::Field { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

//! Index unpacking.

use crate::error::DecodeResult;
use crate::varint::decode_varint;

/// A decoded triangle strip.
///
/// `indices` holds what was actually decoded, which can be shorter than the
/// length the stream declared when the stream is cut short.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStrip {
    pub indices: Vec<u16>,
    /// Strip length announced by the stream header.
    pub declared_len: usize,
}

impl IndexStrip {
    /// Whether fewer indices were decoded than the header announced.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.indices.len() < self.declared_len
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Unpack varint-encoded triangle strip indices.
///
/// The indices form a triangle strip, where degenerate triangles
/// (with repeated vertices) are used for strip restarts. Each index is coded
/// as its distance below the number of zero codes seen so far, so a `0`
/// introduces the next unseen vertex.
///
/// Only a missing header is an error. A stream that ends early yields the
/// indices decoded up to that point.
pub fn unpack_indices(packed: &[u8]) -> DecodeResult<IndexStrip> {
    let (declared_len, mut offset) = decode_varint(packed, 0)?;
    let declared_len = usize::try_from(declared_len).unwrap_or(usize::MAX);

    // The declared length is untrusted; don't let it drive the allocation.
    let mut indices = Vec::with_capacity(declared_len.min(packed.len()));
    let mut zeros = 0u64;
    while indices.len() < declared_len && offset < packed.len() {
        let Ok((code, next)) = decode_varint(packed, offset) else {
            break;
        };
        offset = next;
        indices.push(zeros.wrapping_sub(code) as u16);
        if code == 0 {
            zeros += 1;
        }
    }

    if indices.len() < declared_len {
        tracing::debug!(
            "Index strip truncated: decoded {} of {} indices",
            indices.len(),
            declared_len
        );
    }

    Ok(IndexStrip {
        indices,
        declared_len,
    })
}

/// Expand a triangle strip into individual triangles.
///
/// Every other triangle has its winding flipped so all faces keep the same
/// orientation. Triangles with a repeated vertex are strip restarts and are
/// dropped.
#[must_use]
pub fn strip_to_triangles(strip: &[u16]) -> Vec<[u16; 3]> {
    strip
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (a, b, c) = (w[0], w[1], w[2]);
            if a == b || b == c || a == c {
                return None;
            }
            Some(if i % 2 == 0 { [a, b, c] } else { [a, c, b] })
        })
        .collect()
}

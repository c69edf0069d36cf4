//! Octant mask and layer bounds unpacking.

use std::ops::Range;

use crate::error::{DecodeError, DecodeResult};
use crate::varint::decode_varint;

/// Number of layer bounds a mesh carries.
pub const LAYER_COUNT: usize = 10;

/// Octant counts per layer.
const OCTANTS_PER_LAYER: usize = 8;

/// Octant assignment and layer layout of a triangle strip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OctantLayers {
    /// Child octant (0-7) of each vertex. Vertices no strip index reaches
    /// keep octant 0.
    pub octants: Vec<u8>,
    /// Strip offset at which each layer starts. Layers past the last
    /// encoded one start (and end) at the end of the counted strip.
    pub layer_bounds: [usize; LAYER_COUNT],
}

impl OctantLayers {
    /// Strip indices belonging to `layer`.
    #[must_use]
    pub fn layer_range(&self, layer: usize) -> Range<usize> {
        let start = self.layer_bounds[layer.min(LAYER_COUNT - 1)];
        let end = self
            .layer_bounds
            .get(layer + 1)
            .copied()
            .unwrap_or(start);
        start..end
    }

    /// Octant mask of a vertex as a single bit, for masking out children.
    #[must_use]
    pub fn octant_bit(&self, vertex: usize) -> u8 {
        self.octants.get(vertex).map_or(0, |&o| 1 << o)
    }
}

/// Unpack the per-octant index counts of a mesh.
///
/// # Format
///
/// A varint count `n`, then `n` varint counts. Count `i` covers the next
/// run of strip indices, all of whose vertices belong to octant `i & 7`.
/// Every eight counts make up one layer.
///
/// # Arguments
///
/// * `packed` - The `layer_and_octant_counts` field
/// * `indices` - The unpacked triangle strip
/// * `vertex_count` - Number of vertices in the mesh
pub fn unpack_octant_mask_and_layer_bounds(
    packed: &[u8],
    indices: &[u16],
    vertex_count: usize,
) -> DecodeResult<OctantLayers> {
    let (count, mut offset) = decode_varint(packed, 0)?;
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    if count > LAYER_COUNT * OCTANTS_PER_LAYER {
        return Err(DecodeError::InvalidLength {
            what: "octant counts (at most 80)",
            actual: count,
        });
    }

    let mut layers = OctantLayers {
        octants: vec![0; vertex_count],
        layer_bounds: [0; LAYER_COUNT],
    };
    let mut consumed = 0usize;

    for i in 0..count {
        if i % OCTANTS_PER_LAYER == 0 {
            layers.layer_bounds[i / OCTANTS_PER_LAYER] = consumed;
        }

        let (run, next) = decode_varint(packed, offset)?;
        offset = next;
        let end = consumed.saturating_add(usize::try_from(run).unwrap_or(usize::MAX));
        if end > indices.len() {
            return Err(DecodeError::TruncatedInput {
                needed: end,
                actual: indices.len(),
            });
        }

        for &index in &indices[consumed..end] {
            let vertex = usize::from(index);
            let octant = layers
                .octants
                .get_mut(vertex)
                .ok_or(DecodeError::VertexIndexOutOfRange {
                    index: vertex,
                    len: vertex_count,
                })?;
            *octant = (i & 7) as u8;
        }
        consumed = end;
    }

    let first_unset = count.div_ceil(OCTANTS_PER_LAYER);
    for bound in &mut layers.layer_bounds[first_unset..] {
        *bound = consumed;
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::encode_varint;

    fn counts(values: &[u64]) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_varint(values.len() as u64, &mut buf);
        for &v in values {
            encode_varint(v, &mut buf);
        }
        buf
    }

    #[test]
    fn single_layer() {
        // Octant 0 gets two indices, octant 3 gets one.
        let packed = counts(&[2, 0, 0, 1, 0, 0, 0, 0]);
        let indices = [0u16, 1, 2];
        let layers = unpack_octant_mask_and_layer_bounds(&packed, &indices, 3).unwrap();
        assert_eq!(layers.octants, vec![0, 0, 3]);
        assert_eq!(layers.layer_bounds, [0, 3, 3, 3, 3, 3, 3, 3, 3, 3]);
        assert_eq!(layers.layer_range(0), 0..3);
        assert_eq!(layers.layer_range(1), 3..3);
        assert_eq!(layers.octant_bit(2), 0b1000);
    }

    #[test]
    fn second_layer_wraps_octants() {
        let mut values = vec![1; 8];
        values.extend([0, 2]);
        let packed = counts(&values);
        let indices: Vec<u16> = (0..10).collect();
        let layers = unpack_octant_mask_and_layer_bounds(&packed, &indices, 10).unwrap();
        assert_eq!(layers.octants, vec![0, 1, 2, 3, 4, 5, 6, 7, 1, 1]);
        assert_eq!(layers.layer_bounds[..3], [0, 8, 10]);
        assert_eq!(layers.layer_range(1), 8..10);
        assert_eq!(layers.layer_range(LAYER_COUNT - 1), 10..10);
    }

    #[test]
    fn empty_counts() {
        let layers = unpack_octant_mask_and_layer_bounds(&counts(&[]), &[], 2).unwrap();
        assert_eq!(layers.octants, vec![0, 0]);
        assert_eq!(layers.layer_bounds, [0; LAYER_COUNT]);
    }

    #[test]
    fn runs_past_strip() {
        let err = unpack_octant_mask_and_layer_bounds(&counts(&[4]), &[0, 1], 2).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TruncatedInput {
                needed: 4,
                actual: 2
            }
        ));
    }

    #[test]
    fn index_past_vertices() {
        let err = unpack_octant_mask_and_layer_bounds(&counts(&[2]), &[0, 5], 2).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::VertexIndexOutOfRange { index: 5, len: 2 }
        ));
    }

    #[test]
    fn too_many_counts() {
        let err = unpack_octant_mask_and_layer_bounds(&counts(&[0; 81]), &[], 0).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidLength { actual: 81, .. }));
    }
}

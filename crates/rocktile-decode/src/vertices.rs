//! Vertex unpacking.

use glam::{DMat4, DVec3};

use crate::error::{DecodeError, DecodeResult};

/// Unpack delta-encoded vertex positions.
///
/// Input format: 3*N bytes arranged as [X0,X1,...,Xn, Y0,Y1,...,Yn, Z0,Z1,...,Zn]
/// Each component is delta-encoded (cumulative sum, wrapping at 256).
///
/// Output: N quantized positions in tile space.
pub fn unpack_vertices(packed: &[u8]) -> DecodeResult<Vec<[u8; 3]>> {
    if packed.len() % 3 != 0 {
        return Err(DecodeError::InvalidLength {
            what: "vertex planes (must be a multiple of 3)",
            actual: packed.len(),
        });
    }

    let count = packed.len() / 3;
    let mut vertices = vec![[0u8; 3]; count];
    for (axis, plane) in packed.chunks_exact(count.max(1)).enumerate().take(3) {
        let mut acc = 0u8;
        for (vertex, &delta) in vertices.iter_mut().zip(plane) {
            acc = acc.wrapping_add(delta);
            vertex[axis] = acc;
        }
    }
    Ok(vertices)
}

/// Promote quantized positions to model space with the tile's placement
/// matrix (`M[:3,:3] * p + M[:3,3]`).
#[must_use]
pub fn transform_positions(positions: &[[u8; 3]], placement: &DMat4) -> Vec<DVec3> {
    positions
        .iter()
        .map(|&[x, y, z]| {
            placement.transform_point3(DVec3::new(f64::from(x), f64::from(y), f64::from(z)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn three_vertex_tile() {
        let packed = [10, 0, 0, 0, 10, 0, 0, 0, 10];
        let vertices = unpack_vertices(&packed).unwrap();
        assert_eq!(vertices, vec![[10, 0, 0], [10, 10, 0], [10, 10, 10]]);
    }

    #[test]
    fn wraps_at_256() {
        let packed = [200, 100, 0, 0, 0, 0];
        let vertices = unpack_vertices(&packed).unwrap();
        assert_eq!(vertices, vec![[200, 0, 0], [44, 0, 0]]);
    }

    #[test]
    fn empty_input() {
        assert!(unpack_vertices(&[]).unwrap().is_empty());
    }

    #[test]
    fn rejects_partial_planes() {
        let err = unpack_vertices(&[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidLength { actual: 4, .. }));
    }

    #[test]
    fn placement_applies_rotation_and_translation() {
        let placement = DMat4::from_cols_array(&[
            0.0, 1.0, 0.0, 0.0, //
            -1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 2.0, 0.0, //
            100.0, 200.0, 300.0, 1.0,
        ]);
        let out = transform_positions(&[[1, 2, 3]], &placement);
        assert_eq!(out, vec![DVec3::new(98.0, 201.0, 306.0)]);
    }

    proptest! {
        #[test]
        fn planes_are_running_sums(planes in proptest::collection::vec(any::<[u8; 3]>(), 1..64)) {
            let count = planes.len();
            let mut packed = vec![0u8; count * 3];
            for (i, deltas) in planes.iter().enumerate() {
                for axis in 0..3 {
                    packed[axis * count + i] = deltas[axis];
                }
            }
            let vertices = unpack_vertices(&packed).unwrap();
            for axis in 0..3 {
                let mut sum = 0u32;
                for (i, deltas) in planes.iter().enumerate() {
                    sum += u32::from(deltas[axis]);
                    prop_assert_eq!(u32::from(vertices[i][axis]), sum % 256);
                }
            }
        }
    }
}

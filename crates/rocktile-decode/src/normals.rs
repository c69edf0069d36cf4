//! Normal vector unpacking.

use glam::DVec3;

use crate::error::{DecodeError, DecodeResult};

const HEADER_LEN: usize = 3;

/// Normal written for vertices when a tile has no normal data.
pub const NO_NORMAL: [u8; 4] = [255, 255, 255, 0];

/// Unpack normal data from the node's `for_normals` field.
///
/// This produces a lookup table of 3-byte normals that can be
/// indexed by the mesh's normals field.
///
/// # Format
///
/// - Bytes 0-1: Normal count `n` (little-endian u16)
/// - Byte 2: Quantization shift `s` (0-7)
/// - Next `n` bytes: First folded coordinate of each normal
/// - Next `n` bytes: Second folded coordinate of each normal
///
/// # Returns
///
/// A vector of RGB normal values, each channel mapping `[-1, 1]` onto
/// `[0, 254]` around a bias of 127.
pub fn unpack_for_normals(for_normals: &[u8]) -> DecodeResult<Vec<[u8; 3]>> {
    if for_normals.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedInput {
            needed: HEADER_LEN,
            actual: for_normals.len(),
        });
    }
    let count = usize::from(u16::from_le_bytes([for_normals[0], for_normals[1]]));
    let shift = for_normals[2];
    if shift >= 8 {
        return Err(DecodeError::InvalidShift(shift));
    }

    let payload = &for_normals[HEADER_LEN..];
    if payload.len() < count * 2 {
        return Err(DecodeError::TruncatedInput {
            needed: HEADER_LEN + count * 2,
            actual: for_normals.len(),
        });
    }
    if payload.len() != count * 2 {
        return Err(DecodeError::InvalidLength {
            what: "normal table (must be 3 + 2 * count bytes)",
            actual: for_normals.len(),
        });
    }
    let (first, second) = payload.split_at(count);

    Ok(first
        .iter()
        .zip(second)
        .map(|(&a, &f)| {
            let a = f64::from(expand(a, shift)) / 255.0;
            let f = f64::from(expand(f, shift)) / 255.0;
            quantize(unfold_normal(a, f))
        })
        .collect())
}

/// Unpack per-vertex normals using the normal lookup table.
///
/// # Arguments
///
/// * `mesh_normals` - The mesh's normals field: a plane of low bytes followed
///   by a plane of high bytes, one index per vertex
/// * `for_normals` - The unpacked normal lookup table from [`unpack_for_normals`]
/// * `vertex_count` - Number of vertices (for fallback if no normals)
///
/// # Returns
///
/// A vector of RGBA normal values (4 bytes per vertex, A is padding).
pub fn unpack_normals(
    mesh_normals: Option<&[u8]>,
    for_normals: Option<&[[u8; 3]]>,
    vertex_count: usize,
) -> DecodeResult<Vec<[u8; 4]>> {
    let (Some(packed), Some(table)) = (mesh_normals, for_normals) else {
        return Ok(vec![NO_NORMAL; vertex_count]);
    };

    if packed.len() % 2 != 0 {
        return Err(DecodeError::InvalidLength {
            what: "normal index planes (must be even)",
            actual: packed.len(),
        });
    }
    let (low, high) = packed.split_at(packed.len() / 2);

    low.iter()
        .zip(high)
        .map(|(&lo, &hi)| {
            let index = usize::from(lo) | (usize::from(hi) << 8);
            let [r, g, b] = *table.get(index).ok_or(DecodeError::NormalIndexOutOfRange {
                index,
                len: table.len(),
            })?;
            Ok([r, g, b, 0])
        })
        .collect()
}

/// Widen a quantized coordinate back to the `[0, 255]` range.
fn expand(v: u8, shift: u8) -> i32 {
    let v = i32::from(v);
    let s = u32::from(shift);
    if s <= 4 {
        return (v << s) + (v & ((1 << s) - 1));
    }
    if s <= 6 {
        // Replicate the high bits into the vacated low bits.
        let r = 8 - s;
        let hi = v << s;
        return hi + (hi >> r) + (hi >> r >> r) + (hi >> r >> r >> r);
    }
    -(v & 1)
}

/// Folded octahedron coordinates after moving them into the valid lozenge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fold {
    /// `-1` when the point was folded, meaning the normal faces backwards.
    pub sign: f64,
    pub b: f64,
    pub c: f64,
}

/// Fold `(a, f)` into the lozenge `0.5 <= a + f <= 1.5`, `-0.5 <= a - f <= 0.5`.
///
/// Points already inside are returned unchanged with a positive sign. Points
/// outside are reflected across whichever boundary they crossed, checked in
/// the order `g <= 0.5`, `g >= 1.5`, `h <= -0.5`, then `h > 0.5`.
#[must_use]
pub fn fold_octahedron(a: f64, f: f64) -> Fold {
    let g = a + f;
    let h = a - f;
    if (0.5..=1.5).contains(&g) && (-0.5..=0.5).contains(&h) {
        return Fold {
            sign: 1.0,
            b: a,
            c: f,
        };
    }

    let folded = |b, c| Fold { sign: -1.0, b, c };
    if g <= 0.5 {
        return folded(0.5 - f, 0.5 - a);
    }
    if g >= 1.5 {
        return folded(1.5 - f, 1.5 - a);
    }
    if h <= -0.5 {
        return folded(f - 0.5, a + 0.5);
    }
    folded(f + 0.5, a - 0.5)
}

/// Reconstruct the unit normal for folded coordinates in `[0, 1]`.
#[must_use]
pub fn unfold_normal(a: f64, f: f64) -> DVec3 {
    let Fold { sign, b, c } = fold_octahedron(a, f);
    let g = b + c;
    let h = b - c;
    let x = (2.0 * g - 1.0)
        .min(3.0 - 2.0 * g)
        .min((2.0 * h + 1.0).min(1.0 - 2.0 * h))
        * sign;
    DVec3::new(x, 2.0 * b - 1.0, 2.0 * c - 1.0).normalize()
}

fn quantize(n: DVec3) -> [u8; 3] {
    let channel = |x: f64| (127.0 * x + 127.0).round_ties_even().clamp(0.0, 255.0) as u8;
    [channel(n.x), channel(n.y), channel(n.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn packed(shift: u8, first: &[u8], second: &[u8]) -> Vec<u8> {
        let mut buf = (first.len() as u16).to_le_bytes().to_vec();
        buf.push(shift);
        buf.extend_from_slice(first);
        buf.extend_from_slice(second);
        buf
    }

    fn to_unit(n: [u8; 3]) -> DVec3 {
        DVec3::new(
            2.0 * f64::from(n[0]) / 255.0 - 1.0,
            2.0 * f64::from(n[1]) / 255.0 - 1.0,
            2.0 * f64::from(n[2]) / 255.0 - 1.0,
        )
    }

    #[test]
    fn expand_low_shifts_pad_with_low_bits() {
        assert_eq!(expand(0xff, 0), 0xff);
        assert_eq!(expand(0x0f, 4), 0xff);
        assert_eq!(expand(0x01, 2), 0b101);
    }

    #[test]
    fn expand_high_shifts_replicate_bits() {
        assert_eq!(expand(0b11, 6), 255);
        assert_eq!(expand(0b111, 5), 255);
        assert_eq!(expand(0b10, 6), 128 + 32 + 8 + 2);
    }

    #[test]
    fn expand_shift_seven_keeps_sign_only() {
        assert_eq!(expand(1, 7), -1);
        assert_eq!(expand(2, 7), 0);
    }

    #[test]
    fn lozenge_center_points_forward() {
        let n = unfold_normal(0.5, 0.5);
        assert!((n - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn fold_boundaries() {
        assert_eq!(fold_octahedron(0.5, 0.5).sign, 1.0);
        assert_eq!(fold_octahedron(0.75, 0.75).sign, 1.0);

        let low = fold_octahedron(0.1, 0.1);
        assert_eq!(low.sign, -1.0);
        assert!((low.b - 0.4).abs() < 1e-12 && (low.c - 0.4).abs() < 1e-12);

        let high = fold_octahedron(1.0, 0.9);
        assert_eq!(high.sign, -1.0);
        assert!((high.b - 0.6).abs() < 1e-12 && (high.c - 0.5).abs() < 1e-12);

        let below = fold_octahedron(0.1, 0.9);
        assert_eq!(below.sign, -1.0);
        assert!((below.b - 0.4).abs() < 1e-12 && (below.c - 0.6).abs() < 1e-12);

        let above = fold_octahedron(0.9, 0.1);
        assert_eq!(above.sign, -1.0);
        assert!((above.b - 0.6).abs() < 1e-12 && (above.c - 0.4).abs() < 1e-12);
    }

    #[test]
    fn corner_points_face_backwards() {
        let n = unfold_normal(0.0, 0.0);
        assert!((n + DVec3::X).length() < 1e-12);
    }

    #[test]
    fn table_from_bytes() {
        let table = unpack_for_normals(&packed(0, &[128, 0], &[128, 0])).unwrap();
        assert_eq!(table.len(), 2);
        // Near +X and exactly -X.
        assert_eq!(table[0][0], 254);
        assert_eq!(table[1], [0, 127, 127]);
    }

    #[test]
    fn table_header_errors() {
        assert!(matches!(
            unpack_for_normals(&[1, 0]).unwrap_err(),
            DecodeError::TruncatedInput { .. }
        ));
        assert!(matches!(
            unpack_for_normals(&[0, 0, 8]).unwrap_err(),
            DecodeError::InvalidShift(8)
        ));
        assert!(matches!(
            unpack_for_normals(&[2, 0, 0, 1, 2, 3]).unwrap_err(),
            DecodeError::TruncatedInput { needed: 7, .. }
        ));
    }

    #[test]
    fn table_rejects_trailing_bytes() {
        assert!(matches!(
            unpack_for_normals(&[1, 0, 0, 1, 2, 3, 4, 5]).unwrap_err(),
            DecodeError::InvalidLength { actual: 8, .. }
        ));
    }

    #[test]
    fn per_vertex_lookup() {
        let table = [[1, 2, 3], [4, 5, 6]];
        let indices = [1u8, 0, 0, 0, 0, 0];
        let normals = unpack_normals(Some(&indices[..]), Some(&table[..]), 99).unwrap();
        assert_eq!(normals, vec![[4, 5, 6, 0], [1, 2, 3, 0], [1, 2, 3, 0]]);
    }

    #[test]
    fn per_vertex_lookup_uses_high_plane() {
        let mut table = vec![[0u8; 3]; 257];
        table[256] = [9, 9, 9];
        let normals = unpack_normals(Some(&[0u8, 1][..]), Some(table.as_slice()), 1).unwrap();
        assert_eq!(normals, vec![[9, 9, 9, 0]]);
    }

    #[test]
    fn missing_inputs_fill_default() {
        let table = [[1, 2, 3]];
        assert_eq!(unpack_normals(None, None, 2).unwrap(), vec![NO_NORMAL; 2]);
        assert_eq!(
            unpack_normals(None, Some(&table[..]), 3).unwrap(),
            vec![NO_NORMAL; 3]
        );
        assert_eq!(
            unpack_normals(Some(&[0u8, 0][..]), None, 1).unwrap(),
            vec![NO_NORMAL]
        );
    }

    #[test]
    fn lookup_errors() {
        let table = [[1, 2, 3]];
        assert!(matches!(
            unpack_normals(Some(&[0u8, 0, 0][..]), Some(&table[..]), 0).unwrap_err(),
            DecodeError::InvalidLength { .. }
        ));
        assert!(matches!(
            unpack_normals(Some(&[1u8, 0][..]), Some(&table[..]), 0).unwrap_err(),
            DecodeError::NormalIndexOutOfRange { index: 1, len: 1 }
        ));
    }

    proptest! {
        #[test]
        fn reconstructed_normals_are_unit(shift in 0u8..8, a in any::<u8>(), f in any::<u8>()) {
            let exact = unfold_normal(
                f64::from(expand(a, shift)) / 255.0,
                f64::from(expand(f, shift)) / 255.0,
            );
            prop_assert!((exact.length() - 1.0).abs() < 1e-9);

            let table = unpack_for_normals(&packed(shift, &[a], &[f])).unwrap();
            let n = to_unit(table[0]);
            prop_assert!((n.length() - 1.0).abs() < 2.5e-2);
        }
    }
}

//! Oriented bounding box unpacking.

use std::f64::consts::PI;

use glam::{DMat3, DVec3, Vec3};

use crate::OrientedBoundingBox;
use crate::error::{DecodeError, DecodeResult};

/// Size of a packed OBB record.
pub const PACKED_OBB_LEN: usize = 15;

/// Unpack a 15-byte oriented bounding box.
///
/// # Format
///
/// - Bytes 0-5: Center offset (3 × i16) relative to `head_node_center`
/// - Bytes 6-8: Extents (3 × u8)
/// - Bytes 9-14: Euler angles (3 × u16)
///
/// All values are little-endian. Offsets and extents are in texels of the
/// node's level; the middle angle only spans half a turn.
///
/// # Arguments
///
/// * `packed` - 15-byte packed OBB data
/// * `head_node_center` - Reference point for center offset
/// * `meters_per_texel` - Scale factor for positions
pub fn unpack_obb(
    packed: &[u8],
    head_node_center: Vec3,
    meters_per_texel: f32,
) -> DecodeResult<OrientedBoundingBox> {
    let packed: &[u8; PACKED_OBB_LEN] =
        packed.try_into().map_err(|_| DecodeError::InvalidLength {
            what: "oriented bounding box (must be 15 bytes)",
            actual: packed.len(),
        })?;

    let mpt = f64::from(meters_per_texel);
    let i16_at = |i: usize| f64::from(i16::from_le_bytes([packed[i], packed[i + 1]]));
    let u16_at = |i: usize| f64::from(u16::from_le_bytes([packed[i], packed[i + 1]]));

    let center = DVec3::new(i16_at(0), i16_at(2), i16_at(4)) * mpt + head_node_center.as_dvec3();
    let extents = DVec3::new(
        f64::from(packed[6]),
        f64::from(packed[7]),
        f64::from(packed[8]),
    ) * mpt;

    let euler = DVec3::new(
        u16_at(9) * (PI / 32768.0),
        u16_at(11) * (PI / 65536.0),
        u16_at(13) * (PI / 32768.0),
    );

    Ok(OrientedBoundingBox {
        center,
        extents,
        orientation: euler_to_orientation(euler),
    })
}

/// Build the rotation for the format's packed Euler angles.
///
/// Rows are written out explicitly; the axis order and signs do not match
/// any of `glam`'s `EulerRot` conventions.
#[must_use]
pub fn euler_to_orientation(euler: DVec3) -> DMat3 {
    let (s0, c0) = euler.x.sin_cos();
    let (s1, c1) = euler.y.sin_cos();
    let (s2, c2) = euler.z.sin_cos();

    let rows = [
        [c0 * c2 - c1 * s0 * s2, c1 * c0 * s2 + c2 * s0, s2 * s1],
        [-c0 * s2 - c2 * c1 * s0, c0 * c1 * c2 - s0 * s2, c2 * s1],
        [s1 * s0, -c0 * s1, c1],
    ];
    DMat3::from_cols_array_2d(&rows).transpose()
}

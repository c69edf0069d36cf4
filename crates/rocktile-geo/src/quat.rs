//! Rotation/quaternion conversions.
//!
//! Quaternions follow the Hamilton convention of [`glam::DQuat`]; stored
//! records list components in `w, x, y, z` order.

use glam::{DMat3, DQuat, DVec3};

/// Convert a rotation matrix to a unit quaternion.
///
/// Branches on the trace, then on the largest diagonal entry, so the
/// divisor never gets close to zero.
#[must_use]
pub fn quat_from_rotation_matrix(m: &DMat3) -> DQuat {
    // r(row, col)
    let r = |i: usize, j: usize| m.col(j)[i];
    let trace = r(0, 0) + r(1, 1) + r(2, 2);

    let (w, x, y, z) = if trace > 0.0 {
        let s = (trace + 1.0).sqrt() * 2.0;
        (
            0.25 * s,
            (r(2, 1) - r(1, 2)) / s,
            (r(0, 2) - r(2, 0)) / s,
            (r(1, 0) - r(0, 1)) / s,
        )
    } else if r(0, 0) > r(1, 1) && r(0, 0) > r(2, 2) {
        let s = (1.0 + r(0, 0) - r(1, 1) - r(2, 2)).sqrt() * 2.0;
        (
            (r(2, 1) - r(1, 2)) / s,
            0.25 * s,
            (r(0, 1) + r(1, 0)) / s,
            (r(0, 2) + r(2, 0)) / s,
        )
    } else if r(1, 1) > r(2, 2) {
        let s = (1.0 + r(1, 1) - r(0, 0) - r(2, 2)).sqrt() * 2.0;
        (
            (r(0, 2) - r(2, 0)) / s,
            (r(0, 1) + r(1, 0)) / s,
            0.25 * s,
            (r(1, 2) + r(2, 1)) / s,
        )
    } else {
        let s = (1.0 + r(2, 2) - r(0, 0) - r(1, 1)).sqrt() * 2.0;
        (
            (r(1, 0) - r(0, 1)) / s,
            (r(0, 2) + r(2, 0)) / s,
            (r(1, 2) + r(2, 1)) / s,
            0.25 * s,
        )
    };

    DQuat::from_xyzw(x, y, z, w).normalize()
}

#[must_use]
pub fn quat_to_rotation_matrix(q: DQuat) -> DMat3 {
    DMat3::from_quat(q)
}

/// Exponential map from an axis-angle vector (radians).
///
/// The zero vector maps to the identity.
#[must_use]
pub fn quat_exp(axis_angle: DVec3) -> DQuat {
    let angle = axis_angle.length();
    if angle == 0.0 {
        return DQuat::IDENTITY;
    }
    DQuat::from_axis_angle(axis_angle / angle, angle)
}

/// Inverse of a unit quaternion.
#[must_use]
pub fn quat_inverse(q: DQuat) -> DQuat {
    q.conjugate()
}

/// Rotation applying `b` first, then `a`.
#[must_use]
pub fn compose(a: DQuat, b: DQuat) -> DQuat {
    a * b
}

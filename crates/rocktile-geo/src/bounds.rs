//! Corners and overlap tests for oriented bounding boxes.

use glam::DVec3;
use rocktile_decode::OrientedBoundingBox;

/// The eight corners of a box.
///
/// Corner `i` takes the positive extent on x when bit 0 is set, on y for
/// bit 1 and on z for bit 2.
#[must_use]
pub fn obb_corners(obb: &OrientedBoundingBox) -> [DVec3; 8] {
    std::array::from_fn(|i| {
        let sign = |bit: usize| if (i >> bit) & 1 == 1 { 1.0 } else { -1.0 };
        let local = DVec3::new(sign(0), sign(1), sign(2)) * obb.extents;
        obb.center + obb.orientation * local
    })
}

/// Separating-axis test on the face normals of both boxes.
///
/// Edge-cross axes are not tested, so a few boxes that only meet near an
/// edge are reported as intersecting.
#[must_use]
pub fn obbs_intersect(a: &OrientedBoundingBox, b: &OrientedBoundingBox) -> bool {
    let corners_a = obb_corners(a);
    let corners_b = obb_corners(b);

    let axes = [a.orientation, b.orientation]
        .into_iter()
        .flat_map(|m| [m.x_axis, m.y_axis, m.z_axis]);

    for axis in axes {
        let (min_a, max_a) = project(&corners_a, axis);
        let (min_b, max_b) = project(&corners_b, axis);
        if max_a < min_b || min_a > max_b {
            return false;
        }
    }
    true
}

fn project(corners: &[DVec3; 8], axis: DVec3) -> (f64, f64) {
    corners
        .iter()
        .map(|c| c.dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quat::{quat_exp, quat_to_rotation_matrix};
    use glam::DMat3;
    use std::f64::consts::FRAC_PI_4;

    fn cube(center: DVec3, half: f64, orientation: DMat3) -> OrientedBoundingBox {
        OrientedBoundingBox {
            center,
            extents: DVec3::splat(half),
            orientation,
        }
    }

    #[test]
    fn corner_order() {
        let obb = OrientedBoundingBox {
            center: DVec3::new(10.0, 0.0, 0.0),
            extents: DVec3::new(1.0, 2.0, 3.0),
            orientation: DMat3::IDENTITY,
        };
        let corners = obb_corners(&obb);
        assert_eq!(corners[0], DVec3::new(9.0, -2.0, -3.0));
        assert_eq!(corners[1], DVec3::new(11.0, -2.0, -3.0));
        assert_eq!(corners[2], DVec3::new(9.0, 2.0, -3.0));
        assert_eq!(corners[4], DVec3::new(9.0, -2.0, 3.0));
        assert_eq!(corners[7], DVec3::new(11.0, 2.0, 3.0));
    }

    #[test]
    fn axis_aligned_overlap() {
        let a = cube(DVec3::ZERO, 1.0, DMat3::IDENTITY);
        let touching = cube(DVec3::new(2.0, 0.0, 0.0), 1.0, DMat3::IDENTITY);
        let apart = cube(DVec3::new(2.5, 0.0, 0.0), 1.0, DMat3::IDENTITY);
        assert!(obbs_intersect(&a, &a));
        assert!(obbs_intersect(&a, &touching));
        assert!(!obbs_intersect(&a, &apart));
        assert!(!obbs_intersect(&apart, &a));
    }

    #[test]
    fn rotated_box_reaches_further() {
        let spun = quat_to_rotation_matrix(quat_exp(DVec3::new(0.0, 0.0, FRAC_PI_4)));
        let a = cube(DVec3::ZERO, 1.0, DMat3::IDENTITY);
        // A unit cube turned 45° reaches sqrt(2) along x.
        let b = cube(DVec3::new(2.3, 0.0, 0.0), 1.0, spun);
        let c = cube(DVec3::new(2.5, 0.0, 0.0), 1.0, spun);
        assert!(obbs_intersect(&a, &b));
        assert!(!obbs_intersect(&a, &c));
    }
}

//! Correction from the authalic sphere to the WGS84 ellipsoid.
//!
//! Tile placements put vertices on a sphere of radius [`AUTHALIC_RADIUS`].
//! To get true WGS84 ECEF positions every point is re-projected: its
//! spherical latitude, longitude and height are reinterpreted as geodetic
//! coordinates on the ellipsoid. That map is not affine, so for a whole tile
//! it is approximated by the affine map that is exact at four corners.

use glam::{DMat4, DVec3, DVec4};
use nalgebra::{SMatrix, SVector};

use crate::earth::{AUTHALIC_RADIUS, WGS84_EQUATORIAL_RADIUS, WGS84_UNIT};
use crate::error::{GeoError, GeoResult};

/// Tile-local reference corners: origin, then the far end of z, x and y.
pub const TILE_CORNERS: [DVec3; 4] = [
    DVec3::new(0.0, 0.0, 0.0),
    DVec3::new(0.0, 0.0, 255.0),
    DVec3::new(255.0, 0.0, 0.0),
    DVec3::new(0.0, 255.0, 0.0),
];

/// Relative volume below which four points are treated as coplanar.
const DEGENERATE_VOLUME: f64 = 1e-12;

/// Re-project a point on the authalic sphere onto the WGS84 ellipsoid.
///
/// Both input and output are ECEF meters.
#[must_use]
pub fn authalic_to_wgs84_pt(p: DVec3) -> DVec3 {
    let q = p / AUTHALIC_RADIUS;
    let lon = q.y.atan2(q.x);
    let lat = q.z.atan2(q.x.hypot(q.y));
    let alt = q.length() - 1.0;

    WGS84_UNIT.ecef_from_radians(lon, lat, alt) * WGS84_EQUATORIAL_RADIUS
}

/// Solve for the affine map taking each `src[i]` to `dst[i]`.
///
/// The nine linear coefficients and three translations form a 12×12 system
/// with one block of three rows per point pair.
///
/// # Errors
///
/// Returns [`GeoError::SingularTransform`] when the source points do not
/// span a volume.
pub fn fit_affine_4pt(src: &[DVec3; 4], dst: &[DVec3; 4]) -> GeoResult<DMat4> {
    let e1 = src[1] - src[0];
    let e2 = src[2] - src[0];
    let e3 = src[3] - src[0];
    let volume = e1.dot(e2.cross(e3)).abs();
    let scale = e1.length() * e2.length() * e3.length();
    if volume.is_nan() || volume <= DEGENERATE_VOLUME * scale {
        return Err(GeoError::SingularTransform);
    }

    let mut a = SMatrix::<f64, 12, 12>::zeros();
    let mut b = SVector::<f64, 12>::zeros();
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        for axis in 0..3 {
            let row = i * 3 + axis;
            a[(row, axis * 3)] = s.x;
            a[(row, axis * 3 + 1)] = s.y;
            a[(row, axis * 3 + 2)] = s.z;
            a[(row, 9 + axis)] = 1.0;
            b[row] = d[axis];
        }
    }

    let t = a.lu().solve(&b).ok_or(GeoError::SingularTransform)?;

    Ok(DMat4::from_cols(
        DVec4::new(t[0], t[3], t[6], 0.0),
        DVec4::new(t[1], t[4], t[7], 0.0),
        DVec4::new(t[2], t[5], t[8], 0.0),
        DVec4::new(t[9], t[10], t[11], 1.0),
    ))
}

/// Affine correction for four authalic ECEF corners.
///
/// # Errors
///
/// Returns [`GeoError::SingularTransform`] for degenerate corners.
pub fn authalic_to_geodetic_corners(corners: &[DVec3; 4]) -> GeoResult<DMat4> {
    let corrected = corners.map(authalic_to_wgs84_pt);
    fit_affine_4pt(corners, &corrected)
}

/// Rewrite a tile placement so it lands on WGS84 instead of the authalic
/// sphere.
///
/// `placement` takes tile-local vertices to authalic ECEF. The result takes
/// them to WGS84 ECEF and is exact at [`TILE_CORNERS`].
///
/// # Errors
///
/// Returns [`GeoError::SingularTransform`] when the placement collapses the
/// tile cube.
pub fn authalic_to_geodetic_tile(placement: &DMat4) -> GeoResult<DMat4> {
    let corners = TILE_CORNERS.map(|c| placement.project_point3(c));
    Ok(authalic_to_geodetic_corners(&corners)? * *placement)
}

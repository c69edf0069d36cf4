//! Coordinate math for placing decoded tiles on the globe.
//!
//! Tiles arrive in an Earth-centered frame built on the authalic sphere.
//! This crate converts between that frame, WGS84 ECEF, WGS84 geodetic and
//! unit Web Mercator, and provides the rotation helpers used when exporting
//! bounding boxes.
//!
//! # Key functions
//!
//! - [`geodetic_to_ecef`] / [`ecef_to_geodetic`]: WGS84 conversions
//! - [`authalic_to_wgs84_pt`]: Correct a single point
//! - [`authalic_to_geodetic_tile`]: Correct a whole tile placement
//! - [`fit_affine_4pt`]: Affine map exact at four points
//! - [`quat_from_rotation_matrix`]: Rotation matrix to quaternion
//! - [`obbs_intersect`]: Separating-axis overlap test

mod error;

pub mod authalic;
pub mod bounds;
pub mod earth;
pub mod mercator;
pub mod quat;

pub use authalic::{
    TILE_CORNERS, authalic_to_geodetic_corners, authalic_to_geodetic_tile, authalic_to_wgs84_pt,
    fit_affine_4pt,
};
pub use bounds::{obb_corners, obbs_intersect};
pub use earth::{
    AUTHALIC, AUTHALIC_RADIUS, Ellipsoid, Geodetic, WGS84, WGS84_EQUATORIAL_RADIUS,
    WGS84_POLAR_RADIUS, WGS84_UNIT, ecef_to_geodetic, geodetic_to_ecef,
};
pub use error::{GeoError, GeoResult};
pub use mercator::{geodetic_to_unit_wm, unit_wm_to_ecef, unit_wm_to_geodetic};
pub use quat::{compose, quat_exp, quat_from_rotation_matrix, quat_inverse, quat_to_rotation_matrix};

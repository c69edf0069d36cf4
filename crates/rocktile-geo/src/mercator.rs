//! Unit Web Mercator.
//!
//! The unit square spans `[-1, 1]` on both axes: `x = lon / π` and
//! `y = ln(tan(π/4 + lat/2)) / π`. Height is scaled so one unit matches one
//! unit of `x` at the equator, i.e. `π · R1` meters.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::DVec3;

use crate::earth::{Geodetic, WGS84, WGS84_EQUATORIAL_RADIUS};

const METERS_PER_UNIT_HEIGHT: f64 = PI * WGS84_EQUATORIAL_RADIUS;

/// Unit Web Mercator to WGS84 geodetic (degrees, meters).
#[must_use]
pub fn unit_wm_to_geodetic(wm: DVec3) -> Geodetic {
    Geodetic::new(
        wm.x * 180.0,
        ((wm.y * PI).exp().atan() * 2.0 - FRAC_PI_2).to_degrees(),
        wm.z * METERS_PER_UNIT_HEIGHT,
    )
}

/// WGS84 geodetic to unit Web Mercator. Inverse of [`unit_wm_to_geodetic`].
#[must_use]
pub fn geodetic_to_unit_wm(position: Geodetic) -> DVec3 {
    let lat = position.lat.to_radians();
    DVec3::new(
        position.lon / 180.0,
        (FRAC_PI_4 + lat * 0.5).tan().ln() / PI,
        position.alt / METERS_PER_UNIT_HEIGHT,
    )
}

/// Unit Web Mercator straight to WGS84 ECEF meters.
#[must_use]
pub fn unit_wm_to_ecef(wm: DVec3) -> DVec3 {
    WGS84.geodetic_to_ecef(unit_wm_to_geodetic(wm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn origin_is_null_island() {
        let g = unit_wm_to_geodetic(DVec3::ZERO);
        assert_eq!(g.lon, 0.0);
        assert!(g.lat.abs() < 1e-12);
        assert_eq!(g.alt, 0.0);
        let ecef = unit_wm_to_ecef(DVec3::ZERO);
        assert!((ecef - DVec3::new(WGS84_EQUATORIAL_RADIUS, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn square_edge_is_mercator_limit() {
        let g = unit_wm_to_geodetic(DVec3::new(1.0, 1.0, 0.0));
        assert!((g.lon - 180.0).abs() < 1e-12);
        assert!((g.lat - 85.051_128_779_806_59).abs() < 1e-9);

        let south = unit_wm_to_geodetic(DVec3::new(-0.5, -1.0, 0.0));
        assert!((south.lon + 90.0).abs() < 1e-12);
        assert!((south.lat + 85.051_128_779_806_59).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn round_trip(x in -1.0f64..1.0, y in -1.0f64..1.0, z in -0.01f64..0.01) {
            let wm = DVec3::new(x, y, z);
            let back = geodetic_to_unit_wm(unit_wm_to_geodetic(wm));
            prop_assert!((back - wm).length() < 1e-9);
        }
    }
}

//! Earth reference models and geodetic/ECEF conversion.
//!
//! Two models are in play and must not be mixed up. Tile data is natively
//! in an Earth-centered frame built on an *authalic* sphere, while
//! geodetic coordinates in the rest of the world (and our output frame)
//! use the WGS84 ellipsoid. Callers pick a model by the frame their data is
//! actually in.

use glam::DVec3;

/// WGS84 semi-major axis in meters.
pub const WGS84_EQUATORIAL_RADIUS: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in meters.
pub const WGS84_POLAR_RADIUS: f64 = 6_356_752.314_245_179;
/// Radius of the authalic sphere the tile data is expressed on.
pub const AUTHALIC_RADIUS: f64 = 6_371_010.0;

/// An ellipsoid of revolution, or a sphere when both axes match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub equatorial_radius: f64,
    pub polar_radius: f64,
}

/// The WGS84 ellipsoid in meters.
pub const WGS84: Ellipsoid = Ellipsoid::new(WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS);

/// WGS84 scaled so the equatorial radius is 1.
pub const WGS84_UNIT: Ellipsoid = WGS84.normalized();

/// The authalic sphere in meters.
pub const AUTHALIC: Ellipsoid = Ellipsoid::sphere(AUTHALIC_RADIUS);

/// A geodetic position: degrees of longitude and latitude, meters of altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
}

impl Geodetic {
    #[must_use]
    pub const fn new(lon: f64, lat: f64, alt: f64) -> Self {
        Self { lon, lat, alt }
    }
}

impl Ellipsoid {
    #[must_use]
    pub const fn new(equatorial_radius: f64, polar_radius: f64) -> Self {
        Self {
            equatorial_radius,
            polar_radius,
        }
    }

    #[must_use]
    pub const fn sphere(radius: f64) -> Self {
        Self::new(radius, radius)
    }

    /// The same shape with a unit equatorial radius.
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self::new(1.0, self.polar_radius / self.equatorial_radius)
    }

    /// `(b / a)^2`.
    #[must_use]
    pub const fn b2_over_a2(&self) -> f64 {
        let ratio = self.polar_radius / self.equatorial_radius;
        ratio * ratio
    }

    /// First eccentricity squared, `1 - (b / a)^2`.
    #[must_use]
    pub const fn eccentricity_sq(&self) -> f64 {
        1.0 - self.b2_over_a2()
    }

    #[must_use]
    pub fn is_sphere(&self) -> bool {
        self.eccentricity_sq() == 0.0
    }

    /// Convert a geodetic position on this model to Earth-centered coordinates.
    #[must_use]
    pub fn geodetic_to_ecef(&self, position: Geodetic) -> DVec3 {
        self.ecef_from_radians(
            position.lon.to_radians(),
            position.lat.to_radians(),
            position.alt,
        )
    }

    /// Convert Earth-centered coordinates to a geodetic position on this model.
    ///
    /// On an ellipsoid the latitude is refined with exactly two fixed-point
    /// iterations, which is what the tile data was produced with. On a sphere
    /// the closed form is used.
    #[must_use]
    pub fn ecef_to_geodetic(&self, ecef: DVec3) -> Geodetic {
        let a = self.equatorial_radius;
        let DVec3 { x, y, z } = ecef / a;
        let lon = y.atan2(x);
        let p2 = x * x + y * y;
        let p = p2.sqrt();

        if self.is_sphere() {
            return Geodetic::new(
                lon.to_degrees(),
                z.atan2(p).to_degrees(),
                (DVec3::new(x, y, z).length() - 1.0) * a,
            );
        }

        let e2 = self.eccentricity_sq();
        let z2 = z * z;
        let mut k = 1.0 / (1.0 - e2);
        for _ in 0..2 {
            let c = ((1.0 - e2) * z2 * (k * k) + p2).powf(1.5) / e2;
            k = (c + (1.0 - e2) * z2 * k.powi(3)) / (c - p2);
        }
        let lat = (k * z).atan2(p);

        let rn = 1.0 / (1.0 - e2 * lat.sin().powi(2)).sqrt();
        let sin_abs_lat = lat.abs().sin();
        let cos_lat = lat.cos();
        let alt = (z.abs() + p - rn * (cos_lat + (1.0 - e2) * sin_abs_lat)) / (cos_lat + sin_abs_lat);

        Geodetic::new(lon.to_degrees(), lat.to_degrees(), alt * a)
    }

    /// Geodetic to ECEF with angles in radians and altitude in model units.
    pub(crate) fn ecef_from_radians(&self, lon: f64, lat: f64, alt: f64) -> DVec3 {
        let (sin_phi, cos_phi) = lat.sin_cos();
        let (sin_lam, cos_lam) = lon.sin_cos();
        let n_phi = self.equatorial_radius / (1.0 - self.eccentricity_sq() * sin_phi * sin_phi).sqrt();

        DVec3::new(
            (n_phi + alt) * cos_phi * cos_lam,
            (n_phi + alt) * cos_phi * sin_lam,
            (self.b2_over_a2() * n_phi + alt) * sin_phi,
        )
    }
}

/// WGS84 geodetic (degrees, meters) to ECEF meters.
#[must_use]
pub fn geodetic_to_ecef(lon: f64, lat: f64, alt: f64) -> DVec3 {
    WGS84.geodetic_to_ecef(Geodetic::new(lon, lat, alt))
}

/// ECEF meters to WGS84 geodetic (degrees, meters).
#[must_use]
pub fn ecef_to_geodetic(x: f64, y: f64, z: f64) -> Geodetic {
    WGS84.ecef_to_geodetic(DVec3::new(x, y, z))
}

//! Locally-flat geodesic helper ("cheap ruler").
//!
//! Distances are in metres and bearings in degrees clockwise from north. The
//! calculator is calibrated once per battle with the site's latitude; over the
//! few kilometres of a battle map the flat approximation is well inside the
//! accuracy the game needs.

use libm::{atan2, cos, sin, sqrt};

const EARTH_RADIUS_KM: f64 = 6378.137;
const FLATTENING: f64 = 1.0 / 298.257223563;
const E2: f64 = FLATTENING * (2.0 - FLATTENING);
const RAD: f64 = core::f64::consts::PI / 180.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Metres-per-degree scale factors for one reference latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCalculator {
    kx: f64,
    ky: f64,
}

impl GeoCalculator {
    /// Build a calculator calibrated for `latitude`.
    pub fn new(latitude: f64) -> Self {
        let m = RAD * EARTH_RADIUS_KM * 1000.0;
        let coslat = cos(latitude * RAD);
        let w2 = 1.0 / (1.0 - E2 * (1.0 - coslat * coslat));
        let w = sqrt(w2);
        Self {
            kx: m * w * coslat,
            ky: m * w * w2 * (1.0 - E2),
        }
    }

    /// Point reached by travelling `distance` metres on `bearing` degrees.
    /// A negative distance travels the reciprocal bearing.
    pub fn destination(&self, from: LatLng, distance: f64, bearing: f64) -> LatLng {
        let a = bearing * RAD;
        self.offset(from, sin(a) * distance, cos(a) * distance)
    }

    /// Point offset by `dx` metres east and `dy` metres north.
    pub fn offset(&self, from: LatLng, dx: f64, dy: f64) -> LatLng {
        LatLng {
            lat: from.lat + dy / self.ky,
            lng: from.lng + dx / self.kx,
        }
    }

    /// Distance in metres between two points.
    pub fn distance(&self, a: LatLng, b: LatLng) -> f64 {
        let dx = wrap(a.lng - b.lng) * self.kx;
        let dy = (a.lat - b.lat) * self.ky;
        sqrt(dx * dx + dy * dy)
    }

    /// Initial bearing from `a` to `b`, in degrees within (-180, 180].
    pub fn bearing(&self, a: LatLng, b: LatLng) -> f64 {
        let dx = wrap(b.lng - a.lng) * self.kx;
        let dy = (b.lat - a.lat) * self.ky;
        atan2(dx, dy) / RAD
    }
}

fn wrap(deg: f64) -> f64 {
    let mut d = deg;
    while d < -180.0 {
        d += 360.0;
    }
    while d > 180.0 {
        d -= 360.0;
    }
    d
}

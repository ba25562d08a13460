//! Placement geometry for automated deployment: where a side's ships go,
//! before any land check.

use crate::core::config::Rules;
use crate::core::geo::{GeoCalculator, LatLng};

/// Bearing and heading for a side deployed against `wind_direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formation {
    /// Bearing from the site towards where the wind comes from.
    pub upwind: u16,
    /// Ships face downwind.
    pub heading: u16,
    /// Bearing along which the line abreast is extended.
    pub abreast: u16,
}

impl Formation {
    pub fn for_wind(wind_direction: u8) -> Self {
        let upwind = (wind_direction % 8) as u16 * 45;
        Self {
            upwind,
            heading: (upwind + 180) % 360,
            abreast: abreast_bearing(upwind),
        }
    }

    /// Position of a side's first ship, upwind of the site.
    pub fn first_position(&self, calc: &GeoCalculator, site: LatLng, rules: &Rules) -> LatLng {
        calc.destination(site, rules.upwind_distance, self.upwind as f64)
    }

    /// Position next to the most easterly ship already placed, or `None`
    /// when nothing is placed yet.
    pub fn next_position(
        &self,
        calc: &GeoCalculator,
        placed: &[LatLng],
        rules: &Rules,
    ) -> Option<LatLng> {
        let anchor = most_easterly(placed)?;
        Some(calc.destination(anchor, rules.abreast_distance, self.abreast as f64))
    }

    /// The points tried for one ship: the preferred one, then each further
    /// creep along the heading, up to the attempt cap.
    pub fn candidates<'a>(
        &'a self,
        calc: &'a GeoCalculator,
        preferred: LatLng,
        rules: &'a Rules,
    ) -> impl Iterator<Item = LatLng> + 'a {
        (0..rules.max_placement_attempts).map(move |i| {
            calc.destination(
                preferred,
                rules.creep_distance * i as f64,
                self.heading as f64,
            )
        })
    }
}

/// Wind-orthogonal bearing, flipped if needed so the line grows eastward.
/// Due north and due south are nudged five degrees east.
pub fn abreast_bearing(upwind: u16) -> u16 {
    match (upwind + 90) % 360 {
        0 => 5,
        180 => 175,
        b if b > 180 => (b + 180) % 360,
        b => b,
    }
}

pub fn most_easterly(points: &[LatLng]) -> Option<LatLng> {
    points
        .iter()
        .copied()
        .max_by(|a, b| a.lng.total_cmp(&b.lng))
}

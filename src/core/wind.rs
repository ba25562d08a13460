//! Battle weather: strength on a seven-step Beaufort-like scale, direction as
//! one of eight compass points, and a forecast that only flavours the
//! description.

use alloc::string::String;
use core::fmt;

use rand::Rng;

use crate::core::config::{Rules, COMPASS_POINTS, WIND_STRENGTH_WEIGHTS, WIND_TITLES};
use crate::core::ship::Pace;

pub const MAX_STRENGTH: u8 = 6;
pub const DIRECTIONS: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum Forecast {
    Dropping,
    #[default]
    Steady,
    Freshening,
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Forecast::Dropping => "dropping",
            Forecast::Steady => "steady",
            Forecast::Freshening => "freshening",
        })
    }
}

/// What the weather allows at one strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherEffect {
    pub sailing: bool,
    pub rowing: bool,
    /// Highest pace a crippled ship can make.
    pub crippled_pace: Pace,
}

/// Change applied by one turn of wind evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindShift {
    /// Direction moved one point clockwise.
    Veered,
    /// Direction moved one point counter-clockwise.
    Backed,
    Dropped,
    Freshened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Wind {
    pub strength: u8,
    /// Compass point the wind blows from, 0 = N clockwise to 7 = NW.
    pub direction: u8,
    pub forecast: Forecast,
}

impl Wind {
    pub fn new(strength: u8, direction: u8, forecast: Forecast) -> Self {
        Self {
            strength: strength.min(MAX_STRENGTH),
            direction: direction % DIRECTIONS,
            forecast,
        }
    }

    /// Fresh weather for a new battle: any direction, strength weighted
    /// towards a moderate breeze.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let strength = WIND_STRENGTH_WEIGHTS[rng.random_range(0..WIND_STRENGTH_WEIGHTS.len())];
        let direction = rng.random_range(0..DIRECTIONS);
        let forecast = match rng.random_range(0..3u8) {
            0 => Forecast::Dropping,
            1 => Forecast::Steady,
            _ => Forecast::Freshening,
        };
        Self::new(strength, direction, forecast)
    }

    /// Roll for a change at the end of a turn. At most one of the four shifts
    /// happens; the forecast never changes.
    pub fn evolve<R: Rng + ?Sized>(&self, rng: &mut R, rules: &Rules) -> (Wind, Option<WindShift>) {
        let roll = rng.random_range(0..rules.wind_change_denominator.max(1));
        // stored records are not trusted to be in range
        let current = Wind::new(self.strength, self.direction, self.forecast);
        let mut next = current;
        let shift = if roll < rules.wind_change_numerator {
            match roll % 4 {
                0 => {
                    next.direction = (current.direction + 1) % DIRECTIONS;
                    WindShift::Veered
                }
                1 => {
                    next.direction = (current.direction + DIRECTIONS - 1) % DIRECTIONS;
                    WindShift::Backed
                }
                2 => {
                    next.strength = current.strength.saturating_sub(1);
                    WindShift::Dropped
                }
                _ => {
                    next.strength = (current.strength + 1).min(MAX_STRENGTH);
                    WindShift::Freshened
                }
            }
        } else {
            return (next, None);
        };
        (next, Some(shift))
    }

    pub fn effect(&self, rules: &Rules) -> WeatherEffect {
        rules.weather[self.strength.min(MAX_STRENGTH) as usize]
    }

    pub fn title(&self) -> &'static str {
        WIND_TITLES[self.strength.min(MAX_STRENGTH) as usize]
    }

    pub fn compass(&self) -> &'static str {
        COMPASS_POINTS[(self.direction % DIRECTIONS) as usize]
    }

    /// Bearing in degrees the wind blows from.
    pub fn bearing(&self) -> u16 {
        (self.direction % DIRECTIONS) as u16 * 45
    }

    /// e.g. "gentle breeze from the NE, steady".
    pub fn describe(&self) -> String {
        alloc::format!("{} from the {}, {}", self.title(), self.compass(), self.forecast)
    }
}

use crate::core::catalogue::{Complement, SailTable, ShipTypeDef};
use crate::core::ship::Pace;
use crate::core::wind::WeatherEffect;

/// Movement sub-phases in one turn (a turn is about one minute).
pub const SUB_PHASES: usize = 5;

/// Full-speed turns a fresh crew can row before exhaustion.
pub const FULL_SPEED_TURNS: u32 = 4;

pub const NUM_SHIP_TYPES: usize = 5;

const fn crew(sailors: u32, archers: u32, marines: u32) -> Complement {
    Complement {
        sailors,
        archers,
        marines,
    }
}

const fn sail(beating: u32, reaching: u32, running: u32) -> SailTable {
    SailTable {
        beating,
        reaching,
        running,
    }
}

//                        Type           Decks Length Beam Hull Oars Crew(sail, arch, mar) Cruise Full TurnC TurnF Era  Light sail      Moderate sail
pub const SHIP_TYPES: [ShipTypeDef; NUM_SHIP_TYPES] = [
    ShipTypeDef::define("Pentaconter", 1, 0.75, 0.25, 2, 2, crew(2, 2, 2), 2, 3, 0, 0, 800, sail(5, 6, 7), sail(0, 6, 7)),
    ShipTypeDef::define("Bireme",      2, 1.5,  0.5,  3, 3, crew(2, 1, 5), 3, 5, 1, 1, 800, sail(4, 5, 6), sail(1, 6, 7)),
    ShipTypeDef::define("Trireme",     3, 1.5,  0.5,  4, 4, crew(4, 2, 10), 3, 5, 1, 2, 500, sail(4, 5, 6), sail(1, 6, 7)),
    ShipTypeDef::define("Quadrireme",  4, 1.5,  0.5,  6, 5, crew(4, 3, 15), 3, 5, 2, 3, 400, sail(3, 4, 5), sail(2, 5, 6)),
    ShipTypeDef::define("Quinquereme", 5, 1.5,  0.5,  8, 6, crew(4, 4, 20), 2, 4, 2, 3, 300, sail(3, 4, 5), sail(2, 5, 6)),
];

pub const CITIES: [&str; 9] = [
    "Athens", "Carthage", "Cyzicus", "Pergamum", "Persia", "Rhodes", "Rome", "Sparta", "Syracuse",
];

/// Names attested for ancient warships, drawn at random for new builds.
pub const SHIP_NAMES: [&str; 24] = [
    "Paralos", "Salaminia", "Amphitrite", "Argo", "Aphrodite", "Delphinia",
    "Eleutheria", "Euploia", "Galene", "Hippokampos", "Kalliste", "Kymothoe",
    "Nike", "Olympias", "Pandora", "Pelagia", "Polemarche", "Sozousa",
    "Soteira", "Tachyploos", "Thetis", "Thrasyleon", "Xanthippe", "Zephyria",
];

/// Weighted draw for a new battle's wind strength.
pub const WIND_STRENGTH_WEIGHTS: [u8; 34] = [
    0, 0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 4, 4, 4, 5,
    5, 6,
];

pub const WIND_TITLES: [&str; 7] = [
    "calm",
    "light air",
    "light breeze",
    "gentle breeze",
    "moderate breeze",
    "fresh breeze",
    "strong breeze",
];

pub const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

const fn weather(sailing: bool, rowing: bool, crippled_pace: Pace) -> WeatherEffect {
    WeatherEffect {
        sailing,
        rowing,
        crippled_pace,
    }
}

/// Indexed by wind strength.
pub const WEATHER: [WeatherEffect; 7] = [
    weather(false, true, Pace::Full),
    weather(false, true, Pace::Full),
    weather(true, true, Pace::Full),
    weather(true, true, Pace::Slow),
    weather(true, true, Pace::Slow),
    weather(true, false, Pace::Slow),
    weather(false, false, Pace::Stop),
];

/// Rule constants for turn resolution and deployment. Passed explicitly to
/// every component that needs them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    /// Sailing, rowing and crippled limits by wind strength.
    pub weather: [WeatherEffect; 7],
    /// Odds of a wind change each turn, as `numerator` in `denominator`.
    pub wind_change_numerator: u32,
    pub wind_change_denominator: u32,
    /// Sides of the die rolled for hole plugging and drowning; a one succeeds.
    pub die_sides: u32,
    /// Metres upwind of the site where a side's first ship is placed.
    pub upwind_distance: f64,
    /// Metres between ships placed in line abreast.
    pub abreast_distance: f64,
    /// Metres crept per retry when a candidate position is on land.
    pub creep_distance: f64,
    /// Land/sea checks attempted per ship before giving up.
    pub max_placement_attempts: u32,
    /// Elevation in metres above which a point counts as land.
    pub ground_elevation: f64,
    /// Grid cells per degree used to key cached elevations.
    pub grid_precision: f64,
    /// Metres survivors swim in one sub-phase.
    pub swim_distance: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            weather: WEATHER,
            wind_change_numerator: 4,
            wind_change_denominator: 52,
            die_sides: 6,
            upwind_distance: 2000.0,
            abreast_distance: 30.0,
            creep_distance: 100.0,
            max_placement_attempts: 20,
            ground_elevation: 4.0,
            grid_precision: 1000.0,
            swim_distance: 5.0,
        }
    }
}

/// Convert a speed in game units to metres covered in one sub-phase:
/// units -> knots -> km/h -> m/min, split over the sub-phases.
pub fn metres_per_sub_phase(speed: i32) -> f64 {
    libm::round(speed as f64 * 2.0 * 1.85 * 1000.0 / 60.0 / SUB_PHASES as f64)
}

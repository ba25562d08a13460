//! One-turn resolution: five movement sub-phases, oar transfers, combat
//! hooks and the end-of-turn rollover.
//!
//! Resolution is a pure function of a turn-start snapshot and a random
//! source. Nothing here touches storage; the caller commits the outcome.

use alloc::string::String;
use alloc::vec::Vec;

use rand::Rng;

use crate::core::battle::LogEntry;
use crate::core::catalogue::{Catalogue, PointOfSail, ShipTypeDef};
use crate::core::combat::{CombatContext, CombatResolver, NoCombat};
use crate::core::common::BattleError;
use crate::core::config::{metres_per_sub_phase, Rules, SUB_PHASES};
use crate::core::geo::{GeoCalculator, LatLng};
use crate::core::ship::{calc_heading, Order, Pace, Propulsion, SailRig, Ship, ShipState};
use crate::core::wind::{Wind, WindShift};

/// Everything the resolver reads, captured before any change is made.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnSnapshot {
    pub battle_id: String,
    pub turn: u32,
    pub wind: Wind,
    /// Used to calibrate distances.
    pub site: LatLng,
    pub ships: Vec<Ship>,
}

/// Position a ship left during a sub-phase, kept for drawing its wake.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Breadcrumb {
    pub turn: u32,
    pub phase: u8,
    pub location: LatLng,
}

/// Result of one turn: the new state of every ship plus what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The turn number after rollover.
    pub turn: u32,
    pub wind: Wind,
    pub wind_shift: Option<WindShift>,
    pub ships: Vec<Ship>,
    /// Ship id and wake position, in sub-phase order.
    pub crumbs: Vec<(String, Breadcrumb)>,
    pub log: Vec<LogEntry>,
    /// Ships that went down this turn.
    pub sunk: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy)]
struct TurnFlags {
    pace_changed: bool,
    sail_handled: bool,
}

pub struct TurnResolver<'a, C: CombatResolver = NoCombat> {
    catalogue: &'a Catalogue,
    rules: &'a Rules,
    combat: C,
}

impl<'a> TurnResolver<'a, NoCombat> {
    pub fn new(catalogue: &'a Catalogue, rules: &'a Rules) -> Self {
        Self::with_combat(catalogue, rules, NoCombat)
    }
}

impl<'a, C: CombatResolver> TurnResolver<'a, C> {
    pub fn with_combat(catalogue: &'a Catalogue, rules: &'a Rules, combat: C) -> Self {
        Self {
            catalogue,
            rules,
            combat,
        }
    }

    /// Signed speed in game units for the ship's current propulsion.
    /// Negative when backing water.
    pub fn speed(&self, ship: &Ship, wind: &Wind) -> Result<i32, BattleError> {
        if ship.health.sunk {
            return Ok(0);
        }
        let def = self.catalogue.require(&ship.ship_type)?;
        let effect = wind.effect(self.rules);
        let health = &ship.health;
        let speed = match ship.propulsion {
            Propulsion::Sailing { rig } => {
                if !effect.sailing || !health.rigging.mast || !health.rigging.sail {
                    0
                } else {
                    let point = PointOfSail::from_heading(ship.heading, wind.direction);
                    def.sailing_speed(wind.strength, rig, point) as i32
                }
            }
            Propulsion::Rowing { pace } => {
                if !effect.rowing || health.port.oars < 1 || health.starboard.oars < 1 {
                    0
                } else if ship.is_crippled() {
                    def.rowing_speed(pace.min(effect.crippled_pace), true)
                } else {
                    def.rowing_speed(pace, false)
                }
            }
        };
        Ok(speed)
    }

    /// Resolve one full turn from `snapshot`.
    pub fn resolve<R: Rng>(
        &self,
        snapshot: &TurnSnapshot,
        rng: &mut R,
    ) -> Result<TurnOutcome, BattleError> {
        for ship in &snapshot.ships {
            if ship.location.is_none() {
                return Err(BattleError::MissingLocation(ship.id.clone()));
            }
            self.catalogue.require(&ship.ship_type)?;
        }

        let calc = GeoCalculator::new(snapshot.site.lat);
        let mut ships = snapshot.ships.clone();
        let mut flags = alloc::vec![TurnFlags::default(); ships.len()];
        let mut crumbs = Vec::new();
        let mut events = Vec::new();
        let next_turn = snapshot.turn + 1;

        // Speeds are fixed for the whole turn; pace and sail orders only
        // take effect from the next one.
        let speeds = snapshot
            .ships
            .iter()
            .map(|s| self.speed(s, &snapshot.wind))
            .collect::<Result<Vec<_>, _>>()?;
        for phase in 0..SUB_PHASES {
            for ((ship, flags), &speed) in ships.iter_mut().zip(flags.iter_mut()).zip(&speeds) {
                self.sub_phase(ship, flags, phase, speed, snapshot.turn, &calc, &mut crumbs)?;
            }
            log::debug!("turn {} sub-phase {} moved", snapshot.turn, phase);
        }

        for (ship, &speed) in ships.iter_mut().zip(&speeds) {
            if let Some(entry) = transfer(ship, speed, next_turn) {
                events.push(entry);
            }
        }

        let mut ctx = CombatContext {
            turn: snapshot.turn,
            ships: &mut ships,
            log: &mut events,
            rng: &mut *rng,
        };
        self.combat.resolve(&mut ctx);

        let (wind, wind_shift) = snapshot.wind.evolve(rng, self.rules);
        if let Some(shift) = wind_shift {
            log::debug!("wind {:?}: {}", shift, wind.describe());
        }

        let mut sunk = Vec::new();
        for ship in ships.iter_mut() {
            if !ship.health.sunk {
                let def = self.catalogue.require(&ship.ship_type)?;
                self.exhaust(ship, next_turn, &mut events);
                if self.resolve_holes(ship, rng, next_turn, &mut events) {
                    sunk.push(ship.id.clone());
                } else {
                    cripple(ship, def, next_turn, &mut events);
                }
            }
            if ship.health.sunk {
                self.drown(ship, rng, next_turn, &mut events);
            }
            ship.orders = None;
        }

        Ok(TurnOutcome {
            turn: next_turn,
            wind,
            wind_shift,
            ships,
            crumbs,
            log: events,
            sunk,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn sub_phase(
        &self,
        ship: &mut Ship,
        flags: &mut TurnFlags,
        phase: usize,
        speed: i32,
        turn: u32,
        calc: &GeoCalculator,
        crumbs: &mut Vec<(String, Breadcrumb)>,
    ) -> Result<(), BattleError> {
        let order = ship.orders.map(|o| o[phase]).unwrap_or_default();
        let location = ship
            .location
            .ok_or_else(|| BattleError::MissingLocation(ship.id.clone()))?;
        let crumb = Breadcrumb {
            turn,
            phase: phase as u8,
            location,
        };

        if ship.health.sunk {
            if order == Order::Swim && ship.health.survivors() > 0 {
                crumbs.push((ship.id.clone(), crumb));
                ship.location = Some(calc.destination(
                    location,
                    self.rules.swim_distance,
                    ship.heading as f64,
                ));
            }
            return Ok(());
        }

        if speed != 0 {
            crumbs.push((ship.id.clone(), crumb));
            ship.location = Some(calc.destination(
                location,
                metres_per_sub_phase(speed),
                ship.heading as f64,
            ));
            ship.delay_countdown -= 1;
        }

        match order {
            Order::Faster | Order::Slower if !flags.pace_changed => {
                flags.pace_changed = true;
                change_pace(ship, order);
            }
            _ if order.is_steering() => {
                if speed != 0 && ship.health.can_steer() && ship.delay_countdown <= 0 {
                    let def = self.catalogue.require(&ship.ship_type)?;
                    ship.heading = calc_heading(ship.heading, order, speed < 0);
                    ship.delay_countdown = def.turn_delay_at(speed.abs()) as i32 + 1;
                }
            }
            Order::RaiseSail | Order::LowerSail if !flags.sail_handled => {
                flags.sail_handled = true;
                handle_sail(ship, order);
            }
            _ => {}
        }
        Ok(())
    }

    /// A turn ended at full pace spends one full-speed turn.
    fn exhaust(&self, ship: &mut Ship, turn: u32, log: &mut Vec<LogEntry>) {
        if ship.propulsion != (Propulsion::Rowing { pace: Pace::Full }) {
            return;
        }
        ship.health.full_speeds = ship.health.full_speeds.saturating_sub(1);
        if ship.health.full_speeds == 0 {
            ship.propulsion = Propulsion::Rowing { pace: Pace::Cruise };
            log.push(LogEntry::new(&ship.id, turn, "rowers exhausted"));
        }
    }

    /// One attempt per turn to plug a hole; failure costs one point of hull.
    /// Returns true if the ship sank.
    fn resolve_holes<R: Rng>(
        &self,
        ship: &mut Ship,
        rng: &mut R,
        turn: u32,
        log: &mut Vec<LogEntry>,
    ) -> bool {
        if ship.health.holes > 0 {
            if roll(rng, self.rules.die_sides) {
                ship.health.holes -= 1;
                log.push(LogEntry::new(&ship.id, turn, "hole plugged"));
            } else {
                ship.health.hull = ship.health.hull.saturating_sub(1);
                log.push(
                    LogEntry::new(&ship.id, turn, "plug failed")
                        .with_note(alloc::format!("hull {}", ship.health.hull)),
                );
            }
        }
        if ship.health.hull == 0 {
            ship.health.sunk = true;
            ship.state = ShipState::Sunk;
            ship.propulsion = Propulsion::Rowing { pace: Pace::Stop };
            log.push(LogEntry::new(&ship.id, turn, "SUNK!"));
            log::info!("ship {} sank on turn {}", ship.id, turn);
            return true;
        }
        false
    }

    /// Survivors in the water: every crew member and oar bank has a one in
    /// `die_sides` chance of drowning each turn.
    fn drown<R: Rng>(&self, ship: &mut Ship, rng: &mut R, turn: u32, log: &mut Vec<LogEntry>) {
        let sides = self.rules.die_sides;
        let health = &mut ship.health;
        let groups: [(&str, &mut u32); 7] = [
            ("captain", &mut health.crew.captain),
            ("steersman", &mut health.crew.steersman),
            ("sailors", &mut health.crew.sailors),
            ("archers", &mut health.crew.archers),
            ("marines", &mut health.crew.marines),
            ("port rowers", &mut health.port.oars),
            ("starboard rowers", &mut health.starboard.oars),
        ];
        for (label, count) in groups {
            let lost = (0..*count).filter(|_| roll(rng, sides)).count() as u32;
            if lost > 0 {
                *count -= lost;
                log.push(LogEntry::new(
                    &ship.id,
                    turn,
                    alloc::format!("{} {} drowned", lost, label),
                ));
            }
        }
    }
}

fn roll<R: Rng>(rng: &mut R, sides: u32) -> bool {
    rng.random_range(0..sides.max(1)) == 0
}

/// Shift one oar bank to an empty side. Only for a rowing ship that was
/// stationary this turn; at most once per turn.
fn transfer(ship: &mut Ship, speed: i32, turn: u32) -> Option<LogEntry> {
    let wants = ship
        .orders
        .map(|o| o.contains(&Order::Transfer))
        .unwrap_or(false);
    if !wants || speed != 0 || ship.health.sunk {
        return None;
    }
    if !matches!(ship.propulsion, Propulsion::Rowing { .. }) {
        return None;
    }
    let health = &mut ship.health;
    let to = if health.port.oars == 0 && health.starboard.oars > 1 {
        health.port.oars = 1;
        health.starboard.oars -= 1;
        "port"
    } else if health.starboard.oars == 0 && health.port.oars > 1 {
        health.starboard.oars = 1;
        health.port.oars -= 1;
        "starboard"
    } else {
        return None;
    };
    ship.propulsion = Propulsion::Rowing { pace: Pace::Stop };
    Some(LogEntry::new(&ship.id, turn, "oars transferred").with_note(alloc::format!("to {}", to)))
}

fn change_pace(ship: &mut Ship, order: Order) {
    ship.propulsion = match (ship.propulsion, order) {
        (Propulsion::Rowing { pace }, Order::Faster) => {
            let next = pace.faster();
            if next == Pace::Full && ship.health.full_speeds == 0 {
                Propulsion::Rowing { pace }
            } else {
                Propulsion::Rowing { pace: next }
            }
        }
        (Propulsion::Rowing { pace }, _) => Propulsion::Rowing { pace: pace.slower() },
        (Propulsion::Sailing { .. }, Order::Faster) => Propulsion::Sailing { rig: SailRig::Full },
        (Propulsion::Sailing { .. }, _) => Propulsion::Sailing {
            rig: SailRig::Reefed,
        },
    };
}

/// Raising needs a mast, a sail and deck hands; lowering leaves the ship
/// stopped under oars.
fn handle_sail(ship: &mut Ship, order: Order) {
    let health = &ship.health;
    match (ship.propulsion, order) {
        (Propulsion::Rowing { .. }, Order::RaiseSail)
            if health.rigging.mast && health.rigging.sail && health.crew.sailors > 0 =>
        {
            ship.propulsion = Propulsion::Sailing { rig: SailRig::Full };
        }
        (Propulsion::Sailing { .. }, Order::LowerSail) => {
            ship.propulsion = Propulsion::Rowing { pace: Pace::Stop };
        }
        _ => {}
    }
}

/// A sound ship whose hull is down to half or less is crippled.
fn cripple(ship: &mut Ship, def: &ShipTypeDef, turn: u32, log: &mut Vec<LogEntry>) {
    if matches!(ship.state, ShipState::New | ShipState::Ready) && ship.health.hull * 2 <= def.hull {
        ship.state = ShipState::Crippled;
        log.push(LogEntry::new(&ship.id, turn, "crippled"));
    }
}

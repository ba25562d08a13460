//! Readiness review: decides how far a battle's setup has progressed.

use crate::core::battle::{Awaiting, Battle, Side, Squadron};
use crate::core::ship::Ship;

/// Pass/fail for each setup check, published on the battle record for
/// display. The stored `awaiting` phase is authoritative, not this report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase"))]
pub struct ReadinessReport {
    pub players_set: bool,
    pub squadrons_ok: bool,
    pub ships_ok: bool,
    pub flags_ok: bool,
    pub all_deployed: bool,
}

impl ReadinessReport {
    /// Furthest phase whose prerequisites all hold, counting from `players`.
    pub fn phase(&self) -> Awaiting {
        if !self.players_set {
            Awaiting::Players
        } else if !(self.squadrons_ok && self.ships_ok && self.flags_ok) {
            Awaiting::Squadrons
        } else if !self.all_deployed {
            Awaiting::Deployment
        } else {
            Awaiting::Orders
        }
    }

    /// Phase to store: never earlier than the current one.
    pub fn next_phase(&self, current: Awaiting) -> Awaiting {
        self.phase().max(current)
    }
}

/// Evaluate the setup checks. `squadrons` are the enrolled squadron records
/// and `ships` every ship belonging to them.
pub fn evaluate(battle: &Battle, squadrons: &[Squadron], ships: &[Ship]) -> ReadinessReport {
    let players_set =
        !battle.squadrons.is_empty() && battle.squadrons.values().all(|s| s.player.is_some());

    let unassigned = battle.squadrons.values().any(|s| s.side.is_none());
    let squadrons_ok = !unassigned
        && Side::BOTH
            .iter()
            .all(|side| battle.squadrons_on(*side).next().is_some());

    let ships_ok = Side::BOTH.iter().all(|side| {
        battle
            .squadrons_on(*side)
            .any(|sq| eligible_in(ships, sq).next().is_some())
    });

    let flags_ok = squadrons
        .iter()
        .filter(|sq| battle.squadrons.contains_key(&sq.id))
        .all(|sq| {
            let eligible = eligible_in(ships, &sq.id).count();
            eligible == 0 || eligible_in(ships, &sq.id).filter(|s| s.flagship).count() == 1
        });

    let all_deployed = battle
        .squadrons
        .keys()
        .all(|sq| eligible_in(ships, sq).all(|s| s.in_battle(&battle.id)));

    ReadinessReport {
        players_set,
        squadrons_ok,
        ships_ok,
        flags_ok,
        all_deployed,
    }
}

fn eligible_in<'a>(ships: &'a [Ship], squadron: &'a str) -> impl Iterator<Item = &'a Ship> + 'a {
    ships
        .iter()
        .filter(move |s| s.squadron.as_deref() == Some(squadron) && s.is_eligible())
}

/// A battle is decided once either side has no eligible ship still afloat
/// in it.
pub fn is_decided(battle: &Battle, ships: &[Ship]) -> bool {
    Side::BOTH.iter().any(|side| {
        !ships.iter().any(|ship| {
            ship.in_battle(&battle.id)
                && ship.is_eligible()
                && !ship.health.sunk
                && ship
                    .squadron
                    .as_deref()
                    .and_then(|sq| battle.side_of(sq))
                    == Some(*side)
        })
    })
}

//! Combat phases run after movement each turn. The stock resolver does
//! nothing; rules for missile fire and melee plug in here.

use alloc::vec::Vec;

use rand::RngCore;

use crate::core::battle::LogEntry;
use crate::core::ship::Ship;

/// Everything a combat phase may read or change: the ships after movement,
/// the turn being resolved and the log for this turn.
pub struct CombatContext<'a> {
    pub turn: u32,
    pub ships: &'a mut [Ship],
    pub log: &'a mut Vec<LogEntry>,
    pub rng: &'a mut dyn RngCore,
}

/// Hooks for the combat phases, called in declaration order.
pub trait CombatResolver {
    fn archery(&self, _ctx: &mut CombatContext<'_>) {}
    fn raking(&self, _ctx: &mut CombatContext<'_>) {}
    fn ramming(&self, _ctx: &mut CombatContext<'_>) {}
    fn grappling(&self, _ctx: &mut CombatContext<'_>) {}
    fn boarding(&self, _ctx: &mut CombatContext<'_>) {}
    fn morale(&self, _ctx: &mut CombatContext<'_>) {}

    fn resolve(&self, ctx: &mut CombatContext<'_>) {
        self.archery(ctx);
        self.raking(ctx);
        self.ramming(ctx);
        self.grappling(ctx);
        self.boarding(ctx);
        self.morale(ctx);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCombat;

impl CombatResolver for NoCombat {}

impl<T: CombatResolver + ?Sized> CombatResolver for &T {
    fn archery(&self, ctx: &mut CombatContext<'_>) {
        (**self).archery(ctx)
    }
    fn raking(&self, ctx: &mut CombatContext<'_>) {
        (**self).raking(ctx)
    }
    fn ramming(&self, ctx: &mut CombatContext<'_>) {
        (**self).ramming(ctx)
    }
    fn grappling(&self, ctx: &mut CombatContext<'_>) {
        (**self).grappling(ctx)
    }
    fn boarding(&self, ctx: &mut CombatContext<'_>) {
        (**self).boarding(ctx)
    }
    fn morale(&self, ctx: &mut CombatContext<'_>) {
        (**self).morale(ctx)
    }
    fn resolve(&self, ctx: &mut CombatContext<'_>) {
        (**self).resolve(ctx)
    }
}

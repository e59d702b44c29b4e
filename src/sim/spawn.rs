//! Spawn scheduling
//!
//! Once per spawn tick the round asks its `SpawnPolicy` what kind of object
//! to create, then launches it from below the field with kind-specific
//! kinematics.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::ObjectKind;
use crate::consts::*;
use crate::tuning::{Tuning, Variant};

/// What a policy may look at when deciding
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    /// Unpaused time since round start
    pub active_ms: u64,
    pub time_remaining: u32,
    pub round_seconds: u32,
    /// Bonus objects spawned so far this round
    pub bonuses_spawned: u32,
    /// An unsliced bonus is still in the field
    pub bonus_live: bool,
}

/// Decides the kind of each spawned object
pub trait SpawnPolicy: std::fmt::Debug {
    fn choose(&mut self, ctx: &SpawnContext, rng: &mut Pcg32) -> ObjectKind;
}

/// Bonus objects at most every `spacing_ms` of active time, capped per round.
/// Never spawns bombs.
#[derive(Debug, Clone)]
pub struct EvenlyPaced {
    pub spacing_ms: u64,
    pub max_bonuses: u32,
    last_bonus_ms: u64,
}

impl EvenlyPaced {
    pub fn new(spacing_ms: u64, max_bonuses: u32) -> Self {
        Self {
            spacing_ms,
            max_bonuses,
            last_bonus_ms: 0,
        }
    }
}

impl SpawnPolicy for EvenlyPaced {
    fn choose(&mut self, ctx: &SpawnContext, _rng: &mut Pcg32) -> ObjectKind {
        let since_last = ctx.active_ms.saturating_sub(self.last_bonus_ms);
        if since_last >= self.spacing_ms
            && ctx.bonuses_spawned < self.max_bonuses
            && !ctx.bonus_live
        {
            self.last_bonus_ms = ctx.active_ms;
            ObjectKind::Bonus
        } else {
            ObjectKind::Normal
        }
    }
}

/// Fixed per-tick bonus chance within the bonus budget, plus bombs once the
/// opening grace period is over. Bonuses may cluster.
#[derive(Debug, Clone)]
pub struct RandomThreshold {
    pub bonus_probability: f32,
    pub bomb_probability: f32,
    pub max_bonuses: u32,
    pub bomb_after_seconds: u32,
}

impl SpawnPolicy for RandomThreshold {
    fn choose(&mut self, ctx: &SpawnContext, rng: &mut Pcg32) -> ObjectKind {
        let roll: f32 = rng.random();
        let bombs_allowed =
            ctx.time_remaining < ctx.round_seconds.saturating_sub(self.bomb_after_seconds);

        if roll < self.bonus_probability && ctx.bonuses_spawned < self.max_bonuses && !ctx.bonus_live
        {
            ObjectKind::Bonus
        } else if roll < self.bonus_probability + self.bomb_probability && bombs_allowed {
            ObjectKind::Bomb
        } else {
            ObjectKind::Normal
        }
    }
}

/// Build the spawn policy for a tuning's variant
pub fn policy_for(tuning: &Tuning) -> Box<dyn SpawnPolicy> {
    match tuning.variant {
        Variant::EvenlyPaced => Box::new(EvenlyPaced::new(
            tuning.bonus_spacing_ms,
            tuning.max_bonuses,
        )),
        Variant::RandomThreshold => Box::new(RandomThreshold {
            bonus_probability: tuning.bonus_probability,
            bomb_probability: tuning.bomb_probability,
            max_bonuses: tuning.max_bonuses,
            bomb_after_seconds: tuning.bomb_after_seconds,
        }),
    }
}

/// Initial kinematics for a new object
#[derive(Debug, Clone, Copy)]
pub struct Launch {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
}

/// Launch from below the field with an upward velocity. Bonus objects rise
/// slower and hang longer so they are easier to tap.
pub fn launch(kind: ObjectKind, tuning: &Tuning, rng: &mut Pcg32) -> Launch {
    let usable = (tuning.field_width - 2.0 * tuning.spawn_margin).max(0.0);
    let x = rng.random::<f32>() * usable + tuning.spawn_margin;
    let y = tuning.field_height + tuning.spawn_depth;

    let (speed, spread, gravity) = match kind {
        ObjectKind::Bonus => (BONUS_LAUNCH_SPEED, BONUS_LAUNCH_SPREAD, BONUS_GRAVITY),
        ObjectKind::Normal | ObjectKind::Bomb => {
            (NORMAL_LAUNCH_SPEED, NORMAL_LAUNCH_SPREAD, NORMAL_GRAVITY)
        }
    };
    let vy = -(speed + rng.random::<f32>() * spread);
    let vx = (rng.random::<f32>() - 0.5) * LATERAL_SPREAD;

    Launch {
        pos: Vec2::new(x, y),
        vel: Vec2::new(vx, vy),
        gravity,
    }
}

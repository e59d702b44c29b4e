//! Round state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Unique per round, assigned in increasing order, never reused
pub type ObjectId = u32;

/// What a falling object does when dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Scores a point
    Normal,
    /// Opens a quiz
    Bonus,
    /// Ends the round (alternate variant only)
    Bomb,
}

impl ObjectKind {
    /// Tap radius around the object center
    pub fn hit_radius(&self) -> f32 {
        match self {
            ObjectKind::Bonus => BONUS_HIT_RADIUS,
            ObjectKind::Normal | ObjectKind::Bomb => NORMAL_HIT_RADIUS,
        }
    }
}

/// A falling object entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    /// Added to vel.y every frame
    pub gravity: f32,
    /// Terminal: once set the object is inert
    pub sliced: bool,
    /// Clock time after which a sliced object is pruned
    #[serde(default)]
    pub remove_at_ms: Option<u64>,
}

impl FallingObject {
    pub fn new(id: ObjectId, kind: ObjectKind, pos: Vec2, vel: Vec2, gravity: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            gravity,
            sliced: false,
            remove_at_ms: None,
        }
    }

    /// Mark sliced. Returns false if it already was.
    pub fn slice(&mut self, now_ms: u64, linger_ms: u64) -> bool {
        if self.sliced {
            return false;
        }
        self.sliced = true;
        self.remove_at_ms = Some(now_ms + linger_ms);
        true
    }

    pub fn is_live_bonus(&self) -> bool {
        self.kind == ObjectKind::Bonus && !self.sliced
    }

    /// Whether a tap at `point` lands on this object
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.kind.hit_radius().powi(2)
    }
}

/// Aggregate counters for the running round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub score: u32,
    pub slices_count: u32,
    pub correct_answers: u32,
    pub bonuses_consumed: u32,
    /// Whole seconds left on the round timer
    pub time_remaining: u32,
}

impl RoundState {
    pub fn new(round_seconds: u32) -> Self {
        Self {
            score: 0,
            slices_count: 0,
            correct_answers: 0,
            bonuses_consumed: 0,
            time_remaining: round_seconds,
        }
    }
}

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Drivers active, taps accepted
    Running,
    /// Quiz open; spawn, physics and round timer are frozen
    Paused,
    /// Terminal
    Ended,
}

/// Final round output, handed to the round-ended collaborator exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub score: u32,
    pub slices_count: u32,
    pub correct_answers: u32,
    pub bonuses_consumed: u32,
    pub ended_by_bomb: bool,
}

impl RoundResult {
    pub fn from_state(state: &RoundState, ended_by_bomb: bool) -> Self {
        Self {
            score: state.score,
            slices_count: state.slices_count,
            correct_answers: state.correct_answers,
            bonuses_consumed: state.bonuses_consumed,
            ended_by_bomb,
        }
    }
}

/// Floating label style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// "+1"
    Slice,
    /// "SURPRISE!"
    Surprise,
    /// "BOOM!"
    Boom,
    /// "+10"
    QuizCorrect,
    /// "+5"
    QuizConsolation,
}

impl EffectKind {
    pub fn label(&self) -> &'static str {
        match self {
            EffectKind::Slice => "+1",
            EffectKind::Surprise => "SURPRISE!",
            EffectKind::Boom => "BOOM!",
            EffectKind::QuizCorrect => "+10",
            EffectKind::QuizConsolation => "+5",
        }
    }
}

/// Cosmetic floating label with a time to live (no gameplay coupling)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEffect {
    pub id: u32,
    pub kind: EffectKind,
    pub pos: Vec2,
    pub expires_at_ms: u64,
}

/// Notable things that happened during `advance`/`dismiss`/`answer_quiz`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    Spawned {
        id: ObjectId,
        kind: ObjectKind,
        /// Unpaused time since round start
        active_ms: u64,
    },
    Sliced {
        id: ObjectId,
        score: u32,
    },
    BonusHit {
        id: ObjectId,
        bonuses_consumed: u32,
    },
    BombHit {
        id: ObjectId,
    },
    QuizOpened {
        question: String,
    },
    QuizAnswered {
        correct: bool,
        timed_out: bool,
    },
    QuizClosed {
        correct: bool,
        points: u32,
    },
    SecondElapsed {
        time_remaining: u32,
    },
    RoundEnded(RoundResult),
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

//! Deterministic simulation module
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - Integer millisecond clock, advanced only by the host
//! - Seeded RNG only
//! - Stable iteration order (by object id, timers by due time then id)
//! - No rendering or platform dependencies

pub mod clock;
pub mod physics;
pub mod quiz;
pub mod round;
pub mod shuffle;
pub mod spawn;
pub mod state;

pub use clock::{Clock, TimerId, TimerKind};
pub use quiz::{
    AntiGhostTapPolicy, QuestionBank, QuizAnswer, QuizOption, QuizQuestion, QuizQueue,
    QuizSession, QuizStage,
};
pub use round::{Round, seed_from_entropy, start_round};
pub use shuffle::{shuffle, shuffled};
pub use spawn::{EvenlyPaced, RandomThreshold, SpawnContext, SpawnPolicy};
pub use state::{
    EffectKind, FallingObject, ObjectId, ObjectKind, RngState, RoundEvent, RoundPhase,
    RoundResult, RoundState, ScoreEffect,
};

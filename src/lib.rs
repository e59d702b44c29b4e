//! Quiz Slice - a timed slice-the-falling-objects arcade round
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (spawning, physics, quiz interruptions)
//! - `tuning`: Data-driven round balance
//! - `persistence`: Record store boundary (save/fetch of finished rounds)
//! - `leaderboard`: Best score per player
//! - `session`: Player code entry and round allowance
//! - `autoplay`: Seeded bot player for headless runs

pub mod autoplay;
pub mod error;
pub mod leaderboard;
pub mod persistence;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{BankError, ConfigError, QuizError, SessionError, StoreError};
pub use leaderboard::Leaderboard;
pub use tuning::{Tuning, Variant};

/// Round configuration constants
pub mod consts {
    /// Round length in whole seconds
    pub const ROUND_SECONDS: u32 = 60;
    /// Render frame period (~60 Hz)
    pub const FRAME_MS: u64 = 16;
    /// Spawn ticker period
    pub const SPAWN_PERIOD_MS: u64 = 800;
    /// Round timer period
    pub const SECOND_MS: u64 = 1000;

    /// Play field dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Keep spawns this far from the side edges
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Objects start this far below the bottom edge
    pub const SPAWN_DEPTH: f32 = 80.0;
    /// Objects past height + slack are culled
    pub const CULL_SLACK: f32 = 150.0;

    /// Minimum active time between two bonus spawns
    pub const BONUS_SPACING_MS: u64 = 5800;
    /// Bonus spawns allowed per round
    pub const MAX_BONUSES: u32 = 10;
    /// Alternate variant: chance a spawn tick produces a bonus
    pub const BONUS_PROBABILITY: f32 = 0.10;
    /// Alternate variant: chance (on top of the bonus chance) of a bomb
    pub const BOMB_PROBABILITY: f32 = 0.05;
    /// Alternate variant: bombs only appear after this many seconds
    pub const BOMB_AFTER_SECONDS: u32 = 10;

    /// Quiz countdown in whole seconds
    pub const QUIZ_SECONDS: u32 = 10;
    /// Input lock at quiz open (anti ghost tap)
    pub const WARM_UP_MS: u64 = 800;
    /// How long the verdict stays up before the round resumes
    pub const REVEAL_MS: u64 = 1500;

    /// Scoring
    pub const SLICE_POINTS: u32 = 1;
    pub const CORRECT_POINTS: u32 = 10;
    pub const INCORRECT_POINTS: u32 = 5;

    /// Floating score label lifetime
    pub const EFFECT_TTL_MS: u64 = 800;
    /// Sliced objects linger (inert) before removal
    pub const SLICE_LINGER_MS: u64 = 200;
    /// Delay between slicing a bomb and the round ending
    pub const BOMB_FUSE_MS: u64 = 400;

    /// Normal objects: upward speed 12..16 px/frame, gravity 0.25
    pub const NORMAL_LAUNCH_SPEED: f32 = 12.0;
    pub const NORMAL_LAUNCH_SPREAD: f32 = 4.0;
    pub const NORMAL_GRAVITY: f32 = 0.25;
    /// Bonus objects rise slower and hang longer
    pub const BONUS_LAUNCH_SPEED: f32 = 8.0;
    pub const BONUS_LAUNCH_SPREAD: f32 = 2.0;
    pub const BONUS_GRAVITY: f32 = 0.15;
    /// Horizontal speed spread (centered on zero)
    pub const LATERAL_SPREAD: f32 = 3.0;

    /// Tap radius for coordinate hit testing
    pub const NORMAL_HIT_RADIUS: f32 = 32.0;
    pub const BONUS_HIT_RADIUS: f32 = 40.0;
}

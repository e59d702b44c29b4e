//! Data-driven round balance
//!
//! Every field defaults from `consts`, so a tuning file only needs the values
//! it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::quiz::AntiGhostTapPolicy;

/// Which spawn/quiz design a round uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Bonus spawns evenly spaced, pre-shuffled question queue, shuffled
    /// options, warm-up input lock
    #[default]
    EvenlyPaced,
    /// Random bonus/bomb spawns, random question draw, options in bank order,
    /// no warm-up
    RandomThreshold,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::EvenlyPaced => "evenly-paced",
            Variant::RandomThreshold => "random-threshold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "evenly-paced" | "even" | "paced" => Some(Variant::EvenlyPaced),
            "random-threshold" | "random" => Some(Variant::RandomThreshold),
            _ => None,
        }
    }

    /// Questions come from a pre-shuffled per-round queue
    pub fn queued_questions(&self) -> bool {
        *self == Variant::EvenlyPaced
    }

    /// Options are shown in a random order
    pub fn shuffle_options(&self) -> bool {
        *self == Variant::EvenlyPaced
    }
}

/// Round tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub variant: Variant,

    // === Field ===
    pub field_width: f32,
    pub field_height: f32,
    pub spawn_margin: f32,
    pub spawn_depth: f32,
    pub cull_slack: f32,

    // === Clock ===
    pub round_seconds: u32,
    pub frame_ms: u64,
    pub spawn_period_ms: u64,

    // === Bonus pacing ===
    pub bonus_spacing_ms: u64,
    pub max_bonuses: u32,
    pub bonus_probability: f32,
    pub bomb_probability: f32,
    pub bomb_after_seconds: u32,

    // === Quiz ===
    pub quiz_seconds: u32,
    pub warm_up_ms: u64,
    pub reveal_ms: u64,

    // === Scoring ===
    pub slice_points: u32,
    pub correct_points: u32,
    pub incorrect_points: u32,

    // === Cosmetics ===
    pub effect_ttl_ms: u64,
    pub slice_linger_ms: u64,
    pub bomb_fuse_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            variant: Variant::EvenlyPaced,

            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            spawn_margin: SPAWN_MARGIN,
            spawn_depth: SPAWN_DEPTH,
            cull_slack: CULL_SLACK,

            round_seconds: ROUND_SECONDS,
            frame_ms: FRAME_MS,
            spawn_period_ms: SPAWN_PERIOD_MS,

            bonus_spacing_ms: BONUS_SPACING_MS,
            max_bonuses: MAX_BONUSES,
            bonus_probability: BONUS_PROBABILITY,
            bomb_probability: BOMB_PROBABILITY,
            bomb_after_seconds: BOMB_AFTER_SECONDS,

            quiz_seconds: QUIZ_SECONDS,
            warm_up_ms: WARM_UP_MS,
            reveal_ms: REVEAL_MS,

            slice_points: SLICE_POINTS,
            correct_points: CORRECT_POINTS,
            incorrect_points: INCORRECT_POINTS,

            effect_ttl_ms: EFFECT_TTL_MS,
            slice_linger_ms: SLICE_LINGER_MS,
            bomb_fuse_ms: BOMB_FUSE_MS,
        }
    }
}

impl Tuning {
    /// Defaults for a variant
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {} ({})", path.display(), tuning.variant.as_str());
        Ok(tuning)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        // Field defaults would otherwise let a bare array through as all defaults
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(ConfigError::Invalid {
                field: "tuning",
                reason: "must be a JSON object",
            });
        }
        let tuning: Tuning = serde_json::from_value(value)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &'static str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        };

        if self.field_width <= 2.0 * self.spawn_margin {
            return invalid("field_width", "must exceed twice the spawn margin");
        }
        if self.field_height <= 0.0 {
            return invalid("field_height", "must be positive");
        }
        if self.cull_slack <= self.spawn_depth {
            return invalid("cull_slack", "must exceed spawn_depth or spawns are culled at once");
        }
        if self.round_seconds == 0 {
            return invalid("round_seconds", "must be positive");
        }
        if self.frame_ms == 0 {
            return invalid("frame_ms", "must be positive");
        }
        if self.spawn_period_ms == 0 {
            return invalid("spawn_period_ms", "must be positive");
        }
        if self.quiz_seconds == 0 {
            return invalid("quiz_seconds", "must be positive");
        }
        if self.max_bonuses > MAX_BONUSES {
            return invalid("max_bonuses", "must not exceed 10 per round");
        }
        if self.warm_up_ms >= self.quiz_seconds as u64 * SECOND_MS {
            return invalid("warm_up_ms", "must be shorter than the quiz countdown");
        }
        if !(0.0..=1.0).contains(&self.bonus_probability) {
            return invalid("bonus_probability", "must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.bomb_probability)
            || self.bonus_probability + self.bomb_probability > 1.0
        {
            return invalid("bomb_probability", "bonus + bomb chance must be within [0, 1]");
        }
        Ok(())
    }

    /// Objects whose y passes this are culled
    pub fn cull_y(&self) -> f32 {
        self.field_height + self.cull_slack
    }

    pub fn ghost_tap_policy(&self) -> AntiGhostTapPolicy {
        match self.variant {
            Variant::EvenlyPaced if self.warm_up_ms > 0 => AntiGhostTapPolicy::WarmUp {
                lock_ms: self.warm_up_ms,
            },
            _ => AntiGhostTapPolicy::None,
        }
    }

    /// Upper bound on how long one quiz keeps the round paused
    pub fn max_quiz_ms(&self) -> u64 {
        let countdown = self.quiz_seconds as u64 * SECOND_MS;
        let warm_up = self.ghost_tap_policy().lock_ms();
        countdown.max(warm_up) + self.reveal_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
        assert!(Tuning::for_variant(Variant::RandomThreshold).validate().is_ok());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{ "round_seconds": 30, "variant": "RandomThreshold" }"#)
            .unwrap();
        assert_eq!(tuning.round_seconds, 30);
        assert_eq!(tuning.variant, Variant::RandomThreshold);
        assert_eq!(tuning.spawn_period_ms, SPAWN_PERIOD_MS);
        assert_eq!(tuning.ghost_tap_policy(), AntiGhostTapPolicy::None);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "frame_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "frame_ms", .. }));

        let err = Tuning::from_json(r#"{ "bonus_probability": 0.9, "bomb_probability": 0.2 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "bomb_probability", .. }));

        assert!(matches!(
            Tuning::from_json("[]"),
            Err(ConfigError::Invalid { field: "tuning", .. })
        ));
        assert!(matches!(Tuning::from_json("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_positional_array() {
        let err = Tuning::from_json(r#"["RandomThreshold", 800.0, 600.0]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tuning", .. }));
        assert!(Tuning::from_json("42").is_err());
    }

    #[test]
    fn test_rejects_bonus_budget_and_endless_warm_up() {
        let err = Tuning::from_json(r#"{ "max_bonuses": 11 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_bonuses", .. }));
        assert!(Tuning::from_json(r#"{ "max_bonuses": 10 }"#).is_ok());

        let err = Tuning::from_json(r#"{ "quiz_seconds": 2, "warm_up_ms": 2000 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "warm_up_ms", .. }));
        assert!(Tuning::from_json(r#"{ "quiz_seconds": 2, "warm_up_ms": 1999 }"#).is_ok());
    }

    #[test]
    fn test_variant_names() {
        assert_eq!(Variant::from_str("Random"), Some(Variant::RandomThreshold));
        assert_eq!(Variant::from_str("evenly-paced"), Some(Variant::EvenlyPaced));
        assert_eq!(Variant::from_str("chaos"), None);
        assert!(Variant::EvenlyPaced.queued_questions());
        assert!(!Variant::RandomThreshold.shuffle_options());
    }

    #[test]
    fn test_quiz_bound() {
        let tuning = Tuning::default();
        assert_eq!(tuning.ghost_tap_policy(), AntiGhostTapPolicy::WarmUp { lock_ms: 800 });
        assert_eq!(tuning.max_quiz_ms(), 11_500);
    }
}

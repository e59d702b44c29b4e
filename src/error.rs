//! Error types
//!
//! Rejections from the round API are values, never panics. `dismiss` has no
//! error type at all: late or repeated taps are expected and ignored.

use thiserror::Error;

/// Why a quiz answer was rejected. The round is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("no quiz is open")]
    NoActiveQuiz,

    #[error("quiz input is locked during warm-up")]
    InputLocked,

    #[error("quiz already answered")]
    AlreadyAnswered,

    #[error("option {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("round is over")]
    RoundOver,
}

/// Question bank construction errors.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("question bank is empty")]
    Empty,

    #[error("question {index} has {count} options, need at least 2")]
    TooFewOptions { index: usize, count: usize },

    #[error("question {index} marks option {correct} correct but has {len} options")]
    CorrectIndexOutOfRange {
        index: usize,
        correct: usize,
        len: usize,
    },

    #[error("question bank parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("question bank read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tuning load/validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tuning read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Record store errors. Only surfaced by `fetch_records`; saving is fire-and-forget.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record store parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("record store unavailable")]
    Unavailable,
}

/// Player session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("player code is empty")]
    EmptyCode,

    #[error("player {code} already played {played} rounds")]
    RoundLimitReached { code: String, played: u32 },
}

//! Player code entry and round allowance

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::persistence::GameRecord;

/// Rounds a single player code may play
pub const MAX_ROUNDS_PER_PLAYER: u32 = 2;

/// Longest accepted player code
pub const MAX_CODE_LEN: usize = 10;

/// Trim, uppercase and cap a raw player code. None if nothing is left.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code: String = raw.trim().to_uppercase().chars().take(MAX_CODE_LEN).collect();
    let code = code.trim_end().to_string();
    (!code.is_empty()).then_some(code)
}

/// A player's progress through their allowed rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    code: String,
    rounds_played: u32,
}

impl PlayerSession {
    pub fn new(raw_code: &str) -> Result<Self, SessionError> {
        Self::resume(raw_code, 0)
    }

    /// Pick up a session with some rounds already played
    pub fn resume(raw_code: &str, rounds_played: u32) -> Result<Self, SessionError> {
        let code = normalize_code(raw_code).ok_or(SessionError::EmptyCode)?;
        Ok(Self {
            code,
            rounds_played,
        })
    }

    /// Count this player's saved rounds
    pub fn from_records(raw_code: &str, records: &[GameRecord]) -> Result<Self, SessionError> {
        let code = normalize_code(raw_code).ok_or(SessionError::EmptyCode)?;
        let played = records.iter().filter(|r| r.player_code == code).count() as u32;
        Ok(Self {
            code,
            rounds_played: played,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn can_play(&self) -> bool {
        self.rounds_played < MAX_ROUNDS_PER_PLAYER
    }

    /// Number the next round would get (1-based)
    pub fn next_round(&self) -> u32 {
        self.rounds_played + 1
    }

    /// Claim the next round. After this, `rounds_played` is the number of the
    /// round in progress.
    pub fn begin_round(&mut self) -> Result<u32, SessionError> {
        if !self.can_play() {
            return Err(SessionError::RoundLimitReached {
                code: self.code.clone(),
                played: self.rounds_played,
            });
        }
        self.rounds_played += 1;
        log::info!("{} starting round {}", self.code, self.rounds_played);
        Ok(self.rounds_played)
    }
}

//! Record store boundary
//!
//! Finished rounds are saved fire-and-forget: a failed save is logged and
//! never feeds back into the round result.
//!
//! Features:
//! - `GameRecord` built from a final `RoundResult`
//! - Versioned JSON file store
//! - In-memory store with switchable outages

pub mod json_file;

pub use json_file::JsonFileStore;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::session::PlayerSession;
use crate::sim::RoundResult;

/// One saved round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub player_code: String,
    pub round: u32,
    pub score: u32,
    pub slices: u32,
    pub correct_answers: u32,
    /// Quizzes presented, i.e. bonus objects consumed
    pub total_questions: u32,
    /// RFC 3339, UTC
    pub timestamp: String,
}

impl GameRecord {
    pub fn new(player_code: &str, round: u32, result: &RoundResult) -> Self {
        Self {
            player_code: player_code.to_string(),
            round,
            score: result.score,
            slices: result.slices_count,
            correct_answers: result.correct_answers,
            total_questions: result.bonuses_consumed,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Where finished rounds go
pub trait RecordStore {
    fn fetch_records(&self) -> Result<Vec<GameRecord>, StoreError>;

    /// Returns false on failure. Callers must not depend on the outcome.
    fn save_record(&mut self, record: &GameRecord) -> bool;
}

/// Save the round for the session's current round number and hand the result
/// back unchanged.
pub fn finish_round<S: RecordStore + ?Sized>(
    store: &mut S,
    session: &PlayerSession,
    result: RoundResult,
) -> RoundResult {
    let record = GameRecord::new(session.code(), session.rounds_played(), &result);
    if !store.save_record(&record) {
        log::warn!(
            "Could not save round {} for {}, result kept locally",
            record.round,
            record.player_code
        );
    }
    result
}

/// Volatile store for tests and offline play
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Vec<GameRecord>,
    available: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            available: true,
        }
    }

    /// Simulate the backend going away (or coming back)
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }
}

impl RecordStore for MemoryStore {
    fn fetch_records(&self) -> Result<Vec<GameRecord>, StoreError> {
        if !self.available {
            return Err(StoreError::Unavailable);
        }
        Ok(self.records.clone())
    }

    fn save_record(&mut self, record: &GameRecord) -> bool {
        if !self.available {
            return false;
        }
        self.records.push(record.clone());
        true
    }
}

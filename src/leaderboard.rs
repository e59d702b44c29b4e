//! Leaderboard system
//!
//! Built from saved records, keeps each player's best round.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::persistence::GameRecord;

/// Number of entries shown by default
pub const DEFAULT_TOP: usize = 10;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-indexed position
    pub rank: usize,
    pub player_code: String,
    /// Best score across the player's rounds
    pub score: u32,
    /// Round that scored it
    pub round: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub timestamp: String,
}

/// Best score per player, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Aggregate records. On equal best scores the earlier round is kept;
    /// players with equal scores are ordered by code.
    pub fn from_records(records: &[GameRecord]) -> Self {
        let mut best: HashMap<&str, &GameRecord> = HashMap::new();
        for record in records {
            best.entry(record.player_code.as_str())
                .and_modify(|current| {
                    if record.score > current.score {
                        *current = record;
                    }
                })
                .or_insert(record);
        }

        let mut rows: Vec<&GameRecord> = best.into_values().collect();
        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.player_code.cmp(&b.player_code))
        });

        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(i, r)| LeaderboardEntry {
                rank: i + 1,
                player_code: r.player_code.clone(),
                score: r.score,
                round: r.round,
                correct_answers: r.correct_answers,
                total_questions: r.total_questions,
                timestamp: r.timestamp.clone(),
            })
            .collect();
        Self { entries }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First `n` rows
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Rank of a player's best round (1-indexed)
    pub fn rank_of(&self, player_code: &str) -> Option<usize> {
        self.personal_best(player_code).map(|e| e.rank)
    }

    pub fn personal_best(&self, player_code: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.player_code == player_code)
    }

    /// Get the rank a new score would achieve (1-indexed)
    pub fn potential_rank(&self, score: u32) -> usize {
        let rank = self.entries.iter().position(|e| score > e.score);
        rank.unwrap_or(self.entries.len()) + 1
    }
}

//! Quiz interruption: question bank, per-round queue, and the timed session
//!
//! A session walks `WarmUp -> Active -> Revealed -> Closed`. The round owns
//! the timers; the session only enforces which transitions are legal.

use std::collections::VecDeque;
use std::path::Path;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::shuffle::{shuffle, shuffled};
use crate::error::{BankError, QuizError};

/// Bank shipped with the crate
const BUILTIN_QUESTIONS: &str = include_str!("../../assets/questions.json");

/// A multiple-choice question as stored in the bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options` of the right answer
    pub correct: usize,
}

/// Read-only set of questions. Never empty.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<QuizQuestion>,
}

impl QuestionBank {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        for (index, q) in questions.iter().enumerate() {
            if q.options.len() < 2 {
                return Err(BankError::TooFewOptions {
                    index,
                    count: q.options.len(),
                });
            }
            if q.correct >= q.options.len() {
                return Err(BankError::CorrectIndexOutOfRange {
                    index,
                    correct: q.correct,
                    len: q.options.len(),
                });
            }
        }
        Ok(Self { questions })
    }

    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let questions: Vec<QuizQuestion> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    pub fn load(path: &Path) -> Result<Self, BankError> {
        let json = std::fs::read_to_string(path)?;
        let bank = Self::from_json(&json)?;
        log::info!("Loaded {} questions from {}", bank.len(), path.display());
        Ok(bank)
    }

    pub fn builtin() -> Result<Self, BankError> {
        Self::from_json(BUILTIN_QUESTIONS)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Uniform random question
    pub fn draw(&self, rng: &mut Pcg32) -> QuizQuestion {
        self.questions[rng.random_range(0..self.questions.len())].clone()
    }
}

/// Questions for one round. Consumed front to back; once empty, falls back to
/// random draws from the full bank so it never runs dry.
#[derive(Debug, Clone)]
pub struct QuizQueue {
    pending: VecDeque<QuizQuestion>,
    bank: QuestionBank,
}

impl QuizQueue {
    /// Whole bank in a fresh random order
    pub fn shuffled(bank: QuestionBank, rng: &mut Pcg32) -> Self {
        let pending = shuffled(bank.questions(), rng).into();
        Self { pending, bank }
    }

    /// No queue: every question is a random draw
    pub fn random_draw(bank: QuestionBank) -> Self {
        Self {
            pending: VecDeque::new(),
            bank,
        }
    }

    pub fn next(&mut self, rng: &mut Pcg32) -> QuizQuestion {
        match self.pending.pop_front() {
            Some(q) => q,
            None => self.bank.draw(rng),
        }
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

/// Guard against the slicing tap landing on an answer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntiGhostTapPolicy {
    /// Lock input for a short window when the quiz opens
    WarmUp { lock_ms: u64 },
    /// Accept answers immediately
    None,
}

impl AntiGhostTapPolicy {
    pub fn lock_ms(&self) -> u64 {
        match self {
            AntiGhostTapPolicy::WarmUp { lock_ms } => *lock_ms,
            AntiGhostTapPolicy::None => 0,
        }
    }
}

/// An answer option, tagged with correctness when the order was fixed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizOption {
    pub text: String,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizStage {
    /// Input locked, countdown already running
    WarmUp,
    /// Waiting for exactly one selection
    Active,
    /// Verdict shown
    Revealed,
    /// Score applied, session about to be dropped
    Closed,
}

/// A selection: an index into the shown options, or the timeout sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizAnswer {
    Option(usize),
    Timeout,
}

/// One open quiz. Exists only while the round is paused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSession {
    question: String,
    options: Vec<QuizOption>,
    stage: QuizStage,
    selected: Option<QuizAnswer>,
    time_remaining: u32,
    opened_at_ms: u64,
}

impl QuizSession {
    pub fn open(
        question: QuizQuestion,
        shuffle_options: bool,
        locked: bool,
        seconds: u32,
        now_ms: u64,
        rng: &mut Pcg32,
    ) -> Self {
        let QuizQuestion {
            question,
            options,
            correct,
        } = question;
        let mut options: Vec<QuizOption> = options
            .into_iter()
            .enumerate()
            .map(|(i, text)| QuizOption {
                text,
                correct: i == correct,
            })
            .collect();
        if shuffle_options {
            shuffle(&mut options, rng);
        }

        Self {
            question,
            options,
            stage: if locked {
                QuizStage::WarmUp
            } else {
                QuizStage::Active
            },
            selected: None,
            time_remaining: seconds,
            opened_at_ms: now_ms,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Options in display order
    pub fn options(&self) -> &[QuizOption] {
        &self.options
    }

    pub fn stage(&self) -> QuizStage {
        self.stage
    }

    pub fn selected(&self) -> Option<QuizAnswer> {
        self.selected
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn opened_at_ms(&self) -> u64 {
        self.opened_at_ms
    }

    pub fn input_locked(&self) -> bool {
        self.stage == QuizStage::WarmUp
    }

    /// Display index of the right answer
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.correct)
    }

    /// End of warm-up
    pub fn unlock(&mut self) {
        if self.stage == QuizStage::WarmUp {
            self.stage = QuizStage::Active;
        }
    }

    /// One countdown second. Returns true if this tick timed the quiz out.
    pub fn tick_second(&mut self) -> bool {
        if !matches!(self.stage, QuizStage::WarmUp | QuizStage::Active) {
            return false;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.selected = Some(QuizAnswer::Timeout);
            self.stage = QuizStage::Revealed;
            return true;
        }
        false
    }

    /// Accept the one and only selection. Returns whether it was correct.
    pub fn select(&mut self, answer: QuizAnswer) -> Result<bool, QuizError> {
        match self.stage {
            QuizStage::WarmUp => return Err(QuizError::InputLocked),
            QuizStage::Revealed | QuizStage::Closed => return Err(QuizError::AlreadyAnswered),
            QuizStage::Active => {}
        }
        if let QuizAnswer::Option(index) = answer {
            if index >= self.options.len() {
                return Err(QuizError::OptionOutOfRange {
                    index,
                    len: self.options.len(),
                });
            }
        }
        self.selected = Some(answer);
        self.stage = QuizStage::Revealed;
        Ok(self.is_correct().unwrap_or(false))
    }

    /// None until a selection exists. Timeout is never correct.
    pub fn is_correct(&self) -> Option<bool> {
        self.selected.map(|answer| match answer {
            QuizAnswer::Option(index) => self.options.get(index).is_some_and(|o| o.correct),
            QuizAnswer::Timeout => false,
        })
    }

    /// Revealed -> Closed. Returns the verdict, or None if not yet revealed.
    pub fn close(&mut self) -> Option<bool> {
        if self.stage != QuizStage::Revealed {
            return None;
        }
        self.stage = QuizStage::Closed;
        self.is_correct()
    }
}

//! Seeded bot player
//!
//! Drives a `Round` the way a distracted human would: taps some of what is on
//! screen each frame, mostly leaves bombs alone, and answers quizzes after a
//! reaction delay with a configurable hit rate.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::SECOND_MS;
use crate::sim::{ObjectKind, QuizAnswer, QuizStage, Round, RoundResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPlayConfig {
    /// Per-frame chance to tap a visible Normal object
    pub tap_chance: f32,
    /// Per-frame chance to tap a visible Bonus object
    pub bonus_tap_chance: f32,
    /// Per-frame chance to tap a visible Bomb
    pub bomb_tap_chance: f32,
    /// Chance to pick the right option
    pub accuracy: f32,
    /// Chance to ignore a quiz until it times out
    pub timeout_chance: f32,
    /// Delay from quiz unlock to answer
    pub reaction_ms: u64,
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self {
            tap_chance: 0.05,
            bonus_tap_chance: 0.10,
            bomb_tap_chance: 0.002,
            accuracy: 0.7,
            timeout_chance: 0.1,
            reaction_ms: 1200,
        }
    }
}

/// Plan for the quiz currently on screen
#[derive(Debug, Clone, Copy)]
struct QuizPlan {
    opened_at_ms: u64,
    /// None lets the countdown run out
    answer_at_ms: Option<u64>,
    pick_correct: bool,
}

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    config: AutoPlayConfig,
    rng: Pcg32,
    plan: Option<QuizPlan>,
}

impl AutoPlayer {
    pub fn new(config: AutoPlayConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            plan: None,
        }
    }

    pub fn config(&self) -> &AutoPlayConfig {
        &self.config
    }

    /// Input for one frame
    pub fn act(&mut self, round: &mut Round) {
        if round.is_over() {
            return;
        }
        if round.quiz().is_some() {
            self.act_on_quiz(round);
            return;
        }
        self.plan = None;

        let height = round.tuning().field_height;
        let visible: Vec<_> = round
            .objects()
            .iter()
            .filter(|o| !o.sliced && o.pos.y >= 0.0 && o.pos.y <= height)
            .map(|o| (o.kind, o.pos))
            .collect();

        for (kind, pos) in visible {
            let chance = match kind {
                ObjectKind::Normal => self.config.tap_chance,
                ObjectKind::Bonus => self.config.bonus_tap_chance,
                ObjectKind::Bomb => self.config.bomb_tap_chance,
            };
            if self.rng.random::<f32>() < chance {
                round.dismiss_at(pos);
                if round.is_paused() {
                    break;
                }
            }
        }
    }

    fn act_on_quiz(&mut self, round: &mut Round) {
        let now = round.now_ms();
        let Some(quiz) = round.quiz() else {
            return;
        };
        if quiz.stage() != QuizStage::Active {
            return;
        }

        let opened_at_ms = quiz.opened_at_ms();
        let plan = match self.plan {
            Some(plan) if plan.opened_at_ms == opened_at_ms => plan,
            _ => {
                let answer_at_ms = (self.rng.random::<f32>() >= self.config.timeout_chance)
                    .then_some(now + self.config.reaction_ms);
                let plan = QuizPlan {
                    opened_at_ms,
                    answer_at_ms,
                    pick_correct: self.rng.random::<f32>() < self.config.accuracy,
                };
                self.plan = Some(plan);
                plan
            }
        };

        let Some(answer_at_ms) = plan.answer_at_ms else {
            return;
        };
        if now < answer_at_ms {
            return;
        }

        let len = quiz.options().len();
        let Some(correct) = quiz.correct_index() else {
            return;
        };
        let index = if plan.pick_correct || len < 2 {
            correct
        } else {
            let other = self.rng.random_range(0..len - 1);
            if other >= correct { other + 1 } else { other }
        };
        if let Err(e) = round.answer_quiz(QuizAnswer::Option(index)) {
            log::debug!("Bot answer rejected: {}", e);
        }
    }

    /// Play frame by frame until the round ends
    pub fn play_round(&mut self, round: &mut Round) -> Option<RoundResult> {
        let tuning = round.tuning();
        let frame_ms = tuning.frame_ms.max(1);
        let worst_case_ms = tuning.round_seconds as u64 * SECOND_MS
            + (tuning.max_bonuses as u64 + 1) * tuning.max_quiz_ms()
            + tuning.bomb_fuse_ms;
        let max_frames = worst_case_ms / frame_ms + 2;

        for _ in 0..max_frames {
            if round.is_over() {
                break;
            }
            self.act(round);
            round.advance(frame_ms);
        }
        if !round.is_over() {
            log::warn!("Round did not end after {} frames", max_frames);
        }
        round.result().cloned()
    }
}

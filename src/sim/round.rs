//! Round control loop
//!
//! A `Round` owns everything a running round mutates: counters, live objects,
//! effects, the open quiz and the clock. Three periodic drivers (frame, spawn,
//! round second) plus the quiz timers are dispatched from `advance`. Taps and
//! quiz answers arrive between `advance` calls, on the same thread, so they
//! always see the latest committed positions.
//!
//! Pause is a gate, not a timer stop: while a quiz is open the frame, spawn
//! and round-second drivers keep firing as no-ops, and only the quiz timers do
//! work.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::clock::{Clock, TimerId, TimerKind};
use super::physics;
use super::quiz::{QuestionBank, QuizAnswer, QuizQueue, QuizSession};
use super::spawn::{self, SpawnContext, SpawnPolicy};
use super::state::{
    EffectKind, FallingObject, ObjectId, ObjectKind, RngState, RoundEvent, RoundPhase,
    RoundResult, RoundState, ScoreEffect,
};
use crate::consts::SECOND_MS;
use crate::error::QuizError;
use crate::tuning::Tuning;

#[derive(Debug)]
pub struct Round {
    tuning: Tuning,
    rng_state: RngState,
    rng: Pcg32,
    clock: Clock,
    phase: RoundPhase,
    state: RoundState,
    /// Ascending id order
    objects: Vec<FallingObject>,
    effects: Vec<ScoreEffect>,
    quiz: Option<QuizSession>,
    queue: QuizQueue,
    policy: Box<dyn SpawnPolicy>,
    events: Vec<RoundEvent>,
    result: Option<RoundResult>,
    bonuses_spawned: u32,
    /// Total paused time of finished pauses
    paused_ms: u64,
    pause_started_ms: Option<u64>,
    quiz_countdown: Option<TimerId>,
    quiz_warm_up: Option<TimerId>,
    bomb_fuse: Option<TimerId>,
    next_id: ObjectId,
    next_effect_id: u32,
}

impl Round {
    /// Start a round: fresh counters, pre-shuffled question queue, drivers armed
    pub fn start(tuning: Tuning, bank: QuestionBank, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let mut rng = rng_state.to_rng();
        let queue = if tuning.variant.queued_questions() {
            QuizQueue::shuffled(bank, &mut rng)
        } else {
            QuizQueue::random_draw(bank)
        };

        let mut clock = Clock::new();
        clock.every(tuning.frame_ms, TimerKind::Frame);
        clock.every(tuning.spawn_period_ms, TimerKind::Spawn);
        clock.every(SECOND_MS, TimerKind::RoundSecond);

        log::info!(
            "Round started: seed={} variant={} duration={}s",
            seed,
            tuning.variant.as_str(),
            tuning.round_seconds
        );

        Self {
            policy: spawn::policy_for(&tuning),
            state: RoundState::new(tuning.round_seconds),
            tuning,
            rng_state,
            rng,
            clock,
            phase: RoundPhase::Running,
            objects: Vec::new(),
            effects: Vec::new(),
            quiz: None,
            queue,
            events: Vec::new(),
            result: None,
            bonuses_spawned: 0,
            paused_ms: 0,
            pause_started_ms: None,
            quiz_countdown: None,
            quiz_warm_up: None,
            bomb_fuse: None,
            next_id: 1,
            next_effect_id: 1,
        }
    }

    /// Advance the clock by `dt_ms`, firing every timer that falls due in order.
    /// Stops at the first round end.
    pub fn advance(&mut self, dt_ms: u64) {
        if self.phase == RoundPhase::Ended {
            return;
        }
        let until = self.clock.now_ms().saturating_add(dt_ms);
        while let Some((_, kind)) = self.clock.pop_due(until) {
            self.fire(kind);
            if self.phase == RoundPhase::Ended {
                return;
            }
        }
        self.clock.settle(until);
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Frame => self.on_frame(),
            TimerKind::Spawn => self.on_spawn(),
            TimerKind::RoundSecond => self.on_round_second(),
            TimerKind::QuizSecond => self.on_quiz_second(),
            TimerKind::QuizWarmUp => {
                self.quiz_warm_up = None;
                if let Some(quiz) = self.quiz.as_mut() {
                    quiz.unlock();
                }
            }
            TimerKind::QuizReveal => self.close_quiz(),
            TimerKind::BombFuse => {
                self.bomb_fuse = None;
                self.end(true);
            }
        }
    }

    fn on_frame(&mut self) {
        let now = self.clock.now_ms();
        self.effects.retain(|e| now < e.expires_at_ms);

        if self.phase != RoundPhase::Running {
            return;
        }
        let culled = physics::integrate(&mut self.objects, self.tuning.cull_y(), now);
        if culled > 0 {
            log::trace!("Removed {} objects at {}ms", culled, now);
        }
    }

    fn on_spawn(&mut self) {
        if self.phase != RoundPhase::Running {
            return;
        }
        let ctx = SpawnContext {
            active_ms: self.active_ms(),
            time_remaining: self.state.time_remaining,
            round_seconds: self.tuning.round_seconds,
            bonuses_spawned: self.bonuses_spawned,
            bonus_live: self.objects.iter().any(|o| o.is_live_bonus()),
        };
        let kind = self.policy.choose(&ctx, &mut self.rng);
        let launch = spawn::launch(kind, &self.tuning, &mut self.rng);

        let id = self.next_id;
        self.next_id += 1;
        self.objects.push(FallingObject::new(
            id,
            kind,
            launch.pos,
            launch.vel,
            launch.gravity,
        ));
        if kind == ObjectKind::Bonus {
            self.bonuses_spawned += 1;
        }

        log::debug!("Spawned {:?} #{} at active {}ms", kind, id, ctx.active_ms);
        self.events.push(RoundEvent::Spawned {
            id,
            kind,
            active_ms: ctx.active_ms,
        });
    }

    fn on_round_second(&mut self) {
        if self.phase != RoundPhase::Running {
            return;
        }
        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        self.events.push(RoundEvent::SecondElapsed {
            time_remaining: self.state.time_remaining,
        });
        if self.state.time_remaining == 0 {
            self.end(false);
        }
    }

    fn on_quiz_second(&mut self) {
        let Some(quiz) = self.quiz.as_mut() else {
            return;
        };
        if quiz.tick_second() {
            log::debug!("Quiz timed out");
            self.events.push(RoundEvent::QuizAnswered {
                correct: false,
                timed_out: true,
            });
            self.schedule_reveal();
        }
    }

    /// Dismiss an object by id. Silently ignored while paused or ended, for
    /// unknown ids, and for objects already sliced.
    pub fn dismiss(&mut self, id: ObjectId) {
        if self.phase != RoundPhase::Running {
            return;
        }
        let now = self.clock.now_ms();
        let linger = self.tuning.slice_linger_ms;
        let Some(obj) = self.objects.iter_mut().find(|o| o.id == id) else {
            return;
        };
        if !obj.slice(now, linger) {
            return;
        }
        let (kind, pos) = (obj.kind, obj.pos);

        match kind {
            ObjectKind::Normal => {
                self.state.score += self.tuning.slice_points;
                self.state.slices_count += 1;
                self.add_effect(EffectKind::Slice, pos);
                log::debug!("Sliced #{} (score {})", id, self.state.score);
                self.events.push(RoundEvent::Sliced {
                    id,
                    score: self.state.score,
                });
            }
            ObjectKind::Bonus => {
                self.state.bonuses_consumed += 1;
                self.add_effect(EffectKind::Surprise, pos);
                self.events.push(RoundEvent::BonusHit {
                    id,
                    bonuses_consumed: self.state.bonuses_consumed,
                });
                self.open_quiz();
            }
            ObjectKind::Bomb => {
                self.add_effect(EffectKind::Boom, pos);
                self.events.push(RoundEvent::BombHit { id });
                if self.bomb_fuse.is_none() {
                    log::info!("Bomb #{} hit, round ends in {}ms", id, self.tuning.bomb_fuse_ms);
                    self.bomb_fuse =
                        Some(self.clock.after(self.tuning.bomb_fuse_ms, TimerKind::BombFuse));
                }
            }
        }
    }

    /// Tap at screen coordinates: dismiss whatever is under the point
    pub fn dismiss_at(&mut self, point: Vec2) -> Option<ObjectId> {
        let id = self.object_at(point)?;
        self.dismiss(id);
        Some(id)
    }

    fn open_quiz(&mut self) {
        let now = self.clock.now_ms();
        self.phase = RoundPhase::Paused;
        self.pause_started_ms = Some(now);

        let question = self.queue.next(&mut self.rng);
        let lock_ms = self.tuning.ghost_tap_policy().lock_ms();
        let session = QuizSession::open(
            question,
            self.tuning.variant.shuffle_options(),
            lock_ms > 0,
            self.tuning.quiz_seconds,
            now,
            &mut self.rng,
        );

        self.quiz_countdown = Some(self.clock.every(SECOND_MS, TimerKind::QuizSecond));
        if lock_ms > 0 {
            self.quiz_warm_up = Some(self.clock.after(lock_ms, TimerKind::QuizWarmUp));
        }

        log::info!("Quiz opened: {}", session.question());
        self.events.push(RoundEvent::QuizOpened {
            question: session.question().to_string(),
        });
        self.quiz = Some(session);
    }

    /// Submit the quiz selection. Returns whether it was correct. Rejections
    /// leave the round untouched.
    pub fn answer_quiz(&mut self, answer: QuizAnswer) -> Result<bool, QuizError> {
        if self.phase == RoundPhase::Ended {
            return Err(QuizError::RoundOver);
        }
        let quiz = self.quiz.as_mut().ok_or(QuizError::NoActiveQuiz)?;
        let correct = quiz.select(answer)?;

        log::debug!("Quiz answered {:?}: correct={}", answer, correct);
        self.events.push(RoundEvent::QuizAnswered {
            correct,
            timed_out: answer == QuizAnswer::Timeout,
        });
        self.schedule_reveal();
        Ok(correct)
    }

    fn schedule_reveal(&mut self) {
        if let Some(id) = self.quiz_countdown.take() {
            self.clock.cancel(id);
        }
        self.clock.after(self.tuning.reveal_ms, TimerKind::QuizReveal);
    }

    fn close_quiz(&mut self) {
        let Some(mut quiz) = self.quiz.take() else {
            return;
        };
        let correct = quiz.close().unwrap_or(false);
        if let Some(id) = self.quiz_warm_up.take() {
            self.clock.cancel(id);
        }

        let points = if correct {
            self.state.correct_answers += 1;
            self.tuning.correct_points
        } else {
            self.tuning.incorrect_points
        };
        self.state.score += points;
        let center = Vec2::new(self.tuning.field_width, self.tuning.field_height) / 2.0;
        let effect = if correct {
            EffectKind::QuizCorrect
        } else {
            EffectKind::QuizConsolation
        };
        self.add_effect(effect, center);

        let now = self.clock.now_ms();
        if let Some(started) = self.pause_started_ms.take() {
            self.paused_ms += now - started;
        }
        self.phase = RoundPhase::Running;

        log::info!("Quiz closed: correct={} +{} (score {})", correct, points, self.state.score);
        self.events.push(RoundEvent::QuizClosed { correct, points });
    }

    /// One-shot terminal transition. Later triggers are ignored.
    fn end(&mut self, ended_by_bomb: bool) {
        if self.phase == RoundPhase::Ended {
            return;
        }
        self.phase = RoundPhase::Ended;
        self.clock.cancel_all();
        self.quiz = None;
        self.quiz_countdown = None;
        self.quiz_warm_up = None;
        self.bomb_fuse = None;

        let result = RoundResult::from_state(&self.state, ended_by_bomb);
        log::info!(
            "Round ended: score={} slices={} quiz={}/{} bomb={}",
            result.score,
            result.slices_count,
            result.correct_answers,
            result.bonuses_consumed,
            result.ended_by_bomb
        );
        self.events.push(RoundEvent::RoundEnded(result.clone()));
        self.result = Some(result);
    }

    fn add_effect(&mut self, kind: EffectKind, pos: Vec2) {
        let id = self.next_effect_id;
        self.next_effect_id += 1;
        self.effects.push(ScoreEffect {
            id,
            kind,
            pos,
            expires_at_ms: self.clock.now_ms() + self.tuning.effect_ttl_ms,
        });
    }

    /// Unpaused time since round start
    pub fn active_ms(&self) -> u64 {
        let now = self.clock.now_ms();
        let current_pause = self.pause_started_ms.map_or(0, |s| now - s);
        now - self.paused_ms - current_pause
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == RoundPhase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.phase == RoundPhase::Ended
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn objects(&self) -> &[FallingObject] {
        &self.objects
    }

    pub fn effects(&self) -> &[ScoreEffect] {
        &self.effects
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    /// Set exactly once, when the round ends
    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    pub fn bonuses_spawned(&self) -> u32 {
        self.bonuses_spawned
    }

    pub fn questions_left(&self) -> usize {
        self.queue.remaining()
    }

    /// Newest unsliced object under a screen point
    pub fn object_at(&self, point: Vec2) -> Option<ObjectId> {
        physics::object_at(&self.objects, point)
    }

    /// Take events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Start a round with the given tuning, question bank and seed
pub fn start_round(tuning: Tuning, bank: QuestionBank, seed: u64) -> Round {
    Round::start(tuning, bank, seed)
}

/// Fresh seed from the thread RNG, for hosts that do not pick one
pub fn seed_from_entropy() -> u64 {
    rand::random()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::quiz::QuizStage;
    use crate::tuning::Variant;
    use proptest::prelude::*;

    fn round(variant: Variant) -> Round {
        let bank = QuestionBank::builtin().unwrap();
        Round::start(Tuning::for_variant(variant), bank, 42)
    }

    /// Drop an object straight into the field
    fn place(round: &mut Round, kind: ObjectKind, pos: Vec2) -> ObjectId {
        let id = round.next_id;
        round.next_id += 1;
        round
            .objects
            .push(FallingObject::new(id, kind, pos, Vec2::new(0.5, -6.0), 0.25));
        id
    }

    fn ended_events(events: &[RoundEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, RoundEvent::RoundEnded(_)))
            .count()
    }

    #[test]
    fn test_round_starts_running() {
        let round = round(Variant::EvenlyPaced);
        assert_eq!(round.phase(), RoundPhase::Running);
        assert_eq!(round.state().time_remaining, 60);
        assert_eq!(round.state().score, 0);
        assert_eq!(round.clock.pending(), 3);
        assert!(round.result().is_none());
    }

    #[test]
    fn test_spawn_ticks_create_objects() {
        let mut round = round(Variant::EvenlyPaced);
        round.advance(4000);
        let spawned = round
            .drain_events()
            .iter()
            .filter(|e| matches!(e, RoundEvent::Spawned { .. }))
            .count();
        assert_eq!(spawned, 5);
        // Ids ascend and are unique
        let ids: Vec<_> = round.objects().iter().map(|o| o.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(round.state().time_remaining, 56);
    }

    #[test]
    fn test_dismiss_normal_is_idempotent() {
        let mut round = round(Variant::EvenlyPaced);
        let id = place(&mut round, ObjectKind::Normal, Vec2::new(200.0, 300.0));

        round.dismiss(id);
        assert_eq!(round.state().score, 1);
        assert_eq!(round.state().slices_count, 1);
        assert_eq!(round.effects().len(), 1);
        assert_eq!(round.effects()[0].kind.label(), "+1");

        round.dismiss(id);
        assert_eq!(round.state().score, 1);
        assert_eq!(round.state().slices_count, 1);
    }

    #[test]
    fn test_dismiss_unknown_id_is_ignored() {
        let mut round = round(Variant::EvenlyPaced);
        round.dismiss(999);
        assert_eq!(round.state().score, 0);
        assert!(round.drain_events().is_empty());
    }

    #[test]
    fn test_dismiss_at_coordinates() {
        let mut round = round(Variant::EvenlyPaced);
        let id = place(&mut round, ObjectKind::Normal, Vec2::new(200.0, 300.0));
        assert_eq!(round.dismiss_at(Vec2::new(500.0, 100.0)), None);
        assert_eq!(round.dismiss_at(Vec2::new(210.0, 290.0)), Some(id));
        assert_eq!(round.state().slices_count, 1);
        // Sliced objects no longer catch taps
        assert_eq!(round.object_at(Vec2::new(200.0, 300.0)), None);
    }

    #[test]
    fn test_sliced_object_lingers_then_goes() {
        let mut round = round(Variant::EvenlyPaced);
        let id = place(&mut round, ObjectKind::Normal, Vec2::new(200.0, 300.0));
        round.dismiss(id);
        round.advance(100);
        assert!(round.objects().iter().any(|o| o.id == id));
        round.advance(200);
        assert!(!round.objects().iter().any(|o| o.id == id));
    }

    #[test]
    fn test_effects_expire() {
        let mut round = round(Variant::EvenlyPaced);
        let id = place(&mut round, ObjectKind::Normal, Vec2::new(200.0, 300.0));
        round.dismiss(id);
        round.advance(784);
        assert_eq!(round.effects().len(), 1);
        round.advance(16);
        assert!(round.effects().is_empty());
    }

    #[test]
    fn test_bonus_pauses_and_freezes_simulation() {
        let mut round = round(Variant::EvenlyPaced);
        round.advance(1000);
        let bonus = place(&mut round, ObjectKind::Bonus, Vec2::new(300.0, 300.0));
        round.drain_events();

        round.dismiss(bonus);
        assert!(round.is_paused());
        assert_eq!(round.state().bonuses_consumed, 1);
        assert!(round.effects().iter().any(|e| e.kind == EffectKind::Surprise));
        let quiz = round.quiz().unwrap();
        assert_eq!(quiz.stage(), QuizStage::WarmUp);
        assert_eq!(quiz.time_remaining(), 10);

        let frozen: Vec<_> = round
            .objects()
            .iter()
            .filter(|o| !o.sliced)
            .map(|o| (o.id, o.pos))
            .collect();
        let time_remaining = round.state().time_remaining;
        let active = round.active_ms();

        round.advance(5000);
        let after: Vec<_> = round
            .objects()
            .iter()
            .filter(|o| !o.sliced)
            .map(|o| (o.id, o.pos))
            .collect();
        assert_eq!(frozen, after);
        assert_eq!(round.state().time_remaining, time_remaining);
        assert_eq!(round.active_ms(), active);
        assert!(
            !round
                .drain_events()
                .iter()
                .any(|e| matches!(e, RoundEvent::Spawned { .. }))
        );

        // Taps are ignored while the quiz is up
        let other = place(&mut round, ObjectKind::Normal, Vec2::new(100.0, 100.0));
        round.dismiss(other);
        assert_eq!(round.state().slices_count, 0);
    }

    #[test]
    fn test_quiz_timeout_scores_consolation() {
        let mut round = round(Variant::EvenlyPaced);
        let bonus = place(&mut round, ObjectKind::Bonus, Vec2::new(300.0, 300.0));
        round.dismiss(bonus);
        let score_before = round.state().score;

        // Countdown hits zero after 10s, verdict stays up 1.5s
        round.advance(10_000);
        let quiz = round.quiz().unwrap();
        assert_eq!(quiz.stage(), QuizStage::Revealed);
        assert_eq!(quiz.selected(), Some(QuizAnswer::Timeout));
        assert_eq!(
            round.answer_quiz(QuizAnswer::Option(0)),
            Err(QuizError::AlreadyAnswered)
        );

        round.advance(1499);
        assert!(round.is_paused());
        round.advance(1);
        assert_eq!(round.phase(), RoundPhase::Running);
        assert!(round.quiz().is_none());
        assert_eq!(round.state().score, score_before + 5);
        assert_eq!(round.state().correct_answers, 0);
        assert_eq!(round.state().bonuses_consumed, 1);

        let closes: Vec<_> = round
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, RoundEvent::QuizClosed { .. }))
            .collect();
        assert_eq!(
            closes,
            vec![RoundEvent::QuizClosed {
                correct: false,
                points: 5
            }]
        );
    }

    #[test]
    fn test_quiz_session_bounded_without_input() {
        let mut round = round(Variant::EvenlyPaced);
        let bonus = place(&mut round, ObjectKind::Bonus, Vec2::new(300.0, 300.0));
        round.dismiss(bonus);
        let opened = round.now_ms();
        while round.is_paused() {
            round.advance(1);
        }
        assert!(round.now_ms() - opened <= round.tuning().max_quiz_ms());
    }

    #[test]
    fn test_correct_answer_scores_ten() {
        let mut round = round(Variant::EvenlyPaced);
        let id = place(&mut round, ObjectKind::Normal, Vec2::new(200.0, 300.0));
        round.dismiss(id);
        let bonus = place(&mut round, ObjectKind::Bonus, Vec2::new(300.0, 300.0));
        round.dismiss(bonus);
        let score_before = round.state().score;
        let correct = round.quiz().unwrap().correct_index().unwrap();

        // Ghost tap from the slice gesture is swallowed
        assert_eq!(
            round.answer_quiz(QuizAnswer::Option(correct)),
            Err(QuizError::InputLocked)
        );
        round.advance(800);
        assert_eq!(round.quiz().unwrap().stage(), QuizStage::Active);
        assert_eq!(round.answer_quiz(QuizAnswer::Option(correct)), Ok(true));
        assert_eq!(
            round.answer_quiz(QuizAnswer::Option(correct)),
            Err(QuizError::AlreadyAnswered)
        );
        assert_eq!(round.state().score, score_before);

        round.advance(1500);
        assert!(!round.is_paused());
        assert_eq!(round.state().score, score_before + 10);
        assert_eq!(round.state().correct_answers, 1);
        assert_eq!(
            round.answer_quiz(QuizAnswer::Option(correct)),
            Err(QuizError::NoActiveQuiz)
        );
    }

    #[test]
    fn test_wrong_answer_scores_five() {
        let mut round = round(Variant::EvenlyPaced);
        let bonus = place(&mut round, ObjectKind::Bonus, Vec2::new(300.0, 300.0));
        round.dismiss(bonus);
        round.advance(800);
        let correct = round.quiz().unwrap().correct_index().unwrap();
        let wrong = (correct + 1) % round.quiz().unwrap().options().len();
        assert_eq!(round.answer_quiz(QuizAnswer::Option(wrong)), Ok(false));
        round.advance(1500);
        assert_eq!(round.state().score, 5);
        assert_eq!(round.state().correct_answers, 0);
    }

    #[test]
    fn test_pause_excluded_from_active_time() {
        let mut round = round(Variant::EvenlyPaced);
        round.advance(2000);
        let bonus = place(&mut round, ObjectKind::Bonus, Vec2::new(300.0, 300.0));
        round.dismiss(bonus);
        round.advance(800);
        round.answer_quiz(QuizAnswer::Timeout).unwrap();
        round.advance(1500);
        assert_eq!(round.now_ms(), 4300);
        assert_eq!(round.active_ms(), 2000);
    }

    #[test]
    fn test_round_ends_exactly_once() {
        let mut round = round(Variant::EvenlyPaced);
        let mut events = Vec::new();
        for _ in 0..5000 {
            round.advance(16);
            events.extend(round.drain_events());
        }
        assert!(round.is_over());
        assert_eq!(round.now_ms(), 60_000);
        assert_eq!(round.state().time_remaining, 0);
        assert_eq!(ended_events(&events), 1);
        assert_eq!(round.clock.pending(), 0);
        let result = round.result().unwrap().clone();
        assert!(!result.ended_by_bomb);

        // Inert afterwards
        let ids: Vec<_> = round.objects().iter().map(|o| o.id).collect();
        for id in ids {
            round.dismiss(id);
        }
        assert_eq!(round.result(), Some(&result));
        assert_eq!(round.answer_quiz(QuizAnswer::Timeout), Err(QuizError::RoundOver));
    }

    #[test]
    fn test_pending_dismiss_at_timer_zero() {
        let mut round = round(Variant::EvenlyPaced);
        round.advance(59_999);
        let id = place(&mut round, ObjectKind::Normal, Vec2::new(200.0, 300.0));
        round.advance(1);
        round.dismiss(id);

        let events = round.drain_events();
        assert_eq!(ended_events(&events), 1);
        assert_eq!(round.result().unwrap().slices_count, 0);
        assert_eq!(round.state().slices_count, 0);
    }

    #[test]
    fn test_bomb_ends_round_after_fuse() {
        let mut round = round(Variant::RandomThreshold);
        let bomb = place(&mut round, ObjectKind::Bomb, Vec2::new(200.0, 300.0));
        round.dismiss(bomb);
        assert!(round.effects().iter().any(|e| e.kind.label() == "BOOM!"));
        round.advance(399);
        assert!(!round.is_over());
        round.advance(1);
        assert!(round.is_over());
        assert!(round.result().unwrap().ended_by_bomb);
        assert_eq!(ended_events(&round.drain_events()), 1);
    }

    #[test]
    fn test_round_timer_beats_bomb_fuse() {
        let mut round = round(Variant::RandomThreshold);
        round.advance(59_800);
        let bomb = place(&mut round, ObjectKind::Bomb, Vec2::new(200.0, 300.0));
        round.dismiss(bomb);
        round.advance(1000);
        let result = round.result().unwrap();
        assert!(!result.ended_by_bomb);
        assert_eq!(ended_events(&round.drain_events()), 1);
    }

    #[test]
    fn test_alternate_variant_has_no_warm_up() {
        let mut round = round(Variant::RandomThreshold);
        let bonus = place(&mut round, ObjectKind::Bonus, Vec2::new(300.0, 300.0));
        round.dismiss(bonus);
        assert_eq!(round.quiz().unwrap().stage(), QuizStage::Active);
        assert!(round.answer_quiz(QuizAnswer::Option(0)).is_ok());
    }

    #[test]
    fn test_evenly_paced_bonus_cadence_over_full_round() {
        let mut round = round(Variant::EvenlyPaced);
        let mut events = Vec::new();
        let mut steps = 0;
        while !round.is_over() {
            let live: Vec<_> = round
                .objects()
                .iter()
                .filter(|o| o.is_live_bonus())
                .map(|o| o.id)
                .collect();
            assert!(live.len() <= 1, "two bonus objects live at once");
            if let Some(&id) = live.first() {
                round.dismiss(id);
            }
            if round.quiz().is_some_and(|q| q.stage() == QuizStage::Active) {
                round.answer_quiz(QuizAnswer::Option(0)).unwrap();
            }
            round.advance(16);
            events.extend(round.drain_events());
            steps += 1;
            assert!(steps < 20_000, "round never ended");
        }

        let bonus_times: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::Spawned {
                    kind: ObjectKind::Bonus,
                    active_ms,
                    ..
                } => Some(*active_ms),
                _ => None,
            })
            .collect();
        assert!(!bonus_times.is_empty());
        assert!(bonus_times.len() <= 10);
        assert!(bonus_times.windows(2).all(|w| w[1] - w[0] >= 5800));
        assert!(bonus_times[0] >= 5800);

        let result = round.result().unwrap();
        assert!(result.bonuses_consumed <= 10);
        assert_eq!(result.bonuses_consumed as usize, bonus_times.len());
        assert!(!events.iter().any(|e| matches!(
            e,
            RoundEvent::Spawned {
                kind: ObjectKind::Bomb,
                ..
            }
        )));
    }

    #[test]
    fn test_huge_step_ends_round_without_overflow() {
        let mut round = round(Variant::EvenlyPaced);
        round.advance(1000);
        round.advance(u64::MAX);
        assert!(round.is_over());
        assert_eq!(round.now_ms(), 60_000);
        assert_eq!(ended_events(&round.drain_events()), 1);
    }

    #[test]
    fn test_same_seed_same_round() {
        let mut a = round(Variant::RandomThreshold);
        let mut b = round(Variant::RandomThreshold);
        for _ in 0..600 {
            a.advance(16);
            b.advance(16);
        }
        assert_eq!(a.drain_events(), b.drain_events());
        let pa: Vec<_> = a.objects().iter().map(|o| o.pos).collect();
        let pb: Vec<_> = b.objects().iter().map(|o| o.pos).collect();
        assert_eq!(pa, pb);
    }

    proptest! {
        #[test]
        fn prop_each_object_scores_once(taps in proptest::collection::vec(0u32..12, 0..60)) {
            let mut round = round(Variant::EvenlyPaced);
            let ids: Vec<_> = (0..8)
                .map(|i| place(&mut round, ObjectKind::Normal, Vec2::new(100.0 + i as f32 * 50.0, 300.0)))
                .collect();
            let mut distinct = std::collections::HashSet::new();
            for tap in taps {
                round.dismiss(tap);
                if ids.contains(&tap) {
                    distinct.insert(tap);
                }
            }
            prop_assert_eq!(round.state().score as usize, distinct.len());
            prop_assert_eq!(round.state().slices_count as usize, distinct.len());
        }
    }
}

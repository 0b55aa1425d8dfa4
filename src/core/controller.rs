//! Game Controller: round state machine
//!
//! Transitions:
//! - reset_game:        score → 0/0, then start_new_round
//! - start_new_round:   random target, total += 1, replace pending timer
//! - observed == target: correct += 1, then start_new_round
//! - observed != target: nothing
//! - timeout(current):  start_new_round, no point
//! - timeout(stale):    nothing
//!
//! Matches and timeouts race for the same transition. Each new round
//! cancels the previous timer and waits on a fresh token, so whichever
//! arrives second finds the round already replaced.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::config::GameConfig;
use crate::core::timer::{RoundTimer, TimerToken};
use crate::types::{EmojiCode, GameStatus, ReasonCode, Round, RoundOutput, Score};
use crate::{EMOJI_CATALOG, ROUND_DURATION_MS};

/// The single mutable (score, round, pending timer) triple
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub score: Score,
    pub round: Option<Round>,
    pub pending: Option<TimerToken>,
}

/// Owns the game state; the only writer of score and round
#[derive(Debug)]
pub struct GameController<T: RoundTimer> {
    state: GameState,
    timer: T,
    rng: StdRng,
    round_duration: Duration,
    next_token: u64,
    last_reason: Option<ReasonCode>,
}

impl<T: RoundTimer> GameController<T> {
    /// Controller with the default round length and an entropy-seeded RNG
    pub fn new(timer: T) -> Self {
        Self::with_rng(
            timer,
            Duration::from_millis(ROUND_DURATION_MS),
            StdRng::from_entropy(),
        )
    }

    pub fn from_config(timer: T, config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(timer, config.round_duration(), rng)
    }

    pub fn with_rng(timer: T, round_duration: Duration, rng: StdRng) -> Self {
        Self {
            state: GameState::default(),
            timer,
            rng,
            round_duration,
            next_token: 0,
            last_reason: None,
        }
    }

    /// Clear the score and start the first round
    pub fn reset_game(&mut self) -> RoundOutput {
        self.state.score = Score::new();
        self.state.round = None;
        if let Some(token) = self.state.pending.take() {
            self.timer.cancel(token);
        }
        tracing::info!("game reset");
        self.advance(ReasonCode::G001_GAME_RESET)
    }

    /// Pick a new target and restart the deadline
    pub fn start_new_round(&mut self) -> RoundOutput {
        self.advance(ReasonCode::G002_ROUND_STARTED)
    }

    /// Feed the dominant emoji of the latest frame (`None` = no signal)
    pub fn on_observed_emoji(&mut self, code: Option<EmojiCode>) -> RoundOutput {
        let Some(round) = self.state.round else {
            return self.report(ReasonCode::G006_NO_ACTIVE_ROUND);
        };
        let Some(code) = code else {
            return self.report(ReasonCode::G005_NO_SIGNAL);
        };

        if code != round.target {
            return self.report(ReasonCode::G004_MISS);
        }

        self.state.score.correct += 1;
        tracing::info!(round = round.number, target = %round.target, "target matched");
        self.advance(ReasonCode::G003_MATCH_SCORED)
    }

    /// Deliver an expiry; ignored unless `token` is the pending timer
    pub fn on_round_timeout(&mut self, token: TimerToken) -> RoundOutput {
        if self.state.pending != Some(token) {
            tracing::debug!(%token, pending = ?self.state.pending, "dropping stale timeout");
            return self.report(ReasonCode::G008_STALE_TIMEOUT);
        }

        if let Some(round) = self.state.round {
            tracing::info!(round = round.number, target = %round.target, "round expired");
        }
        self.advance(ReasonCode::G007_ROUND_EXPIRED)
    }

    /// Start the next round and re-arm the timer
    fn advance(&mut self, reason: ReasonCode) -> RoundOutput {
        if let Some(token) = self.state.pending.take() {
            self.timer.cancel(token);
        }

        let target = self.random_emoji();
        self.state.score.total += 1;
        let round = Round::new(target, self.state.score.total, self.round_duration);
        self.state.round = Some(round);

        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.timer.schedule(token, self.round_duration);
        self.state.pending = Some(token);

        tracing::debug!(round = round.number, %target, %token, "round started");
        self.report(reason)
    }

    /// Uniform pick from the catalog; may repeat the previous target
    fn random_emoji(&mut self) -> EmojiCode {
        let index = self.rng.gen_range(0..EMOJI_CATALOG.len());
        EmojiCode(EMOJI_CATALOG[index])
    }

    fn report(&mut self, reason: ReasonCode) -> RoundOutput {
        self.last_reason = Some(reason);
        RoundOutput::new(
            reason,
            self.target(),
            self.state.score,
            self.remaining_ms(),
        )
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn score(&self) -> Score {
        self.state.score
    }

    pub fn round(&self) -> Option<&Round> {
        self.state.round.as_ref()
    }

    pub fn target(&self) -> Option<EmojiCode> {
        self.state.round.map(|r| r.target)
    }

    pub fn pending_timer(&self) -> Option<TimerToken> {
        self.state.pending
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.round.map(|r| r.remaining_ms()).unwrap_or(0)
    }

    pub fn round_duration(&self) -> Duration {
        self.round_duration
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Snapshot for status queries
    pub fn status(&self, detector_running: bool) -> GameStatus {
        let target = self.target();
        GameStatus {
            target,
            target_glyph: target.and_then(|t| t.glyph()),
            score: self.state.score,
            round: self.state.round.map(|r| r.number).unwrap_or(0),
            remaining_ms: self.remaining_ms(),
            detector_running,
            last_reason: self.last_reason,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::ManualTimer;

    fn seeded(seed: u64) -> GameController<ManualTimer> {
        GameController::with_rng(
            ManualTimer::new(),
            Duration::from_millis(ROUND_DURATION_MS),
            StdRng::seed_from_u64(seed),
        )
    }

    /// Some catalog entry other than `code`
    fn other_than(code: EmojiCode) -> EmojiCode {
        EmojiCode::catalog().find(|c| *c != code).unwrap()
    }

    #[test]
    fn test_new_controller_has_no_round() {
        let controller = seeded(1);
        assert!(controller.round().is_none());
        assert_eq!(controller.score(), Score::new());
        assert_eq!(controller.pending_timer(), None);
    }

    #[test]
    fn test_reset_starts_first_round() {
        let mut controller = seeded(1);
        let output = controller.reset_game();

        assert_eq!(output.reason, ReasonCode::G001_GAME_RESET);
        assert_eq!(controller.score(), Score { correct: 0, total: 1 });
        let target = controller.target().unwrap();
        assert!(target.in_catalog());
        assert_eq!(controller.round().unwrap().number, 1);
        assert_eq!(
            controller.timer().scheduled(),
            &[(TimerToken(1), Duration::from_millis(6000))]
        );
    }

    #[test]
    fn test_observation_before_reset_is_noop() {
        let mut controller = seeded(1);
        let output = controller.on_observed_emoji(Some(EmojiCode(128515)));

        assert_eq!(output.reason, ReasonCode::G006_NO_ACTIVE_ROUND);
        assert_eq!(controller.score(), Score::new());
        assert!(controller.timer().scheduled().is_empty());
    }

    #[test]
    fn test_absent_code_is_noop() {
        let mut controller = seeded(1);
        controller.reset_game();
        let before = controller.state().clone();

        let output = controller.on_observed_emoji(None);
        assert_eq!(output.reason, ReasonCode::G005_NO_SIGNAL);
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_match_scores_and_advances() {
        let mut controller = seeded(2);
        controller.reset_game();
        let target = controller.target().unwrap();

        let output = controller.on_observed_emoji(Some(target));
        assert_eq!(output.reason, ReasonCode::G003_MATCH_SCORED);
        assert_eq!(controller.score(), Score { correct: 1, total: 2 });
        assert_eq!(controller.round().unwrap().number, 2);
        assert_eq!(controller.pending_timer(), Some(TimerToken(2)));
        assert_eq!(controller.timer().cancelled(), &[TimerToken(1)]);
    }

    #[test]
    fn test_start_new_round_replaces_round_and_timer() {
        let mut controller = seeded(12);
        controller.reset_game();
        let target = controller.target().unwrap();
        controller.on_observed_emoji(Some(target));
        let before = controller.score();
        let old_timer = controller.pending_timer().unwrap();

        let output = controller.start_new_round();
        assert_eq!(output.reason, ReasonCode::G002_ROUND_STARTED);
        assert!(output.round_advanced);
        assert_eq!(
            controller.score(),
            Score { correct: before.correct, total: before.total + 1 }
        );
        assert!(controller.timer().cancelled().contains(&old_timer));
        assert_eq!(controller.timer().live(), vec![controller.pending_timer().unwrap()]);
        assert_eq!(controller.round().unwrap().number, before.total + 1);
        assert_eq!(controller.on_round_timeout(old_timer).reason, ReasonCode::G008_STALE_TIMEOUT);
    }

    #[test]
    fn test_miss_changes_nothing() {
        let mut controller = seeded(3);
        controller.reset_game();
        let before = controller.state().clone();
        let target = controller.target().unwrap();

        let output = controller.on_observed_emoji(Some(other_than(target)));
        assert_eq!(output.reason, ReasonCode::G004_MISS);
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_timeout_advances_without_point() {
        let mut controller = seeded(4);
        controller.reset_game();
        let token = controller.pending_timer().unwrap();

        let output = controller.on_round_timeout(token);
        assert_eq!(output.reason, ReasonCode::G007_ROUND_EXPIRED);
        assert_eq!(controller.score(), Score { correct: 0, total: 2 });
        assert_ne!(controller.pending_timer(), Some(token));
        assert_eq!(controller.timer().live(), vec![TimerToken(2)]);
    }

    #[test]
    fn test_stale_timeout_after_match_is_ignored() {
        let mut controller = seeded(5);
        controller.reset_game();
        let first_timer = controller.pending_timer().unwrap();
        let target = controller.target().unwrap();

        controller.on_observed_emoji(Some(target));
        let after_match = controller.state().clone();

        let output = controller.on_round_timeout(first_timer);
        assert_eq!(output.reason, ReasonCode::G008_STALE_TIMEOUT);
        assert_eq!(controller.state(), &after_match);
    }

    #[test]
    fn test_timeout_delivered_twice_only_applies_once() {
        let mut controller = seeded(6);
        controller.reset_game();
        let token = controller.pending_timer().unwrap();

        controller.on_round_timeout(token);
        let output = controller.on_round_timeout(token);

        assert_eq!(output.reason, ReasonCode::G008_STALE_TIMEOUT);
        assert_eq!(controller.score().total, 2);
    }

    #[test]
    fn test_reset_clears_score_and_cancels_timer() {
        let mut controller = seeded(7);
        controller.reset_game();
        let target = controller.target().unwrap();
        controller.on_observed_emoji(Some(target));
        let old_timer = controller.pending_timer().unwrap();

        controller.reset_game();
        assert_eq!(controller.score(), Score { correct: 0, total: 1 });
        assert!(controller.timer().cancelled().contains(&old_timer));
        assert_eq!(controller.on_round_timeout(old_timer).reason, ReasonCode::G008_STALE_TIMEOUT);
    }

    #[test]
    fn test_same_seed_same_targets() {
        let mut a = seeded(99);
        let mut b = seeded(99);
        a.reset_game();
        b.reset_game();
        for _ in 0..20 {
            assert_eq!(a.target(), b.target());
            let ta = a.pending_timer().unwrap();
            let tb = b.pending_timer().unwrap();
            a.on_round_timeout(ta);
            b.on_round_timeout(tb);
        }
    }

    #[test]
    fn test_targets_cover_catalog() {
        let mut controller = seeded(11);
        controller.reset_game();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(controller.target().unwrap());
            let token = controller.pending_timer().unwrap();
            controller.on_round_timeout(token);
        }
        assert_eq!(seen.len(), EMOJI_CATALOG.len());
    }

    #[test]
    fn test_invariants_under_mixed_inputs() {
        let mut controller = seeded(21);
        let mut driver = StdRng::seed_from_u64(42);
        controller.reset_game();
        let mut old_tokens = Vec::new();

        for _ in 0..2000 {
            match driver.gen_range(0..5) {
                0 => {
                    let target = controller.target().unwrap();
                    controller.on_observed_emoji(Some(target));
                }
                1 => {
                    let code = EmojiCode(EMOJI_CATALOG[driver.gen_range(0..EMOJI_CATALOG.len())]);
                    controller.on_observed_emoji(Some(code));
                }
                2 => {
                    let token = controller.pending_timer().unwrap();
                    old_tokens.push(token);
                    controller.on_round_timeout(token);
                }
                3 => {
                    if let Some(&stale) = old_tokens.last() {
                        let before = controller.state().clone();
                        controller.on_round_timeout(stale);
                        assert_eq!(controller.state(), &before);
                    }
                }
                _ => {
                    controller.on_observed_emoji(None);
                }
            }

            let score = controller.score();
            assert!(score.correct <= score.total);
            assert!(controller.round().is_some());
            assert_eq!(controller.timer().live().len(), 1);
            assert_eq!(controller.timer().live()[0], controller.pending_timer().unwrap());
            assert_eq!(controller.round().unwrap().number, score.total);
        }
    }
}

use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::level::{LevelConfig, level_config};
use crate::generator::{AnswerOptions, Problem, ProblemGenerator};
use crate::session::result::{AnswerRecord, LevelOutcome};

/// How long the answer feedback stays up before moving on.
pub const DEFAULT_RESULT_DELAY: Duration = Duration::from_millis(1200);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAnswer { index: u32 },
    ShowingResult { index: u32, chosen: Option<u32> },
    LevelComplete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Answered {
        chosen: Option<u32>,
        correct_answer: u32,
        correct: bool,
    },
    NextQuestion {
        index: u32,
    },
    Completed(LevelOutcome),
}

/// One attempt at one level.
///
/// Time never comes from the clock directly: callers pass `now` in, so the
/// countdown and the feedback delay are driven by `tick`.
pub struct LevelSession {
    config: &'static LevelConfig,
    generator: Box<dyn ProblemGenerator>,
    state: SessionState,
    problem: Problem,
    options: AnswerOptions,
    score: u32,
    streak: u32,
    presented_at: Instant,
    resolved_at: Option<Instant>,
    fastest_correct: Option<Duration>,
    result_delay: Duration,
    history: Vec<AnswerRecord>,
}

impl LevelSession {
    pub fn new(
        level: u32,
        mut generator: Box<dyn ProblemGenerator>,
        now: Instant,
        result_delay: Duration,
    ) -> Self {
        let config = level_config(level);
        let (problem, options) = generator.generate(config);
        debug!(level = config.level, "level session started");
        Self {
            config,
            generator,
            state: SessionState::AwaitingAnswer { index: 0 },
            problem,
            options,
            score: 0,
            streak: 0,
            presented_at: now,
            resolved_at: None,
            fastest_correct: None,
            result_delay,
            history: Vec::new(),
        }
    }

    /// Back to the first question with all running state cleared.
    pub fn restart(&mut self, now: Instant) {
        self.score = 0;
        self.streak = 0;
        self.fastest_correct = None;
        self.history.clear();
        self.present(0, now);
        debug!(level = self.config.level, "level session restarted");
    }

    pub fn level(&self) -> u32 {
        self.config.level
    }

    pub fn config(&self) -> &'static LevelConfig {
        self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn options(&self) -> &AnswerOptions {
        &self.options
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    /// Zero-based index of the question on screen.
    pub fn question_index(&self) -> u32 {
        match self.state {
            SessionState::AwaitingAnswer { index } | SessionState::ShowingResult { index, .. } => {
                index
            }
            SessionState::LevelComplete => self.config.question_count,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::LevelComplete
    }

    fn time_limit(&self) -> Duration {
        Duration::from_secs(self.config.time_limit_secs as u64)
    }

    fn elapsed_on_question(&self, now: Instant) -> Duration {
        self.resolved_at
            .unwrap_or(now)
            .saturating_duration_since(self.presented_at)
    }

    /// Whole seconds left on the countdown; frozen once the question resolves.
    pub fn time_left(&self, now: Instant) -> u32 {
        let elapsed = self.elapsed_on_question(now).as_secs() as u32;
        self.config.time_limit_secs.saturating_sub(elapsed)
    }

    pub fn time_ratio(&self, now: Instant) -> f64 {
        if self.config.time_limit_secs == 0 {
            return 0.0;
        }
        self.time_left(now) as f64 / self.config.time_limit_secs as f64
    }

    pub fn select_option(&mut self, slot: usize, now: Instant) -> Option<SessionEvent> {
        let value = self.options.get(slot)?;
        self.answer(Some(value), now)
    }

    /// Resolve the current question. Only the first answer counts; later
    /// calls return `None`. `None` as the choice means the time ran out.
    pub fn answer(&mut self, choice: Option<u32>, now: Instant) -> Option<SessionEvent> {
        let SessionState::AwaitingAnswer { index } = self.state else {
            return None;
        };

        let elapsed = now.saturating_duration_since(self.presented_at);
        let correct_answer = self.problem.answer;
        let correct = choice == Some(correct_answer);

        if correct {
            self.score += 1;
            self.streak += 1;
            self.fastest_correct = Some(match self.fastest_correct {
                Some(best) => best.min(elapsed),
                None => elapsed,
            });
        } else {
            self.streak = 0;
        }

        self.history.push(AnswerRecord {
            question: self.problem.display_text(),
            correct_answer,
            chosen: choice,
            elapsed_ms: elapsed.as_millis() as u64,
        });
        self.state = SessionState::ShowingResult {
            index,
            chosen: choice,
        };
        self.resolved_at = Some(now);

        debug!(
            question = index,
            ?choice,
            correct,
            elapsed_ms = elapsed.as_millis() as u64,
            "question resolved"
        );

        Some(SessionEvent::Answered {
            chosen: choice,
            correct_answer,
            correct,
        })
    }

    /// Advance timers. Fires the timeout and the post-answer transition.
    pub fn tick(&mut self, now: Instant) -> Option<SessionEvent> {
        match self.state {
            SessionState::AwaitingAnswer { .. } => {
                if now.saturating_duration_since(self.presented_at) >= self.time_limit() {
                    self.answer(None, now)
                } else {
                    None
                }
            }
            SessionState::ShowingResult { index, .. } => {
                let resolved_at = self.resolved_at.unwrap_or(now);
                if now.saturating_duration_since(resolved_at) < self.result_delay {
                    return None;
                }
                let next = index + 1;
                if next < self.config.question_count {
                    self.present(next, now);
                    Some(SessionEvent::NextQuestion { index: next })
                } else {
                    self.state = SessionState::LevelComplete;
                    let outcome = self.outcome();
                    debug!(
                        level = outcome.level,
                        score = outcome.score,
                        "level session complete"
                    );
                    Some(SessionEvent::Completed(outcome))
                }
            }
            SessionState::LevelComplete => None,
        }
    }

    pub fn outcome(&self) -> LevelOutcome {
        LevelOutcome {
            level: self.config.level,
            score: self.score,
            question_count: self.config.question_count,
            final_streak: self.streak,
            fastest_correct: self.fastest_correct,
        }
    }

    fn present(&mut self, index: u32, now: Instant) {
        let (problem, options) = self.generator.generate(self.config);
        self.problem = problem;
        self.options = options;
        self.presented_at = now;
        self.resolved_at = None;
        self.state = SessionState::AwaitingAnswer { index };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::level::Operation;
    use crate::generator::arithmetic::ArithmeticGenerator;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    /// Always asks 2 + 3 with the answer in the first slot.
    struct FixedGenerator;

    impl ProblemGenerator for FixedGenerator {
        fn generate(&mut self, _config: &LevelConfig) -> (Problem, AnswerOptions) {
            (
                Problem {
                    left: 2,
                    operation: Operation::Add,
                    right: 3,
                    answer: 5,
                },
                AnswerOptions([5, 4, 6, 7]),
            )
        }
    }

    fn session(level: u32, t0: Instant) -> LevelSession {
        LevelSession::new(level, Box::new(FixedGenerator), t0, DEFAULT_RESULT_DELAY)
    }

    fn ms(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    /// Answer the current question with `slot` at `at`, then let the delay pass.
    fn answer_and_advance(s: &mut LevelSession, slot: usize, at: Instant) -> Option<SessionEvent> {
        s.select_option(slot, at);
        s.tick(at + DEFAULT_RESULT_DELAY)
    }

    #[test]
    fn test_starts_awaiting_first_question() {
        let t0 = Instant::now();
        let s = session(1, t0);
        assert_eq!(s.state(), SessionState::AwaitingAnswer { index: 0 });
        assert_eq!(s.time_left(t0), 15);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_out_of_range_level_plays_level_one() {
        let t0 = Instant::now();
        let s = session(99, t0);
        assert_eq!(s.level(), 1);
    }

    #[test]
    fn test_only_first_answer_is_honored() {
        let t0 = Instant::now();
        let mut s = session(1, t0);
        let first = s.select_option(0, ms(t0, 500));
        assert!(matches!(first, Some(SessionEvent::Answered { correct: true, .. })));
        assert_eq!(s.select_option(1, ms(t0, 600)), None);
        assert_eq!(s.score(), 1);
        assert_eq!(s.history().len(), 1);
        assert_eq!(
            s.state(),
            SessionState::ShowingResult {
                index: 0,
                chosen: Some(5)
            }
        );
    }

    #[test]
    fn test_result_held_for_display_delay() {
        let t0 = Instant::now();
        let mut s = session(1, t0);
        s.select_option(0, ms(t0, 1000));
        assert_eq!(s.tick(ms(t0, 2100)), None);
        assert_eq!(
            s.tick(ms(t0, 2200)),
            Some(SessionEvent::NextQuestion { index: 1 })
        );
        assert_eq!(s.state(), SessionState::AwaitingAnswer { index: 1 });
        assert_eq!(s.time_left(ms(t0, 2200)), 15);
    }

    #[test]
    fn test_countdown_timeout_counts_as_wrong() {
        let t0 = Instant::now();
        let mut s = session(1, t0);
        s.select_option(0, ms(t0, 100));
        s.tick(ms(t0, 1300));
        assert_eq!(s.streak(), 1);

        let presented = ms(t0, 1300);
        assert_eq!(s.tick(presented + Duration::from_millis(14_999)), None);
        assert_eq!(s.time_left(presented + Duration::from_millis(14_999)), 1);
        let ev = s.tick(presented + Duration::from_secs(15));
        assert_eq!(
            ev,
            Some(SessionEvent::Answered {
                chosen: None,
                correct_answer: 5,
                correct: false
            })
        );
        assert_eq!(s.streak(), 0);
        assert!(s.history()[1].timed_out());
        // A late click after the timeout is ignored.
        assert_eq!(s.select_option(0, presented + Duration::from_secs(16)), None);
    }

    #[test]
    fn test_wrong_answer_resets_streak() {
        let t0 = Instant::now();
        let mut s = session(1, t0);
        let mut now = t0;
        for _ in 0..3 {
            now += Duration::from_secs(1);
            answer_and_advance(&mut s, 0, now);
            now += DEFAULT_RESULT_DELAY;
        }
        assert_eq!(s.streak(), 3);
        now += Duration::from_secs(1);
        answer_and_advance(&mut s, 2, now);
        assert_eq!(s.streak(), 0);
        assert_eq!(s.score(), 3);
    }

    #[test]
    fn test_full_level_completes_with_outcome() {
        let t0 = Instant::now();
        let mut s = session(1, t0);
        let mut now = t0;
        let mut last = None;
        for i in 0..10 {
            now += Duration::from_secs(4);
            // Miss question 3, answer everything else correctly.
            let slot = if i == 3 { 1 } else { 0 };
            last = answer_and_advance(&mut s, slot, now);
            now += DEFAULT_RESULT_DELAY;
        }
        let Some(SessionEvent::Completed(outcome)) = last else {
            panic!("expected completion, got {last:?}");
        };
        assert_eq!(outcome.level, 1);
        assert_eq!(outcome.score, 9);
        assert_eq!(outcome.question_count, 10);
        assert_eq!(outcome.final_streak, 6);
        assert_eq!(outcome.fastest_correct, Some(Duration::from_secs(4)));
        assert!(!outcome.speed_bonus());
        assert!(s.is_complete());
        assert_eq!(s.tick(now + Duration::from_secs(60)), None);
        assert_eq!(s.answer(Some(5), now), None);
    }

    #[test]
    fn test_fast_correct_answer_recorded() {
        let t0 = Instant::now();
        let mut s = session(1, t0);
        s.select_option(0, ms(t0, 1200));
        s.tick(ms(t0, 2400));
        s.select_option(0, ms(t0, 9000));
        assert_eq!(s.outcome().fastest_correct, Some(Duration::from_millis(1200)));
        assert!(s.outcome().speed_bonus());
    }

    #[test]
    fn test_fast_wrong_answer_is_not_a_speed_bonus() {
        let t0 = Instant::now();
        let mut s = session(1, t0);
        s.select_option(3, ms(t0, 500));
        assert!(!s.outcome().speed_bonus());
    }

    #[test]
    fn test_restart_clears_running_state() {
        let t0 = Instant::now();
        let mut s = session(2, t0);
        answer_and_advance(&mut s, 0, ms(t0, 500));
        assert_eq!(s.score(), 1);

        let later = ms(t0, 5000);
        s.restart(later);
        assert_eq!(s.score(), 0);
        assert_eq!(s.streak(), 0);
        assert!(s.history().is_empty());
        assert_eq!(s.state(), SessionState::AwaitingAnswer { index: 0 });
        assert_eq!(s.time_left(later), 15);
    }

    #[test]
    fn test_random_generator_session_runs_to_completion() {
        let t0 = Instant::now();
        let generator = ArithmeticGenerator::new(SmallRng::seed_from_u64(1));
        let mut s = LevelSession::new(10, Box::new(generator), t0, DEFAULT_RESULT_DELAY);
        let mut now = t0;
        let mut completed = None;
        while completed.is_none() {
            let answer = s.problem().answer;
            now += Duration::from_secs(2);
            s.answer(Some(answer), now);
            now += DEFAULT_RESULT_DELAY;
            if let Some(SessionEvent::Completed(o)) = s.tick(now) {
                completed = Some(o);
            }
        }
        let outcome = completed.unwrap();
        assert_eq!(outcome.question_count, 20);
        assert!(outcome.is_perfect());
        assert!(outcome.speed_bonus());
    }
}

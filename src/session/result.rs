use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A correct answer faster than this earns the speed badge.
pub const SPEED_BONUS_LIMIT: Duration = Duration::from_secs(3);

/// How one question resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub correct_answer: u32,
    /// `None` when the countdown ran out.
    pub chosen: Option<u32>,
    pub elapsed_ms: u64,
}

impl AnswerRecord {
    pub fn is_correct(&self) -> bool {
        self.chosen == Some(self.correct_answer)
    }

    pub fn timed_out(&self) -> bool {
        self.chosen.is_none()
    }
}

/// Summary of a finished level attempt, input to the progress update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelOutcome {
    pub level: u32,
    pub score: u32,
    pub question_count: u32,
    /// Streak running when the last question resolved.
    pub final_streak: u32,
    pub fastest_correct: Option<Duration>,
}

impl LevelOutcome {
    pub fn is_perfect(&self) -> bool {
        self.question_count > 0 && self.score == self.question_count
    }

    pub fn speed_bonus(&self) -> bool {
        self.fastest_correct
            .is_some_and(|elapsed| elapsed < SPEED_BONUS_LIMIT)
    }

    pub fn percentage(&self) -> u32 {
        if self.question_count == 0 {
            return 0;
        }
        (self.score as f64 / self.question_count as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(score: u32, questions: u32) -> LevelOutcome {
        LevelOutcome {
            level: 1,
            score,
            question_count: questions,
            final_streak: 0,
            fastest_correct: None,
        }
    }

    #[test]
    fn test_perfect_requires_every_answer() {
        assert!(outcome(10, 10).is_perfect());
        assert!(!outcome(9, 10).is_perfect());
        assert!(!outcome(0, 0).is_perfect());
    }

    #[test]
    fn test_speed_bonus_is_strictly_under_limit() {
        let mut o = outcome(5, 10);
        assert!(!o.speed_bonus());
        o.fastest_correct = Some(Duration::from_millis(2999));
        assert!(o.speed_bonus());
        o.fastest_correct = Some(SPEED_BONUS_LIMIT);
        assert!(!o.speed_bonus());
    }

    #[test]
    fn test_answer_record_flags() {
        let timed_out = AnswerRecord {
            question: "1 + 1 = ?".to_string(),
            correct_answer: 2,
            chosen: None,
            elapsed_ms: 15000,
        };
        assert!(timed_out.timed_out());
        assert!(!timed_out.is_correct());
        assert_eq!(outcome(7, 12).percentage(), 58);
    }
}

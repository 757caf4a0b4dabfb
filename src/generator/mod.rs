pub mod arithmetic;
pub mod distractors;

use crate::engine::level::{LevelConfig, Operation};

/// Number of choices offered per question, correct answer included.
pub const OPTION_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    pub left: u32,
    pub operation: Operation,
    pub right: u32,
    pub answer: u32,
}

impl Problem {
    pub fn display_text(&self) -> String {
        format!("{} {} {} = ?", self.left, self.operation.symbol(), self.right)
    }
}

/// Answer choices in presentation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerOptions(pub [u32; OPTION_COUNT]);

impl AnswerOptions {
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied()
    }

    pub fn position(&self, value: u32) -> Option<usize> {
        self.0.iter().position(|&v| v == value)
    }
}

pub trait ProblemGenerator {
    fn generate(&mut self, config: &LevelConfig) -> (Problem, AnswerOptions);
}

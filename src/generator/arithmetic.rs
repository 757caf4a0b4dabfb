use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::engine::level::{LevelConfig, Operation};
use crate::generator::distractors::pick_distractors;
use crate::generator::{AnswerOptions, OPTION_COUNT, Problem, ProblemGenerator};

/// Divisor and quotient are both drawn from 1..=DIVISION_MAX.
const DIVISION_MAX: u32 = 10;

pub struct ArithmeticGenerator<R: Rng = SmallRng> {
    rng: R,
}

impl<R: Rng> ArithmeticGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ProblemGenerator for ArithmeticGenerator<R> {
    fn generate(&mut self, config: &LevelConfig) -> (Problem, AnswerOptions) {
        generate_problem(config, &mut self.rng)
    }
}

pub fn generate_problem<R: Rng + ?Sized>(
    config: &LevelConfig,
    rng: &mut R,
) -> (Problem, AnswerOptions) {
    let operation = config
        .operations
        .choose(rng)
        .copied()
        .unwrap_or(Operation::Add);
    let problem = make_problem(operation, config.max_operand.max(1), rng);

    let mut options = [problem.answer; OPTION_COUNT];
    let wrong = pick_distractors(problem.answer, OPTION_COUNT - 1, rng);
    options[1..].copy_from_slice(&wrong);
    options.shuffle(rng);

    (problem, AnswerOptions(options))
}

fn make_problem<R: Rng + ?Sized>(operation: Operation, max: u32, rng: &mut R) -> Problem {
    let (left, right, answer) = match operation {
        Operation::Add => {
            let a = rng.gen_range(1..=max);
            let b = rng.gen_range(1..=max);
            (a, b, a + b)
        }
        Operation::Subtract => {
            let a = rng.gen_range(1..=max);
            let b = rng.gen_range(1..=a);
            (a, b, a - b)
        }
        Operation::Multiply => {
            let a = rng.gen_range(1..=max);
            let b = rng.gen_range(1..=max);
            (a, b, a * b)
        }
        Operation::Divide => {
            let divisor = rng.gen_range(1..=DIVISION_MAX);
            let quotient = rng.gen_range(1..=DIVISION_MAX);
            (divisor * quotient, divisor, quotient)
        }
    };

    Problem {
        left,
        operation,
        right,
        answer,
    }
}

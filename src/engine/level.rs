use serde::{Deserialize, Serialize};

pub const LEVEL_COUNT: u32 = 10;

/// `current_level` value once every level has been finished.
pub const ALL_LEVELS_CLEARED: u32 = LEVEL_COUNT + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '×',
            Operation::Divide => '÷',
        }
    }
}

const ALL_OPS: &[Operation] = &[
    Operation::Add,
    Operation::Subtract,
    Operation::Multiply,
    Operation::Divide,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelConfig {
    pub level: u32,
    pub label: &'static str,
    pub operations: &'static [Operation],
    pub max_operand: u32,
    pub time_limit_secs: u32,
    pub question_count: u32,
}

pub const LEVELS: [LevelConfig; LEVEL_COUNT as usize] = [
    LevelConfig {
        level: 1,
        label: "Addition (+)",
        operations: &[Operation::Add],
        max_operand: 10,
        time_limit_secs: 15,
        question_count: 10,
    },
    LevelConfig {
        level: 2,
        label: "Subtraction (-)",
        operations: &[Operation::Subtract],
        max_operand: 10,
        time_limit_secs: 15,
        question_count: 10,
    },
    LevelConfig {
        level: 3,
        label: "Mixed +/-",
        operations: &[Operation::Add, Operation::Subtract],
        max_operand: 20,
        time_limit_secs: 12,
        question_count: 10,
    },
    LevelConfig {
        level: 4,
        label: "Multiplication (×)",
        operations: &[Operation::Multiply],
        max_operand: 10,
        time_limit_secs: 15,
        question_count: 10,
    },
    LevelConfig {
        level: 5,
        label: "Division (÷)",
        operations: &[Operation::Divide],
        max_operand: 50,
        time_limit_secs: 15,
        question_count: 10,
    },
    LevelConfig {
        level: 6,
        label: "Mixed ×/÷",
        operations: &[Operation::Multiply, Operation::Divide],
        max_operand: 12,
        time_limit_secs: 12,
        question_count: 10,
    },
    LevelConfig {
        level: 7,
        label: "All Operations",
        operations: ALL_OPS,
        max_operand: 20,
        time_limit_secs: 12,
        question_count: 12,
    },
    LevelConfig {
        level: 8,
        label: "Challenge Mode",
        operations: ALL_OPS,
        max_operand: 50,
        time_limit_secs: 10,
        question_count: 12,
    },
    LevelConfig {
        level: 9,
        label: "Speed Round",
        operations: ALL_OPS,
        max_operand: 100,
        time_limit_secs: 8,
        question_count: 15,
    },
    LevelConfig {
        level: 10,
        label: "Master Level",
        operations: ALL_OPS,
        max_operand: 100,
        time_limit_secs: 6,
        question_count: 20,
    },
];

/// Config for `level`; anything outside 1..=10 plays as level 1.
pub fn level_config(level: u32) -> &'static LevelConfig {
    if (1..=LEVEL_COUNT).contains(&level) {
        &LEVELS[(level - 1) as usize]
    } else {
        &LEVELS[0]
    }
}

/// Parse a `level` deep-link parameter. Missing or unusable values mean level 1.
pub fn parse_level_param(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|level| (1..=LEVEL_COUNT).contains(level))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_numbered_in_order() {
        for (i, cfg) in LEVELS.iter().enumerate() {
            assert_eq!(cfg.level, i as u32 + 1);
            assert!(!cfg.operations.is_empty());
            assert!(cfg.max_operand >= 1);
            assert!(cfg.question_count > 0);
        }
    }

    #[test]
    fn test_level_config_falls_back_to_first() {
        assert_eq!(level_config(0).level, 1);
        assert_eq!(level_config(11).level, 1);
        assert_eq!(level_config(7).level, 7);
        assert_eq!(level_config(10).question_count, 20);
    }

    #[test]
    fn test_parse_level_param_defaults() {
        assert_eq!(parse_level_param(None), 1);
        assert_eq!(parse_level_param(Some("")), 1);
        assert_eq!(parse_level_param(Some("abc")), 1);
        assert_eq!(parse_level_param(Some("0")), 1);
        assert_eq!(parse_level_param(Some("-3")), 1);
        assert_eq!(parse_level_param(Some("42")), 1);
    }

    #[test]
    fn test_parse_level_param_valid() {
        assert_eq!(parse_level_param(Some("4")), 4);
        assert_eq!(parse_level_param(Some(" 10 ")), 10);
    }
}

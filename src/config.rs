// ABOUTME: Configuration and constants for the interpreter
// This module contains version info and the loop-budget default shared by the CLI and evaluator

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `max_loop_iterations` budget when `--max_while_loops` is not given.
pub const DEFAULT_MAX_LOOP_ITERATIONS: usize = 10_000;

/// Budget for a global scope's `while` loop. `Unbounded` disables the check
/// entirely (selected by passing `-1` to `--max_while_loops`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBudget {
    Bounded(usize),
    Unbounded,
}

impl Default for LoopBudget {
    fn default() -> Self {
        LoopBudget::Bounded(DEFAULT_MAX_LOOP_ITERATIONS)
    }
}

impl LoopBudget {
    /// Builds a budget from the CLI's `--max_while_loops` value.
    /// `-1` means unbounded; any other negative value is a usage error.
    pub fn from_cli_arg(n: i64) -> Result<Self, String> {
        if n == -1 {
            Ok(LoopBudget::Unbounded)
        } else if n < 0 {
            Err(format!(
                "--max_while_loops must be -1 (unbounded) or non-negative, got {n}"
            ))
        } else {
            Ok(LoopBudget::Bounded(n as usize))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_one_is_unbounded() {
        assert_eq!(LoopBudget::from_cli_arg(-1), Ok(LoopBudget::Unbounded));
    }

    #[test]
    fn non_negative_is_bounded() {
        assert_eq!(LoopBudget::from_cli_arg(0), Ok(LoopBudget::Bounded(0)));
        assert_eq!(LoopBudget::from_cli_arg(42), Ok(LoopBudget::Bounded(42)));
    }

    #[test]
    fn other_negatives_are_rejected() {
        assert!(LoopBudget::from_cli_arg(-2).is_err());
    }
}

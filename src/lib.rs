//! A calculator for arithmetic and dice notation such as `4d6k3 + 2`.
//!
//! Text is parsed into a [`Node`] tree, which is then evaluated with a [`Roller`]
//! as the source of randomness. Every dice term leaves a line in the execution log.

mod common;
mod error;
mod options;
pub mod parse;
pub mod roll;

pub use common::{Decimal, DisplayBehavior, Float, UInt, Verbosity};
pub use error::Error;
pub use options::{DiceOptions, ExpressionFormat, QueryFormat};
pub use parse::{ast::Node, parse, parse_arithmetic, ParseError, Parser};
pub use roll::{calculate, evaluate, ExecuteError, Outcome, Roller};

/// Parses and evaluates `s` with the thread-local RNG and default options.
pub fn roll(s: &str) -> Result<Outcome, Error> {
    let node = parse(s)?;
    Ok(evaluate(&node, &mut rand::thread_rng(), &DiceOptions::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll() {
        let outcome = roll("3d1 + 1").unwrap();
        assert_eq!(outcome.result, 4.0);
        assert_eq!(outcome.log, "`3d1`: `[1, 1, 1]` Sum: 3");
        assert_eq!(roll("2 * (1 + 2)").unwrap().log, "");
    }

    #[test]
    fn test_roll_errors() {
        assert_eq!(
            roll("1d6e"),
            Err(ParseError::InvalidDiceArgument { position: 3 }.into())
        );
        assert_eq!(roll("(0/0)d6").unwrap_err().to_string(), "this dice part is not a number!");
        assert_eq!(
            roll("(").unwrap_err().to_string(),
            "please close your parentheses!"
        );
    }
}

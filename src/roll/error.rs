use super::value::DicePartError;
use thiserror::Error;

/// Limit on `quantity × explosions × rerolls` for a single dice term.
pub const MAX_DICE: u64 = 1_000_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecuteError {
    #[error("Attempted DoS with over {} dice detected. {0}", MAX_DICE)]
    DoS(String),
    #[error("{0}")]
    InvalidDicePart(#[from] DicePartError),
    #[error("dice are not supported in plain calculations!")]
    DiceNotSupported,
}

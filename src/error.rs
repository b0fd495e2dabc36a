use crate::parse::ParseError;
use crate::roll::ExecuteError;

/// Any failure while turning text into a result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Execute(#[from] ExecuteError),
}

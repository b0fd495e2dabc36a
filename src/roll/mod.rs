mod ctx;
mod engine;
mod error;
mod execution_log;
mod request;
mod roller;
mod value;

use crate::common::Float;
use crate::options::DiceOptions;
use crate::parse::ast::Node;

pub(crate) type RResult<T> = Result<T, ExecuteError>;

pub use ctx::RollContext;
pub use error::{ExecuteError, MAX_DICE};
pub use execution_log::LogBuilder;
pub use request::{DiceRequest, Repeat};
pub use roller::Roller;
pub use value::{DicePartError, DicePartValue};

/// The value of an expression together with the log of its dice.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub result: Float,
    pub log: String,
}

/// Evaluates `node`, rolling any dice with `roller`.
pub fn evaluate(node: &Node, roller: &mut impl Roller, options: &DiceOptions) -> RResult<Outcome> {
    let mut ctx = RollContext::new(roller, options);
    let result = ctx.eval(node)?;
    Ok(Outcome {
        result,
        log: ctx.into_log(),
    })
}

/// Evaluates a tree of plain arithmetic. Any dice term is an error.
pub fn calculate(node: &Node) -> RResult<Float> {
    RollContext::arithmetic().eval(node)
}

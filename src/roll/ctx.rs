use super::engine;
use super::error::ExecuteError;
use super::execution_log::LogBuilder;
use super::request::{DiceRequest, Repeat};
use super::roller::Roller;
use super::value::DicePartValue;
use super::RResult;
use crate::common::Float;
use crate::options::DiceOptions;
use crate::parse::ast::*;

/// State threaded through one evaluation of a tree.
///
/// A context without a roller only does arithmetic and fails on the first dice term.
pub struct RollContext<'a> {
    roller: Option<&'a mut dyn Roller>,
    options: DiceOptions,
    log: LogBuilder,
}

impl<'a> RollContext<'a> {
    pub fn new(roller: &'a mut dyn Roller, options: &DiceOptions) -> Self {
        Self {
            roller: Some(roller),
            options: *options,
            log: LogBuilder::from_options(options),
        }
    }

    pub fn arithmetic() -> Self {
        let options = DiceOptions::default();
        Self {
            roller: None,
            log: LogBuilder::from_options(&options),
            options,
        }
    }

    pub fn eval(&mut self, node: &Node) -> RResult<Float> {
        node.evaluate(self)
    }

    /// Consumes the context, returning the execution log.
    pub fn into_log(self) -> String {
        self.log.build()
    }

    fn execute(&mut self, request: &DiceRequest) -> RResult<Float> {
        let roller = self
            .roller
            .as_deref_mut()
            .ok_or(ExecuteError::DiceNotSupported)?;
        engine::execute(request, roller, &self.options, &mut self.log)
    }

    fn numberize(&mut self, node: &Node) -> RResult<DicePartValue> {
        Ok(DicePartValue::new(self.eval(node)?)?)
    }

    fn numberize_opt(&mut self, node: &Option<Box<Node>>) -> RResult<Option<DicePartValue>> {
        node.as_deref().map(|node| self.numberize(node)).transpose()
    }
}

impl Evaluate for Number {
    fn evaluate(&self, _ctx: &mut RollContext<'_>) -> RResult<Float> {
        Ok(self.value)
    }
}

macro_rules! impl_binary {
    ($($node:ident => |$l:ident, $r:ident| $op:expr;)*) => {
        $(
            impl Evaluate for $node {
                fn evaluate(&self, ctx: &mut RollContext<'_>) -> RResult<Float> {
                    let $l = ctx.eval(&self.left)?;
                    let $r = ctx.eval(&self.right)?;
                    Ok($op)
                }
            }
        )*
    };
}

impl_binary! {
    Add => |l, r| l + r;
    Subtract => |l, r| l - r;
    Multiply => |l, r| l * r;
    Divide => |l, r| l / r;
    Pow => |l, r| l.powf(r);
}

impl Evaluate for Negate {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> RResult<Float> {
        Ok(-ctx.eval(&self.operand)?)
    }
}

impl Evaluate for Dice {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> RResult<Float> {
        if ctx.roller.is_none() {
            return Err(ExecuteError::DiceNotSupported);
        }
        let mut request = DiceRequest::new(ctx.numberize(&self.quantity)?, ctx.numberize(&self.sides)?);

        let explode_threshold = ctx.numberize_opt(&self.explode_threshold)?;
        let explode_iterations = ctx.numberize_opt(&self.explode_iterations)?;
        request.explode = explode_threshold.map(|threshold| Repeat {
            threshold,
            iterations: explode_iterations,
            unbounded: self.explode_unbounded,
        });
        let reroll_threshold = ctx.numberize_opt(&self.reroll_threshold)?;
        let reroll_iterations = ctx.numberize_opt(&self.reroll_iterations)?;
        request.reroll = reroll_threshold.map(|threshold| Repeat {
            threshold,
            iterations: reroll_iterations,
            unbounded: self.reroll_unbounded,
        });

        request.drop_lowest = ctx.numberize_opt(&self.drop_lowest)?;
        request.keep_highest = ctx.numberize_opt(&self.keep_highest)?;
        request.target = ctx.numberize_opt(&self.target)?;
        request.failure = ctx.numberize_opt(&self.failure)?;
        request.sort_descending = self.sort_descending;
        request.display = self.display;
        request.verbosity = self.verbosity;

        ctx.execute(&request)
    }
}

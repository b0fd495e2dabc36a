use super::request::DiceRequest;
use super::value::DicePartValue;
use crate::common::{Decimal, DisplayBehavior, Float, Verbosity};
use crate::options::{DiceOptions, ExpressionFormat, QueryFormat};
use std::fmt;

/// Collects one line per executed dice term and decides at the end which of them are shown.
#[derive(Debug, Clone)]
pub struct LogBuilder {
    query_format: QueryFormat,
    expression_format: ExpressionFormat,
    cutoff: usize,
    entries: Vec<(DisplayBehavior, String)>,
}

impl LogBuilder {
    pub fn new(query_format: QueryFormat, expression_format: ExpressionFormat, cutoff: usize) -> Self {
        Self {
            query_format,
            expression_format,
            cutoff,
            entries: Vec::new(),
        }
    }

    pub fn from_options(options: &DiceOptions) -> Self {
        Self::new(
            options.default_query_format,
            options.default_expression_format,
            options.default_output_cutoff,
        )
    }

    /// Records the outcome of `request`. `rolls` are the dice that made it into the result.
    pub fn add(&mut self, request: &DiceRequest, rolls: &[DicePartValue], result: Float) {
        let entry = self.entry(request, rolls, result);
        self.entries.push((request.display, entry));
    }

    fn exclude_roll_list(&self, verbosity: Verbosity, rolls: usize) -> bool {
        match (verbosity, self.expression_format) {
            (Verbosity::Quiet, _) => true,
            (Verbosity::Verbose, _) => false,
            (Verbosity::Default, ExpressionFormat::TotalOnly) => true,
            (Verbosity::Default, ExpressionFormat::AllRolls) => false,
            (Verbosity::Default, ExpressionFormat::LimitedRolls) => rolls > self.cutoff,
        }
    }

    fn entry(&self, request: &DiceRequest, rolls: &[DicePartValue], result: Float) -> String {
        let exclude = self.exclude_roll_list(request.verbosity, rolls.len());
        let result = Decimal(result);
        let body = if request.is_counted() {
            if exclude || rolls.is_empty() {
                format!("Hit: {}", result)
            } else {
                format!("`[{}]` Hit: {}", RollList(rolls), result)
            }
        } else if rolls.is_empty() {
            "0, there's no dice!".to_owned()
        } else if rolls.len() == 1 || exclude {
            result.to_string()
        } else {
            format!("`[{}]` Sum: {}", RollList(rolls), result)
        };
        format!("`{}`: {}", request, body)
    }

    /// Joins the visible entries, oldest first.
    pub fn build(self) -> String {
        let mut shown = Vec::new();
        for (i, (display, entry)) in self.entries.iter().rev().enumerate() {
            let is_last = i == 0;
            let visible = match (*display, self.query_format) {
                (DisplayBehavior::Hide, _) => false,
                (DisplayBehavior::Show, _) => true,
                (DisplayBehavior::Default, QueryFormat::ResultOnly) => false,
                (DisplayBehavior::Default, QueryFormat::AllDice) => true,
                (DisplayBehavior::Default, QueryFormat::LastDie) => is_last,
            };
            if visible {
                shown.push(entry.as_str());
            }
        }
        shown.reverse();
        shown.join("\n").trim_end().to_owned()
    }
}

struct RollList<'a>(&'a [DicePartValue]);

impl fmt::Display for RollList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, roll) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", roll)?;
        }
        Ok(())
    }
}

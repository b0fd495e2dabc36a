use super::value::DicePartValue;
use crate::common::{Decimal, DisplayBehavior, UInt, Verbosity};
use std::fmt;

/// A threshold with an optional cap on how often it applies, as used by explosions and rerolls.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Repeat {
    pub threshold: DicePartValue,
    pub iterations: Option<DicePartValue>,
    /// Set by the `ie`/`ir` spelling.
    pub unbounded: bool,
}

impl Repeat {
    /// How often the repetition may apply, or `None` if it may go on forever.
    ///
    /// An infinite explicit cap counts as unbounded.
    pub fn budget(&self, default: u32) -> Option<UInt> {
        if self.unbounded {
            return None;
        }
        match self.iterations {
            Some(iterations) => iterations.value(),
            None => Some(default.into()),
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
        if self.unbounded {
            f.write_str("i")?;
        }
        write!(f, "{}{}", c, Decimal(self.threshold.source()))?;
        if let Some(iterations) = self.iterations {
            write!(f, ";{}", Decimal(iterations.source()))?;
        }
        Ok(())
    }
}

/// A dice term with every sub-expression resolved to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct DiceRequest {
    pub quantity: DicePartValue,
    pub sides: DicePartValue,
    pub explode: Option<Repeat>,
    pub reroll: Option<Repeat>,
    pub drop_lowest: Option<DicePartValue>,
    pub keep_highest: Option<DicePartValue>,
    pub target: Option<DicePartValue>,
    pub failure: Option<DicePartValue>,
    pub sort_descending: bool,
    pub display: DisplayBehavior,
    pub verbosity: Verbosity,
}

impl DiceRequest {
    pub fn new(quantity: DicePartValue, sides: DicePartValue) -> Self {
        Self {
            quantity,
            sides,
            explode: None,
            reroll: None,
            drop_lowest: None,
            keep_highest: None,
            target: None,
            failure: None,
            sort_descending: false,
            display: DisplayBehavior::Default,
            verbosity: Verbosity::Default,
        }
    }

    /// Whether the result is a count of hits rather than a sum.
    pub fn is_counted(&self) -> bool {
        self.target.is_some() || self.failure.is_some()
    }
}

/// The text shown in the execution log, built from the numbers as they were
/// evaluated rather than from their rounded magnitudes.
impl fmt::Display for DiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d{}",
            Decimal(self.quantity.source()),
            Decimal(self.sides.source())
        )?;
        if let Some(explode) = &self.explode {
            explode.write(f, 'e')?;
        }
        if let Some(reroll) = &self.reroll {
            reroll.write(f, 'r')?;
        }
        for (c, arg) in [
            ('p', self.drop_lowest),
            ('k', self.keep_highest),
            ('t', self.target),
            ('f', self.failure),
        ] {
            if let Some(arg) = arg {
                write!(f, "{}{}", c, Decimal(arg.source()))?;
            }
        }
        if self.sort_descending {
            f.write_str("o")?;
        }
        match self.display {
            DisplayBehavior::Hide => f.write_str("h")?,
            DisplayBehavior::Show => f.write_str("s")?,
            DisplayBehavior::Default => {}
        }
        match self.verbosity {
            Verbosity::Quiet => f.write_str("q"),
            Verbosity::Verbose => f.write_str("v"),
            Verbosity::Default => Ok(()),
        }
    }
}

use crate::common::UInt;
use rand::Rng;

/// A source of uniformly distributed dice values.
pub trait Roller {
    /// Returns a value in `min..=max`. Callers guarantee `1 <= min <= max`.
    fn roll(&mut self, min: UInt, max: UInt) -> UInt;
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, min: UInt, max: UInt) -> UInt {
        self.gen_range(min..=max)
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedRoller;

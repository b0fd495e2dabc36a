use crate::common::{Decimal, Float, UInt};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum DicePartError {
    #[error("this dice part is not a number!")]
    NotANumber,
    #[error("this dice part is too big but not infinite! ({})", Decimal(*.0))]
    OutOfRange(Float),
}

/// A magnitude used in dice evaluation which may be infinite.
///
/// The magnitude is the rounded absolute value of `source`; `None` encodes
/// infinity. Values compare by magnitude only, with infinity above every
/// finite value.
#[derive(Debug, Copy, Clone)]
pub struct DicePartValue {
    value: Option<UInt>,
    source: Float,
}

impl DicePartValue {
    pub const INFINITY: Self = Self {
        value: None,
        source: Float::INFINITY,
    };

    pub const ZERO: Self = Self {
        value: Some(0),
        source: 0.0,
    };

    pub fn new(source: Float) -> Result<Self, DicePartError> {
        if source.is_nan() {
            Err(DicePartError::NotANumber)
        } else if source.is_infinite() {
            Ok(Self {
                value: None,
                source,
            })
        } else if source.abs() > i32::MAX as Float {
            Err(DicePartError::OutOfRange(source))
        } else {
            Ok(Self {
                value: Some(source.round_ties_even().abs() as UInt),
                source,
            })
        }
    }

    /// A rolled value; no range check applies since it never came from user input.
    pub fn rolled(value: UInt) -> Self {
        Self {
            value: Some(value),
            source: value as Float,
        }
    }

    pub fn value(&self) -> Option<UInt> {
        self.value
    }

    pub fn source(&self) -> Float {
        self.source
    }

    pub fn is_infinite(&self) -> bool {
        self.value.is_none()
    }

    pub fn as_float(&self) -> Float {
        self.value.map_or(Float::INFINITY, |x| x as Float)
    }

    /// Sum of two magnitudes, infinite if either side is.
    pub fn plus(self, other: Self) -> Self {
        match (self.value, other.value) {
            (Some(a), Some(b)) => Self::rolled(a.saturating_add(b)),
            _ => Self::INFINITY,
        }
    }
}

impl From<UInt> for DicePartValue {
    fn from(value: UInt) -> Self {
        Self::rolled(value)
    }
}

impl PartialEq for DicePartValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for DicePartValue {}

impl PartialOrd for DicePartValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DicePartValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.value, other.value) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl PartialEq<UInt> for DicePartValue {
    fn eq(&self, other: &UInt) -> bool {
        self.value == Some(*other)
    }
}

impl PartialOrd<UInt> for DicePartValue {
    fn partial_cmp(&self, other: &UInt) -> Option<Ordering> {
        Some(self.cmp(&Self::rolled(*other)))
    }
}

impl fmt::Display for DicePartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(x) => fmt::Display::fmt(&x, f),
            None => f.write_str("∞"),
        }
    }
}

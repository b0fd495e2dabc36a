use crate::common::{Decimal, Float};
use std::fmt;
use thiserror::Error;

/// Dice features which may be configured at most once per term.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Modifier {
    Explosion,
    Reroll,
    Drop,
    Keep,
    Target,
    Failure,
    Sorting,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Explosion => "explosion",
            Self::Reroll => "reroll",
            Self::Drop => "drop",
            Self::Keep => "keep",
            Self::Target => "target",
            Self::Failure => "failure",
            Self::Sorting => "sorting",
        };
        f.write_str(s)
    }
}

/// Positions of symbols count characters; positions of parentheses count tokens, starting at 1.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("there was nothing in the calculation!")]
    Empty,
    #[error("the symbol '{symbol}' at position {position} is not recognized as maths!")]
    UnrecognizedSymbol { symbol: char, position: usize },
    #[error("'{slice}' at position {position} is not a valid number!")]
    InvalidNumber { slice: String, position: usize },
    #[error("the two numbers {} and {} are not allowed to follow each other without an operation!", Decimal(*.0), Decimal(*.1))]
    AdjacentNumbers(Float, Float),
    #[error("the parenthesis at position {0} is not allowed, there's not enough opened parentheses!")]
    UnmatchedClose(usize),
    #[error("there's nothing between the two parentheses at position {} and {}!", .0 - 1, .0)]
    EmptyParentheses(usize),
    #[error("please close your parentheses!")]
    Unclosed,
    #[error("the parentheses are nested deeper than the allowed {0} levels!")]
    TooDeep(usize),
    #[error("the calculation nests more than {0} operations inside each other!")]
    TooComplex(usize),
    #[error("somehow the operation at position {position} was not attached to a number or a parenthesis!")]
    DanglingOperator { position: usize },
    #[error("somehow the negation at position {position} was not attached to a number or a parenthesis!")]
    DanglingNegation { position: usize },
    #[error("something's wrong with the dice at position {position} - the argument is not a number (nor math) - maybe you forgot to use parentheses?")]
    InvalidDiceArgument { position: usize },
    #[error("{modifier} at position {position} has already been configured for these dice!")]
    DuplicateModifier { modifier: Modifier, position: usize },
    #[error("somehow there were multiple leftover nodes after parsing, starting at position {position}!")]
    Leftover { position: usize },
}

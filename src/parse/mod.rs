pub mod ast;
mod builder;
mod element;
mod error;
mod lexer;
mod normalize;
mod sequence;

pub use error::{Modifier, ParseError};

use ast::Node;
use lexer::Tokens;
use sequence::Sequence;

/// How deep parentheses may nest before input is rejected.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How many nodes the longest path of a parsed tree may hold. Deeper trees are rejected.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 256;

/// Parser settings. [`parse`] and [`parse_arithmetic`] cover the common cases.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Parser {
    dice: bool,
    max_depth: usize,
    max_tree_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::dice()
    }
}

impl Parser {
    /// Accepts the full dice notation.
    pub fn dice() -> Self {
        Self {
            dice: true,
            max_depth: DEFAULT_MAX_DEPTH,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }

    /// Accepts plain arithmetic only; dice letters are unrecognized symbols.
    pub fn arithmetic() -> Self {
        Self {
            dice: false,
            ..Self::dice()
        }
    }

    pub fn max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    /// Bounds every evaluation, display and drop of the parsed tree.
    pub fn max_tree_depth(self, max_tree_depth: usize) -> Self {
        Self {
            max_tree_depth,
            ..self
        }
    }

    pub fn parse(&self, s: &str) -> Result<Node, ParseError> {
        let Tokens {
            elements,
            positions,
            end,
        } = lexer::tokenize(s, self.dice)?;
        normalize::validate_parentheses(&elements, self.max_depth)?;
        let mut seq: Sequence<_> = elements.into_iter().collect();
        normalize::normalize(&mut seq)?;
        let node = builder::build_tree(seq, &positions, end, self.max_tree_depth)?;
        log::trace!("parsed {:?} as {}", s, node);
        Ok(node)
    }
}

/// Parses an expression that may contain dice.
pub fn parse(s: &str) -> Result<Node, ParseError> {
    Parser::dice().parse(s)
}

/// Parses an expression without dice.
pub fn parse_arithmetic(s: &str) -> Result<Node, ParseError> {
    Parser::arithmetic().parse(s)
}

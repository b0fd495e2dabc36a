use super::ast::Node;
use crate::common::Float;

/// Binary operators as they appear in raw text. `-` may still turn into a negation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

/// Markers of the dice notation, before they are folded into a [`Dice`](super::ast::Dice) node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DicePart {
    Dice,
    Explode,
    ExplodeUnbounded,
    Reroll,
    RerollUnbounded,
    Drop,
    Keep,
    Target,
    Failure,
    Sort,
    Hide,
    Show,
    Quiet,
    Verbose,
    Separator,
}

impl DicePart {
    /// Whether this part can follow the sides of a dice term as a modifier.
    pub fn is_modifier(self) -> bool {
        !matches!(self, Self::Dice | Self::Separator)
    }
}

/// One position of the parser's workspace: either a raw token or an already built tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    OpenParen,
    CloseParen,
    Operator(Operator),
    DicePart(DicePart),
    Negation,
    Node(Node),
}

impl Element {
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub fn as_number(&self) -> Option<Float> {
        match self {
            Self::Node(Node::Number(x)) => Some(x.value),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        self.as_number().is_some()
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::OpenParen)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Self::CloseParen)
    }

    /// Where an argument ends: before a closing paren, a dice part or an operator.
    pub fn ends_argument(&self) -> bool {
        matches!(
            self,
            Self::CloseParen | Self::DicePart(_) | Self::Operator(_)
        )
    }

    pub fn into_node(self) -> Option<Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl From<Node> for Element {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

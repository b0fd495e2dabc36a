use crate::common::{Decimal, DisplayBehavior, Float, Verbosity};
use crate::roll::{RResult, RollContext};
use std::fmt;

#[enum_dispatch::enum_dispatch]
pub trait Evaluate {
    fn evaluate(&self, ctx: &mut RollContext<'_>) -> RResult<Float>;
}

/// A parsed expression tree. Every node owns its children.
#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch::enum_dispatch(Evaluate)]
pub enum Node {
    Number(Number),
    Add(Add),
    Subtract(Subtract),
    Multiply(Multiply),
    Divide(Divide),
    Pow(Pow),
    Negate(Negate),
    Dice(Dice),
}

impl Node {
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Number of nodes on the longest path from this node down to a number.
    pub fn depth(&self) -> usize {
        1 + match self {
            Self::Number(_) => 0,
            Self::Add(Add { left, right })
            | Self::Subtract(Subtract { left, right })
            | Self::Multiply(Multiply { left, right })
            | Self::Divide(Divide { left, right })
            | Self::Pow(Pow { left, right }) => left.depth().max(right.depth()),
            Self::Negate(negate) => negate.operand.depth(),
            Self::Dice(dice) => [
                &dice.explode_threshold,
                &dice.explode_iterations,
                &dice.reroll_threshold,
                &dice.reroll_iterations,
                &dice.drop_lowest,
                &dice.keep_highest,
                &dice.target,
                &dice.failure,
            ]
            .into_iter()
            .flatten()
            .chain([&dice.quantity, &dice.sides])
            .map(|node| node.depth())
            .max()
            .unwrap_or(0),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => fmt::Display::fmt(x, f),
            Self::Add(x) => fmt::Display::fmt(x, f),
            Self::Subtract(x) => fmt::Display::fmt(x, f),
            Self::Multiply(x) => fmt::Display::fmt(x, f),
            Self::Divide(x) => fmt::Display::fmt(x, f),
            Self::Pow(x) => fmt::Display::fmt(x, f),
            Self::Negate(x) => fmt::Display::fmt(x, f),
            Self::Dice(x) => fmt::Display::fmt(x, f),
        }
    }
}

/// Wraps a sub-expression in parentheses unless it is a bare number.
struct Operand<'a>(&'a Node);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_number() {
            fmt::Display::fmt(self.0, f)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Number {
    pub value: Float,
}

impl Number {
    pub fn new(value: Float) -> Self {
        Self { value }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Decimal(self.value), f)
    }
}

macro_rules! binary_node {
    ($($Name:ident => $symbol:literal),* $(,)?) => {$(
        #[derive(Debug, Clone, PartialEq)]
        pub struct $Name {
            pub left: Box<Node>,
            pub right: Box<Node>,
        }

        impl $Name {
            pub fn new(left: Node, right: Node) -> Self {
                Self {
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        }

        impl fmt::Display for $Name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {} {}", Operand(&self.left), $symbol, Operand(&self.right))
            }
        }
    )*};
}

binary_node! {
    Add => "+",
    Subtract => "-",
    Multiply => "*",
    Divide => "/",
    Pow => "^",
}

#[derive(Debug, Clone, PartialEq)]
pub struct Negate {
    pub operand: Box<Node>,
}

impl Negate {
    pub fn new(operand: Node) -> Self {
        Self {
            operand: Box::new(operand),
        }
    }
}

impl fmt::Display for Negate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-{}", Operand(&self.operand))
    }
}

/// A dice term such as `4d6k3`. Quantity, sides and every modifier argument
/// are full sub-expressions, resolved only when the term is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Dice {
    pub quantity: Box<Node>,
    pub sides: Box<Node>,
    /// Explode any die greater than or equal to this.
    pub explode_threshold: Option<Box<Node>>,
    /// Cap on chained explosions of a single die.
    pub explode_iterations: Option<Box<Node>>,
    pub explode_unbounded: bool,
    /// Reroll any die less than or equal to this.
    pub reroll_threshold: Option<Box<Node>>,
    pub reroll_iterations: Option<Box<Node>>,
    pub reroll_unbounded: bool,
    pub drop_lowest: Option<Box<Node>>,
    pub keep_highest: Option<Box<Node>>,
    /// Count dice greater than or equal to this as hits.
    pub target: Option<Box<Node>>,
    /// Count dice less than or equal to this as failures.
    pub failure: Option<Box<Node>>,
    pub sort_descending: bool,
    pub display: DisplayBehavior,
    pub verbosity: Verbosity,
}

impl Dice {
    pub fn new(quantity: Node, sides: Node) -> Self {
        Self {
            quantity: Box::new(quantity),
            sides: Box::new(sides),
            explode_threshold: None,
            explode_iterations: None,
            explode_unbounded: false,
            reroll_threshold: None,
            reroll_iterations: None,
            reroll_unbounded: false,
            drop_lowest: None,
            keep_highest: None,
            target: None,
            failure: None,
            sort_descending: false,
            display: DisplayBehavior::Default,
            verbosity: Verbosity::Default,
        }
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", Operand(&self.quantity), Operand(&self.sides))?;
        if let Some(threshold) = &self.explode_threshold {
            if self.explode_unbounded {
                f.write_str("i")?;
            }
            write!(f, "e{}", Operand(threshold))?;
            if let Some(iterations) = &self.explode_iterations {
                write!(f, ";{}", Operand(iterations))?;
            }
        }
        if let Some(threshold) = &self.reroll_threshold {
            if self.reroll_unbounded {
                f.write_str("i")?;
            }
            write!(f, "r{}", Operand(threshold))?;
            if let Some(iterations) = &self.reroll_iterations {
                write!(f, ";{}", Operand(iterations))?;
            }
        }
        for (c, arg) in [
            ('p', &self.drop_lowest),
            ('k', &self.keep_highest),
            ('t', &self.target),
            ('f', &self.failure),
        ] {
            if let Some(arg) = arg {
                write!(f, "{}{}", c, Operand(arg))?;
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

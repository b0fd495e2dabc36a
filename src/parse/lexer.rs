use super::ast::Number;
use super::element::{DicePart, Element, Operator};
use super::error::ParseError;
use crate::common::{Float, NonEmpty};
use logos::{Logos, Span};

#[derive(Logos, Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    #[token("×")]
    #[token("∙")]
    Star,
    #[token("/")]
    #[token("÷")]
    Slash,
    #[token("^")]
    Caret,

    #[regex(r"[0-9.]+")]
    Number,

    #[token("d")]
    Dice,
    #[token("e")]
    Explode,
    #[token("ie")]
    ExplodeUnbounded,
    #[token("r")]
    Reroll,
    #[token("ir")]
    RerollUnbounded,
    #[token("p")]
    Drop,
    #[token("k")]
    Keep,
    #[token("t")]
    Target,
    #[token("f")]
    Failure,
    #[token("o")]
    Sort,
    #[token("h")]
    Hide,
    #[token("s")]
    Show,
    #[token("q")]
    Quiet,
    #[token("v")]
    Verbose,
    #[token(";")]
    Separator,

    #[regex(r"\s+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn as_operator(self) -> Option<Operator> {
        use Operator::*;
        Some(match self {
            Self::Plus => Plus,
            Self::Minus => Minus,
            Self::Star => Times,
            Self::Slash => Divide,
            Self::Caret => Power,
            _ => return None,
        })
    }

    pub fn as_dice_part(self) -> Option<DicePart> {
        use DicePart::*;
        Some(match self {
            Self::Dice => Dice,
            Self::Explode => Explode,
            Self::ExplodeUnbounded => ExplodeUnbounded,
            Self::Reroll => Reroll,
            Self::RerollUnbounded => RerollUnbounded,
            Self::Drop => Drop,
            Self::Keep => Keep,
            Self::Target => Target,
            Self::Failure => Failure,
            Self::Sort => Sort,
            Self::Hide => Hide,
            Self::Show => Show,
            Self::Quiet => Quiet,
            Self::Verbose => Verbose,
            Self::Separator => Separator,
            _ => return None,
        })
    }
}

/// Elements of an expression with the character position each one starts at.
#[derive(Debug)]
pub struct Tokens {
    pub elements: NonEmpty<Element>,
    pub positions: Vec<usize>,
    /// Number of characters in the whole input.
    pub end: usize,
}

/// Splits `s` into elements. Without `dice`, dice letters are rejected like any unknown symbol.
pub fn tokenize(s: &str, dice: bool) -> Result<Tokens, ParseError> {
    let mut lexer = TokenKind::lexer(s);
    let mut elements = Vec::new();
    let mut positions = Vec::new();
    let (mut position, mut scanned) = (0, 0);
    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        position += s[scanned..span.start].chars().count();
        scanned = span.start;
        let element = match kind {
            TokenKind::LeftParen => Element::OpenParen,
            TokenKind::RightParen => Element::CloseParen,
            TokenKind::Number => {
                Element::Node(Number::new(parse_number(lexer.slice(), position)?).into())
            }
            kind => match (kind.as_operator(), kind.as_dice_part()) {
                (Some(op), _) => Element::Operator(op),
                (None, Some(part)) if dice => Element::DicePart(part),
                _ => return Err(unrecognized(s, span, position)),
            },
        };
        elements.push(element);
        positions.push(position);
    }
    log::trace!("tokenized {:?} into {} elements", s, elements.len());
    Ok(Tokens {
        elements: NonEmpty::try_from_vec(elements).map_err(|_| ParseError::Empty)?,
        positions,
        end: position + s[scanned..].chars().count(),
    })
}

fn unrecognized(s: &str, span: Span, position: usize) -> ParseError {
    ParseError::UnrecognizedSymbol {
        symbol: s[span.start..].chars().next().unwrap_or('\u{FFFD}'),
        position,
    }
}

fn parse_number(slice: &str, position: usize) -> Result<Float, ParseError> {
    slice.parse().map_err(|_| ParseError::InvalidNumber {
        slice: slice.to_owned(),
        position,
    })
}

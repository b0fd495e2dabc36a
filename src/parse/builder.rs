use super::ast::{self, Add, Divide, Multiply, Negate, Node, Pow, Subtract};
use super::element::{DicePart, Element, Operator};
use super::error::{Modifier, ParseError};
use super::sequence::{Position, Sequence};

type Constructor = fn(Node, Node) -> Node;

fn multiplicative(op: Operator) -> Option<Constructor> {
    match op {
        Operator::Times => Some(|l, r| Multiply::new(l, r).into()),
        Operator::Divide => Some(|l, r| Divide::new(l, r).into()),
        _ => None,
    }
}

fn additive(op: Operator) -> Option<Constructor> {
    match op {
        Operator::Plus => Some(|l, r| Add::new(l, r).into()),
        Operator::Minus => Some(|l, r| Subtract::new(l, r).into()),
        _ => None,
    }
}

/// Collapses a normalized, parenthesis-checked sequence into a single tree.
///
/// The whole input is wrapped in one more pair of parentheses. Then the leftmost
/// closing parenthesis and the opening one right before it always enclose a span
/// without any parentheses, which is reduced to a single node until only the
/// outermost pair is left.
///
/// `positions` are the character positions of the tokens the sequence was built
/// from, `end` the length of the input. No tree grows deeper than `max_depth`.
pub fn build_tree(
    seq: Sequence<Element>,
    positions: &[usize],
    end: usize,
    max_depth: usize,
) -> Result<Node, ParseError> {
    if seq.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut builder = Builder {
        positions: char_positions(&seq, positions, end),
        seq,
        end,
        max_depth,
    };
    builder.seq.push_front(Element::OpenParen);
    builder.seq.push_back(Element::CloseParen);
    builder.run()
}

/// Character positions of every slot in `seq`, which must still hold its tokens
/// in their first slots. Implied operators take the position of the token after them.
fn char_positions(seq: &Sequence<Element>, tokens: &[usize], end: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(seq.len());
    let mut cur = seq.head();
    while let Some(pos) = cur {
        order.push(pos);
        cur = seq.next(pos);
    }
    let mut positions = vec![end; order.iter().max().map_or(0, |&pos| pos + 1)];
    let mut following = end;
    for &pos in order.iter().rev() {
        following = tokens.get(pos).copied().unwrap_or(following);
        positions[pos] = following;
    }
    positions
}

fn set_once(
    slot: &mut Option<Box<Node>>,
    duplicate: ParseError,
    value: impl FnOnce() -> Result<Node, ParseError>,
) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(duplicate);
    }
    *slot = Some(Box::new(value()?));
    Ok(())
}

struct Builder {
    seq: Sequence<Element>,
    positions: Vec<usize>,
    end: usize,
    max_depth: usize,
}

impl Builder {
    fn run(mut self) -> Result<Node, ParseError> {
        loop {
            let head = self.seq.head().ok_or(ParseError::Empty)?;
            let close = self
                .seq
                .find_forward(head, Element::is_close)
                .ok_or(ParseError::Unclosed)?;
            let open = self
                .seq
                .find_backward(close, Element::is_open)
                .ok_or(ParseError::UnmatchedClose(1))?;

            let node = self.reduce_span(open, close)?;
            self.seq.remove(open);
            self.seq.remove(close);
            if self.seq.len() == 1 {
                let position = self.position(node);
                return self
                    .seq
                    .remove(node)
                    .into_node()
                    .ok_or(ParseError::Leftover { position });
            }
        }
    }

    fn position(&self, pos: Position) -> usize {
        self.positions.get(pos).copied().unwrap_or(self.end)
    }

    fn dangling_operator(&self, pos: Position) -> ParseError {
        ParseError::DanglingOperator {
            position: self.position(pos),
        }
    }

    fn invalid_argument(&self, pos: Position) -> ParseError {
        ParseError::InvalidDiceArgument {
            position: self.position(pos),
        }
    }

    /// Stores `node` at `pos` unless it nests deeper than allowed.
    fn place(&mut self, pos: Position, node: impl Into<Node>) -> Result<(), ParseError> {
        let node = node.into();
        if node.depth() > self.max_depth {
            return Err(ParseError::TooComplex(self.max_depth));
        }
        self.seq.replace(pos, Element::Node(node));
        Ok(())
    }

    /// Folds everything strictly between `open` and `close` into one node and returns its position.
    fn reduce_span(&mut self, open: Position, close: Position) -> Result<Position, ParseError> {
        self.fold_dice(open, close)?;
        self.fold_powers(open, close)?;
        self.fold_negations(open, close)?;
        self.fold_left_to_right(open, close, multiplicative)?;
        self.fold_left_to_right(open, close, additive)?;

        let first = self
            .seq
            .next(open)
            .filter(|&pos| pos != close)
            .ok_or(ParseError::Empty)?;
        if let Some(next) = self.seq.next(first).filter(|&pos| pos != close) {
            return Err(ParseError::Leftover {
                position: self.position(next),
            });
        }
        match &self.seq[first] {
            Element::Node(node) => {
                log::trace!("reduced span to {}", node);
                Ok(first)
            }
            Element::Operator(_) => Err(self.dangling_operator(first)),
            Element::Negation => Err(ParseError::DanglingNegation {
                position: self.position(first),
            }),
            _ => Err(self.invalid_argument(first)),
        }
    }

    /// Removes the node at `pos`, failing with `err` if there is none.
    fn take_node(&mut self, pos: Option<Position>, err: ParseError) -> Result<Node, ParseError> {
        match pos {
            Some(pos) if self.seq[pos].is_node() => self.seq.remove(pos).into_node().ok_or(err),
            _ => Err(err),
        }
    }

    /// Turns the negation at `pos` and the node after it into a single node.
    fn fold_negation(&mut self, pos: Position) -> Result<(), ParseError> {
        let err = ParseError::DanglingNegation {
            position: self.position(pos),
        };
        let next = self.seq.next(pos);
        let operand = self.take_node(next, err)?;
        self.place(pos, Negate::new(operand))
    }

    /// Takes the operand following `anchor`.
    ///
    /// Negation is folded later than dice and powers, so a negation right after
    /// `anchor` would otherwise be stranded. Such negations are folded here up to
    /// the end of the operand.
    fn take_operand(&mut self, anchor: Position, err: ParseError) -> Result<Node, ParseError> {
        let mut cur = match self.seq.next(anchor) {
            Some(pos) if self.seq[pos].is_node() || self.seq[pos] == Element::Negation => pos,
            _ => return Err(err),
        };
        loop {
            if self.seq[cur] == Element::Negation {
                self.fold_negation(cur)?;
            }
            match self.seq.next(cur) {
                Some(next) if !self.seq[next].ends_argument() => cur = next,
                _ => break,
            }
        }
        let first = self.seq.next(anchor);
        self.take_node(first, err)
    }

    fn fold_dice(&mut self, open: Position, close: Position) -> Result<(), ParseError> {
        let mut cur = self.seq.next(open);
        while let Some(pos) = cur.filter(|&pos| pos != close) {
            if self.seq[pos] == Element::DicePart(DicePart::Dice) {
                let dice = self.fold_one_dice(pos)?;
                self.place(pos, dice)?;
            }
            cur = self.seq.next(pos);
        }
        Ok(())
    }

    /// Takes the `;`-separated iteration cap following a threshold, if any.
    fn take_iterations(&mut self, anchor: Position) -> Result<Option<Box<Node>>, ParseError> {
        match self.seq.next(anchor) {
            Some(pos) if self.seq[pos] == Element::DicePart(DicePart::Separator) => {
                let err = self.invalid_argument(pos);
                self.seq.remove(pos);
                let iterations = self.take_operand(anchor, err)?;
                Ok(Some(Box::new(iterations)))
            }
            _ => Ok(None),
        }
    }

    /// Consumes the quantity before the `d` at `d`, the sides after it and every
    /// modifier after those. Only the `d` itself is left in the sequence.
    fn fold_one_dice(&mut self, d: Position) -> Result<ast::Dice, ParseError> {
        let err = self.invalid_argument(d);
        let prev = self.seq.prev(d);
        if !prev.map_or(false, |pos| self.seq[pos].is_node()) {
            return Err(err);
        }
        let sides = self.take_operand(d, err.clone())?;
        let prev = self.seq.prev(d);
        let quantity = self.take_node(prev, err)?;
        let mut dice = ast::Dice::new(quantity, sides);

        loop {
            let (pos, part) = match self.seq.next(d) {
                Some(pos) => match self.seq[pos] {
                    Element::DicePart(part) if part.is_modifier() => (pos, part),
                    _ => break,
                },
                None => break,
            };
            let position = self.position(pos);
            let duplicate =
                move |modifier: Modifier| ParseError::DuplicateModifier { modifier, position };
            let err = self.invalid_argument(pos);
            self.seq.remove(pos);
            match part {
                DicePart::Explode | DicePart::ExplodeUnbounded => {
                    if part == DicePart::ExplodeUnbounded {
                        if dice.explode_unbounded {
                            return Err(duplicate(Modifier::Explosion));
                        }
                        dice.explode_unbounded = true;
                    }
                    set_once(&mut dice.explode_threshold, duplicate(Modifier::Explosion), || {
                        self.take_operand(d, err)
                    })?;
                    dice.explode_iterations = self.take_iterations(d)?;
                }
                DicePart::Reroll | DicePart::RerollUnbounded => {
                    if part == DicePart::RerollUnbounded {
                        if dice.reroll_unbounded {
                            return Err(duplicate(Modifier::Reroll));
                        }
                        dice.reroll_unbounded = true;
                    }
                    set_once(&mut dice.reroll_threshold, duplicate(Modifier::Reroll), || {
                        self.take_operand(d, err)
                    })?;
                    dice.reroll_iterations = self.take_iterations(d)?;
                }
                DicePart::Drop => set_once(&mut dice.drop_lowest, duplicate(Modifier::Drop), || {
                    self.take_operand(d, err)
                })?,
                DicePart::Keep => set_once(&mut dice.keep_highest, duplicate(Modifier::Keep), || {
                    self.take_operand(d, err)
                })?,
                DicePart::Target => set_once(&mut dice.target, duplicate(Modifier::Target), || {
                    self.take_operand(d, err)
                })?,
                DicePart::Failure => set_once(&mut dice.failure, duplicate(Modifier::Failure), || {
                    self.take_operand(d, err)
                })?,
                DicePart::Sort => {
                    if dice.sort_descending {
                        return Err(duplicate(Modifier::Sorting));
                    }
                    dice.sort_descending = true;
                }
                DicePart::Hide => dice.display = dice.display.hide(),
                DicePart::Show => dice.display = dice.display.show(),
                DicePart::Quiet => dice.verbosity = dice.verbosity.quieter(),
                DicePart::Verbose => dice.verbosity = dice.verbosity.louder(),
                DicePart::Dice | DicePart::Separator => unreachable!("not a modifier"),
            }
        }
        Ok(dice)
    }

    /// Exponentiation binds right to left, so `2^3^2` is `2^(3^2)`.
    fn fold_powers(&mut self, open: Position, close: Position) -> Result<(), ParseError> {
        let mut cur = self.seq.prev(close);
        while let Some(pos) = cur.filter(|&pos| pos != open) {
            if self.seq[pos] == Element::Operator(Operator::Power) {
                let err = self.dangling_operator(pos);
                let prev = self.seq.prev(pos);
                if !prev.map_or(false, |base| self.seq[base].is_node()) {
                    return Err(err);
                }
                let exponent = self.take_operand(pos, err.clone())?;
                let prev = self.seq.prev(pos);
                let base = self.take_node(prev, err)?;
                self.place(pos, Pow::new(base, exponent))?;
            }
            cur = self.seq.prev(pos);
        }
        Ok(())
    }

    fn fold_negations(&mut self, open: Position, close: Position) -> Result<(), ParseError> {
        let mut cur = self.seq.next(open);
        while let Some(pos) = cur.filter(|&pos| pos != close) {
            if self.seq[pos] == Element::Negation {
                self.fold_negation(pos)?;
            }
            cur = self.seq.next(pos);
        }
        Ok(())
    }

    fn fold_left_to_right(
        &mut self,
        open: Position,
        close: Position,
        constructor: fn(Operator) -> Option<Constructor>,
    ) -> Result<(), ParseError> {
        let mut cur = self.seq.next(open);
        while let Some(pos) = cur.filter(|&pos| pos != close) {
            if let Element::Operator(op) = self.seq[pos] {
                if let Some(make) = constructor(op) {
                    let err = self.dangling_operator(pos);
                    let next = self.seq.next(pos);
                    if !next.map_or(false, |right| self.seq[right].is_node()) {
                        return Err(err);
                    }
                    let right = self.take_node(next, err.clone())?;
                    let prev = self.seq.prev(pos);
                    let left = self.take_node(prev, err)?;
                    self.place(pos, make(left, right))?;
                }
            }
            cur = self.seq.next(pos);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ast::test_utils::*;
    use crate::parse::ast::Dice;
    use crate::parse::lexer::{tokenize, Tokens};
    use crate::parse::normalize::normalize;
    use crate::parse::DEFAULT_MAX_TREE_DEPTH;

    fn normalized(s: &str) -> Result<(Sequence<Element>, Vec<usize>, usize), ParseError> {
        let Tokens {
            elements,
            positions,
            end,
        } = tokenize(s, true)?;
        let mut seq: Sequence<Element> = elements.into_iter().collect();
        normalize(&mut seq)?;
        Ok((seq, positions, end))
    }

    fn build_with(s: &str, max_depth: usize) -> Result<Node, ParseError> {
        let (seq, positions, end) = normalized(s)?;
        build_tree(seq, &positions, end, max_depth)
    }

    fn build(s: &str) -> Result<Node, ParseError> {
        build_with(s, DEFAULT_MAX_TREE_DEPTH)
    }

    fn check(s: &str, expected: Node) {
        assert_eq!(build(s), Ok(expected));
    }

    fn check_err(s: &str, expected: ParseError) {
        assert_eq!(build(s), Err(expected));
    }

    fn as_dice(node: Node) -> Dice {
        match node {
            Node::Dice(dice) => dice,
            other => panic!("expected dice, got {}", other),
        }
    }

    #[test]
    fn test_precedence() {
        check("1+2*3", add(num(1.0), mul(num(2.0), num(3.0))));
        check("1-2-3", sub(sub(num(1.0), num(2.0)), num(3.0)));
        check("4^2^3", pow(num(4.0), pow(num(2.0), num(3.0))));
        check("-5^2", neg(pow(num(5.0), num(2.0))));
        check("2^-1", pow(num(2.0), neg(num(1.0))));
        check("3--1", sub(num(3.0), neg(num(1.0))));
        check("2(3+4)", mul(num(2.0), add(num(3.0), num(4.0))));
        check("((7))", num(7.0));
    }

    #[test]
    fn test_dice_structure() {
        check("-3d-6", neg(dice(num(3.0), neg(num(6.0)))));
        check("1d2d3", dice(dice(num(1.0), num(2.0)), num(3.0)));
        check(
            "1d6+-1^2",
            add(dice(num(1.0), num(6.0)), neg(pow(num(1.0), num(2.0)))),
        );
        check(
            "(1+1)d(3*2)",
            dice(add(num(1.0), num(1.0)), mul(num(3.0), num(2.0))),
        );
    }

    #[test]
    fn test_dice_modifiers() {
        let d = as_dice(build("12d20e19ir2t11o").unwrap());
        assert_eq!(*d.quantity, num(12.0));
        assert_eq!(*d.sides, num(20.0));
        assert_eq!(d.explode_threshold.as_deref(), Some(&num(19.0)));
        assert!(!d.explode_unbounded);
        assert_eq!(d.explode_iterations, None);
        assert_eq!(d.reroll_threshold.as_deref(), Some(&num(2.0)));
        assert!(d.reroll_unbounded);
        assert_eq!(d.target.as_deref(), Some(&num(11.0)));
        assert!(d.sort_descending);
        assert_eq!(d.keep_highest, None);

        let d = as_dice(build("12d20e19;1r2;5t11").unwrap());
        assert_eq!(d.explode_iterations.as_deref(), Some(&num(1.0)));
        assert_eq!(d.reroll_iterations.as_deref(), Some(&num(5.0)));
        assert!(!d.reroll_unbounded);
        assert!(!d.sort_descending);

        let d = as_dice(build("12d20k10p15").unwrap());
        assert_eq!(d.keep_highest.as_deref(), Some(&num(10.0)));
        assert_eq!(d.drop_lowest.as_deref(), Some(&num(15.0)));
        assert_eq!(d.target, None);

        let d = as_dice(build("1d6e-1f(2+1)").unwrap());
        assert_eq!(d.explode_threshold.as_deref(), Some(&neg(num(1.0))));
        assert_eq!(d.failure.as_deref(), Some(&add(num(2.0), num(1.0))));
    }

    #[test]
    fn test_errors() {
        let duplicate = |modifier, position| ParseError::DuplicateModifier { modifier, position };
        check_err("1d6e5e4", duplicate(Modifier::Explosion, 5));
        check_err("1d6e5ie4", duplicate(Modifier::Explosion, 5));
        check_err("1d6r1ir2", duplicate(Modifier::Reroll, 5));
        check_err("1d6k1k2", duplicate(Modifier::Keep, 5));
        check_err("1d6p1p2", duplicate(Modifier::Drop, 5));
        check_err("1d6t1t2", duplicate(Modifier::Target, 5));
        check_err("1d6f1f2", duplicate(Modifier::Failure, 5));
        check_err("1d6oo", duplicate(Modifier::Sorting, 4));

        let invalid = |position| ParseError::InvalidDiceArgument { position };
        check_err("d6", invalid(0));
        check_err("1d", invalid(1));
        check_err("1d6k", invalid(3));
        check_err("1d6e5;", invalid(5));
        check_err("1 d 6 k", invalid(6));

        let dangling = |position| ParseError::DanglingOperator { position };
        check_err("1+", dangling(1));
        check_err("*2", dangling(0));
        check_err("2^", dangling(1));
        check_err("1+*2", dangling(2));
        check_err("1;2", ParseError::Leftover { position: 1 });
        assert_eq!(
            duplicate(Modifier::Sorting, 4).to_string(),
            "sorting at position 4 has already been configured for these dice!"
        );
    }

    #[test]
    fn test_implied_operator_position() {
        let (seq, positions, end) = normalized("2 (3)").unwrap();
        assert_eq!(char_positions(&seq, &positions, end), vec![0, 2, 3, 4, 2]);
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(build_with("1+1+1", 3), Ok(add(add(num(1.0), num(1.0)), num(1.0))));
        assert_eq!(build_with("1+1+1+1", 3), Err(ParseError::TooComplex(3)));
        assert_eq!(build_with("2^2^2^2", 3), Err(ParseError::TooComplex(3)));
        assert_eq!(build_with("-(-(-(1)))", 3), Err(ParseError::TooComplex(3)));
        assert_eq!(build_with("1d1d1d1", 3), Err(ParseError::TooComplex(3)));

        let long = format!("{}1", "1+".repeat(20_000));
        assert_eq!(build(&long), Err(ParseError::TooComplex(DEFAULT_MAX_TREE_DEPTH)));
    }
}

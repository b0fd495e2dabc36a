use super::element::{Element, Operator};
use super::error::ParseError;
use super::sequence::Sequence;

/// Checks that parentheses pair up, are never empty and nest at most `max_depth` deep.
pub fn validate_parentheses(elements: &[Element], max_depth: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    for (i, element) in elements.iter().enumerate() {
        let position = i + 1;
        match element {
            Element::OpenParen => {
                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::TooDeep(max_depth));
                }
            }
            Element::CloseParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(ParseError::UnmatchedClose(position))?;
                if i > 0 && elements[i - 1].is_open() {
                    return Err(ParseError::EmptyParentheses(position));
                }
            }
            _ => {}
        }
    }
    if depth > 0 {
        Err(ParseError::Unclosed)
    } else {
        Ok(())
    }
}

/// Inserts implied multiplications and turns every `-` that cannot be a subtraction into a negation.
pub fn normalize(seq: &mut Sequence<Element>) -> Result<(), ParseError> {
    let mut cur = seq.head();
    while let Some(pos) = cur {
        let next = match seq.next(pos) {
            Some(next) => next,
            None => break,
        };
        let (this, that) = (&seq[pos], &seq[next]);

        if let (Some(a), Some(b)) = (this.as_number(), that.as_number()) {
            return Err(ParseError::AdjacentNumbers(a, b));
        }
        let implied_product =
            (this.is_close() || this.is_number()) && (that.is_open() || that.is_number());
        let negation = matches!(this, Element::Operator(Operator::Minus))
            && (that.is_number() || that.is_open())
            && !seq
                .prev(pos)
                .map_or(false, |prev| seq[prev].is_number() || seq[prev].is_close());

        if implied_product {
            seq.insert_after(pos, Element::Operator(Operator::Times));
        } else if negation {
            seq.replace(pos, Element::Negation);
        }
        cur = seq.next(pos);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::lexer::tokenize;

    fn normalized(s: &str) -> Result<Vec<Element>, ParseError> {
        let mut seq: Sequence<Element> = tokenize(s, true)?.elements.into_iter().collect();
        normalize(&mut seq)?;
        Ok(seq.iter().cloned().collect())
    }

    fn check(s: &str, expected: &str) {
        let shape: String = normalized(s)
            .unwrap()
            .iter()
            .map(|element| match element {
                Element::OpenParen => '(',
                Element::CloseParen => ')',
                Element::Operator(Operator::Plus) => '+',
                Element::Operator(Operator::Minus) => '-',
                Element::Operator(Operator::Times) => '*',
                Element::Operator(Operator::Divide) => '/',
                Element::Operator(Operator::Power) => '^',
                Element::DicePart(_) => 'd',
                Element::Negation => '~',
                Element::Node(_) => 'n',
            })
            .collect();
        assert_eq!(shape, expected);
    }

    fn check_parens(s: &str, expected: Result<(), ParseError>) {
        let tokens = tokenize(s, true).unwrap();
        assert_eq!(validate_parentheses(&tokens.elements, 4), expected);
    }

    #[test]
    fn test_implied_product() {
        check("2(3+4)", "n*(n+n)");
        check("(1)(2)", "(n)*(n)");
        check("(1)2", "(n)*n");
    }

    #[test]
    fn test_negation() {
        check("-1", "~n");
        check("3--1", "n-~n");
        check("2^-(1)", "n^~(n)");
        check("1-2", "n-n");
        check("(1)-2", "(n)-n");
        check("1d-6", "nd~n");
        check("--1", "-~n");
        check("1*-d", "n*-d");
    }

    #[test]
    fn test_adjacent_numbers() {
        assert_eq!(normalized("1 2.5"), Err(ParseError::AdjacentNumbers(1.0, 2.5)));
        assert_eq!(
            ParseError::AdjacentNumbers(1.0, 2.5).to_string(),
            "the two numbers 1 and 2.5 are not allowed to follow each other without an operation!"
        );
    }

    #[test]
    fn test_parentheses() {
        check_parens("(1+(2))", Ok(()));
        check_parens("1)", Err(ParseError::UnmatchedClose(2)));
        check_parens(")(", Err(ParseError::UnmatchedClose(1)));
        check_parens("1+()", Err(ParseError::EmptyParentheses(4)));
        check_parens("((1)", Err(ParseError::Unclosed));
        check_parens("((((1))))", Ok(()));
        check_parens("(((((1)))))", Err(ParseError::TooDeep(4)));
        assert_eq!(
            ParseError::EmptyParentheses(4).to_string(),
            "there's nothing between the two parentheses at position 3 and 4!"
        );
    }
}

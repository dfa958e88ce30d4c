//! Turns a raw `{…}` token into an expression node.
//!
//! Families are probed in a fixed order. A probe that doesn't recognise the
//! token answers `Ok(None)`; only a token no family recognises is an error.
//! A probe that recognises the token but finds bad content in it (a prefix
//! limit of zero) fails straight away.

use crate::error::{Error, Result};
use crate::expr::{Composite, Expression, ModifierExpr};
use crate::operator::Operator;
use crate::syntax;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Modifier(Operator),
    Composite,
}

const FAMILIES: [Family; 9] = [
    Family::Modifier(Operator::Simple),
    Family::Modifier(Operator::Reserved),
    Family::Modifier(Operator::Fragment),
    Family::Modifier(Operator::Label),
    Family::Modifier(Operator::Path),
    Family::Modifier(Operator::Parameter),
    Family::Modifier(Operator::Query),
    Family::Modifier(Operator::QueryContinuation),
    Family::Composite,
];

impl Family {
    fn probe(self, token: &str) -> Result<Option<Expression>> {
        match self {
            Family::Modifier(op) => probe_modifier(token, op),
            Family::Composite => probe_composite(token),
        }
    }
}

fn probe_modifier(token: &str, op: Operator) -> Result<Option<Expression>> {
    let Some(raw) = syntax::parse_expression(token) else {
        return Ok(None);
    };
    match raw.specs.as_slice() {
        [spec] if raw.op == op => Ok(Some(Expression::Modifier(ModifierExpr::from_spec(
            op, spec,
        )?))),
        _ => Ok(None),
    }
}

/// Splits the body on commas, builds the first member, then folds the rest
/// in with [`Composite::add`].
fn probe_composite(token: &str) -> Result<Option<Expression>> {
    let Some(body) = token.strip_prefix('{').and_then(|t| t.strip_suffix('}')) else {
        return Ok(None);
    };
    let (op, body) = match body.chars().next().and_then(Operator::from_char) {
        Some(op) => (op, &body[1..]),
        None => (Operator::Simple, body),
    };

    let specs: Vec<&str> = body.split(',').collect();
    if specs.len() < 2 || specs.iter().any(|s| syntax::parse_varspec(s).is_none()) {
        return Ok(None);
    }
    let Some(first) = syntax::parse_varspec(specs[0]) else {
        return Ok(None);
    };

    let composite = specs[1..].iter().try_fold(
        Composite::new(ModifierExpr::from_spec(op, &first)?),
        |composite, spec| composite.add(spec),
    )?;
    Ok(Some(Expression::Composite(composite)))
}

/// Parses one `{…}` token.
pub fn parse(token: &str) -> Result<Expression> {
    for family in FAMILIES {
        if let Some(expr) = family.probe(token)? {
            return Ok(expr);
        }
    }
    Err(Error::UnrecognizedExpression(token.to_string()))
}

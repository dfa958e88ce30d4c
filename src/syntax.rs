//! Grammar of a single `{…}` expression token.
//!
//! ```text
//! expression = "{" [ operator ] varspec *( "," varspec ) "}"
//! operator   = "+" / "#" / "." / "/" / ";" / "?" / "&"
//! varspec    = name [ "*" / ":" limit ]
//! limit      = "0" / %x31-39 *DIGIT
//! name       = 1*( ALPHA / DIGIT / "_" )
//! ```

use crate::name::is_name_char;
use crate::operator::Operator;
use winnow::ascii::digit1;
use winnow::combinator::{alt, opt, preceded, separated};
use winnow::prelude::*;
use winnow::token::{any, take_while};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RawModifier<'a> {
    None,
    Explode,
    /// Digits as written; range checks happen when the node is built.
    Prefix(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct VarSpec<'a> {
    pub(crate) name: &'a str,
    pub(crate) modifier: RawModifier<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawExpression<'a> {
    pub(crate) op: Operator,
    pub(crate) specs: Vec<VarSpec<'a>>,
}

fn operator(input: &mut &str) -> ModalResult<Operator> {
    opt(any.verify_map(Operator::from_char))
        .map(|op| op.unwrap_or(Operator::Simple))
        .parse_next(input)
}

fn varname<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., is_name_char).parse_next(input)
}

fn modifier_suffix<'a>(input: &mut &'a str) -> ModalResult<RawModifier<'a>> {
    opt(alt((
        '*'.value(RawModifier::Explode),
        preceded(':', digit1.verify(|d: &str| d == "0" || !d.starts_with('0')))
            .map(RawModifier::Prefix),
    )))
    .map(|m| m.unwrap_or(RawModifier::None))
    .parse_next(input)
}

fn varspec<'a>(input: &mut &'a str) -> ModalResult<VarSpec<'a>> {
    let name = varname.parse_next(input)?;
    let modifier = modifier_suffix.parse_next(input)?;
    Ok(VarSpec { name, modifier })
}

fn expression<'a>(input: &mut &'a str) -> ModalResult<RawExpression<'a>> {
    '{'.parse_next(input)?;
    let op = operator.parse_next(input)?;
    let specs: Vec<VarSpec<'a>> = separated(1.., varspec, ',').parse_next(input)?;
    '}'.parse_next(input)?;
    Ok(RawExpression { op, specs })
}

/// Parses a whole `{…}` token, or `None` if it isn't one.
pub(crate) fn parse_expression(token: &str) -> Option<RawExpression<'_>> {
    expression.parse(token).ok()
}

/// Parses a bare `name[*|:N]`, or `None` if it isn't one.
pub(crate) fn parse_varspec(spec: &str) -> Option<VarSpec<'_>> {
    varspec.parse(spec).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &'static str, modifier: RawModifier<'static>) -> VarSpec<'static> {
        VarSpec { name, modifier }
    }

    #[test]
    fn test_simple_expression() {
        let raw = parse_expression("{var}").unwrap();
        assert_eq!(raw.op, Operator::Simple);
        assert_eq!(raw.specs, vec![spec("var", RawModifier::None)]);
    }

    #[test]
    fn test_operators() {
        for (token, op) in [
            ("{+x}", Operator::Reserved),
            ("{#x}", Operator::Fragment),
            ("{.x}", Operator::Label),
            ("{/x}", Operator::Path),
            ("{;x}", Operator::Parameter),
            ("{?x}", Operator::Query),
            ("{&x}", Operator::QueryContinuation),
        ] {
            assert_eq!(parse_expression(token).unwrap().op, op, "{}", token);
        }
    }

    #[test]
    fn test_modifiers() {
        let raw = parse_expression("{?a,b*,c:30}").unwrap();
        assert_eq!(
            raw.specs,
            vec![
                spec("a", RawModifier::None),
                spec("b", RawModifier::Explode),
                spec("c", RawModifier::Prefix("30")),
            ]
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for token in [
            "{}",
            "{+}",
            "{var",
            "var}",
            "{a b}",
            "{a-b}",
            "{a,}",
            "{,a}",
            "{a:}",
            "{a:-1}",
            "{a:007}",
            "{a:00}",
            "{a*:3}",
            "{=a}",
            "{!a}",
            "{@a}",
            "{|a}",
            "{a}b",
            "{{a}}",
        ] {
            assert!(parse_expression(token).is_none(), "{}", token);
        }
    }

    #[test]
    fn test_varspec() {
        assert_eq!(parse_varspec("x:3"), Some(spec("x", RawModifier::Prefix("3"))));
        assert_eq!(parse_varspec("list*"), Some(spec("list", RawModifier::Explode)));
        assert_eq!(parse_varspec("x:0"), Some(spec("x", RawModifier::Prefix("0"))));
        assert_eq!(parse_varspec("x:10"), Some(spec("x", RawModifier::Prefix("10"))));
        assert_eq!(parse_varspec("x:03"), None);
        assert_eq!(parse_varspec("x,y"), None);
        assert_eq!(parse_varspec(""), None);
    }
}

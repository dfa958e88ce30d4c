use crate::dispatch;
use crate::encode::decode;
use crate::error::{Error, Result};
use crate::expr::{Captures, Expression};
use crate::name::Name;
use crate::operator::Operator;
use crate::value::{Bindings, Value};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use url::Url;

/// Literal text between expressions.
///
/// `raw` is the text as written, `text` is what it expands to once
/// backslash escapes are reduced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Literal {
    raw: String,
    text: String,
}

impl Literal {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn push(&mut self, raw: &str, text: char) {
        self.raw.push_str(raw);
        self.text.push(text);
    }

    fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(Literal),
    Expression(Expression),
}

#[derive(Debug, Clone)]
struct Matcher {
    regex: Regex,
    groups: Vec<(String, Name)>,
}

/// A parsed URI template.
///
/// ```
/// use uritmpl::{Bindings, Template};
///
/// let template: Template = "/users/{id}{?fields*}".parse().unwrap();
/// let mut vars = Bindings::new();
/// vars.set("id", "42").unwrap();
/// vars.set("fields", vec!["name", "email"]).unwrap();
/// assert_eq!(template.expand(&vars), "/users/42?fields=name&fields=email");
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    matcher: OnceLock<Matcher>,
}

fn is_escapable(c: char) -> bool {
    Operator::from_char(c).is_some() || matches!(c, '{' | '}' | '\\')
}

/// Splits `source` into literal runs and `{…}` tokens.
///
/// Braces only appear in literal text when escaped; an unclosed `{` or a
/// stray `}` is rejected.
fn tokenize(source: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = Literal::default();
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => match rest[1..].chars().next() {
                Some(escaped) if is_escapable(escaped) => {
                    let len = 1 + escaped.len_utf8();
                    literal.push(&rest[..len], escaped);
                    rest = &rest[len..];
                }
                _ => {
                    literal.push("\\", '\\');
                    rest = &rest[1..];
                }
            },
            '{' => {
                let end = rest
                    .find('}')
                    .ok_or_else(|| Error::UnrecognizedExpression(rest.to_string()))?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Expression(dispatch::parse(&rest[..=end])?));
                rest = &rest[end + 1..];
            }
            '}' => return Err(Error::UnrecognizedExpression(rest.to_string())),
            other => {
                let len = other.len_utf8();
                literal.push(&rest[..len], other);
                rest = &rest[len..];
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

impl Template {
    /// Parses a template. Any expression that no family recognises fails
    /// the whole template.
    pub fn parse(source: &str) -> Result<Self> {
        Ok(Self {
            source: source.to_string(),
            segments: tokenize(source)?,
            matcher: OnceLock::new(),
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every variable name, in order of first appearance.
    pub fn variables(&self) -> Vec<&Name> {
        let mut names: Vec<&Name> = Vec::new();
        for segment in &self.segments {
            if let Segment::Expression(expr) = segment {
                for name in expr.names() {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }

    pub fn expand(&self, bindings: &Bindings) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => out.push_str(&lit.text),
                Segment::Expression(expr) => out.push_str(&expr.render(bindings)),
            }
        }
        out
    }

    pub fn expand_url(&self, bindings: &Bindings) -> Result<Url> {
        Ok(Url::parse(&self.expand(bindings))?)
    }

    /// The template text, with escapes as written.
    pub fn to_pattern(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(lit) => lit.raw.clone(),
                Segment::Expression(expr) => expr.to_pattern(),
            })
            .collect()
    }

    fn write_regex(&self, captures: &mut Captures) -> Result<String> {
        let mut pattern = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => pattern.push_str(&regex::escape(&lit.text)),
                Segment::Expression(expr) => {
                    let fragment =
                        expr.write_regex(captures)
                            .map_err(|e| Error::ExtractionNotSupported {
                                template: self.source.clone(),
                                source: Box::new(e),
                            })?;
                    pattern.push_str(&fragment);
                }
            }
        }
        Ok(pattern)
    }

    /// Unanchored regex matching this template's expansions.
    pub fn matching_regex(&self) -> Result<String> {
        self.write_regex(&mut Captures::default())
    }

    fn matcher(&self) -> Result<&Matcher> {
        if let Some(matcher) = self.matcher.get() {
            return Ok(matcher);
        }
        let mut captures = Captures::default();
        let pattern = self.write_regex(&mut captures)?;
        let regex = Regex::new(&format!("^{}$", pattern))?;
        let matcher = Matcher {
            regex,
            groups: captures.groups().to_vec(),
        };
        Ok(self.matcher.get_or_init(|| matcher))
    }

    /// Recovers the bindings that expand to `url`.
    ///
    /// Every captured value is percent-decoded and bound as a scalar. A
    /// name used more than once must decode to the same value each time.
    pub fn extract(&self, url: &str) -> Result<Bindings> {
        let matcher = self.matcher()?;
        let caps = matcher
            .regex
            .captures(url)
            .ok_or_else(|| Error::UrlDoesntMatchTemplate(url.to_string()))?;

        let mut bindings = Bindings::new();
        for (group, name) in &matcher.groups {
            let raw = caps.name(group).map_or("", |m| m.as_str());
            let value = decode(raw).map_err(|_| Error::InvalidPercentEncoding {
                name: name.to_string(),
                value: raw.to_string(),
            })?;
            match bindings.get(name).as_scalar() {
                Some(seen) if seen != value => {
                    return Err(Error::UrlDoesntMatchTemplate(url.to_string()));
                }
                Some(_) => {}
                None => {
                    bindings.insert(name.clone(), Value::Scalar(value.into_owned()));
                }
            }
        }
        Ok(bindings)
    }

    pub fn extract_url(&self, url: &Url) -> Result<Bindings> {
        self.extract(url.as_str())
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.segments == other.segments
    }
}

impl Eq for Template {}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Template::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pattern())
    }
}

use super::single::{Flavor, SingleValue};
use super::Captures;
use crate::error::{Error, Result};
use crate::name::Name;
use crate::operator::{CharClass, Operator};
use crate::syntax::{RawModifier, VarSpec};
use crate::value::{Bindings, Value};
use std::num::NonZeroUsize;

/// Largest prefix limit RFC 6570 allows (`max-length < 10000`).
pub const MAX_PREFIX: i64 = 9999;

/// Per-variable value modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    None,
    /// `*`
    Explode,
    /// `:N`, keep at most N characters of each value.
    Prefix(NonZeroUsize),
}

impl Modifier {
    pub fn prefix(n: i64) -> Result<Self> {
        if !(1..=MAX_PREFIX).contains(&n) {
            return Err(Error::InvalidLimit(n));
        }
        let n = usize::try_from(n).unwrap_or(usize::MAX);
        NonZeroUsize::new(n)
            .map(Modifier::Prefix)
            .ok_or(Error::InvalidLimit(0))
    }

    fn suffix(self) -> String {
        match self {
            Modifier::None => String::new(),
            Modifier::Explode => "*".to_string(),
            Modifier::Prefix(n) => format!(":{}", n),
        }
    }

    fn apply(self, value: &str) -> &str {
        match self {
            Modifier::Prefix(n) => match value.char_indices().nth(n.get()) {
                Some((end, _)) => &value[..end],
                None => value,
            },
            Modifier::None | Modifier::Explode => value,
        }
    }
}

/// A single variable under one operator with an optional modifier, e.g.
/// `{var}`, `{/list*}`, `{;keys:3}`.
///
/// The operator decides the lead, the separator between exploded members,
/// the allowed characters, and whether members render as `name=value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierExpr {
    op: Operator,
    value: SingleValue,
    modifier: Modifier,
}

impl ModifierExpr {
    pub fn new(op: Operator, name: Name, modifier: Modifier) -> Self {
        let flavor = match op.allowed_characters() {
            CharClass::Extended => Flavor::ExtendedReserved,
            CharClass::Unreserved => Flavor::Plain,
        };
        Self {
            op,
            value: SingleValue::new(name, flavor),
            modifier,
        }
    }

    pub(crate) fn from_spec(op: Operator, spec: &VarSpec<'_>) -> Result<Self> {
        let name = Name::new(spec.name)?;
        let modifier = match spec.modifier {
            RawModifier::None => Modifier::None,
            RawModifier::Explode => Modifier::Explode,
            RawModifier::Prefix(digits) => {
                let n = digits.parse().map_err(|_| Error::InvalidLimit(i64::MAX))?;
                Modifier::prefix(n)?
            }
        };
        Ok(Self::new(op, name, modifier))
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    pub fn name(&self) -> &Name {
        self.value.name()
    }

    pub fn modifier(&self) -> Modifier {
        self.modifier
    }

    pub fn lead(&self) -> &'static str {
        self.op.lead()
    }

    /// Joins list members: the operator separator when exploded, `,` otherwise.
    pub fn separator(&self) -> char {
        match self.modifier {
            Modifier::Explode => self.op.separator(),
            Modifier::None | Modifier::Prefix(_) => ',',
        }
    }

    pub fn render(&self, bindings: &Bindings) -> String {
        self.expand(bindings, self.lead()).unwrap_or_default()
    }

    /// Expansion with `lead` in place of the operator's own, or `None` when
    /// the variable is undefined.
    pub(crate) fn expand(&self, bindings: &Bindings, lead: &str) -> Option<String> {
        let value = bindings.get(self.name());
        if value.is_undefined() {
            return None;
        }

        let named = self.op.emits_key_value();
        let body = match (value, self.modifier) {
            (Value::Absent, _) => return None,
            (Value::Scalar(s), _) => self.member(self.name().as_str(), self.encode(s), named),
            (Value::List(items), Modifier::Explode) => {
                let separator = self.separator().to_string();
                items
                    .iter()
                    .map(|item| self.member(self.name().as_str(), self.encode(item), named))
                    .collect::<Vec<_>>()
                    .join(&separator)
            }
            (Value::List(items), _) => {
                let joined = items
                    .iter()
                    .map(|item| self.encode(item))
                    .collect::<Vec<_>>()
                    .join(",");
                self.member(self.name().as_str(), joined, named)
            }
            (Value::AssocList(pairs), Modifier::Explode) => {
                let separator = self.separator().to_string();
                pairs
                    .iter()
                    .map(|(k, v)| {
                        let key = self.value.encode(k);
                        let encoded = self.encode(v);
                        if named {
                            self.member(&key, encoded, true)
                        } else {
                            format!("{}={}", key, encoded)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(&separator)
            }
            (Value::AssocList(pairs), _) => {
                let joined = pairs
                    .iter()
                    .flat_map(|(k, v)| [self.value.encode(k), self.encode(v)])
                    .collect::<Vec<_>>()
                    .join(",");
                self.member(self.name().as_str(), joined, named)
            }
        };
        Some(format!("{}{}", lead, body))
    }

    fn encode(&self, raw: &str) -> String {
        self.value.encode(self.modifier.apply(raw))
    }

    /// `key=value` for key-value operators, dropping `=` for an empty value
    /// where the operator asks for it; the bare value otherwise.
    fn member(&self, key: &str, encoded: String, named: bool) -> String {
        if !named {
            encoded
        } else if encoded.is_empty() && self.op.omits_equals_when_empty() {
            key.to_string()
        } else {
            format!("{}={}", key, encoded)
        }
    }

    pub fn matching_regex(&self) -> Result<String> {
        self.write_regex(&mut Captures::default())
    }

    pub(crate) fn write_regex(&self, captures: &mut Captures) -> Result<String> {
        self.write_regex_with_lead(captures, &self.op.regex_prefix())
    }

    /// Regex with `lead` (already escaped) in place of the operator's own.
    pub(crate) fn write_regex_with_lead(
        &self,
        captures: &mut Captures,
        lead: &str,
    ) -> Result<String> {
        let repetition = match self.modifier {
            Modifier::Explode => return Err(Error::Unmatchable(self.to_pattern())),
            Modifier::None => "*".to_string(),
            Modifier::Prefix(n) => format!("{{{}}}", n),
        };
        let capture = self.value.capture(captures, &repetition);

        let body = if !self.op.emits_key_value() {
            capture
        } else if self.op.omits_equals_when_empty() {
            format!("{}(?:={})?", self.name(), capture)
        } else {
            format!("{}={}", self.name(), capture)
        };
        Ok(format!("{}{}", lead, body))
    }

    /// `name`, `name*` or `name:N`, without operator or braces.
    pub fn name_spec(&self) -> String {
        format!("{}{}", self.name(), self.modifier.suffix())
    }

    pub fn to_pattern(&self) -> String {
        format!("{{{}{}}}", self.op.symbol(), self.name_spec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn bindings() -> Bindings {
        let mut b = Bindings::new();
        b.set("var", "value").unwrap();
        b.set("hello", "Hello World!").unwrap();
        b.set("path", "/foo/bar").unwrap();
        b.set("empty", "").unwrap();
        b.set("list", vec!["red", "green", "blue"]).unwrap();
        b.set("keys", vec![("semi", ";"), ("dot", "."), ("comma", ",")])
            .unwrap();
        b.set("empty_keys", Value::AssocList(vec![])).unwrap();
        b.set("empty_list", Value::List(vec![])).unwrap();
        b
    }

    fn expr(op: Operator, name: &str, modifier: Modifier) -> ModifierExpr {
        ModifierExpr::new(op, Name::new(name).unwrap(), modifier)
    }

    fn prefix(n: i64) -> Modifier {
        Modifier::prefix(n).unwrap()
    }

    fn check(cases: &[(Operator, &str, Modifier, &str)]) {
        let b = bindings();
        for (op, name, modifier, expected) in cases {
            let e = expr(*op, name, *modifier);
            assert_eq!(e.render(&b), *expected, "{}", e.to_pattern());
        }
    }

    #[test]
    fn test_prefix_range() {
        for n in [0, -1, -100, i64::MIN, MAX_PREFIX + 1, i64::MAX] {
            assert!(matches!(Modifier::prefix(n), Err(Error::InvalidLimit(m)) if m == n));
        }
        assert_eq!(prefix(3).suffix(), ":3");
        assert_eq!(prefix(MAX_PREFIX).suffix(), ":9999");
    }

    #[test]
    fn test_oversized_limit_rejected_at_parse() {
        let spec = VarSpec {
            name: "x",
            modifier: RawModifier::Prefix("99999999999999999999"),
        };
        assert!(matches!(
            ModifierExpr::from_spec(Operator::Simple, &spec),
            Err(Error::InvalidLimit(i64::MAX))
        ));
        let spec = VarSpec {
            name: "x",
            modifier: RawModifier::Prefix("10000"),
        };
        assert!(matches!(
            ModifierExpr::from_spec(Operator::Simple, &spec),
            Err(Error::InvalidLimit(10000))
        ));
    }

    #[test]
    fn test_prefix_truncates_characters() {
        assert_eq!(prefix(3).apply("value"), "val");
        assert_eq!(prefix(30).apply("value"), "value");
        assert_eq!(prefix(2).apply("\u{e9}t\u{e9}"), "\u{e9}t");
    }

    #[test]
    fn test_simple_and_reserved() {
        use Operator::*;
        check(&[
            (Simple, "var", Modifier::None, "value"),
            (Simple, "hello", Modifier::None, "Hello%20World%21"),
            (Simple, "var", prefix(3), "val"),
            (Simple, "var", prefix(30), "value"),
            (Simple, "hello", Modifier::Explode, "Hello%20World%21"),
            (Simple, "list", Modifier::None, "red,green,blue"),
            (Simple, "list", Modifier::Explode, "red,green,blue"),
            (Simple, "keys", Modifier::None, "semi,%3B,dot,.,comma,%2C"),
            (Simple, "keys", Modifier::Explode, "semi=%3B,dot=.,comma=%2C"),
            (Simple, "undef", Modifier::None, ""),
            (Simple, "empty", Modifier::None, ""),
            (Reserved, "hello", Modifier::None, "Hello%20World!"),
            (Reserved, "path", prefix(6), "/foo/b"),
            (Reserved, "list", Modifier::None, "red,green,blue"),
            (Reserved, "keys", Modifier::None, "semi,;,dot,.,comma,,"),
            (Reserved, "keys", Modifier::Explode, "semi=;,dot=.,comma=,"),
        ]);
    }

    #[test]
    fn test_fragment_label_path() {
        use Operator::*;
        check(&[
            (Fragment, "path", prefix(6), "#/foo/b"),
            (Fragment, "list", Modifier::None, "#red,green,blue"),
            (Fragment, "list", Modifier::Explode, "#red,green,blue"),
            (Fragment, "keys", Modifier::Explode, "#semi=;,dot=.,comma=,"),
            (Label, "var", prefix(3), ".val"),
            (Label, "list", Modifier::None, ".red,green,blue"),
            (Label, "list", Modifier::Explode, ".red.green.blue"),
            (Label, "keys", Modifier::None, ".semi,%3B,dot,.,comma,%2C"),
            (Label, "keys", Modifier::Explode, ".semi=%3B.dot=..comma=%2C"),
            (Label, "empty", Modifier::None, "."),
            (Path, "var", prefix(1), "/v"),
            (Path, "list", Modifier::None, "/red,green,blue"),
            (Path, "list", Modifier::Explode, "/red/green/blue"),
            (Path, "path", Modifier::None, "/%2Ffoo%2Fbar"),
            (Path, "keys", Modifier::None, "/semi,%3B,dot,.,comma,%2C"),
            (Path, "keys", Modifier::Explode, "/semi=%3B/dot=./comma=%2C"),
        ]);
    }

    #[test]
    fn test_key_value_operators() {
        use Operator::*;
        check(&[
            (Parameter, "hello", prefix(5), ";hello=Hello"),
            (Parameter, "empty", Modifier::None, ";empty"),
            (Parameter, "list", Modifier::None, ";list=red,green,blue"),
            (Parameter, "list", Modifier::Explode, ";list=red;list=green;list=blue"),
            (Parameter, "keys", Modifier::None, ";keys=semi,%3B,dot,.,comma,%2C"),
            (Parameter, "keys", Modifier::Explode, ";semi=%3B;dot=.;comma=%2C"),
            (Query, "var", prefix(3), "?var=val"),
            (Query, "empty", Modifier::None, "?empty="),
            (Query, "list", Modifier::None, "?list=red,green,blue"),
            (Query, "list", Modifier::Explode, "?list=red&list=green&list=blue"),
            (Query, "keys", Modifier::None, "?keys=semi,%3B,dot,.,comma,%2C"),
            (Query, "keys", Modifier::Explode, "?semi=%3B&dot=.&comma=%2C"),
            (QueryContinuation, "var", prefix(3), "&var=val"),
            (QueryContinuation, "list", Modifier::Explode, "&list=red&list=green&list=blue"),
            (QueryContinuation, "keys", Modifier::Explode, "&semi=%3B&dot=.&comma=%2C"),
        ]);
    }

    #[test]
    fn test_empty_collections_are_undefined() {
        use Operator::*;
        check(&[
            (Simple, "empty_list", Modifier::None, ""),
            (Path, "empty_list", Modifier::Explode, ""),
            (Query, "empty_keys", Modifier::Explode, ""),
            (Fragment, "empty_keys", Modifier::None, ""),
        ]);
    }

    #[test]
    fn test_prefix_applies_per_list_member() {
        check(&[(Operator::Simple, "list", prefix(2), "re,gr,bl")]);
    }

    #[test]
    fn test_to_pattern() {
        assert_eq!(expr(Operator::Simple, "var", Modifier::None).to_pattern(), "{var}");
        assert_eq!(expr(Operator::Path, "list", Modifier::Explode).to_pattern(), "{/list*}");
        assert_eq!(expr(Operator::Query, "x", prefix(12)).to_pattern(), "{?x:12}");
        assert_eq!(expr(Operator::Reserved, "x", Modifier::None).to_pattern(), "{+x}");
        assert_eq!(expr(Operator::Label, "x", prefix(2)).name_spec(), "x:2");
    }

    #[test]
    fn test_explode_is_unmatchable() {
        for op in Operator::ALL {
            let e = expr(op, "list", Modifier::Explode);
            assert!(matches!(e.matching_regex(), Err(Error::Unmatchable(p)) if p == e.to_pattern()));
        }
    }

    #[test]
    fn test_matching_regex() {
        let e = expr(Operator::Query, "var", Modifier::None);
        let re = Regex::new(&format!("^{}$", e.matching_regex().unwrap())).unwrap();
        assert_eq!(&re.captures("?var=value").unwrap()["var"], "value");
        assert!(!re.is_match("&var=value"));

        let e = expr(Operator::Path, "var", prefix(3));
        let re = Regex::new(&format!("^{}$", e.matching_regex().unwrap())).unwrap();
        assert_eq!(&re.captures("/val").unwrap()["var"], "val");
        assert_eq!(&re.captures("/%20ab").unwrap()["var"], "%20ab");
        assert!(!re.is_match("/value"));
        assert!(!re.is_match("/ab"));
    }

    #[test]
    fn test_regex_lead_is_escaped() {
        let e = expr(Operator::Label, "var", Modifier::None);
        let re = Regex::new(&format!("^{}$", e.matching_regex().unwrap())).unwrap();
        assert!(re.is_match(".value"));
        assert!(!re.is_match("xvalue"));
    }
}

use super::single::{Flavor, SingleValue};
use super::Captures;
use crate::name::Name;
use crate::operator::{CharClass, Operator};
use crate::value::Bindings;

/// Several plain names under one operator, e.g. `{/x,y}` or `{?a,b}`.
///
/// Undefined variables are skipped. Key-value operators emit `name=value`
/// for each defined variable, joined by the operator separator after a
/// single lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedMulti {
    op: Operator,
    values: Vec<SingleValue>,
}

impl FixedMulti {
    pub fn new(op: Operator, names: Vec<Name>) -> Self {
        let flavor = match op.allowed_characters() {
            CharClass::Extended => Flavor::ExtendedReserved,
            CharClass::Unreserved => Flavor::Plain,
        };
        let values = names
            .into_iter()
            .map(|name| SingleValue::new(name, flavor))
            .collect();
        Self { op, values }
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.values.iter().map(SingleValue::name)
    }

    pub fn render(&self, bindings: &Bindings) -> String {
        let parts: Vec<String> = self
            .values
            .iter()
            .filter(|v| !bindings.get(v.name()).is_undefined())
            .map(|v| {
                let rendered = v.render(bindings);
                if !self.op.emits_key_value() {
                    rendered
                } else if rendered.is_empty() && self.op.omits_equals_when_empty() {
                    v.name().to_string()
                } else {
                    format!("{}={}", v.name(), rendered)
                }
            })
            .collect();

        if parts.is_empty() {
            return String::new();
        }
        let separator = self.op.separator().to_string();
        format!("{}{}", self.op.lead(), parts.join(&separator))
    }

    pub fn matching_regex(&self) -> String {
        self.write_regex(&mut Captures::default())
    }

    pub(crate) fn write_regex(&self, captures: &mut Captures) -> String {
        let parts: Vec<String> = self
            .values
            .iter()
            .map(|v| {
                let capture = v.write_regex(captures);
                if !self.op.emits_key_value() {
                    capture
                } else if self.op.omits_equals_when_empty() {
                    format!("{}(?:={})?", v.name(), capture)
                } else {
                    format!("{}={}", v.name(), capture)
                }
            })
            .collect();
        let separator = regex::escape(&self.op.separator().to_string());
        format!("{}{}", self.op.regex_prefix(), parts.join(&separator))
    }

    pub fn to_pattern(&self) -> String {
        let names: Vec<&str> = self.names().map(Name::as_str).collect();
        format!("{{{}{}}}", self.op.symbol(), names.join(","))
    }
}

use super::Captures;
use crate::encode::encode;
use crate::name::Name;
use crate::operator::CharClass;
use crate::value::{Bindings, Value};

/// Which characters a single value leaves unencoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Plain,
    ExtendedReserved,
}

impl Flavor {
    pub fn class(self) -> CharClass {
        match self {
            Flavor::Plain => CharClass::Unreserved,
            Flavor::ExtendedReserved => CharClass::Extended,
        }
    }
}

/// One variable rendered bare, `{name}` or `{+name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleValue {
    name: Name,
    flavor: Flavor,
}

impl SingleValue {
    pub fn new(name: Name, flavor: Flavor) -> Self {
        Self { name, flavor }
    }

    pub fn plain(name: Name) -> Self {
        Self::new(name, Flavor::Plain)
    }

    pub fn extended(name: Name) -> Self {
        Self::new(name, Flavor::ExtendedReserved)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn encode(&self, s: &str) -> String {
        encode(s, self.flavor.class())
    }

    /// Lists and associative lists render as their comma-joined members.
    pub fn render(&self, bindings: &Bindings) -> String {
        match bindings.get(&self.name) {
            Value::Absent => String::new(),
            Value::Scalar(s) => self.encode(s),
            Value::List(items) => items
                .iter()
                .map(|item| self.encode(item))
                .collect::<Vec<_>>()
                .join(","),
            Value::AssocList(pairs) => pairs
                .iter()
                .flat_map(|(k, v)| [self.encode(k), self.encode(v)])
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// One encoded character: an allowed character or a `%XX` triplet.
    pub(crate) fn atom(&self) -> String {
        format!(
            "(?:[{}]|%[0-9A-Fa-f]{{2}})",
            self.flavor.class().regex_set()
        )
    }

    pub fn matching_regex(&self) -> String {
        self.write_regex(&mut Captures::default())
    }

    pub(crate) fn write_regex(&self, captures: &mut Captures) -> String {
        self.capture(captures, "*")
    }

    /// Named group over `atom` repeated by `repetition`.
    pub(crate) fn capture(&self, captures: &mut Captures, repetition: &str) -> String {
        captures.group(&self.name, &format!("{}{}", self.atom(), repetition))
    }

    pub fn to_pattern(&self) -> String {
        match self.flavor {
            Flavor::Plain => format!("{{{}}}", self.name),
            Flavor::ExtendedReserved => format!("{{+{}}}", self.name),
        }
    }
}

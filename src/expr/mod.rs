//! Expression nodes: everything that can appear between `{` and `}`.
//!
//! Each node renders against [`Bindings`] and can compile itself into a
//! regex fragment with one named capture group per variable, which is
//! what extraction matches URLs against.

mod composite;
mod modifier;
mod multi;
mod single;

pub use composite::Composite;
pub use modifier::{Modifier, ModifierExpr, MAX_PREFIX};
pub use multi::FixedMulti;
pub use single::{Flavor, SingleValue};

use crate::error::Result;
use crate::name::Name;
use crate::value::Bindings;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Single(SingleValue),
    Multi(FixedMulti),
    Modifier(ModifierExpr),
    Composite(Composite),
}

impl Expression {
    pub fn render(&self, bindings: &Bindings) -> String {
        match self {
            Expression::Single(e) => e.render(bindings),
            Expression::Multi(e) => e.render(bindings),
            Expression::Modifier(e) => e.render(bindings),
            Expression::Composite(e) => e.render(bindings),
        }
    }

    /// Regex fragment matching this expression's expansions. Fails with
    /// [`Error::Unmatchable`](crate::Error::Unmatchable) for exploded
    /// variables.
    pub fn matching_regex(&self) -> Result<String> {
        self.write_regex(&mut Captures::default())
    }

    pub(crate) fn write_regex(&self, captures: &mut Captures) -> Result<String> {
        match self {
            Expression::Single(e) => Ok(e.write_regex(captures)),
            Expression::Multi(e) => Ok(e.write_regex(captures)),
            Expression::Modifier(e) => e.write_regex(captures),
            Expression::Composite(e) => e.write_regex(captures),
        }
    }

    pub fn to_pattern(&self) -> String {
        match self {
            Expression::Single(e) => e.to_pattern(),
            Expression::Multi(e) => e.to_pattern(),
            Expression::Modifier(e) => e.to_pattern(),
            Expression::Composite(e) => e.to_pattern(),
        }
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> Vec<&Name> {
        match self {
            Expression::Single(e) => vec![e.name()],
            Expression::Multi(e) => e.names().collect(),
            Expression::Modifier(e) => vec![e.name()],
            Expression::Composite(e) => e.members().iter().map(ModifierExpr::name).collect(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pattern())
    }
}

impl FromStr for Expression {
    type Err = crate::error::Error;

    fn from_str(token: &str) -> Result<Self> {
        crate::dispatch::parse(token)
    }
}

/// Capture-group bookkeeping for one regex.
///
/// The regex engine rejects duplicate group names and names starting with
/// a digit, so a variable keeps its own name as the group name only on its
/// first occurrence and only when that is legal; otherwise it gets a
/// synthetic `_.N` name, which can never collide with a variable name.
#[derive(Debug, Clone, Default)]
pub(crate) struct Captures {
    groups: Vec<(String, Name)>,
}

impl Captures {
    /// Returns `(?P<group>body)` and records which variable the group binds.
    pub(crate) fn group(&mut self, name: &Name, body: &str) -> String {
        let legal = name
            .as_str()
            .starts_with(|c: char| c.is_ascii_alphabetic() || c == '_');
        let taken = self.groups.iter().any(|(_, n)| n == name);
        let group = if legal && !taken {
            name.to_string()
        } else {
            format!("_.{}", self.groups.len())
        };
        let fragment = format!("(?P<{}>{})", group, body);
        self.groups.push((group, name.clone()));
        fragment
    }

    pub(crate) fn groups(&self) -> &[(String, Name)] {
        &self.groups
    }
}

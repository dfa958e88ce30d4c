use super::modifier::ModifierExpr;
use super::Captures;
use crate::error::{Error, Result};
use crate::operator::Operator;
use crate::syntax;
use crate::value::Bindings;

/// Several variable specs sharing one operator, e.g. `{?x,y*}` or
/// `{#path:6,keys}`.
///
/// Members render independently. Only the first member that expands keeps
/// the operator's lead; later ones use the continuation form (`&` after a
/// query) or, for fragments, drop the lead and are joined by `,`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composite {
    op: Operator,
    members: Vec<ModifierExpr>,
    remove_lead: bool,
}

impl Composite {
    pub fn new(first: ModifierExpr) -> Self {
        let op = first.operator();
        Self {
            op,
            members: vec![first],
            remove_lead: op == Operator::Fragment,
        }
    }

    /// Appends a bare variable spec (`name`, `name*` or `name:N`) under this
    /// composite's operator.
    pub fn add(mut self, spec: &str) -> Result<Self> {
        let parsed = syntax::parse_varspec(spec)
            .ok_or_else(|| Error::UnrecognizedExpression(spec.to_string()))?;
        self.members.push(ModifierExpr::from_spec(self.op, &parsed)?);
        Ok(self)
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    pub fn members(&self) -> &[ModifierExpr] {
        &self.members
    }

    fn group_separator(&self) -> &'static str {
        match self.op {
            Operator::Simple | Operator::Reserved | Operator::Fragment => ",",
            _ => "",
        }
    }

    fn continuation_lead(&self) -> &'static str {
        if self.remove_lead {
            ""
        } else {
            self.op.continuation().lead()
        }
    }

    pub fn render(&self, bindings: &Bindings) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let lead = if parts.is_empty() {
                self.op.lead()
            } else {
                self.continuation_lead()
            };
            if let Some(expanded) = member.expand(bindings, lead) {
                parts.push(expanded);
            }
        }
        parts.join(self.group_separator())
    }

    pub fn matching_regex(&self) -> Result<String> {
        self.write_regex(&mut Captures::default())
    }

    pub(crate) fn write_regex(&self, captures: &mut Captures) -> Result<String> {
        let continuation = regex::escape(self.continuation_lead());
        let parts = self
            .members
            .iter()
            .enumerate()
            .map(|(i, member)| {
                if i == 0 {
                    member.write_regex(captures)
                } else {
                    member.write_regex_with_lead(captures, &continuation)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(&regex::escape(self.group_separator())))
    }

    pub fn to_pattern(&self) -> String {
        let specs: Vec<String> = self.members.iter().map(ModifierExpr::name_spec).collect();
        format!("{{{}{}}}", self.op.symbol(), specs.join(","))
    }
}

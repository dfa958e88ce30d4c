//! Reader for conformance fixtures in the uritemplate-test JSON layout.
//!
//! ```json
//! {
//!   "Level 1 Examples": {
//!     "level": 1,
//!     "variables": { "var": "value" },
//!     "testcases": [
//!       ["{var}", "value"],
//!       ["{x,y}", ["1024,768", "768,1024"]],
//!       ["{bad", false]
//!     ]
//!   }
//! }
//! ```

use crate::name::Name;
use crate::value::{Bindings, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("group '{group}': {message}")]
    Format { group: String, message: String },
}

pub type Result<T> = std::result::Result<T, FixtureError>;

/// What a test case expects from its template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Exact(String),
    /// Any of these expansions is accepted (member order of associative
    /// values is not fixed by every fixture author).
    AnyOf(Vec<String>),
    /// The template must be rejected.
    Failure,
}

impl Expected {
    pub fn accepts(&self, actual: &str) -> bool {
        match self {
            Expected::Exact(s) => s == actual,
            Expected::AnyOf(options) => options.iter().any(|s| s == actual),
            Expected::Failure => false,
        }
    }

    /// The expansion shown when reporting a mismatch.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Expected::Exact(s) => Some(s),
            Expected::AnyOf(options) => options.first().map(String::as_str),
            Expected::Failure => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestCase {
    pub template: String,
    pub expected: Expected,
    /// Position within the group's `testcases` array.
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub level: Option<u64>,
    pub variables: Bindings,
    pub cases: Vec<TestCase>,
}

pub fn parse_file(path: &Path) -> Result<Vec<Group>> {
    let content = std::fs::read_to_string(path)?;
    parse_content(&content)
}

pub fn parse_content(content: &str) -> Result<Vec<Group>> {
    let json: serde_json::Value = serde_json::from_str(content)?;
    let groups = json.as_object().ok_or_else(|| FixtureError::Format {
        group: String::new(),
        message: "top level must be an object of groups".to_string(),
    })?;
    groups
        .iter()
        .map(|(name, group)| parse_group(name, group))
        .collect()
}

fn format_error(group: &str, message: impl Into<String>) -> FixtureError {
    FixtureError::Format {
        group: group.to_string(),
        message: message.into(),
    }
}

fn parse_group(name: &str, json: &serde_json::Value) -> Result<Group> {
    let group = json
        .as_object()
        .ok_or_else(|| format_error(name, "expected an object"))?;

    // Variables whose names we can't express are left out; templates that
    // reference them fail to parse and are reported per case.
    let mut variables = Bindings::new();
    if let Some(vars) = group.get("variables").and_then(|v| v.as_object()) {
        for (key, value) in vars {
            if let Ok(var) = Name::new(key.as_str()) {
                variables.insert(var, Value::from_json(value));
            }
        }
    }

    let cases = group
        .get("testcases")
        .and_then(|t| t.as_array())
        .ok_or_else(|| format_error(name, "missing 'testcases' array"))?
        .iter()
        .enumerate()
        .map(|(index, case)| parse_case(name, index, case))
        .collect::<Result<Vec<_>>>()?;

    Ok(Group {
        name: name.to_string(),
        level: group.get("level").and_then(|l| l.as_u64()),
        variables,
        cases,
    })
}

fn parse_case(group: &str, index: usize, json: &serde_json::Value) -> Result<TestCase> {
    use serde_json::Value as Json;

    let (template, expected) = match json.as_array().map(Vec::as_slice) {
        Some([Json::String(template), expected]) => (template, expected),
        _ => {
            return Err(format_error(
                group,
                format!("test case {} must be [template, expected]", index),
            ))
        }
    };

    let expected = match expected {
        Json::String(s) => Expected::Exact(s.clone()),
        Json::Bool(false) => Expected::Failure,
        Json::Array(options) => Expected::AnyOf(
            options
                .iter()
                .map(|o| {
                    o.as_str().map(String::from).ok_or_else(|| {
                        format_error(group, format!("test case {}: options must be strings", index))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        other => {
            return Err(format_error(
                group,
                format!("test case {}: unsupported expectation {}", index, other),
            ))
        }
    };

    Ok(TestCase {
        template: template.clone(),
        expected,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "Level 1 Examples": {
            "level": 1,
            "variables": { "var": "value", "hello": "Hello World!" },
            "testcases": [
                ["{var}", "value"],
                ["{hello}", "Hello%20World%21"]
            ]
        },
        "Failures": {
            "variables": { "keys": { "a": "1", "b": "2" }, "bad name": "x" },
            "testcases": [
                ["{keys*}", ["a=1,b=2", "b=2,a=1"]],
                ["{bad", false]
            ]
        }
    }"#;

    #[test]
    fn test_parse_groups_in_document_order() {
        let groups = parse_content(SAMPLE).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Level 1 Examples");
        assert_eq!(groups[0].level, Some(1));
        assert_eq!(groups[0].cases.len(), 2);
        assert_eq!(groups[0].variables.get_str("var"), Some("value"));
        assert_eq!(groups[1].name, "Failures");
        assert_eq!(groups[1].level, None);
    }

    #[test]
    fn test_parse_expectations() {
        let groups = parse_content(SAMPLE).unwrap();
        assert_eq!(
            groups[0].cases[0].expected,
            Expected::Exact("value".to_string())
        );
        let keys = &groups[1].cases[0].expected;
        assert!(keys.accepts("b=2,a=1"));
        assert!(!keys.accepts("a=1"));
        assert_eq!(keys.primary(), Some("a=1,b=2"));
        assert_eq!(groups[1].cases[1].expected, Expected::Failure);
        assert_eq!(groups[1].cases[1].index, 1);
    }

    #[test]
    fn test_unusable_variable_names_skipped() {
        let groups = parse_content(SAMPLE).unwrap();
        assert_eq!(groups[1].variables.len(), 1);
    }

    #[test]
    fn test_malformed_fixtures() {
        assert!(matches!(parse_content("[]"), Err(FixtureError::Format { .. })));
        assert!(matches!(parse_content("{"), Err(FixtureError::Json(_))));
        assert!(matches!(
            parse_content(r#"{"g": {"variables": {}}}"#),
            Err(FixtureError::Format { group, .. }) if group == "g"
        ));
        assert!(parse_content(r#"{"g": {"testcases": [["{x}"]]}}"#).is_err());
        assert!(parse_content(r#"{"g": {"testcases": [["{x}", true]]}}"#).is_err());
        assert!(parse_content(r#"{"g": {"testcases": [["{x}", [1]]]}}"#).is_err());
    }

    #[test]
    fn test_parse_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("spec-examples.json");
        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(parse_file(&path).unwrap().len(), 2);
        assert!(matches!(
            parse_file(&tmp.path().join("missing.json")),
            Err(FixtureError::Io(_))
        ));
    }
}

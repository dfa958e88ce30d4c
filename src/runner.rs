use crate::discover::Suite;
use crate::fixture::{parse_file, Expected, Group, TestCase};
use crate::template::Template;
use crate::value::Bindings;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub case: TestCase,
    pub passed: bool,
    /// The expansion, when the template parsed.
    pub actual: Option<String>,
    pub error: Option<String>,
    pub elapsed: Duration,
    pub suite: String,
    pub group: String,
}

#[derive(Debug, Clone)]
pub struct GroupResult {
    pub name: String,
    pub results: Vec<CaseResult>,
}

impl GroupResult {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

#[derive(Debug)]
pub struct SuiteResult {
    pub suite: Suite,
    pub group_results: Vec<GroupResult>,
    pub load_error: Option<String>,
    pub elapsed: Duration,
}

impl SuiteResult {
    pub fn passed(&self) -> bool {
        self.load_error.is_none() && self.group_results.iter().all(|g| g.passed())
    }

    pub fn total_cases(&self) -> usize {
        self.group_results.iter().map(|g| g.results.len()).sum()
    }

    pub fn passed_cases(&self) -> usize {
        self.group_results
            .iter()
            .flat_map(|g| &g.results)
            .filter(|r| r.passed)
            .count()
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    CaseComplete(Box<CaseResult>),
    Skip { suite: String, reason: String },
}

/// Parses and expands one case against its group's variables.
pub fn run_case(case: &TestCase, variables: &Bindings, suite: &str, group: &str) -> CaseResult {
    let start = Instant::now();

    let (passed, actual, error) = match (Template::parse(&case.template), &case.expected) {
        (Err(_), Expected::Failure) => (true, None, None),
        (Err(e), _) => (false, None, Some(e.to_string())),
        (Ok(template), Expected::Failure) => {
            let actual = template.expand(variables);
            let error = format!("expected '{}' to be rejected", case.template);
            (false, Some(actual), Some(error))
        }
        (Ok(template), expected) => {
            let actual = template.expand(variables);
            (expected.accepts(&actual), Some(actual), None)
        }
    };

    CaseResult {
        case: case.clone(),
        passed,
        actual,
        error,
        elapsed: start.elapsed(),
        suite: suite.to_string(),
        group: group.to_string(),
    }
}

fn matches_pattern(group: &Group, case: &TestCase, pattern: Option<&str>) -> bool {
    pattern.map_or(true, |pat| {
        group.name.contains(pat) || case.template.contains(pat)
    })
}

fn run_group(
    group: &Group,
    suite_name: &str,
    pattern: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> GroupResult {
    let mut results = Vec::new();
    for case in &group.cases {
        if !matches_pattern(group, case, pattern) {
            continue;
        }
        let result = run_case(case, &group.variables, suite_name, &group.name);
        if let Some(tx) = progress_tx {
            let _ = tx.send(ProgressEvent::CaseComplete(Box::new(result.clone())));
        }
        results.push(result);
    }
    GroupResult {
        name: group.name.clone(),
        results,
    }
}

pub fn run_suite(
    suite: &Suite,
    pattern: Option<&str>,
    progress_tx: Option<&Sender<ProgressEvent>>,
) -> SuiteResult {
    let start = Instant::now();

    let groups = match parse_file(&suite.path) {
        Ok(groups) => groups,
        Err(e) => {
            if let Some(tx) = progress_tx {
                let _ = tx.send(ProgressEvent::Skip {
                    suite: suite.name.clone(),
                    reason: e.to_string(),
                });
            }
            return SuiteResult {
                suite: suite.clone(),
                group_results: vec![],
                load_error: Some(e.to_string()),
                elapsed: start.elapsed(),
            };
        }
    };

    let group_results = groups
        .iter()
        .map(|group| run_group(group, &suite.name, pattern, progress_tx))
        .filter(|g| !g.results.is_empty())
        .collect();

    SuiteResult {
        suite: suite.clone(),
        group_results,
        load_error: None,
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn create_suite(dir: &Path, name: &str, content: &str) -> Suite {
        let path = dir.join(format!("{}.json", name));
        fs::write(&path, content).unwrap();
        Suite::new(path, dir)
    }

    const PASSING: &str = r##"{
        "Level 2": {
            "variables": { "var": "value", "hello": "Hello World!", "path": "/foo/bar" },
            "testcases": [
                ["{+var}", "value"],
                ["{+hello}", "Hello%20World!"],
                ["{#path}", "#/foo/bar"],
                ["{x", false]
            ]
        }
    }"##;

    #[test]
    fn test_run_passing_suite() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(tmp.path(), "level2", PASSING);

        let result = run_suite(&suite, None, None);
        assert!(result.passed());
        assert_eq!(result.total_cases(), 4);
        assert_eq!(result.passed_cases(), 4);
    }

    #[test]
    fn test_run_failing_suite() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(
            tmp.path(),
            "failing",
            r#"{"g": {"variables": {"var": "value"}, "testcases": [
                ["{var}", "wrong"],
                ["{var}", false],
                ["{bad-name}", "x"]
            ]}}"#,
        );

        let result = run_suite(&suite, None, None);
        assert!(!result.passed());
        assert_eq!(result.passed_cases(), 0);

        let results = &result.group_results[0].results;
        assert_eq!(results[0].actual.as_deref(), Some("value"));
        assert!(results[0].error.is_none());
        assert!(results[1].error.as_deref().unwrap().contains("rejected"));
        assert!(results[2].actual.is_none());
        assert!(results[2].error.is_some());
    }

    #[test]
    fn test_any_of_expectation() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(
            tmp.path(),
            "any",
            r#"{"g": {"variables": {"keys": {"a": "1", "b": "2"}}, "testcases": [
                ["{keys*}", ["b=2,a=1", "a=1,b=2"]]
            ]}}"#,
        );
        assert!(run_suite(&suite, None, None).passed());
    }

    #[test]
    fn test_pattern_filter() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(tmp.path(), "level2", PASSING);

        let result = run_suite(&suite, Some("#"), None);
        assert_eq!(result.total_cases(), 1);
        let result = run_suite(&suite, Some("Level"), None);
        assert_eq!(result.total_cases(), 4);
        let result = run_suite(&suite, Some("nothing"), None);
        assert_eq!(result.total_cases(), 0);
        assert!(result.group_results.is_empty());
    }

    #[test]
    fn test_load_error() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(tmp.path(), "broken", "{ not json");

        let (tx, rx) = mpsc::channel();
        let result = run_suite(&suite, None, Some(&tx));
        drop(tx);
        assert!(!result.passed());
        assert!(result.load_error.is_some());
        let events: Vec<_> = rx.into_iter().collect();
        assert!(matches!(events.as_slice(), [ProgressEvent::Skip { .. }]));
    }

    #[test]
    fn test_progress_events() {
        let tmp = TempDir::new().unwrap();
        let suite = create_suite(tmp.path(), "level2", PASSING);

        let (tx, rx) = mpsc::channel();
        run_suite(&suite, None, Some(&tx));
        drop(tx);
        let completed = rx
            .into_iter()
            .filter(|e| matches!(e, ProgressEvent::CaseComplete(_)))
            .count();
        assert_eq!(completed, 4);
    }
}

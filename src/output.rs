use crate::discover::Suite;
use crate::fixture::{Expected, Group};
use crate::runner::{CaseResult, ProgressEvent, SuiteResult};
use similar::{ChangeTag, TextDiff};
use std::io::{self, Write};
use std::time::Duration;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub struct Output {
    stdout: StandardStream,
    dot_count: usize,
}

impl Output {
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(color_choice),
            dot_count: 0,
        }
    }

    fn set_color(&mut self, color: Color) {
        let _ = self.stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    }

    fn set_bold(&mut self) {
        let _ = self.stdout.set_color(ColorSpec::new().set_bold(true));
    }

    fn set_dim(&mut self) {
        let _ = self.stdout.set_color(ColorSpec::new().set_dimmed(true));
    }

    fn reset(&mut self) {
        let _ = self.stdout.reset();
    }

    fn mark(&mut self, passed: bool) -> io::Result<()> {
        if passed {
            self.set_color(Color::Green);
            write!(self.stdout, "✓")?;
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "✗")?;
        }
        self.reset();
        Ok(())
    }

    pub fn print_progress(&mut self, event: &ProgressEvent, verbose: bool) -> io::Result<()> {
        match event {
            ProgressEvent::CaseComplete(result) => {
                if verbose {
                    self.print_verbose_result(result)
                } else {
                    self.print_dot(result)
                }
            }
            ProgressEvent::Skip { suite, reason } => {
                self.set_color(Color::Yellow);
                write!(self.stdout, "S")?;
                self.reset();
                if verbose {
                    writeln!(self.stdout, " {}: {}", suite, reason)
                } else {
                    self.stdout.flush()?;
                    self.dot_count += 1;
                    self.maybe_newline()
                }
            }
        }
    }

    fn print_dot(&mut self, result: &CaseResult) -> io::Result<()> {
        if result.passed {
            self.set_color(Color::Green);
            write!(self.stdout, ".")?;
        } else {
            self.set_color(Color::Red);
            write!(self.stdout, "F")?;
        }
        self.reset();
        self.stdout.flush()?;

        self.dot_count += 1;
        self.maybe_newline()
    }

    fn maybe_newline(&mut self) -> io::Result<()> {
        if self.dot_count >= 80 {
            writeln!(self.stdout)?;
            self.dot_count = 0;
        }
        Ok(())
    }

    fn print_verbose_result(&mut self, result: &CaseResult) -> io::Result<()> {
        self.mark(result.passed)?;
        write!(
            self.stdout,
            " {}/{}: {} ",
            result.suite, result.group, result.case.template
        )?;

        self.set_dim();
        writeln!(self.stdout, "{:.3}ms", result.elapsed.as_secs_f64() * 1000.0)?;
        self.reset();
        Ok(())
    }

    pub fn finish_progress(&mut self) -> io::Result<()> {
        if self.dot_count > 0 {
            writeln!(self.stdout)?;
        }
        writeln!(self.stdout)
    }

    pub fn print_results(&mut self, results: &[SuiteResult], elapsed: Duration) -> io::Result<()> {
        let mut total_passed = 0;
        let mut total_failed = 0;
        let mut total_skipped = 0;
        let mut failed_cases: Vec<&CaseResult> = Vec::new();

        let mut sorted_results: Vec<_> = results.iter().collect();
        sorted_results.sort_by(|a, b| a.suite.name.cmp(&b.suite.name));

        for suite_result in &sorted_results {
            if let Some(error) = &suite_result.load_error {
                self.set_color(Color::Yellow);
                write!(self.stdout, "⊘ {}", suite_result.suite.name)?;
                self.reset();
                writeln!(self.stdout, ": {}", error)?;
                total_skipped += 1;
                continue;
            }

            let suite_passed = suite_result.passed_cases();
            let suite_total = suite_result.total_cases();
            total_passed += suite_passed;
            total_failed += suite_total - suite_passed;

            self.mark(suite_result.passed())?;
            writeln!(
                self.stdout,
                " {}: {}/{} cases passed in {:.2}s",
                suite_result.suite.name,
                suite_passed,
                suite_total,
                suite_result.elapsed.as_secs_f64()
            )?;

            failed_cases.extend(
                suite_result
                    .group_results
                    .iter()
                    .flat_map(|g| &g.results)
                    .filter(|r| !r.passed),
            );
        }

        if !failed_cases.is_empty() {
            writeln!(self.stdout)?;
            self.set_color(Color::Red);
            self.set_bold();
            writeln!(self.stdout, "Failures:")?;
            self.reset();

            for result in failed_cases {
                writeln!(self.stdout)?;
                self.print_failure(result)?;
            }
        }

        writeln!(self.stdout)?;
        let elapsed_str = format!(" in {:.2}s", elapsed.as_secs_f64());

        if total_failed == 0 && total_skipped == 0 {
            self.set_color(Color::Green);
            self.set_bold();
            write!(self.stdout, "All {} cases passed", total_passed)?;
            self.reset();
            writeln!(self.stdout, "{}", elapsed_str)
        } else {
            self.set_bold();
            write!(self.stdout, "Summary:")?;
            self.reset();
            writeln!(
                self.stdout,
                " {} passed, {} failed, {} skipped{}",
                total_passed, total_failed, total_skipped, elapsed_str
            )
        }
    }

    fn print_failure(&mut self, result: &CaseResult) -> io::Result<()> {
        self.mark(false)?;
        writeln!(
            self.stdout,
            " {}/{} #{}: {}",
            result.suite, result.group, result.case.index, result.case.template
        )?;

        if let Some(error) = &result.error {
            writeln!(self.stdout, "  Error: {}", error)?;
        }
        if let (Some(expected), Some(actual)) = (result.case.expected.primary(), &result.actual) {
            if let Expected::AnyOf(options) = &result.case.expected {
                writeln!(self.stdout, "  Accepted: {}", options.join(" | "))?;
            }
            writeln!(self.stdout)?;
            self.print_diff(expected, actual)?;
        }
        Ok(())
    }

    /// Expected over actual, with the differing characters highlighted.
    pub fn print_diff(&mut self, expected: &str, actual: &str) -> io::Result<()> {
        let diff = TextDiff::from_chars(expected, actual);

        for (sign, color, side) in [
            ("-", Color::Red, ChangeTag::Delete),
            ("+", Color::Green, ChangeTag::Insert),
        ] {
            write!(self.stdout, "  {}", sign)?;
            for (changed, run) in highlight(&diff, side) {
                if changed {
                    self.set_bold_color(color);
                }
                write!(self.stdout, "{}", run)?;
                self.reset();
            }
            writeln!(self.stdout)?;
        }
        Ok(())
    }

    fn set_bold_color(&mut self, color: Color) {
        let _ = self
            .stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    }

    pub fn print_list(&mut self, suites: &[(Suite, Vec<Group>)]) -> io::Result<()> {
        for (suite, groups) in suites {
            writeln!(self.stdout)?;
            self.set_bold();
            write!(self.stdout, "{}", suite.name)?;
            self.reset();
            writeln!(self.stdout)?;

            for group in groups {
                let level = group
                    .level
                    .map(|l| format!(" [level {}]", l))
                    .unwrap_or_default();
                writeln!(
                    self.stdout,
                    "  {}{}: {} case(s)",
                    group.name,
                    level,
                    group.cases.len()
                )?;
                for case in &group.cases {
                    writeln!(self.stdout, "    - {}", case.template)?;
                }
            }
        }
        Ok(())
    }
}

/// One side of a character diff as runs of `(changed, text)`; the other
/// side's changes are dropped.
fn highlight<'a>(diff: &TextDiff<'a, 'a, 'a, str>, side: ChangeTag) -> Vec<(bool, String)> {
    let mut runs: Vec<(bool, String)> = Vec::new();
    for change in diff.iter_all_changes() {
        let changed = match change.tag() {
            ChangeTag::Equal => false,
            tag if tag == side => true,
            _ => continue,
        };
        match runs.last_mut() {
            Some((last, text)) if *last == changed => text.push_str(change.value()),
            _ => runs.push((changed, change.value().to_string())),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar::TextDiff;

    #[test]
    fn test_highlight_runs() {
        let diff = TextDiff::from_chars("?x=1024", "?x=1025&y");
        let removed = highlight(&diff, ChangeTag::Delete);
        let added = highlight(&diff, ChangeTag::Insert);

        let joined: String = removed.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(joined, "?x=1024");
        let joined: String = added.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(joined, "?x=1025&y");
        assert!(removed.iter().any(|(changed, t)| *changed && t == "4"));
        assert!(added.iter().any(|(changed, _)| *changed));
    }

    #[test]
    fn test_highlight_identical() {
        let diff = TextDiff::from_chars("same", "same");
        assert_eq!(highlight(&diff, ChangeTag::Insert), vec![(false, "same".to_string())]);
    }
}

//! Text output formatter for human-readable display
//!
//! This module provides:
//! - A header naming the target and its hypothetical version
//! - Deprecation banners for the target and managed packages
//! - Per-package dependency lines (`name (range) *matches* version`)
//! - Summary with package counts

use crate::domain::{AuditReport, EvaluationResult, PackageReport};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

const MATCHES: &str = "*matches*";
const MISMATCH: &str = "*doesn't match*";
const ALL_MATCH: &str = "All dependencies match";

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter without colors
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: false,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn format_header(&self, report: &AuditReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let target = format!("{} {}", report.target_name, report.target_version);
        if self.color {
            writeln!(writer, "Checking compatibility with {}", target.bold())?;
        } else {
            writeln!(writer, "Checking compatibility with {}", target)?;
        }

        if report.used_default_package_list {
            writeln!(
                writer,
                "Using default package list ({})",
                report.package_list_source
            )?;
        } else {
            writeln!(writer, "Package list: {}", report.package_list_source)?;
        }

        if report.target_deprecated {
            self.banner(&format!("{} is deprecated", report.target_name), writer)?;
        }
        writeln!(writer)
    }

    fn banner(&self, message: &str, writer: &mut dyn Write) -> std::io::Result<()> {
        let text = format!("*** {} ***", message);
        if self.color {
            writeln!(writer, "{}", text.yellow().bold())
        } else {
            writeln!(writer, "{}", text)
        }
    }

    fn format_package(&self, package: &PackageReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.color {
            writeln!(writer, "{}:", package.package_name.bold())?;
        } else {
            writeln!(writer, "{}:", package.package_name)?;
        }

        if !package.found {
            let line = match &package.error {
                Some(error) => format!("lookup failed: {}", error),
                None => "not found on registry".to_string(),
            };
            if self.color {
                return writeln!(writer, "  {}", line.red());
            }
            return writeln!(writer, "  {}", line);
        }

        if package.deprecated {
            write!(writer, "  ")?;
            self.banner(&format!("{} is deprecated", package.package_name), writer)?;
        }

        for result in &package.results {
            if result.satisfied && self.verbosity != Verbosity::Verbose {
                continue;
            }
            self.format_result(result, writer)?;
        }

        if package.all_satisfied {
            if self.color {
                writeln!(writer, "  {}", ALL_MATCH.green())?;
            } else {
                writeln!(writer, "  {}", ALL_MATCH)?;
            }
        }
        Ok(())
    }

    fn format_result(&self, result: &EvaluationResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let mut notes = Vec::new();
        if result.resolved_via_override {
            notes.push("override".to_string());
        }
        if result.dependency_deprecated {
            notes.push("deprecated".to_string());
        }
        if let Some(error) = &result.error {
            notes.push(error.clone());
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", notes.join(", "))
        };

        let verdict = if result.satisfied { MATCHES } else { MISMATCH };
        if self.color {
            let verdict = if result.satisfied {
                verdict.green()
            } else {
                verdict.red().bold()
            };
            writeln!(
                writer,
                "  {} ({}) {} {}{}",
                result.dependency_name,
                result.range.dimmed(),
                verdict,
                result.resolved_display(),
                notes.dimmed()
            )
        } else {
            writeln!(
                writer,
                "  {} ({}) {} {}{}",
                result.dependency_name,
                result.range,
                verdict,
                result.resolved_display(),
                notes
            )
        }
    }

    fn format_summary(&self, report: &AuditReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let checked = report.package_reports.len();
        let mismatched = report.mismatched_count();
        let not_found = report.not_found_count();

        if self.color {
            let mismatched = if mismatched > 0 {
                mismatched.to_string().red().bold()
            } else {
                mismatched.to_string().green()
            };
            let not_found = if not_found > 0 {
                not_found.to_string().yellow()
            } else {
                not_found.to_string().normal()
            };
            writeln!(
                writer,
                "{} {} package(s) checked, {} with mismatches, {} not found",
                "Summary:".bold(),
                checked,
                mismatched,
                not_found
            )
        } else {
            writeln!(
                writer,
                "Summary: {} package(s) checked, {} with mismatches, {} not found",
                checked, mismatched, not_found
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &AuditReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(report, writer);
        }

        self.format_header(report, writer)?;
        for package in &report.package_reports {
            self.format_package(package, writer)?;
        }
        if !report.package_reports.is_empty() {
            writeln!(writer)?;
        }
        self.format_summary(report, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use semver::Version;

    fn sample_report() -> AuditReport {
        AuditReport {
            target_name: "acme.foo".to_string(),
            target_version: Version::new(5, 0, 1),
            target_deprecated: true,
            used_default_package_list: true,
            package_list_source: "packages.yml".to_string(),
            generated_at: Utc::now(),
            package_reports: vec![
                PackageReport::evaluated(
                    "acme/bar",
                    false,
                    vec![
                        EvaluationResult::resolved(
                            "acme.foo",
                            ">=1.1.0 <5.0.0",
                            Version::new(5, 0, 1),
                            false,
                            true,
                        ),
                        EvaluationResult::resolved(
                            "acme.baz",
                            ">=0.2.4 <1.0.0",
                            Version::new(0, 6, 0),
                            true,
                            false,
                        ),
                    ],
                ),
                PackageReport::evaluated(
                    "acme/qux",
                    true,
                    vec![EvaluationResult::resolved(
                        "acme.baz",
                        "*",
                        Version::new(0, 6, 0),
                        true,
                        false,
                    )],
                ),
                PackageReport::not_found("acme/missing"),
                PackageReport::failed("acme/broken", "HTTP 502"),
            ],
        }
    }

    fn render(verbosity: Verbosity) -> String {
        TextFormatter::new(verbosity).render(&sample_report())
    }

    #[test]
    fn test_header_and_banners() {
        let output = render(Verbosity::Normal);
        assert!(output.starts_with("Checking compatibility with acme.foo 5.0.1\n"));
        assert!(output.contains("Using default package list (packages.yml)"));
        assert!(output.contains("*** acme.foo is deprecated ***"));
        assert!(output.contains("*** acme/qux is deprecated ***"));
    }

    #[test]
    fn test_normal_shows_only_mismatches() {
        let output = render(Verbosity::Normal);
        assert!(output.contains("  acme.foo (>=1.1.0 <5.0.0) *doesn't match* 5.0.1 [override]\n"));
        assert!(!output.contains("acme.baz (>=0.2.4 <1.0.0)"));
    }

    #[test]
    fn test_verbose_shows_matches() {
        let output = render(Verbosity::Verbose);
        assert!(output.contains("  acme.baz (>=0.2.4 <1.0.0) *matches* 0.6.0\n"));
        assert!(output.contains("  acme.baz (*) *matches* 0.6.0\n"));
    }

    #[test]
    fn test_all_match_line() {
        let output = render(Verbosity::Normal);
        assert!(output.contains("acme/qux:\n  *** acme/qux is deprecated ***\n  All dependencies match\n"));
        assert!(!output.contains("acme/bar:\n  All dependencies match"));
    }

    #[test]
    fn test_missing_and_failed_packages() {
        let output = render(Verbosity::Normal);
        assert!(output.contains("acme/missing:\n  not found on registry\n"));
        assert!(output.contains("acme/broken:\n  lookup failed: HTTP 502\n"));
    }

    #[test]
    fn test_unresolved_dependency_line() {
        let report = AuditReport {
            package_reports: vec![PackageReport::evaluated(
                "acme/bar",
                false,
                vec![EvaluationResult::unresolved("acme.ghost", ">=1.0.0", "timeout")],
            )],
            ..sample_report()
        };
        let output = TextFormatter::new(Verbosity::Normal).render(&report);
        assert!(output.contains("  acme.ghost (>=1.0.0) *doesn't match* unresolved [timeout]\n"));
    }

    #[test]
    fn test_summary() {
        let output = render(Verbosity::Normal);
        assert!(output.ends_with("Summary: 4 package(s) checked, 1 with mismatches, 2 not found\n"));
    }

    #[test]
    fn test_quiet_prints_summary_only() {
        let output = render(Verbosity::Quiet);
        assert_eq!(
            output,
            "Summary: 4 package(s) checked, 1 with mismatches, 2 not found\n"
        );
    }

    #[test]
    fn test_explicit_package_list() {
        let report = AuditReport {
            used_default_package_list: false,
            package_list_source: "https://example.com/list.yml".to_string(),
            ..sample_report()
        };
        let output = TextFormatter::new(Verbosity::Normal).render(&report);
        assert!(output.contains("Package list: https://example.com/list.yml\n"));
    }
}

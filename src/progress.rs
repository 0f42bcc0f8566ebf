//! Progress display for audit runs
//!
//! A spinner covers target validation and package list loading; a bar then
//! tracks package evaluation with a running tally of outcomes.

use crate::domain::PackageReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

/// Running count of package outcomes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeTally {
    /// Packages whose dependencies all match
    pub compatible: usize,
    /// Packages with at least one unsatisfied dependency
    pub mismatched: usize,
    /// Packages missing from the registry or whose lookup failed
    pub not_found: usize,
}

impl OutcomeTally {
    /// Count one package report
    pub fn record(&mut self, report: &PackageReport) {
        if !report.found {
            self.not_found += 1;
        } else if report.all_satisfied {
            self.compatible += 1;
        } else {
            self.mismatched += 1;
        }
    }

    /// Total packages counted so far
    pub fn total(&self) -> usize {
        self.compatible + self.mismatched + self.not_found
    }
}

impl fmt::Display for OutcomeTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ok, {} mismatched, {} not found",
            self.compatible, self.mismatched, self.not_found
        )
    }
}

/// Progress reporter for one audit run
pub struct AuditProgress {
    /// Disabled in quiet and JSON modes
    enabled: bool,
    bar: Option<ProgressBar>,
    tally: OutcomeTally,
}

impl AuditProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bar: None,
            tally: OutcomeTally::default(),
        }
    }

    /// Show a spinner while the override target is validated
    pub fn validating(&mut self, target: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(format!("Checking {}", target));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.bar = Some(spinner);
    }

    /// Switch the spinner to the loading step
    pub fn loading(&self) {
        if let Some(ref bar) = self.bar {
            bar.set_message("Loading package list");
        }
    }

    /// Replace the spinner with a bar over `total` packages
    pub fn evaluating(&mut self, total: usize) {
        self.finish();
        self.tally = OutcomeTally::default();
        if !self.enabled {
            return;
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░"));
        }
        bar.set_message(self.tally.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(bar);
    }

    /// Count a finished package and show it with the running tally
    pub fn record(&mut self, report: &PackageReport) {
        self.tally.record(report);
        if let Some(ref bar) = self.bar {
            bar.set_message(format!("{} | {}", report.package_name, self.tally));
            bar.inc(1);
        }
    }

    /// Count a package whose evaluation task was lost
    pub fn record_lost(&mut self) {
        self.tally.not_found += 1;
        if let Some(ref bar) = self.bar {
            bar.set_message(self.tally.to_string());
            bar.inc(1);
        }
    }

    pub fn tally(&self) -> OutcomeTally {
        self.tally
    }

    /// Finish and clear the current spinner or bar
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

//! Human-readable report output and result tally.

use std::fmt::Display;
use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Failed,
    /// Not run because it would write and writes are disabled.
    Skipped,
}

impl CheckOutcome {
    pub fn from_bool(passed: bool) -> Self {
        if passed { Self::Passed } else { Self::Failed }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Passed => "✓ PASS",
            Self::Failed => "✗ FAIL",
            Self::Skipped => "- SKIP",
        }
    }
}

/// Writes report lines to any sink (stdout in the binary, a buffer in tests).
pub struct Reporter<W> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Title framed by double rules.
    pub fn banner(&mut self, title: impl Display) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "{rule}")
    }

    pub fn rule(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(RULE_WIDTH))
    }

    pub fn section(&mut self, title: impl Display) -> io::Result<()> {
        writeln!(self.out, "\n=== {title} ===")
    }

    /// Unindented status line.
    pub fn status(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "  {text}")
    }

    /// Second-level entry under a [`Reporter::line`].
    pub fn item(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "    {text}")
    }

    pub fn pass(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "  ✓ {text}")
    }

    pub fn fail(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "  ✗ {text}")
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Results of one run, in execution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    results: Vec<(&'static str, CheckOutcome)>,
}

impl RunSummary {
    pub fn record(&mut self, name: &'static str, outcome: CheckOutcome) {
        self.results.push((name, outcome));
    }

    pub fn results(&self) -> &[(&'static str, CheckOutcome)] {
        &self.results
    }

    pub fn outcome(&self, name: &str) -> Option<CheckOutcome> {
        self.results
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, outcome)| *outcome)
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(CheckOutcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckOutcome::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(CheckOutcome::Skipped)
    }

    fn count(&self, wanted: CheckOutcome) -> usize {
        self.results.iter().filter(|(_, o)| *o == wanted).count()
    }

    /// 0 when nothing failed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.failed() == 0 { 0 } else { 1 }
    }

    pub fn print<W: Write>(&self, out: &mut Reporter<W>) -> io::Result<()> {
        out.blank()?;
        out.banner("CHECK RESULTS")?;
        for (name, outcome) in &self.results {
            out.line(format!("{name}: {}", outcome.label()))?;
        }

        out.blank()?;
        out.rule()?;
        let total = self.total();
        out.status(format!("Passed: {}/{total}", self.passed()))?;
        out.status(format!("Failed: {}/{total}", self.failed()))?;
        if self.skipped() > 0 {
            out.status(format!("Skipped: {}/{total}", self.skipped()))?;
        }

        out.blank()?;
        match self.failed() {
            0 => out.status("✓ ALL CHECKS PASSED!"),
            1 => out.status("✗ 1 check failed"),
            n => out.status(format!("✗ {n} checks failed")),
        }
    }
}

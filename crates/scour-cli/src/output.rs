use std::io::Write;

use owo_colors::OwoColorize;

use scour_core::{ExtractOutcome, ItemFailure, ScanOutcome};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One warning line for a per-item failure, printed as it happens.
pub fn warning_line(name: &str, cause: &str, color: ColorMode) -> String {
    if color.enabled() {
        format!("{} {}: {}", "WARNING:".yellow(), name, cause)
    } else {
        format!("WARNING: {}: {}", name, cause)
    }
}

/// Print matched document names, one per line (pipe-friendly).
pub fn print_matches(w: &mut dyn Write, matches: &[String]) -> std::io::Result<()> {
    for name in matches {
        writeln!(w, "{}", name)?;
    }
    Ok(())
}

/// Print the list of documents that could not be read.
pub fn print_failures(
    w: &mut dyn Write,
    failures: &[ItemFailure],
    color: ColorMode,
) -> std::io::Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    let header = format!("{} document(s) could not be read:", failures.len());
    if color.enabled() {
        writeln!(w, "{}", header.yellow())?;
    } else {
        writeln!(w, "{}", header)?;
    }
    for failure in failures {
        writeln!(w, "  {}: {}", failure.name, failure.error)?;
    }
    Ok(())
}

/// Print the final status line for a search run.
pub fn print_scan_summary(
    w: &mut dyn Write,
    outcome: &ScanOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    writeln!(
        w,
        "{} match(es) in {} document(s)",
        outcome.matches.len(),
        outcome.total
    )?;
    print_status(
        w,
        outcome.completed,
        outcome.total,
        outcome.failures.len(),
        outcome.cancelled,
        color,
    )
}

/// Print the final status line for an extract run.
pub fn print_extract_summary(
    w: &mut dyn Write,
    outcome: &ExtractOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if outcome.skipped > 0 {
        writeln!(
            w,
            "Wrote {} file(s), skipped {} already present",
            outcome.written, outcome.skipped
        )?;
    } else {
        writeln!(w, "Wrote {} file(s)", outcome.written)?;
    }
    print_status(
        w,
        outcome.completed,
        outcome.total,
        outcome.failures.len(),
        outcome.cancelled,
        color,
    )
}

fn print_status(
    w: &mut dyn Write,
    completed: usize,
    total: usize,
    failures: usize,
    cancelled: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    if cancelled {
        let line = format!("Cancelled after {}/{} processed", completed, total);
        if color.enabled() {
            writeln!(w, "{}", line.yellow())
        } else {
            writeln!(w, "{}", line)
        }
    } else if failures > 0 {
        let line = format!("Completed with {} failure(s)", failures);
        if color.enabled() {
            writeln!(w, "{}", line.yellow())
        } else {
            writeln!(w, "{}", line)
        }
    } else if color.enabled() {
        writeln!(w, "{}", "Completed".green())
    } else {
        writeln!(w, "Completed")
    }
}

use std::io::Write;

use owo_colors::OwoColorize;
use reqmatch_core::{ComparisonResult, ComparisonRun};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn format_percentage(pct: f64) -> String {
    format!("{:>6.2}%", pct)
}

/// One scored candidate: `name  matched/total  pct%`.
pub fn print_result_line(
    w: &mut dyn Write,
    result: &ComparisonResult,
    name_width: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let counts = format!("{}/{}", result.matched_count, result.total_requirements);
    let pct = format_percentage(result.match_percentage);
    if color.enabled() {
        let pct = if result.match_percentage >= 75.0 {
            pct.green().to_string()
        } else if result.match_percentage >= 25.0 {
            pct.yellow().to_string()
        } else {
            pct.red().to_string()
        };
        writeln!(
            w,
            "  {:<width$}  {:>9}  {}",
            result.document_name,
            counts,
            pct,
            width = name_width
        )
    } else {
        writeln!(
            w,
            "  {:<width$}  {:>9}  {}",
            result.document_name,
            counts,
            pct,
            width = name_width
        )
    }
}

/// Print a full comparison run: header, per-candidate lines, skips, summary.
pub fn print_run(w: &mut dyn Write, run: &ComparisonRun, color: ColorMode) -> std::io::Result<()> {
    let header = format!(
        "{} ({} requirements) @ {}",
        run.reference,
        run.requirements,
        run.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if color.enabled() {
        writeln!(w, "{}", header.bold())?;
    } else {
        writeln!(w, "{}", header)?;
    }

    let name_width = run
        .results
        .iter()
        .map(|r| r.document_name.len())
        .max()
        .unwrap_or(0);

    if run.results.is_empty() {
        writeln!(w, "  (no candidate documents)")?;
    }
    for result in &run.results {
        print_result_line(w, result, name_width, color)?;
    }

    for skipped in &run.skipped {
        if color.enabled() {
            writeln!(
                w,
                "  {} {}: {}",
                "SKIPPED".yellow(),
                skipped.filename,
                skipped.error.dimmed()
            )?;
        } else {
            writeln!(w, "  SKIPPED {}: {}", skipped.filename, skipped.error)?;
        }
    }
    Ok(())
}

/// Summary footer after a single comparison.
pub fn print_summary(w: &mut dyn Write, run: &ComparisonRun, color: ColorMode) -> std::io::Result<()> {
    let best = run
        .results
        .iter()
        .filter(|r| r.document_name != run.reference)
        .max_by(|a, b| a.match_percentage.total_cmp(&b.match_percentage));

    writeln!(w)?;
    writeln!(
        w,
        "Scored {} document(s), skipped {}",
        run.results.len(),
        run.skipped.len()
    )?;
    if let Some(best) = best {
        let line = format!(
            "Closest match: {} ({:.2}%)",
            best.document_name, best.match_percentage
        );
        if color.enabled() {
            writeln!(w, "{}", line.cyan())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}

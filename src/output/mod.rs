//! Output module for crawl reports
//!
//! This module handles:
//! - Counting results into a [`Summary`]
//! - Printing the human-readable report
//! - Exporting results as a JSON report

mod json;

pub use json::{write_json_report, JsonReport};

use crate::crawler::CrawlResult;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Counts over one crawl's results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of checked addresses
    pub total: usize,

    /// Addresses that answered a plain 200
    pub ok: usize,

    /// Addresses with a non-200 response, or a quirky one
    pub errors: usize,

    /// Addresses whose fetch failed before any response
    pub failures: usize,
}

impl Summary {
    /// True if anything needs the user's attention
    pub fn has_broken_links(&self) -> bool {
        self.errors > 0 || self.failures > 0
    }
}

/// Counts results by outcome
pub fn summarize(results: &[CrawlResult]) -> Summary {
    results.iter().fold(Summary::default(), |mut summary, result| {
        summary.total += 1;
        if result.is_ok() {
            summary.ok += 1;
        }
        if result.is_error() {
            summary.errors += 1;
        }
        if result.is_exception() {
            summary.failures += 1;
        }
        summary
    })
}

/// Writes the report: one summary line, then one line per entry needing
/// attention as `[<code>] <url> - <text>`
///
/// # Arguments
///
/// * `out` - Where the report goes
/// * `results` - The crawl results, in the order they should be listed
/// * `elapsed` - Wall-clock duration of the crawl
pub fn write_report<W: Write>(
    out: &mut W,
    results: &[CrawlResult],
    elapsed: Duration,
) -> io::Result<()> {
    let summary = summarize(results);

    write!(
        out,
        "\u{1f50e} {} Total (in {}ms) - \u{2705} {} OK, \u{26d4} {} Error(s)",
        summary.total,
        elapsed.as_millis(),
        summary.ok,
        summary.errors
    )?;
    if summary.failures > 0 {
        write!(out, ", \u{26a0}\u{fe0f} {} Failed", summary.failures)?;
    }
    writeln!(out)?;

    for result in results
        .iter()
        .filter(|r| r.is_error() || r.is_exception())
    {
        writeln!(out, "{}", result)?;
    }

    Ok(())
}

/// Prints the report to stdout, see [`write_report`]
pub fn print_report(results: &[CrawlResult], elapsed: Duration) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, results, elapsed)
}

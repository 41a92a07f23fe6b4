//! JSON report export

use crate::crawler::CrawlResult;
use crate::output::{summarize, Summary};
use crate::LinkSpectorError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Machine-readable report of one crawl
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub root: &'a str,
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub summary: Summary,
    pub results: &'a [CrawlResult],
}

impl<'a> JsonReport<'a> {
    /// Builds a report stamped with the current time
    pub fn new(root: &'a str, results: &'a [CrawlResult], elapsed_ms: u64) -> Self {
        Self {
            root,
            generated_at: Utc::now(),
            elapsed_ms,
            summary: summarize(results),
            results,
        }
    }
}

/// Writes the report as pretty-printed JSON, replacing any existing file
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(LinkSpectorError)` - The file could not be created or written
pub fn write_json_report(report: &JsonReport<'_>, path: &Path) -> Result<(), LinkSpectorError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    tracing::info!("JSON report written to {}", path.display());
    Ok(())
}

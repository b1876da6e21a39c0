use chrono::{DateTime, Utc};
use clap::ValueEnum;
use org_recon::reconcile::{MasterSet, MismatchReport, ReconcileSummary};
use serde::Serialize;
use std::io::{self, Write};

pub(crate) const TEXT_HEADING: &str = "Names not found in master set:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Heading followed by one unmatched name per line, streamed as found
    #[default]
    Text,
    /// Single JSON document written after the feed is exhausted
    Json,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    master_source: &'a str,
    candidate_source: &'a str,
    master_size: usize,
    summary: ReconcileSummary,
    mismatches: &'a [String],
}

pub(crate) fn write_text_heading<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{TEXT_HEADING}")?;
    writeln!(out)
}

pub(crate) fn write_text_mismatch<W: Write>(out: &mut W, raw: &str) -> io::Result<()> {
    writeln!(out, "{raw}")
}

pub(crate) fn write_json_report<W: Write>(
    out: &mut W,
    master_source: &str,
    candidate_source: &str,
    master_size: usize,
    report: &MismatchReport,
) -> Result<(), serde_json::Error> {
    let document = JsonReport {
        generated_at: Utc::now(),
        master_source,
        candidate_source,
        master_size,
        summary: report.summary,
        mismatches: &report.mismatches,
    };

    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out).map_err(serde_json::Error::io)
}

pub(crate) fn write_master<W: Write>(
    out: &mut W,
    set: &MasterSet,
    limit: Option<usize>,
) -> io::Result<()> {
    let entries = match limit {
        Some(count) => set.head(count),
        None => set.as_slice(),
    };

    for name in entries {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

pub(crate) fn write_lookup<W: Write>(out: &mut W, raw: &str, found: bool) -> io::Result<()> {
    let status = if found { "found" } else { "missing" };
    writeln!(out, "{status}\t{raw}")
}

//! Name normalization, master set construction and candidate matching.

mod candidates;
mod master;
mod matcher;
mod normalizer;
mod reconciler;

pub use candidates::CandidateStream;
pub use master::{MasterRecord, MasterSet, MasterSetBuilder};
pub use matcher::contains;
pub use normalizer::{normalize, CanonicalName};
pub use reconciler::{mismatches, reconcile, MismatchReport, Mismatches, ReconcileSummary};

use crate::sources::{PayloadSource, SourceError};
use std::fmt;
use tracing::info;

/// Which side of the comparison a source feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    Master,
    Candidate,
}

impl fmt::Display for SourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRole::Master => f.write_str("master"),
            SourceRole::Candidate => f.write_str("candidate"),
        }
    }
}

#[derive(Debug)]
pub enum ReconcileError {
    SourceUnavailable {
        role: SourceRole,
        location: String,
        source: SourceError,
    },
    MalformedSource {
        location: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::SourceUnavailable {
                role,
                location,
                source,
            } => write!(f, "{} source {} is unavailable: {}", role, location, source),
            ReconcileError::MalformedSource { location, source } => write!(
                f,
                "master source {} is not a list of name records: {}",
                location, source
            ),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::SourceUnavailable { source, .. } => Some(source),
            ReconcileError::MalformedSource { source, .. } => Some(source),
        }
    }
}

/// Full run against two sources: the master set is built completely before
/// the candidate feed is opened, then mismatches are streamed into `emit`.
pub fn reconcile_sources<E, F>(
    master: &dyn PayloadSource,
    candidates: &dyn PayloadSource,
    delimiter: u8,
    emit: F,
) -> Result<(MasterSet, ReconcileSummary), E>
where
    E: From<ReconcileError>,
    F: FnMut(String) -> Result<(), E>,
{
    reconcile_sources_with(master, candidates, delimiter, |_| Ok(emit))
}

/// Like [`reconcile_sources`], but the sink is created by `start` once both
/// sources are open and before the first candidate is read. Front ends use it
/// to write a heading that must only appear when the run can proceed.
pub fn reconcile_sources_with<E, S, F>(
    master: &dyn PayloadSource,
    candidates: &dyn PayloadSource,
    delimiter: u8,
    start: S,
) -> Result<(MasterSet, ReconcileSummary), E>
where
    E: From<ReconcileError>,
    S: FnOnce(&MasterSet) -> Result<F, E>,
    F: FnMut(String) -> Result<(), E>,
{
    let set = MasterSetBuilder::build(master)?;
    let stream = CandidateStream::open(candidates, delimiter)?;
    info!(
        master = master.location(),
        master_size = set.len(),
        candidates = stream.location(),
        "reconciling candidate feed"
    );

    let emit = start(&set)?;
    let summary = reconcile(&set, stream, emit)?;
    Ok((set, summary))
}

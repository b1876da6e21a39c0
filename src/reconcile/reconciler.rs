use super::master::MasterSet;
use super::normalizer::normalize;
use serde::Serialize;
use tracing::info;

/// Counters for one pass over the candidate feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub scanned: usize,
    pub matched: usize,
    pub mismatched: usize,
}

/// Raw candidate names with no canonical match, in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MismatchReport {
    pub mismatches: Vec<String>,
    pub summary: ReconcileSummary,
}

impl MismatchReport {
    /// Eager form of [`reconcile`]: drains the feed and keeps every mismatch.
    pub fn collect<I, E>(set: &MasterSet, candidates: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<String, E>>,
    {
        let mut mismatches = Vec::new();
        let summary = reconcile(set, candidates, |raw| {
            mismatches.push(raw);
            Ok::<(), E>(())
        })?;

        Ok(Self {
            mismatches,
            summary,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Lazy adaptor yielding the candidates that are not in `set`.
pub struct Mismatches<'a, I> {
    set: &'a MasterSet,
    candidates: I,
}

impl<I> Iterator for Mismatches<'_, I>
where
    I: Iterator<Item = String>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.candidates
            .find(|raw| !self.set.contains(&normalize(raw)))
    }
}

pub fn mismatches<I>(set: &MasterSet, candidates: I) -> Mismatches<'_, I::IntoIter>
where
    I: IntoIterator<Item = String>,
{
    Mismatches {
        set,
        candidates: candidates.into_iter(),
    }
}

/// Pulls candidates one at a time and hands each unmatched raw name to `emit`.
///
/// Stops at the first error from the feed or from `emit`; mismatches emitted
/// before that point stay emitted.
pub fn reconcile<I, S, E, F>(set: &MasterSet, candidates: I, mut emit: F) -> Result<ReconcileSummary, E>
where
    I: IntoIterator<Item = Result<String, S>>,
    E: From<S>,
    F: FnMut(String) -> Result<(), E>,
{
    let mut summary = ReconcileSummary::default();

    for candidate in candidates {
        let raw = candidate?;
        summary.scanned += 1;

        if set.contains(&normalize(&raw)) {
            summary.matched += 1;
        } else {
            summary.mismatched += 1;
            emit(raw)?;
        }
    }

    info!(
        scanned = summary.scanned,
        matched = summary.matched,
        mismatched = summary.mismatched,
        "reconciliation finished"
    );
    Ok(summary)
}

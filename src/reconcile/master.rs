use super::matcher;
use super::normalizer::{normalize, CanonicalName};
use super::{ReconcileError, SourceRole};
use crate::sources::{PayloadSource, SourceError};
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, info, warn};

/// One entry of the master payload. Fields other than `name` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MasterRecord {
    pub name: String,
}

impl MasterRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Sorted, duplicate-free canonical names. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterSet {
    names: Vec<CanonicalName>,
}

impl MasterSet {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn as_slice(&self) -> &[CanonicalName] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CanonicalName> {
        self.names.iter()
    }

    /// First `count` entries in sort order.
    pub fn head(&self, count: usize) -> &[CanonicalName] {
        &self.names[..count.min(self.names.len())]
    }

    pub fn contains(&self, key: &CanonicalName) -> bool {
        matcher::contains(self, key)
    }

    /// Normalizes `raw` before searching.
    pub fn contains_raw(&self, raw: &str) -> bool {
        self.contains(&normalize(raw))
    }
}

impl<'a> IntoIterator for &'a MasterSet {
    type Item = &'a CanonicalName;
    type IntoIter = std::slice::Iter<'a, CanonicalName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

pub struct MasterSetBuilder;

impl MasterSetBuilder {
    /// Fetches the master payload from `source` and builds the set from it.
    pub fn build(source: &dyn PayloadSource) -> Result<MasterSet, ReconcileError> {
        let location = source.location().to_string();
        let unavailable = |cause: SourceError| ReconcileError::SourceUnavailable {
            role: SourceRole::Master,
            location: location.clone(),
            source: cause,
        };

        let mut reader = source.open().map_err(&unavailable)?;
        let mut payload = Vec::new();
        reader
            .read_to_end(&mut payload)
            .map_err(|err| unavailable(SourceError::Read(err)))?;
        debug!(location = %location, bytes = payload.len(), "master payload received");

        let records = Self::parse_records(&payload).map_err(|cause| {
            ReconcileError::MalformedSource {
                location: location.clone(),
                source: cause,
            }
        })?;

        let set = Self::from_records(records);
        info!(location = %location, entries = set.len(), "master set ready");
        Ok(set)
    }

    /// Parses a JSON array of objects that each carry a string `name`.
    pub fn parse_records(payload: &[u8]) -> Result<Vec<MasterRecord>, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    pub fn from_records<I>(records: I) -> MasterSet
    where
        I: IntoIterator<Item = MasterRecord>,
    {
        let mut received = 0usize;
        let mut names: Vec<CanonicalName> = records
            .into_iter()
            .map(|record| {
                received += 1;
                normalize(&record.name)
            })
            .filter(|name| !name.is_empty())
            .collect();

        names.sort_unstable();
        names.dedup();

        if received == 0 {
            warn!("master source contained no records; every candidate will be reported");
        } else {
            debug!(
                received,
                kept = names.len(),
                "normalized master records"
            );
        }

        MasterSet { names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::InMemorySource;

    #[test]
    fn from_records_sorts_and_deduplicates() {
        let set = MasterSetBuilder::from_records([
            MasterRecord::new("Zeta College"),
            MasterRecord::new("alpha university"),
            MasterRecord::new("ALPHA  University."),
            MasterRecord::new("Mid-State"),
        ]);

        let names: Vec<&str> = set.iter().map(CanonicalName::as_str).collect();
        assert_eq!(names, vec!["alpha university", "midstate", "zeta college"]);
    }

    #[test]
    fn from_records_skips_names_without_usable_characters() {
        let set = MasterSetBuilder::from_records([
            MasterRecord::new("---"),
            MasterRecord::new(""),
            MasterRecord::new("MIT"),
        ]);
        assert_eq!(set.len(), 1);
        assert!(set.contains_raw("mit"));
    }

    #[test]
    fn head_clamps_to_set_size() {
        let set = MasterSetBuilder::from_records([
            MasterRecord::new("B"),
            MasterRecord::new("A"),
        ]);
        assert_eq!(set.head(1).len(), 1);
        assert_eq!(set.head(1)[0].as_str(), "a");
        assert_eq!(set.head(10).len(), 2);
    }

    #[test]
    fn build_ignores_extra_fields() {
        let source = InMemorySource::new(
            "fixture",
            r#"[{"id":"1","name":"Ohio State University","type":"UNIVERSITY"}]"#,
        );
        let set = MasterSetBuilder::build(&source).expect("payload parses");
        assert!(set.contains_raw("ohio state university"));
    }

    #[test]
    fn build_rejects_records_without_string_name() {
        for payload in [
            r#"[{"id":"1"}]"#,
            r#"[{"name":null}]"#,
            r#"[{"name":42}]"#,
            r#"{"name":"Ohio State University"}"#,
            "not json",
        ] {
            let source = InMemorySource::new("fixture", payload);
            match MasterSetBuilder::build(&source) {
                Err(ReconcileError::MalformedSource { location, .. }) => {
                    assert_eq!(location, "fixture")
                }
                other => panic!("expected malformed source for {payload}, got {other:?}"),
            }
        }
    }

    #[test]
    fn build_accepts_empty_array_as_empty_set() {
        let source = InMemorySource::new("fixture", "[]");
        let set = MasterSetBuilder::build(&source).expect("empty array parses");
        assert!(set.is_empty());
    }
}

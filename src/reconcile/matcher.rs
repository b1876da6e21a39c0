use super::master::MasterSet;
use super::normalizer::CanonicalName;

/// Exact membership test by binary search over the sorted master set.
///
/// Keys are already lowercase ASCII, so ordinal comparison matches the
/// order the set was sorted in. The empty key never matches.
pub fn contains(set: &MasterSet, key: &CanonicalName) -> bool {
    if key.is_empty() {
        return false;
    }

    set.as_slice()
        .binary_search_by(|entry| entry.as_str().cmp(key.as_str()))
        .is_ok()
}

//! Legacy subject address aliasing
//!
//! One historically observed subject address is looked up under a different
//! canonical address. This is a narrow compatibility shim kept in its own
//! table so it can be dropped without touching the aggregation path.

/// Maps observed subject addresses to the canonical address used for store
/// lookup. Resolution is exact-match; unlisted subjects pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl AliasTable {
    /// Table with no entries; every subject resolves to itself.
    pub fn empty() -> Self {
        AliasTable {
            entries: Vec::new(),
        }
    }

    /// Table with caller-supplied `(observed, canonical)` pairs.
    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        AliasTable {
            entries: entries
                .into_iter()
                .map(|(observed, canonical)| (observed.into(), canonical.into()))
                .collect(),
        }
    }

    /// Canonical address for `subject`, or `subject` itself when unaliased.
    pub fn resolve<'a>(&'a self, subject: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(observed, _)| observed == subject)
            .map(|(_, canonical)| canonical.as_str())
            .unwrap_or(subject)
    }
}

impl Default for AliasTable {
    /// The single legacy entry from the historical sipit.net test
    /// deployment.
    fn default() -> Self {
        AliasTable::with_entries([("sip:dialog@yxa.sipit.net", "sip:dialog1@yxa.sipit.net")])
    }
}

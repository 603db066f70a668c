//! Dialog identifier disambiguation
//!
//! Independent publishers scope dialog ids locally, so two sources can both
//! publish a dialog with id `42`. Before storage every dialog id is rewritten
//! to `<instance-prefix>-<local-id>`, where the prefix is unique to this
//! running engine instance. Fragments from different publishers then never
//! collide in the shared store, without any coordination step between them.

use uuid::Uuid;

use crate::xml::Element;

/// Token unique to one running engine instance, generated once at engine
/// construction and immutable for the rest of the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePrefix(String);

impl InstancePrefix {
    /// Generate a fresh per-instance token.
    ///
    /// Uniqueness across concurrently running instances is all that is
    /// required; the token carries no meaning beyond that.
    pub fn generate() -> Self {
        InstancePrefix(Uuid::new_v4().simple().to_string())
    }

    /// Use a caller-supplied token instead of a generated one.
    pub fn new(token: impl Into<String>) -> Self {
        InstancePrefix(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rewrite a dialog element's `id` attribute in place.
    ///
    /// A missing `id` is treated as the empty string. Every other attribute
    /// and all child content pass through unchanged. Returns both the
    /// originating local id and the disambiguated id written into the
    /// element.
    pub fn rewrite(&self, dialog: &mut Element) -> RewrittenId {
        let local = dialog
            .attr_values("id")
            .first()
            .map(|value| (*value).to_string())
            .unwrap_or_default();
        let global = format!("{}-{}", self.0, local);
        dialog.set_attr("id", global.clone());
        RewrittenId { local, global }
    }
}

impl std::fmt::Display for InstancePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two identities of one rewritten dialog: how the publisher named it
/// and how the store knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenId {
    pub local: String,
    pub global: String,
}

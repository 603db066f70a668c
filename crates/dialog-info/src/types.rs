//! Shared types for the dialog event package engine

use serde::{Deserialize, Serialize};

/// XML namespace of the dialog-info document format (RFC 4235)
pub const DIALOG_INFO_NS: &str = "urn:ietf:params:xml:ns:dialog-info";

/// Media type carried in NOTIFY bodies produced by this engine
pub const DIALOG_INFO_CONTENT_TYPE: &str = "application/dialog-info+xml";

/// One stored dialog fragment, the unit the store holds per published dialog.
///
/// `id` is the globally disambiguated identifier
/// (`<instance-prefix>-<local-id>`); `xml` is the canonical serialized text
/// of the dialog element with the rewritten id, ready to be concatenated
/// verbatim into an aggregate document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogFragment {
    pub id: String,
    pub xml: String,
}

/// Outcome of a successful publish: what the source claimed about itself
/// plus the disambiguated ids under which its dialogs were stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Entity URI from the published document root
    pub entity: String,
    /// Version string as published by the source (not authoritative here)
    pub version: String,
    /// Disambiguated ids of the fragments stored for this document
    pub fragment_ids: Vec<String>,
}

/// Aggregate notification content handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyContent {
    /// Complete dialog-info document text
    pub body: String,
    /// Media type accompanying the body
    pub content_type: &'static str,
    /// Version number used in the document just produced
    pub version: u64,
}

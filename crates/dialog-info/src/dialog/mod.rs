//! Dialog state publication and notification content

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{DialogInfoError, Result};
use crate::package::{DialogPackage, EventPackage};
use crate::types::{DialogFragment, NotifyContent, PublishReceipt, DIALOG_INFO_CONTENT_TYPE};
use crate::xml;

pub mod aggregate;
pub mod alias;
pub mod document;
pub mod rewrite;
pub mod store;

pub use aggregate::build_aggregate;
pub use alias::AliasTable;
pub use document::DialogDocument;
pub use rewrite::{InstancePrefix, RewrittenId};
pub use store::{FragmentStore, MemoryFragmentStore};

/// Notification-content engine for the dialog event package.
///
/// Inbound published documents run through parsing, extraction, identifier
/// rewriting, and serialization before any store mutation; outbound
/// notifications aggregate the stored fragments under a fresh version
/// number. The engine itself holds no durable state beyond its instance
/// prefix.
pub struct DialogEventEngine {
    store: Arc<dyn FragmentStore>,
    prefix: InstancePrefix,
    aliases: AliasTable,
    package: DialogPackage,
}

impl DialogEventEngine {
    /// Create an engine with a freshly generated instance prefix and the
    /// default alias table.
    pub fn new(store: Arc<dyn FragmentStore>) -> Self {
        Self::with_prefix(store, InstancePrefix::generate())
    }

    /// Create an engine with a caller-supplied instance prefix.
    pub fn with_prefix(store: Arc<dyn FragmentStore>, prefix: InstancePrefix) -> Self {
        DialogEventEngine {
            store,
            prefix,
            aliases: AliasTable::default(),
            package: DialogPackage,
        }
    }

    /// Replace the legacy alias table.
    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// The token this instance prepends to every stored dialog id.
    pub fn instance_prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// Process one published dialog-info document for `subject`.
    ///
    /// The whole document is parsed, rewritten, and serialized before the
    /// first store mutation, so a failure anywhere leaves the store exactly
    /// as it was. Each dialog replaces any earlier fragment this instance
    /// stored under the same local id.
    pub async fn publish(
        &self,
        subject: &str,
        document: &str,
        ttl: Duration,
    ) -> Result<PublishReceipt> {
        let doc = match DialogDocument::parse(document) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(subject = %subject, error = %e, "rejected published dialog-info document");
                return Err(e);
            }
        };

        let mut batch = Vec::with_capacity(doc.dialogs.len());
        for mut dialog in doc.dialogs {
            let ids = self.prefix.rewrite(&mut dialog);
            let fragment_xml = match xml::render_fragment(&dialog) {
                Ok(xml) => xml,
                Err(e) => {
                    warn!(subject = %subject, id = %ids.global, error = %e, "dropping publish batch");
                    return Err(e);
                }
            };
            batch.push(DialogFragment {
                id: ids.global,
                xml: fragment_xml,
            });
        }

        let fragment_ids: Vec<String> = batch.iter().map(|f| f.id.clone()).collect();
        for fragment in batch {
            self.store.replace(subject, fragment, ttl).await;
        }

        debug!(
            subject = %subject,
            entity = %doc.entity,
            fragments = fragment_ids.len(),
            "stored published dialog state"
        );
        Ok(PublishReceipt {
            entity: doc.entity,
            version: doc.version,
            fragment_ids,
        })
    }

    /// Produce the aggregate notification body for `subject`.
    ///
    /// `accepted` is the content-type list the subscription gate negotiated
    /// for this subscriber; output is refused unless the dialog-info media
    /// type is among them (an empty list means no preference was stated).
    pub async fn notify(&self, subject: &str, accepted: &[String]) -> Result<NotifyContent> {
        if !self.package.accepts(accepted) {
            warn!(subject = %subject, "subscriber does not accept dialog-info");
            return Err(DialogInfoError::UnsupportedContentType(
                accepted.join(", "),
            ));
        }

        let canonical = self.aliases.resolve(subject);
        let fragments = self.store.fetch_all(canonical).await;
        let version = self.store.get_and_increment_version(canonical).await;
        let body = build_aggregate(
            canonical,
            version,
            fragments.iter().map(|fragment| fragment.xml.as_str()),
        );

        debug!(
            subject = %canonical,
            version,
            fragments = fragments.len(),
            "built aggregate dialog-info document"
        );
        Ok(NotifyContent {
            body,
            content_type: DIALOG_INFO_CONTENT_TYPE,
            version,
        })
    }
}

//! # Dialog Event Package Content Engine
//!
//! Notification-content engine for the SIP dialog event package (RFC 4235):
//! callers and user agents publish dialog-info XML fragments describing one
//! dialog each, and subscribers receive one coherent, versioned aggregate
//! document per subject.
//!
//! The engine is a pure transformation library. SIP transaction handling,
//! subscription admission, and transport belong to the surrounding protocol
//! engine; the storage seam is the [`FragmentStore`] trait, with
//! [`MemoryFragmentStore`] as the in-process implementation.
//!
//! ## Publish path
//!
//! A published document is validated structurally, its `entity`/`version`
//! root attributes and `dialog` children are extracted, each dialog's id is
//! rewritten to `<instance-prefix>-<local-id>` so independently publishing
//! sources never collide, and the rewritten fragments are stored one per
//! dialog. Failures reject the whole document; the store is never left with
//! a partial batch.
//!
//! ## Notify path
//!
//! The stored fragments for a subject are concatenated into a `state="full"`
//! envelope carrying a strictly increasing version number:
//!
//! ```xml
//! <?xml version="1.0"?>
//! <dialog-info xmlns="urn:ietf:params:xml:ns:dialog-info"
//!              version="1" state="full"
//!              entity="sip:alice@example.com">
//! <dialog id="a7c2f431-1"><state>confirmed</state></dialog>
//! </dialog-info>
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sipevent_dialog_info::{DialogEventEngine, MemoryFragmentStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> sipevent_dialog_info::Result<()> {
//! let engine = DialogEventEngine::new(Arc::new(MemoryFragmentStore::new()));
//!
//! let published = r#"<?xml version="1.0"?>
//! <dialog-info xmlns="urn:ietf:params:xml:ns:dialog-info" version="0" state="full"
//!              entity="sip:alice@example.com">
//! <dialog id="1"><state>confirmed</state></dialog>
//! </dialog-info>"#;
//!
//! engine
//!     .publish("sip:alice@example.com", published, Duration::from_secs(3600))
//!     .await?;
//! let content = engine.notify("sip:alice@example.com", &[]).await?;
//! assert_eq!(content.version, 1);
//! assert_eq!(content.content_type, "application/dialog-info+xml");
//! # Ok(())
//! # }
//! ```

pub mod dialog;
pub mod error;
pub mod package;
pub mod types;
pub mod xml;

pub use dialog::{
    build_aggregate, AliasTable, DialogDocument, DialogEventEngine, FragmentStore,
    InstancePrefix, MemoryFragmentStore, RewrittenId,
};
pub use error::{DialogInfoError, Result};
pub use package::{DialogPackage, EventPackage};
pub use types::{
    DialogFragment, NotifyContent, PublishReceipt, DIALOG_INFO_CONTENT_TYPE, DIALOG_INFO_NS,
};

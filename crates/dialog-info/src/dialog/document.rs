//! Inbound dialog-info document validation and fragment extraction

use crate::error::{DialogInfoError, Result};
use crate::xml::{self, Element};

/// Root element name of a dialog-info document
const ROOT_ELEMENT: &str = "dialog-info";

/// Name of the per-dialog child elements
const DIALOG_ELEMENT: &str = "dialog";

/// Parsed representation of one published dialog-info document.
///
/// Ephemeral: it lives only for the duration of a publish operation. The
/// `version` here is whatever the source claimed; the authoritative version
/// numbering of outbound documents belongs to the per-subject counter in the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogDocument {
    pub version: String,
    pub entity: String,
    pub dialogs: Vec<Element>,
}

impl DialogDocument {
    /// Parse and validate a published document.
    ///
    /// The root element must be `dialog-info`, with or without a namespace
    /// prefix, and must carry exactly one `entity` and exactly one `version`
    /// attribute. Dialog child elements are extracted in document order and
    /// left untouched for the rewriter.
    pub fn parse(input: &str) -> Result<Self> {
        let root = xml::parse_document(input)?;
        if !xml::name_matches(root.name(), ROOT_ELEMENT) {
            return Err(DialogInfoError::BadDocument(format!(
                "unexpected root element <{}>",
                root.name()
            )));
        }

        let entity = required_attr(&root, "entity")?;
        let version = required_attr(&root, "version")?;
        let dialogs = root
            .child_elements(DIALOG_ELEMENT)
            .into_iter()
            .cloned()
            .collect();

        Ok(DialogDocument {
            version,
            entity,
            dialogs,
        })
    }
}

/// An attribute downstream code depends on being singular: zero matches and
/// duplicates are both rejected rather than silently picking one.
fn required_attr(root: &Element, name: &str) -> Result<String> {
    let values = root.attr_values(name);
    match values.as_slice() {
        [value] => Ok((*value).to_string()),
        [] => Err(DialogInfoError::BadDocument(format!(
            "missing {name} attribute on document root"
        ))),
        _ => Err(DialogInfoError::BadDocument(format!(
            "duplicated {name} attribute on document root"
        ))),
    }
}

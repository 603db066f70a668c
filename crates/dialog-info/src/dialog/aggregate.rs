//! Aggregate dialog-info document construction
//!
//! The outbound envelope is built textually: stored fragments are already
//! canonical XML, so they concatenate verbatim into the body with no
//! separators. Subscribers depend on this exact wire shape.

use crate::types::DIALOG_INFO_NS;

/// Build the full aggregate document for a subject.
///
/// A subject with zero stored fragments still yields a valid `state="full"`
/// document with an empty body; the subscriber learns that no dialogs exist.
/// The caller supplies the version number the document should carry (the
/// pre-increment counter value) and bumps the counter separately.
pub fn build_aggregate<'a, I>(entity: &str, version: u64, fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut body = String::new();
    for fragment in fragments {
        body.push_str(fragment);
    }
    let body_end = if body.is_empty() { "" } else { "\n" };

    format!(
        "<?xml version=\"1.0\"?>\n\
         <dialog-info xmlns=\"{DIALOG_INFO_NS}\"\n\
         \x20            version=\"{version}\" state=\"full\"\n\
         \x20            entity=\"{entity}\">\n\
         {body}{body_end}</dialog-info>\n"
    )
}

//! Event package definition for dialog state subscriptions (RFC 6665)
//!
//! The subscription gate negotiates content types with each subscriber; the
//! engine consults the package here to decide whether it may produce output
//! for what the gate negotiated.

use std::time::Duration;

use crate::types::DIALOG_INFO_CONTENT_TYPE;

/// Trait for SIP event packages
///
/// Event packages define the semantics and data formats for specific types
/// of SIP event subscriptions.
pub trait EventPackage: Send + Sync {
    /// Name of this event package as it appears in the Event header
    fn name(&self) -> &str;

    /// Content types this package can produce
    fn accept_types(&self) -> Vec<&'static str>;

    /// Default subscription duration
    fn default_expires(&self) -> Duration;

    /// Minimum allowed subscription duration
    fn min_expires(&self) -> Duration {
        Duration::from_secs(60)
    }

    /// Maximum allowed subscription duration
    fn max_expires(&self) -> Duration {
        Duration::from_secs(86400)
    }

    /// Whether this package supports event lists (RFC 4662)
    fn supports_event_lists(&self) -> bool {
        false
    }

    /// Whether any of the content types a subscriber declared acceptable is
    /// one this package produces. An empty list means the subscriber stated
    /// no preference and gets the package default. Media type parameters
    /// are ignored for the comparison.
    fn accepts(&self, declared: &[String]) -> bool {
        if declared.is_empty() {
            return true;
        }
        declared.iter().any(|content_type| {
            let media = content_type
                .split(';')
                .next()
                .unwrap_or_default()
                .trim();
            self.accept_types()
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(media))
        })
    }
}

/// Dialog event package (RFC 4235)
pub struct DialogPackage;

impl EventPackage for DialogPackage {
    fn name(&self) -> &str {
        "dialog"
    }

    fn accept_types(&self) -> Vec<&'static str> {
        vec![DIALOG_INFO_CONTENT_TYPE]
    }

    fn default_expires(&self) -> Duration {
        Duration::from_secs(3600)
    }
}

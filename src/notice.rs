//! Deprecation notice value object and message rendering.

use std::fmt;

/// A single deprecation notice, passed to the active behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// Fully-qualified display name of the deprecated member, e.g.
    /// `Widget.parse` for a class-level member, `Widget#render` for an
    /// instance member, or the bare type name for a constructor.
    pub subject: String,

    /// Suggested replacement: fully-qualified when it names a real member,
    /// literal display text otherwise.
    pub alternative: Option<String>,

    /// Free-text retirement note, commonly a version or date.
    pub note: Option<String>,
}

impl DeprecationNotice {
    /// Creates a notice for the given subject.
    pub fn new(subject: impl Into<String>, alternative: Option<&str>, note: Option<&str>) -> Self {
        Self {
            subject: subject.into(),
            alternative: alternative.map(str::to_string),
            note: note.map(str::to_string),
        }
    }

    /// Renders the human-readable notice text.
    pub fn message(&self) -> String {
        let mut message = format!("`{}` is deprecated", self.subject);

        match &self.note {
            Some(note) => message.push_str(&format!(" and will be outdated {}.", note)),
            None => message.push('.'),
        }

        if let Some(alternative) = &self.alternative {
            message.push_str(&format!(" Please use `{}` instead.", alternative));
        }

        message
    }
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_subject_only() {
        let notice = DeprecationNotice::new("Widget#render", None, None);
        assert_eq!(notice.message(), "`Widget#render` is deprecated.");
    }

    #[test]
    fn test_message_with_note() {
        let notice = DeprecationNotice::new("Widget#render", None, Some("next version"));
        assert_eq!(
            notice.message(),
            "`Widget#render` is deprecated and will be outdated next version."
        );
    }

    #[test]
    fn test_message_with_alternative() {
        let notice = DeprecationNotice::new("Widget#render", Some("Widget#draw"), None);
        assert_eq!(
            notice.message(),
            "`Widget#render` is deprecated. Please use `Widget#draw` instead."
        );
    }

    #[test]
    fn test_message_with_note_and_alternative() {
        let notice = DeprecationNotice::new("Widget#render", Some("Widget#draw"), Some("v2"));
        assert_eq!(
            notice.message(),
            "`Widget#render` is deprecated and will be outdated v2. Please use `Widget#draw` instead."
        );
    }

    #[test]
    fn test_display_matches_message() {
        let notice = DeprecationNotice::new("Widget", Some("Gadget"), None);
        assert_eq!(notice.to_string(), notice.message());
    }
}

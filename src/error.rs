//! Error types for behavior configuration, member marking, and dispatch.

use std::panic::Location;

use thiserror::Error;

/// Errors produced by behavior configuration, deprecation marking, and
/// dispatch through a [`Namespace`](crate::Namespace).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// An unrecognized behavior tag was supplied.
    #[error("invalid behavior `{value}` - has to be `silence` | `warn` | `raise` or a custom handler")]
    InvalidConfiguration {
        /// The rejected tag.
        value: String,
    },

    /// The target member, or a bare alternative name, does not exist on the
    /// namespace. Raised at marking time, never deferred to first call.
    #[error("undefined member `{member}` for namespace `{namespace}`")]
    MemberNotFound {
        /// The unresolved member name.
        member: String,
        /// Display name of the namespace that was searched.
        namespace: String,
    },

    /// A registered member was invoked with different argument or return
    /// types than it was registered with.
    #[error("member `{member}` is registered as {expected}, called as {requested}")]
    SignatureMismatch {
        /// Fully-qualified display name of the member.
        member: String,
        /// Signature the member was registered with.
        expected: &'static str,
        /// Signature the call site asked for.
        requested: &'static str,
    },

    /// Produced by the `raise` behavior when a deprecated member is invoked.
    ///
    /// The origin location identifies the caller of the wrapped member, not
    /// library internals.
    #[error("{message}")]
    DeprecationSignaled {
        /// The rendered notice text.
        message: String,
        /// Call site of the deprecated invocation.
        location: &'static Location<'static>,
    },
}

impl Error {
    /// Call site of the deprecated invocation, for [`Error::DeprecationSignaled`].
    pub fn origin(&self) -> Option<&'static Location<'static>> {
        match self {
            Error::DeprecationSignaled { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::InvalidConfiguration { .. } => "invalid_configuration",
            Error::MemberNotFound { .. } => "member_not_found",
            Error::SignatureMismatch { .. } => "signature_mismatch",
            Error::DeprecationSignaled { .. } => "deprecation_signaled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_not_found_message() {
        let err = Error::MemberNotFound {
            member: "some".to_string(),
            namespace: "Widget".to_string(),
        };
        assert_eq!(err.to_string(), "undefined member `some` for namespace `Widget`");
    }

    #[test]
    fn test_invalid_configuration_lists_accepted_tags() {
        let err = Error::InvalidConfiguration {
            value: "bogus".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("`bogus`"));
        assert!(message.contains("`silence`"));
        assert!(message.contains("`warn`"));
        assert!(message.contains("`raise`"));
    }

    #[test]
    fn test_origin_is_none_for_configuration_errors() {
        let err = Error::InvalidConfiguration {
            value: "bogus".to_string(),
        };
        assert!(err.origin().is_none());
        assert_eq!(err.as_label(), "invalid_configuration");
    }
}

//! Reaction strategies for deprecated-member invocations.
//!
//! Exactly one [`Behavior`] is active per [`Reporter`](crate::Reporter) at
//! any instant. The fixed tags cover the common cases; arbitrary reactions
//! plug in through [`Behavior::custom`].

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::notice::DeprecationNotice;

/// Signature for user-supplied reactions to a deprecation notice.
///
/// An `Err` returned by the handler propagates unchanged to the call site
/// of the wrapped member.
pub type BehaviorFn = dyn Fn(&DeprecationNotice) -> Result<(), Error> + Send + Sync;

/// Strategy applied when a deprecated member is invoked.
#[derive(Clone, Default)]
pub enum Behavior {
    /// Do nothing.
    Silence,

    /// Write the notice to the diagnostic sink, prefixed with the caller's
    /// location. The default.
    #[default]
    Warn,

    /// Fail the invocation with [`Error::DeprecationSignaled`] before the
    /// original callable runs.
    Raise,

    /// Invoke a user-supplied handler with the notice.
    Custom(Arc<BehaviorFn>),
}

impl Behavior {
    /// Wraps a handler as a custom behavior.
    pub fn custom<F>(handler: F) -> Self
    where
        F: Fn(&DeprecationNotice) -> Result<(), Error> + Send + Sync + 'static,
    {
        Behavior::Custom(Arc::new(handler))
    }

    /// Parses one of the fixed tags: `silence`, `warn`, `raise`.
    pub fn from_tag(tag: &str) -> Result<Self, Error> {
        match tag {
            "silence" => Ok(Behavior::Silence),
            "warn" => Ok(Behavior::Warn),
            "raise" => Ok(Behavior::Raise),
            other => Err(Error::InvalidConfiguration {
                value: other.to_string(),
            }),
        }
    }

    /// Returns a short stable label for logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Behavior::Silence => "silence",
            Behavior::Warn => "warn",
            Behavior::Raise => "raise",
            Behavior::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Silence => f.write_str("Silence"),
            Behavior::Warn => f.write_str("Warn"),
            Behavior::Raise => f.write_str("Raise"),
            Behavior::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Fixed tags compare by variant; custom handlers compare by identity.
impl PartialEq for Behavior {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Behavior::Silence, Behavior::Silence)
            | (Behavior::Warn, Behavior::Warn)
            | (Behavior::Raise, Behavior::Raise) => true,
            (Behavior::Custom(a), Behavior::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Conversion into a [`Behavior`], accepting the enum itself or one of the
/// fixed tags as a string.
pub trait IntoBehavior {
    /// Converts the value, failing with [`Error::InvalidConfiguration`] for
    /// an unrecognized tag.
    fn into_behavior(self) -> Result<Behavior, Error>;
}

impl IntoBehavior for Behavior {
    fn into_behavior(self) -> Result<Behavior, Error> {
        Ok(self)
    }
}

impl IntoBehavior for &str {
    fn into_behavior(self) -> Result<Behavior, Error> {
        Behavior::from_tag(self)
    }
}

impl IntoBehavior for String {
    fn into_behavior(self) -> Result<Behavior, Error> {
        Behavior::from_tag(&self)
    }
}

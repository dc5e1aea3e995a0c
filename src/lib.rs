//! Runtime deprecation notices for registered callables.
//!
//! Callables (class-level members, instance members, constructors) are
//! registered on [`Namespace`] objects. Marking a member deprecated makes
//! every later dispatch report a notice - as a diagnostic warning, a
//! distinguished error, silently, or through a custom handler - and then
//! forward all arguments and the result unchanged to the original callable.
//!
//! # Features
//!
//! - **Configurable behavior**: `silence`, `warn`, `raise`, or a custom handler
//! - **Scoped overrides**: temporarily swap the behavior, restored on all exit paths
//! - **Call-site attribution**: warnings and errors point at the caller of the
//!   deprecated member, not at library internals
//! - **Idempotent marking**: re-marking a member never double-reports
//! - **Usage tracking**: Prometheus metrics for deprecated member invocations
//!
//! # Example
//!
//! ```
//! use deprecations::{CallKind, Namespace};
//!
//! let ns = Namespace::new("Legacy");
//! ns.register_static("checksum", |data: Vec<u8>| -> u32 {
//!     data.iter().map(|b| *b as u32).sum()
//! });
//! ns.register_static("digest", |data: Vec<u8>| -> u32 {
//!     data.iter().map(|b| *b as u32).sum()
//! });
//! ns.mark_member_deprecated("checksum", CallKind::Static, Some("digest"), Some("v2.0"))?;
//!
//! // Warns that `Legacy.checksum` is deprecated, then forwards unchanged.
//! let sum: u32 = ns.call_static("checksum", vec![1u8, 2, 3])?;
//! assert_eq!(sum, 6);
//! # Ok::<(), deprecations::Error>(())
//! ```

pub mod behavior;
pub mod error;
pub mod metrics;
pub mod notice;
pub mod registry;
pub mod reporter;
pub mod settings;

pub use behavior::{Behavior, IntoBehavior};
pub use error::Error;
pub use metrics::DeprecationMetrics;
pub use notice::DeprecationNotice;
pub use registry::{CallKind, Namespace};
pub use reporter::{behavior, report, reporter, set_behavior, with_behavior, Reporter};
pub use settings::Settings;

//! Behavior cell, scoped overrides, and notice reporting.
//!
//! A [`Reporter`] owns the active [`Behavior`], the diagnostic sink used by
//! the `warn` behavior, and the usage metrics. One process-wide reporter
//! backs the module-level functions ([`set_behavior`], [`behavior`],
//! [`with_behavior`], [`report`]); additional reporters can be constructed
//! and injected into individual namespaces.

use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::behavior::{Behavior, IntoBehavior};
use crate::error::Error;
use crate::metrics::DeprecationMetrics;
use crate::notice::DeprecationNotice;

/// Destination for `warn` output. Defaults to stderr.
pub type DiagnosticSink = Box<dyn Write + Send>;

/// Executes the configured reaction to deprecated invocations.
pub struct Reporter {
    behavior: RwLock<Behavior>,
    sink: Mutex<DiagnosticSink>,
    metrics: DeprecationMetrics,
}

impl Reporter {
    /// Creates a reporter with the default `warn` behavior, writing to stderr.
    pub fn new() -> Self {
        Self::assemble(Box::new(io::stderr()), DeprecationMetrics::default())
    }

    /// Creates a reporter writing `warn` notices to the given sink.
    pub fn with_sink(sink: DiagnosticSink) -> Self {
        Self::assemble(sink, DeprecationMetrics::default())
    }

    /// Creates a reporter recording into the given metrics collector.
    pub fn with_metrics(metrics: DeprecationMetrics) -> Self {
        Self::assemble(Box::new(io::stderr()), metrics)
    }

    fn assemble(sink: DiagnosticSink, metrics: DeprecationMetrics) -> Self {
        Self {
            behavior: RwLock::new(Behavior::default()),
            sink: Mutex::new(sink),
            metrics,
        }
    }

    /// Returns the currently active behavior.
    pub fn behavior(&self) -> Behavior {
        self.behavior
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the active behavior.
    ///
    /// Accepts a [`Behavior`] value or one of the tags
    /// `"silence" | "warn" | "raise"`; an unrecognized tag fails with
    /// [`Error::InvalidConfiguration`] and leaves the cell unchanged.
    pub fn set_behavior(&self, behavior: impl IntoBehavior) -> Result<(), Error> {
        let behavior = behavior.into_behavior()?;
        debug!(behavior = behavior.as_label(), "behavior configured");
        *self
            .behavior
            .write()
            .unwrap_or_else(PoisonError::into_inner) = behavior;
        Ok(())
    }

    /// Runs `scope` under a temporary behavior, restoring the previous one
    /// on every exit path, including unwinding.
    ///
    /// Nested overrides on one thread restore in reverse order. Overlapping
    /// overrides on different threads race: the last restore wins and the
    /// ordering is undefined.
    pub fn with_behavior<T>(
        &self,
        behavior: impl IntoBehavior,
        scope: impl FnOnce() -> T,
    ) -> Result<T, Error> {
        let behavior = behavior.into_behavior()?;
        let previous = {
            let mut cell = self
                .behavior
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *cell, behavior)
        };
        let _restore = RestoreBehavior {
            reporter: self,
            previous: Some(previous),
        };
        Ok(scope())
    }

    /// Executes the active behavior for one deprecated invocation.
    ///
    /// The location attached to `warn` output and to
    /// [`Error::DeprecationSignaled`] is the caller of the wrapped member,
    /// propagated through the `#[track_caller]` dispatch chain rather than
    /// any internal frame.
    #[track_caller]
    pub fn report(
        &self,
        subject: &str,
        alternative: Option<&str>,
        note: Option<&str>,
    ) -> Result<(), Error> {
        let location = Location::caller();
        let behavior = self.behavior();
        self.metrics.record_report(subject, behavior.as_label());
        let notice = DeprecationNotice::new(subject, alternative, note);

        match behavior {
            Behavior::Silence => Ok(()),
            Behavior::Warn => {
                let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
                // A failed diagnostic write is dropped, not surfaced to the
                // call site.
                let _ = writeln!(
                    sink,
                    "{}:{}: [DEPRECATION] {}",
                    location.file(),
                    location.line(),
                    notice.message()
                );
                Ok(())
            }
            Behavior::Raise => Err(Error::DeprecationSignaled {
                message: notice.message(),
                location,
            }),
            Behavior::Custom(handler) => handler(&notice),
        }
    }

    /// Returns the usage metrics recorded by this reporter.
    pub fn metrics(&self) -> &DeprecationMetrics {
        &self.metrics
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the previous behavior when a scoped override ends, on normal
/// return and during unwinding alike.
struct RestoreBehavior<'a> {
    reporter: &'a Reporter,
    previous: Option<Behavior>,
}

impl Drop for RestoreBehavior<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self
                .reporter
                .behavior
                .write()
                .unwrap_or_else(PoisonError::into_inner) = previous;
        }
    }
}

/// Returns the process-wide reporter backing the module-level functions.
///
/// The default `warn` behavior is installed before first use.
pub fn reporter() -> &'static Reporter {
    static GLOBAL: OnceLock<Reporter> = OnceLock::new();
    GLOBAL.get_or_init(Reporter::new)
}

/// Replaces the process-wide behavior.
pub fn set_behavior(behavior: impl IntoBehavior) -> Result<(), Error> {
    reporter().set_behavior(behavior)
}

/// Returns the currently active process-wide behavior.
pub fn behavior() -> Behavior {
    reporter().behavior()
}

/// Scoped override of the process-wide behavior.
pub fn with_behavior<T>(
    behavior: impl IntoBehavior,
    scope: impl FnOnce() -> T,
) -> Result<T, Error> {
    reporter().with_behavior(behavior, scope)
}

/// Reports an ad-hoc notice through the process-wide reporter.
#[track_caller]
pub fn report(subject: &str, alternative: Option<&str>, note: Option<&str>) -> Result<(), Error> {
    reporter().report(subject, alternative, note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn buffered_reporter() -> (Reporter, SharedBuf) {
        let buf = SharedBuf::default();
        (Reporter::with_sink(Box::new(buf.clone())), buf)
    }

    #[test]
    fn test_set_behavior_round_trips_fixed_tags() {
        let reporter = Reporter::new();
        for tag in [Behavior::Silence, Behavior::Warn, Behavior::Raise] {
            reporter.set_behavior(tag.clone()).unwrap();
            assert_eq!(reporter.behavior(), tag);
        }
    }

    #[test]
    fn test_set_behavior_rejects_unknown_tag() {
        let reporter = Reporter::new();
        reporter.set_behavior("raise").unwrap();
        let err = reporter.set_behavior("bogus").unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { ref value } if value == "bogus"));
        // The cell is left unchanged.
        assert_eq!(reporter.behavior(), Behavior::Raise);
    }

    #[test]
    fn test_silence_produces_no_output_and_no_error() {
        let (reporter, buf) = buffered_reporter();
        reporter.set_behavior("silence").unwrap();
        reporter
            .report("Widget#render", Some("Widget#draw"), Some("v2"))
            .unwrap();
        assert!(buf.contents().is_empty());
    }

    #[test]
    fn test_warn_writes_one_attributed_line() {
        let (reporter, buf) = buffered_reporter();
        reporter.set_behavior("warn").unwrap();
        reporter
            .report("Widget#render", Some("Widget#draw"), Some("v2"))
            .unwrap();

        let output = buf.contents();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("reporter.rs"));
        assert!(output.contains("[DEPRECATION]"));
        assert!(output.trim_end().ends_with(
            "`Widget#render` is deprecated and will be outdated v2. \
             Please use `Widget#draw` instead."
        ));
    }

    #[test]
    fn test_raise_signals_with_caller_origin() {
        let reporter = Reporter::new();
        reporter.set_behavior("raise").unwrap();

        let err = reporter.report("Widget#render", Some("Widget#draw"), Some("v2")).unwrap_err();
        let expected_line = line!() - 1;

        assert!(matches!(err, Error::DeprecationSignaled { .. }));
        let message = err.to_string();
        assert!(message.contains("`Widget#render` is deprecated"));
        assert!(message.contains("`Widget#draw`"));
        // No location prefix in the message itself.
        assert!(!message.contains("reporter.rs"));

        let origin = err.origin().unwrap();
        assert!(origin.file().ends_with("reporter.rs"));
        assert_eq!(origin.line(), expected_line);
    }

    #[test]
    fn test_custom_handler_receives_the_notice() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let reporter = Reporter::new();
        let sink = seen.clone();
        reporter
            .set_behavior(Behavior::custom(move |notice| {
                sink.lock().unwrap().push(notice.clone());
                Ok(())
            }))
            .unwrap();

        reporter.report("Widget.parse", None, Some("2.0")).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![DeprecationNotice::new("Widget.parse", None, Some("2.0"))]
        );
    }

    #[test]
    fn test_custom_handler_error_propagates() {
        let reporter = Reporter::new();
        reporter
            .set_behavior(Behavior::custom(|notice| {
                Err(Error::MemberNotFound {
                    member: notice.subject.clone(),
                    namespace: "Custom".to_string(),
                })
            }))
            .unwrap();

        let err = reporter.report("Widget.parse", None, None).unwrap_err();
        assert!(matches!(err, Error::MemberNotFound { ref member, .. } if member == "Widget.parse"));
    }

    #[test]
    fn test_with_behavior_restores_previous_value() {
        let reporter = Reporter::new();
        reporter.set_behavior("raise").unwrap();

        let inner = reporter.with_behavior("warn", || reporter.behavior()).unwrap();
        assert_eq!(inner, Behavior::Warn);
        assert_eq!(reporter.behavior(), Behavior::Raise);
    }

    #[test]
    fn test_with_behavior_restores_after_panic() {
        let reporter = Reporter::new();
        reporter.set_behavior("raise").unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| {
            reporter
                .with_behavior("warn", || panic!("scope failed"))
                .unwrap();
        }));

        assert!(result.is_err());
        assert_eq!(reporter.behavior(), Behavior::Raise);
    }

    #[test]
    fn test_with_behavior_nests() {
        let reporter = Reporter::new();
        reporter.set_behavior("warn").unwrap();

        reporter
            .with_behavior("silence", || {
                reporter
                    .with_behavior("raise", || {
                        assert_eq!(reporter.behavior(), Behavior::Raise);
                    })
                    .unwrap();
                assert_eq!(reporter.behavior(), Behavior::Silence);
            })
            .unwrap();

        assert_eq!(reporter.behavior(), Behavior::Warn);
    }

    #[test]
    fn test_with_behavior_rejects_invalid_tag_without_running_scope() {
        let reporter = Reporter::new();
        let mut ran = false;
        let err = reporter.with_behavior("bogus", || ran = true).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
        assert!(!ran);
    }

    // The process-wide facade shares one cell; everything it needs to prove
    // lives in a single test to keep parallel test runs off each other's toes.
    #[test]
    fn test_process_wide_facade() {
        set_behavior("silence").unwrap();
        assert_eq!(behavior(), Behavior::Silence);

        let inner = with_behavior(Behavior::Raise, behavior).unwrap();
        assert_eq!(inner, Behavior::Raise);
        assert_eq!(behavior(), Behavior::Silence);

        assert!(set_behavior("bogus").is_err());
        with_behavior("silence", || report("Ad#hoc", None, None))
            .unwrap()
            .unwrap();

        set_behavior(Behavior::Warn).unwrap();
    }
}

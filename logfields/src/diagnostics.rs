//! Diagnostic channel for failures that are recovered instead of propagated.
//!
//! Rendering a misbehaving value never aborts a log call; the failure is reported here
//! instead. [`TracingDiagnostics`] is the default channel: it forwards to `tracing` when a
//! subscriber is installed and writes straight to stderr otherwise.

use core::fmt::Debug;
use std::error::Error as StdError;

/// Receiver of warning-level diagnostics.
///
/// # Examples
///
/// ```rust
/// use std::error::Error;
/// use std::sync::Mutex;
///
/// use logfields::diagnostics::Diagnostics;
///
/// #[derive(Debug, Default)]
/// struct Collecting(Mutex<Vec<String>>);
///
/// impl Diagnostics for Collecting {
///     fn warn(&self, origin: &'static str, message: &str, _: Option<&(dyn Error + 'static)>) {
///         self.0.lock().unwrap().push(format!("{origin}: {message}"));
///     }
/// }
/// ```
pub trait Diagnostics: Debug + Send + Sync {
    /// Reports a recovered failure.
    ///
    /// `origin` names the component that recovered, `cause` is the failure itself when one
    /// is available.
    fn warn(&self, origin: &'static str, message: &str, cause: Option<&(dyn StdError + 'static)>);
}

/// Reports diagnostics through `tracing`, or stderr if no subscriber has been set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl TracingDiagnostics {
    /// A `const` version of `TracingDiagnostics::default()` to allow use as a `&'static`.
    pub const DEFAULT: Self = TracingDiagnostics;

    /// Whether a warning reported now, on this thread, reaches a `tracing` subscriber.
    ///
    /// Decided by the current thread's dispatcher, a scoped default set and dropped elsewhere
    /// does not count.
    pub fn has_subscriber(&self) -> bool {
        tracing::dispatcher::get_default(|dispatch| {
            !dispatch.is::<tracing::subscriber::NoSubscriber>()
        })
    }
}

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, origin: &'static str, message: &str, cause: Option<&(dyn StdError + 'static)>) {
        if self.has_subscriber() {
            match cause {
                Some(cause) => tracing::warn!(origin, error = %cause, "{message}"),
                None => tracing::warn!(origin, "{message}"),
            }
            return;
        }

        eprintln!("WARN [{origin}] {message}");
        let mut source = cause;
        while let Some(error) = source {
            eprintln!("  caused by: {error}");
            source = error.source();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::error::Error as StdError;
    use std::sync::Mutex;

    use super::{Diagnostics, TracingDiagnostics};

    /// Keeps every diagnostic in memory.
    #[derive(Debug, Default)]
    pub(crate) struct Recording {
        pub(crate) entries: Mutex<Vec<(&'static str, String, Option<String>)>>,
    }

    impl Recording {
        pub(crate) fn take(&self) -> Vec<(&'static str, String, Option<String>)> {
            self.entries.lock().unwrap().drain(..).collect()
        }
    }

    impl Diagnostics for Recording {
        fn warn(
            &self,
            origin: &'static str,
            message: &str,
            cause: Option<&(dyn StdError + 'static)>,
        ) {
            self.entries.lock().unwrap().push((
                origin,
                message.into(),
                cause.map(|cause| cause.to_string()),
            ));
        }
    }

    #[tracing_test::traced_test]
    #[test]
    fn forwards_to_tracing_when_subscribed() {
        assert!(TracingDiagnostics::DEFAULT.has_subscriber());

        let cause = std::io::Error::other("disk on fire");
        TracingDiagnostics::DEFAULT.warn("stringify", "rendering failed", Some(&cause));

        assert!(logs_contain("rendering failed"));
        assert!(logs_contain("disk on fire"));
    }
}

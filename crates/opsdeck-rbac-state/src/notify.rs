//! Notifier contract: success/failure feedback for every mutation.
//!
//! The console never swallows a mutation outcome: every create, rename,
//! assign, and remove reports through this trait. Server errors that
//! cannot be associated with a specific row are surfaced here globally.

use tracing::{info, warn};

/// Sink for human-readable mutation feedback.
pub trait Notify: Send + Sync {
    /// A mutation completed.
    fn success(&self, message: &str);

    /// A mutation or reload failed; the message is shown to the operator.
    fn error(&self, message: &str);
}

/// Default notifier: routes feedback to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notify for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "opsdeck_rbac::notify", "{message}");
    }

    fn error(&self, message: &str) {
        warn!(target: "opsdeck_rbac::notify", "{message}");
    }
}

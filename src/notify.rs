//! Toast notification seam.
//!
//! The sync engines announce mutation results through this trait; the UI
//! shell supplies its own implementation. Silent operations never reach it.

/// User-visible transient notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier: routes toasts to the log. Used by the maintenance
/// binary and anywhere no UI shell is attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        log::info!("toast(success): {}", message);
    }

    fn error(&self, message: &str) {
        log::warn!("toast(error): {}", message);
    }
}

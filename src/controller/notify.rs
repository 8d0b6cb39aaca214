//! User-visible alerts raised by the controller.
//!
//! Failures are also written to `ScreenState::last_error`; a notice is
//! the one-shot alert on top of that, the way a phone screen pops an
//! alert dialog.

/// One alert for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Confirmation, e.g. "Copied to clipboard".
    Info(String),
    /// Presentable failure message (the `Display` of a `ScanError`).
    Error(String),
}

/// Where alerts go. A UI shows them; the CLI logs them.
///
/// Called synchronously from the controller and never while its state
/// lock is held, so implementations may read `state()`.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Routes alerts to the log. Used when no UI is attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Info(msg) => log::info!("[SCREEN] {}", msg),
            Notice::Error(msg) => log::error!("[SCREEN] {}", msg),
        }
    }
}

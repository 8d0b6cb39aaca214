//! System clipboard access.
//!
//! The controller only ever writes text, and only after an analysis has
//! produced a transcription.

#[derive(Debug, Clone, thiserror::Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Synchronous text sink the transcription is copied into.
///
/// Kept as a trait so the controller can be driven without a desktop
/// session (tests, headless CLI runs).
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `text`.
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Native clipboard via arboard. Works from a plain terminal process
/// without a window of our own.
///
/// A handle is opened per write; holding one open for the process
/// lifetime misbehaves on some X11 setups.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError(e.to_string()))?;
        log::info!("[CLIPBOARD] Copied {} chars", text.chars().count());
        Ok(())
    }
}

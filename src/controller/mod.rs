//! Capture → upload → analyze controller.
//!
//! Owns the screen's `ScreenState` and is the only thing that mutates it.
//! Each upload or analysis runs under a generation number and a cancel
//! channel. When it completes, its result is applied only if its
//! generation is still the current one; `cancel()` and a superseding
//! capture move the generation on, so late completions are dropped.
//!
//! Locks are never held across an await.

mod error;
mod notify;
mod state;

pub use error::ScanError;
pub use notify::{LogNotifier, Notice, Notifier};
pub use state::{Operation, Phase, ScreenState};

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::camera::{Camera, CaptureOptions, CaptureOutcome, Permission};
use crate::clipboard::Clipboard;
use crate::storage::{ObjectStore, Url};
use crate::vision::{OcrClient, OcrResponse};

/// Result of a `capture_photo` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureReport {
    /// User backed out of the camera; nothing changed.
    Cancelled,
    Uploaded(Url),
}

#[derive(Default)]
struct Inner {
    state: ScreenState,
    permission: Option<Permission>,
    camera_open: bool,
    generation: u64,
    /// Generation of the request in flight, if any.
    current: Option<u64>,
    cancel: Option<watch::Sender<bool>>,
}

impl Inner {
    fn begin(&mut self, op: Operation) -> (u64, watch::Receiver<bool>) {
        self.generation += 1;
        let (tx, rx) = watch::channel(false);
        self.cancel = Some(tx);
        self.current = Some(self.generation);
        self.state.in_flight = Some(op);
        self.state.is_busy = true;
        self.state.last_error = None;
        (self.generation, rx)
    }

    fn clear_flight(&mut self) {
        self.current = None;
        self.cancel = None;
        self.state.in_flight = None;
        self.state.is_busy = false;
    }

    fn cancel_current(&mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(true);
        }
        self.clear_flight();
    }
}

/// Clears the busy flag if the request's future is dropped before
/// `finish` runs, but only while that request is still current.
struct FlightGuard<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
    finished: bool,
}

impl<'a> FlightGuard<'a> {
    fn new(inner: &'a Mutex<Inner>, generation: u64) -> Self {
        Self {
            inner,
            generation,
            finished: false,
        }
    }

    /// Ends the flight. Returns false when the request was superseded,
    /// in which case its result must be discarded.
    fn finish(mut self, inner: &mut Inner) -> bool {
        self.finished = true;
        if inner.current != Some(self.generation) {
            return false;
        }
        inner.clear_flight();
        true
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.current == Some(self.generation) {
            log::warn!("[SCREEN] Request {} dropped mid-flight", self.generation);
            inner.clear_flight();
        }
    }
}

/// Resets `camera_open` however the camera call ends.
struct CameraGuard<'a>(&'a Mutex<Inner>);

impl Drop for CameraGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        inner.camera_open = false;
    }
}

/// Resolves once the flight is cancelled. A dropped sender counts too.
async fn cancellation(mut rx: watch::Receiver<bool>) {
    loop {
        let flagged = *rx.borrow_and_update();
        if flagged || rx.changed().await.is_err() {
            return;
        }
    }
}

async fn run_cancellable<T, E, F>(cancelled: watch::Receiver<bool>, fut: F) -> Result<T, ScanError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ScanError>,
{
    tokio::select! {
        res = fut => res.map_err(Into::into),
        _ = cancellation(cancelled) => Err(ScanError::Cancelled),
    }
}

/// Drives one screen: camera access, capture and upload, analysis and
/// copy. All collaborators are injected, so a UI, the CLI and the tests
/// share the same state machine.
///
/// At most one upload or analysis is in flight. Each gets a generation
/// number; a completion whose generation is no longer current leaves
/// `ScreenState` alone.
pub struct CaptureController {
    camera: Arc<dyn Camera>,
    store: Arc<dyn ObjectStore>,
    ocr: Arc<dyn OcrClient>,
    clipboard: Arc<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
    options: CaptureOptions,
    inner: Mutex<Inner>,
}

impl CaptureController {
    pub fn new(
        camera: Arc<dyn Camera>,
        store: Arc<dyn ObjectStore>,
        ocr: Arc<dyn OcrClient>,
        clipboard: Arc<dyn Clipboard>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            camera,
            store,
            ocr,
            clipboard,
            notifier,
            options: CaptureOptions::default(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ScreenState {
        self.lock().state.clone()
    }

    pub fn permission(&self) -> Option<Permission> {
        self.lock().permission
    }

    /// Record a failure on the screen and alert the user. Call without
    /// the lock held.
    fn fail(&self, err: ScanError) -> ScanError {
        let message = err.to_string();
        self.lock().state.last_error = Some(message.clone());
        self.notifier.notify(Notice::Error(message));
        err
    }

    /// Ask for camera access. Called once when the screen activates;
    /// a granted permission is not asked for again.
    pub async fn request_camera_access(&self) -> Result<Permission, ScanError> {
        if self.permission() == Some(Permission::Granted) {
            return Ok(Permission::Granted);
        }

        let permission = match self.camera.request_access().await {
            Ok(p) => p,
            Err(e) => {
                self.lock().permission = Some(Permission::Denied);
                return Err(self.fail(e.into()));
            }
        };
        self.lock().permission = Some(permission);
        log::info!("[CAMERA] Access: {:?}", permission);

        if permission == Permission::Denied {
            self.fail(ScanError::PermissionDenied);
        }
        Ok(permission)
    }

    /// Take a photo and upload it.
    ///
    /// Rejected with `Busy` while the camera is already open or an upload
    /// is running. A photo taken while an analysis is running cancels
    /// that analysis. A successful upload clears any previous result so
    /// an old transcription never sits next to a new photo.
    pub async fn capture_photo(&self) -> Result<CaptureReport, ScanError> {
        let permission = {
            let mut inner = self.lock();
            if inner.camera_open || inner.state.in_flight == Some(Operation::Upload) {
                log::warn!("[SCREEN] Capture rejected, previous capture still running");
                return Err(ScanError::Busy);
            }
            if inner.permission == Some(Permission::Granted) {
                inner.camera_open = true;
            }
            inner.permission
        };
        match permission {
            Some(Permission::Granted) => {}
            Some(Permission::Denied) => return Err(self.fail(ScanError::PermissionDenied)),
            None => return Err(self.fail(ScanError::PermissionNotRequested)),
        }

        let outcome = {
            let _open = CameraGuard(&self.inner);
            self.camera.capture(&self.options).await
        };
        let resource: PathBuf = match outcome {
            Ok(CaptureOutcome::Captured(path)) => path,
            Ok(CaptureOutcome::Cancelled) => {
                log::info!("[CAMERA] Capture cancelled");
                return Ok(CaptureReport::Cancelled);
            }
            Err(e) => return Err(self.fail(e.into())),
        };

        let (generation, cancelled) = {
            let mut inner = self.lock();
            match inner.state.in_flight {
                Some(Operation::Upload) => return Err(ScanError::Busy),
                Some(Operation::Analyze) => {
                    log::info!("[SCREEN] New photo supersedes running analysis");
                    inner.cancel_current();
                }
                None => {}
            }
            inner.begin(Operation::Upload)
        };
        let guard = FlightGuard::new(&self.inner, generation);
        log::info!("[UPLOAD] Request {} started", generation);

        let result = run_cancellable(cancelled, self.store.upload(&resource)).await;

        let outcome = {
            let mut inner = self.lock();
            if !guard.finish(&mut inner) {
                log::info!("[UPLOAD] Request {} superseded, result dropped", generation);
                return Err(ScanError::Cancelled);
            }
            match result {
                Ok(url) => {
                    inner.state.image_reference = Some(url.clone());
                    inner.state.recognition_result = None;
                    Ok(url)
                }
                Err(e) => Err(e),
            }
        };

        match outcome {
            Ok(url) => {
                log::info!("[UPLOAD] Image available at {}", url);
                Ok(CaptureReport::Uploaded(url))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Send the uploaded photo for full-document text detection.
    ///
    /// Each call is an independent request; a success replaces the
    /// previous result outright.
    pub async fn submit_for_analysis(&self) -> Result<OcrResponse, ScanError> {
        let image = {
            let inner = self.lock();
            inner.state.image_reference.clone()
        };
        let Some(image) = image else {
            return Err(self.fail(ScanError::NoImage));
        };

        let (generation, cancelled) = {
            let mut inner = self.lock();
            if inner.state.in_flight.is_some() {
                log::warn!("[SCREEN] Analysis rejected, request already running");
                return Err(ScanError::Busy);
            }
            inner.begin(Operation::Analyze)
        };
        let guard = FlightGuard::new(&self.inner, generation);
        log::info!("[OCR] Request {} started for {}", generation, image);

        let result = run_cancellable(cancelled, self.ocr.analyze(image.as_str())).await;

        let outcome = {
            let mut inner = self.lock();
            if !guard.finish(&mut inner) {
                log::info!("[OCR] Request {} superseded, result dropped", generation);
                return Err(ScanError::Cancelled);
            }
            if let Ok(response) = &result {
                inner.state.recognition_result = Some(response.clone());
            }
            result
        };

        outcome.map_err(|e| self.fail(e))
    }

    /// Put the transcription on the clipboard.
    pub fn copy_result_to_clipboard(&self) -> Result<String, ScanError> {
        let text = {
            let inner = self.lock();
            inner.state.transcription().map(str::to_string)
        };
        let Some(text) = text else {
            return Err(self.fail(ScanError::MissingResult));
        };

        if let Err(e) = self.clipboard.set_text(&text) {
            return Err(self.fail(e.into()));
        }
        self.notifier
            .notify(Notice::Info("Copied to clipboard".to_string()));
        Ok(text)
    }

    /// Abort whatever request is in flight. Its completion, whenever it
    /// arrives, is discarded. Returns whether anything was running.
    ///
    /// This is the screen teardown hook: the request futures borrow the
    /// controller, so it cannot be dropped out from under them. An owner
    /// that drops or aborts the future instead is covered by `FlightGuard`.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        if inner.current.is_none() {
            return false;
        }
        log::info!("[SCREEN] Cancelling request {:?}", inner.current);
        inner.cancel_current();
        true
    }
}

//! Shared in-memory collaborators for controller tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use what_text_lib::camera::{Camera, CameraError, CaptureOptions, CaptureOutcome, Permission};
use what_text_lib::clipboard::{Clipboard, ClipboardError};
use what_text_lib::controller::{CaptureController, Notice, Notifier, Phase};
use what_text_lib::storage::{ObjectStore, UploadError, Url};
use what_text_lib::vision::{OcrClient, OcrResponse, RecognitionError};

pub fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

/// A recognition result whose transcription is `text`.
pub fn ocr_result(text: &str) -> OcrResponse {
    let body = serde_json::json!({
        "responses": [{ "textAnnotations": [{ "description": text }] }]
    });
    OcrResponse::parse(&body.to_string()).unwrap()
}

pub fn shot() -> CaptureOutcome {
    CaptureOutcome::Captured(PathBuf::from("/tmp/what-text-test/shot.png"))
}

pub struct FakeCamera {
    pub permission: Permission,
    pub outcomes: Mutex<VecDeque<CaptureOutcome>>,
    pub captures: AtomicUsize,
    pub last_options: Mutex<Option<CaptureOptions>>,
    /// Returned from `request_access` instead of `permission` when set.
    pub access_error: Option<CameraError>,
    /// When set, each capture holds the camera open until one permit arrives.
    pub gate: Option<Arc<Notify>>,
}

#[async_trait]
impl Camera for FakeCamera {
    async fn request_access(&self) -> Result<Permission, CameraError> {
        match &self.access_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.permission),
        }
    }

    async fn capture(&self, options: &CaptureOptions) -> Result<CaptureOutcome, CameraError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(*options);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CaptureOutcome::Cancelled))
    }
}

pub struct FakeStore {
    pub results: Mutex<VecDeque<Result<Url, UploadError>>>,
    pub calls: AtomicUsize,
    /// When set, each upload waits for one permit before answering.
    pub gate: Option<Arc<Notify>>,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(&self, _resource: &Path) -> Result<Url, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(UploadError::Network("no scripted result".to_string())))
    }
}

pub struct FakeOcr {
    pub results: Mutex<VecDeque<Result<OcrResponse, RecognitionError>>>,
    pub urls: Mutex<Vec<String>>,
    pub gate: Option<Arc<Notify>>,
}

impl FakeOcr {
    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }
}

#[async_trait]
impl OcrClient for FakeOcr {
    async fn analyze(&self, image_url: &str) -> Result<OcrResponse, RecognitionError> {
        self.urls.lock().unwrap().push(image_url.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(RecognitionError::Network("no scripted result".to_string())))
    }
}

#[derive(Default)]
pub struct FakeClipboard {
    pub writes: Mutex<Vec<String>>,
}

impl Clipboard for FakeClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter_map(|n| match n {
                Notice::Error(m) => Some(m.clone()),
                Notice::Info(_) => None,
            })
            .collect()
    }
}

/// Scripted behaviour for one test screen.
pub struct Script {
    pub permission: Permission,
    pub access_error: Option<CameraError>,
    pub shots: Vec<CaptureOutcome>,
    pub uploads: Vec<Result<Url, UploadError>>,
    pub analyses: Vec<Result<OcrResponse, RecognitionError>>,
    pub capture_gate: Option<Arc<Notify>>,
    pub upload_gate: Option<Arc<Notify>>,
    pub ocr_gate: Option<Arc<Notify>>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            permission: Permission::Granted,
            access_error: None,
            shots: vec![],
            uploads: vec![],
            analyses: vec![],
            capture_gate: None,
            upload_gate: None,
            ocr_gate: None,
        }
    }
}

pub struct Screen {
    pub controller: Arc<CaptureController>,
    pub camera: Arc<FakeCamera>,
    pub store: Arc<FakeStore>,
    pub ocr: Arc<FakeOcr>,
    pub clipboard: Arc<FakeClipboard>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Screen {
    pub fn new(script: Script) -> Self {
        let camera = Arc::new(FakeCamera {
            permission: script.permission,
            outcomes: Mutex::new(script.shots.into()),
            captures: AtomicUsize::new(0),
            last_options: Mutex::new(None),
            access_error: script.access_error,
            gate: script.capture_gate,
        });
        let store = Arc::new(FakeStore {
            results: Mutex::new(script.uploads.into()),
            calls: AtomicUsize::new(0),
            gate: script.upload_gate,
        });
        let ocr = Arc::new(FakeOcr {
            results: Mutex::new(script.analyses.into()),
            urls: Mutex::new(vec![]),
            gate: script.ocr_gate,
        });
        let clipboard = Arc::new(FakeClipboard::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let controller = Arc::new(CaptureController::new(
            camera.clone(),
            store.clone(),
            ocr.clone(),
            clipboard.clone(),
            notifier.clone(),
        ));

        Self {
            controller,
            camera,
            store,
            ocr,
            clipboard,
            notifier,
        }
    }

    /// Screen with permission already granted.
    pub async fn activated(script: Script) -> Self {
        let screen = Self::new(script);
        screen.controller.request_camera_access().await.unwrap();
        screen
    }

    pub fn uploads(&self) -> usize {
        self.store.calls.load(Ordering::SeqCst)
    }

    pub fn captures(&self) -> usize {
        self.camera.captures.load(Ordering::SeqCst)
    }

    /// Poll until the camera has been opened `n` times.
    pub async fn wait_for_captures(&self, n: usize) {
        for _ in 0..400 {
            if self.captures() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("camera opened {} times, expected {}", self.captures(), n);
    }
}

/// Poll until the controller reaches `phase`.
pub async fn wait_for_phase(controller: &CaptureController, phase: Phase) {
    for _ in 0..400 {
        if controller.state().phase() == phase {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "controller never reached {:?}, stuck in {:?}",
        phase,
        controller.state().phase()
    );
}

//! Screen state owned by the controller.

use crate::storage::Url;
use crate::vision::OcrResponse;

/// Where the screen is in capture → upload → analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Uploading,
    ImageReady,
    Analyzing,
    Analyzed,
}

/// Which request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Analyze,
}

/// Snapshot of what the screen renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState {
    /// URL of the last successfully uploaded photo.
    pub image_reference: Option<Url>,
    pub is_busy: bool,
    /// Replaced wholesale by each successful analysis.
    pub recognition_result: Option<OcrResponse>,
    /// Presentable message from the last failed operation.
    pub last_error: Option<String>,
    pub(crate) in_flight: Option<Operation>,
}

impl ScreenState {
    pub fn phase(&self) -> Phase {
        match (self.in_flight, &self.image_reference, &self.recognition_result) {
            (Some(Operation::Upload), _, _) => Phase::Uploading,
            (Some(Operation::Analyze), _, _) => Phase::Analyzing,
            (None, None, _) => Phase::Idle,
            (None, Some(_), None) => Phase::ImageReady,
            (None, Some(_), Some(_)) => Phase::Analyzed,
        }
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    /// Full-page text of the current result.
    pub fn transcription(&self) -> Option<&str> {
        self.recognition_result.as_ref().map(|r| r.transcription())
    }
}

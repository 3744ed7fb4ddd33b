//! View domain — the upload / preview / loading / result / error state machine.
//!
//! `ViewController` is the single owner of the active candidate, the preview,
//! and the current result or error. Every transition is one method. The
//! preview is an overlay flag independent of the panel state: it can be
//! visible together with Loading, ResultShown or ErrorShown.
//!
//! Async work (preview decoding, the scenario call) happens outside the
//! controller. Each piece of async work is issued a `RequestToken`; results
//! carrying a token older than the latest one are dropped, so a response that
//! arrives after a reset or a newer request cannot overwrite the view.

mod result;

pub use result::{ResultTab, ResultView};

use crate::error::OcrError;
use crate::upload::{FileValidator, Preview, UploadCandidate};
use serde::Serialize;

pub const FALLBACK_ERROR_MESSAGE: &str = "analysis failed, please retry";

/// Identifies one preview load or analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// The mutually exclusive panels.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading,
    ResultShown(ResultView),
    ErrorShown(String),
}

impl ViewState {
    fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading => "loading",
            ViewState::ResultShown(_) => "result",
            ViewState::ErrorShown(_) => "error",
        }
    }
}

/// Serializable view of the controller for the webview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub panel: &'static str,
    pub preview_visible: bool,
    pub preview: Option<Preview>,
    pub has_candidate: bool,
    pub result: Option<ResultView>,
    pub error: Option<String>,
}

pub struct ViewController {
    validator: FileValidator,
    dual_view: bool,
    state: ViewState,
    candidate: Option<UploadCandidate>,
    preview: Option<Preview>,
    latest: u64,
    pending_preview: Option<RequestToken>,
    pending_analysis: Option<RequestToken>,
}

impl ViewController {
    pub fn new(validator: FileValidator, dual_view: bool) -> Self {
        Self {
            validator,
            dual_view,
            state: ViewState::Idle,
            candidate: None,
            preview: None,
            latest: 0,
            pending_preview: None,
            pending_analysis: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn candidate(&self) -> Option<&UploadCandidate> {
        self.candidate.as_ref()
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    pub fn preview_visible(&self) -> bool {
        self.preview.is_some()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let (result, error) = match &self.state {
            ViewState::ResultShown(view) => (Some(view.clone()), None),
            ViewState::ErrorShown(message) => (None, Some(message.clone())),
            _ => (None, None),
        };
        ViewSnapshot {
            panel: self.state.name(),
            preview_visible: self.preview_visible(),
            preview: self.preview.clone(),
            has_candidate: self.candidate.is_some(),
            result,
            error,
        }
    }

    fn next_token(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// A file was picked or dropped.
    ///
    /// On rejection the error panel shows the reason and any previous
    /// candidate stays active. On acceptance the candidate replaces the
    /// previous one and the returned token must accompany the preview load.
    pub fn select(&mut self, candidate: UploadCandidate) -> Result<RequestToken, OcrError> {
        if let Err(reason) = self.validator.validate(&candidate) {
            log::warn!("[VIEW] Rejected {}: {}", candidate.name, reason);
            let error = OcrError::from(reason);
            self.show_error(&error);
            return Err(error);
        }

        log::info!("[VIEW] Selected {} ({} bytes)", candidate.name, candidate.size);
        let token = self.next_token();
        self.candidate = Some(candidate);
        self.preview = None;
        self.pending_preview = Some(token);
        self.pending_analysis = None;
        self.state = ViewState::Idle;
        Ok(token)
    }

    /// Surface a failure that happened before a candidate could be built
    /// (unreadable file, malformed data URI). The active candidate is kept.
    pub fn show_error(&mut self, error: &OcrError) {
        self.state = ViewState::ErrorShown(error_message(error));
    }

    /// The async preview read finished. Returns false if the load was stale.
    ///
    /// Only the preview overlay changes; whatever panel is showing (an
    /// analysis may have started or finished meanwhile) stays.
    pub fn preview_loaded(&mut self, token: RequestToken, preview: Preview) -> bool {
        if self.pending_preview != Some(token) {
            log::debug!("[VIEW] Dropping stale preview {:?}", token);
            return false;
        }
        self.pending_preview = None;
        self.preview = Some(preview);
        true
    }

    /// Analyze was triggered.
    ///
    /// Without an active candidate nothing changes and `NoImageSelected` is
    /// returned, so the caller never reaches the network.
    pub fn begin_analysis(&mut self) -> Result<(RequestToken, UploadCandidate), OcrError> {
        let candidate = self.candidate.clone().ok_or(OcrError::NoImageSelected)?;
        let token = self.next_token();
        self.pending_analysis = Some(token);
        self.state = ViewState::Loading;
        log::info!("[VIEW] Analysis {:?} started for {}", token, candidate.name);
        Ok((token, candidate))
    }

    /// The scenario call finished. Returns false if the outcome was stale.
    pub fn finish_analysis(
        &mut self,
        token: RequestToken,
        outcome: Result<String, OcrError>,
    ) -> bool {
        if self.pending_analysis != Some(token) {
            log::info!("[VIEW] Dropping stale analysis {:?}", token);
            return false;
        }
        self.pending_analysis = None;

        self.state = match outcome {
            Ok(text) => ViewState::ResultShown(ResultView::new(text, self.dual_view)),
            Err(e) => {
                log::error!("[VIEW] Analysis failed: {}", e);
                ViewState::ErrorShown(error_message(&e))
            }
        };
        true
    }

    /// Switch the dual-view tab. Only meaningful while a result is shown.
    pub fn select_tab(&mut self, tab: ResultTab) -> Result<(), OcrError> {
        match &mut self.state {
            ViewState::ResultShown(view) => {
                view.active_tab = tab;
                Ok(())
            }
            _ => Err(OcrError::NoResult),
        }
    }

    /// Text the copy button should place on the clipboard.
    pub fn copy_text(&self) -> Result<String, OcrError> {
        match &self.state {
            ViewState::ResultShown(view) => Ok(view.copy_text().to_string()),
            _ => Err(OcrError::NoResult),
        }
    }

    /// Back to the upload panel. Clears candidate, preview, result and
    /// error, and invalidates any outstanding request.
    pub fn reset(&mut self) {
        log::info!("[VIEW] Reset from {}", self.state.name());
        self.latest += 1;
        self.candidate = None;
        self.preview = None;
        self.pending_preview = None;
        self.pending_analysis = None;
        self.state = ViewState::Idle;
    }
}

/// User-facing message for an error, never empty.
pub fn error_message(error: &OcrError) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

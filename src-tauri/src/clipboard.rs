//! Clipboard access for the copy button.
//!
//! Uses arboard for native clipboard access, which works in webview windows
//! where `navigator.clipboard` is unavailable. A failed copy is not an error
//! for the user: the outcome tells the UI to select the text instead.

use crate::error::OcrError;
use serde::Serialize;

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), OcrError>;
}

/// System clipboard, opened per copy.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), OcrError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| OcrError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| OcrError::Clipboard(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CopyOutcome {
    Copied { chars: usize },
    /// Clipboard refused; the UI should select `text` for manual copy.
    SelectForManualCopy { text: String },
}

/// Put `text` on the clipboard, degrading to manual selection on failure.
pub fn copy_or_select(sink: &mut impl ClipboardSink, text: String) -> CopyOutcome {
    match sink.set_text(&text) {
        Ok(()) => {
            let chars = text.chars().count();
            log::info!("[CLIPBOARD] Copied {} chars", chars);
            CopyOutcome::Copied { chars }
        }
        Err(e) => {
            log::warn!("[CLIPBOARD] Copy failed, falling back to selection: {}", e);
            CopyOutcome::SelectForManualCopy { text }
        }
    }
}

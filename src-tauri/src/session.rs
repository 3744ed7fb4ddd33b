//! Session — the view controller plus the OCR backend it drives.
//!
//! Every user action maps to one async method here. The controller lock is
//! never held across an `.await`: work is started under the lock, the lock is
//! released while the preview decodes or the scenario runs, and the outcome
//! is applied under the lock again (and dropped if it went stale meanwhile).

use crate::clipboard::{copy_or_select, ClipboardSink, CopyOutcome};
use crate::error::OcrError;
use crate::scenario::OcrBackend;
use crate::upload::{self, FileValidator, UploadCandidate};
use crate::view::{ResultTab, ViewController, ViewSnapshot};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct Session<B> {
    view: Mutex<ViewController>,
    backend: B,
}

impl<B: OcrBackend> Session<B> {
    pub fn new(backend: B, validator: FileValidator, dual_view: bool) -> Self {
        Self {
            view: Mutex::new(ViewController::new(validator, dual_view)),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn view(&self) -> MutexGuard<'_, ViewController> {
        // The controller stays consistent between statements, so a panic
        // elsewhere does not invalidate it.
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view().snapshot()
    }

    /// Select an image by path (file picker or drop).
    pub async fn select_path(&self, path: &Path) -> ViewSnapshot {
        let validator = *self.view().validator();
        match UploadCandidate::open(path, &validator).await {
            Ok(candidate) => self.select(candidate).await,
            Err(e) => {
                log::warn!("[VIEW] Could not open {}: {}", path.display(), e);
                let mut view = self.view();
                view.show_error(&e);
                view.snapshot()
            }
        }
    }

    /// Select an image handed over as a `data:` URI.
    pub async fn select_data_uri(&self, name: &str, uri: &str) -> ViewSnapshot {
        match UploadCandidate::from_data_uri(name, uri) {
            Ok(candidate) => self.select(candidate).await,
            Err(e) => {
                let mut view = self.view();
                view.show_error(&e);
                view.snapshot()
            }
        }
    }

    /// Validate, make active, and load the preview.
    pub async fn select(&self, candidate: UploadCandidate) -> ViewSnapshot {
        let selected = self.view().select(candidate.clone());
        let Ok(token) = selected else {
            return self.snapshot();
        };

        let preview = upload::load_preview(&candidate).await;

        let mut view = self.view();
        view.preview_loaded(token, preview);
        view.snapshot()
    }

    /// Run the scenario on the active candidate.
    ///
    /// Fails with `NoImageSelected`, leaving the view untouched, when there
    /// is nothing to analyze. Backend failures land in the error panel.
    pub async fn analyze(&self) -> Result<ViewSnapshot, OcrError> {
        let (token, candidate) = self.view().begin_analysis()?;

        let outcome = self.backend.recognize(&candidate).await;

        let mut view = self.view();
        view.finish_analysis(token, outcome);
        Ok(view.snapshot())
    }

    pub fn select_tab(&self, tab: ResultTab) -> Result<ViewSnapshot, OcrError> {
        let mut view = self.view();
        view.select_tab(tab)?;
        Ok(view.snapshot())
    }

    /// Copy the visible result. Only valid while a result is shown.
    pub fn copy(&self, sink: &mut impl ClipboardSink) -> Result<CopyOutcome, OcrError> {
        let text = self.view().copy_text()?;
        Ok(copy_or_select(sink, text))
    }

    pub fn reset(&self) -> ViewSnapshot {
        let mut view = self.view();
        view.reset();
        view.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::tests::MemoryClipboard;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl OcrBackend for Fixed {
        async fn recognize(&self, _candidate: &UploadCandidate) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(OcrError::Api {
                    status,
                    reason: "Bad Gateway".into(),
                }),
            }
        }
    }

    fn session(reply: Result<&'static str, u16>, dual_view: bool) -> Session<Fixed> {
        Session::new(
            Fixed {
                reply,
                calls: AtomicUsize::new(0),
            },
            FileValidator::default(),
            dual_view,
        )
    }

    fn png_candidate() -> UploadCandidate {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        UploadCandidate::from_bytes("white.png", "image/png", bytes)
    }

    #[tokio::test]
    async fn analyze_idle_does_not_call_backend() {
        let session = session(Ok("unused"), false);
        assert!(matches!(session.analyze().await, Err(OcrError::NoImageSelected)));
        assert_eq!(session.backend().calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.snapshot().panel, "idle");
    }

    #[tokio::test]
    async fn select_analyze_copy_reset() {
        let session = session(Ok("Hello"), false);
        let snapshot = session.select(png_candidate()).await;
        assert!(snapshot.preview_visible);
        assert_eq!(
            snapshot.preview.as_ref().map(|p| (p.width, p.height)),
            Some((Some(2), Some(2)))
        );

        let snapshot = session.analyze().await.unwrap();
        assert_eq!(snapshot.panel, "result");
        assert_eq!(snapshot.result.unwrap().raw, "Hello");

        let mut clipboard = MemoryClipboard::default();
        session.copy(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("Hello"));

        let snapshot = session.reset();
        assert_eq!(snapshot.panel, "idle");
        assert!(!snapshot.has_candidate && !snapshot.preview_visible);
        assert!(session.copy(&mut clipboard).is_err());
    }

    #[tokio::test]
    async fn backend_failure_shows_error_with_preview() {
        let session = session(Err(502), false);
        session.select(png_candidate()).await;
        let snapshot = session.analyze().await.unwrap();
        assert_eq!(snapshot.panel, "error");
        assert!(snapshot.preview_visible);
        assert_eq!(snapshot.error.as_deref(), Some("API error: 502 Bad Gateway"));
    }

    #[tokio::test]
    async fn undecodable_image_can_still_be_analyzed() {
        let session = session(Ok("vector text"), false);
        let svg = UploadCandidate::from_bytes("a.svg", "image/svg+xml", b"<svg/>".to_vec());
        let snapshot = session.select(svg).await;
        assert_eq!(snapshot.panel, "idle");
        assert!(snapshot.has_candidate && snapshot.preview_visible);
        assert_eq!(snapshot.preview.unwrap().width, None);

        let snapshot = session.analyze().await.unwrap();
        assert_eq!(snapshot.result.unwrap().raw, "vector text");
        assert_eq!(session.backend().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bad_data_uri_surfaces_error() {
        let session = session(Ok("unused"), false);
        let snapshot = session.select_data_uri("x.png", "not a uri").await;
        assert_eq!(snapshot.panel, "error");
        assert_eq!(snapshot.error.as_deref(), Some("not a data URI"));
    }

    #[tokio::test]
    async fn dual_view_tab_switch_changes_copy() {
        let session = session(Ok("*hi*"), true);
        session.select(png_candidate()).await;
        session.analyze().await.unwrap();

        let mut clipboard = MemoryClipboard::default();
        session.copy(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("hi"));

        session.select_tab(ResultTab::Raw).unwrap();
        session.copy(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("*hi*"));
    }
}

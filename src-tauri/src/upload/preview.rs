//! Preview loading and optional JPEG normalization.

use super::{data_uri, UploadCandidate};
use crate::error::OcrError;
use image::ImageReader;
use serde::Serialize;
use std::io::Cursor;

/// What the preview panel needs: an inline image source and, when the
/// format is one we can decode, its size.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub name: String,
    pub data_uri: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Read the candidate for on-screen display.
///
/// The data URI is built from the bytes as they are; the webview decides how
/// to show them. Dimensions are read on the blocking pool and left empty for
/// formats this build cannot decode (SVG, TIFF, HEIC, ...), which stay
/// eligible for analysis.
pub async fn load_preview(candidate: &UploadCandidate) -> Preview {
    let start = std::time::Instant::now();
    let data_uri = data_uri::encode(&candidate.mime_type, candidate.bytes());

    let owned = candidate.clone();
    let dimensions = tokio::task::spawn_blocking(move || read_dimensions(owned.bytes()))
        .await
        .unwrap_or_else(|e| {
            log::warn!("[UPLOAD] Dimension probe did not finish: {}", e);
            None
        });

    match dimensions {
        Some((width, height)) => log::info!(
            "[UPLOAD] Preview ready: {}x{} in {}ms",
            width,
            height,
            start.elapsed().as_millis()
        ),
        None => log::info!(
            "[UPLOAD] Preview ready for {} ({}), size unknown",
            candidate.name,
            candidate.mime_type
        ),
    }

    Preview {
        name: candidate.name.clone(),
        data_uri,
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
    }
}

fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dimensions) => Some(dimensions),
        Err(e) => {
            log::debug!("[UPLOAD] Cannot read dimensions: {}", e);
            None
        }
    }
}

/// Re-encode any decodable image as an RGB JPEG at quality 95.
///
/// Alpha and palette images are flattened to RGB first; JPEG has no alpha.
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let start = std::time::Instant::now();
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded.to_rgb8();

    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 95);
    rgb.write_with_encoder(encoder)?;

    log::info!(
        "[UPLOAD] JPEG normalize: {} -> {} bytes in {}ms",
        bytes.len(),
        out.len(),
        start.elapsed().as_millis()
    );
    Ok(out)
}

//! Scenario domain — remote OCR workflow API.
//!
//! Public API:
//!   - config.rs  — deployment configuration (base URL, token, flow)
//!   - client.rs  — the two request flows over reqwest
//!   - extract.rs — reply normalization strategies
//!   - types.rs   — request/reply wire types

pub mod client;
pub mod config;
pub mod extract;
pub mod types;

pub use client::ScenarioClient;
pub use config::{RequestFlow, ScenarioConfig};
pub use extract::{extract_response, ReplyStrategy};

use crate::error::OcrError;
use crate::upload::UploadCandidate;
use std::future::Future;

/// Anything that can turn an image into display text.
///
/// `ScenarioClient` is the real implementation; the session only depends on
/// this trait.
pub trait OcrBackend: Send + Sync {
    fn recognize(
        &self,
        candidate: &UploadCandidate,
    ) -> impl Future<Output = Result<String, OcrError>> + Send;
}

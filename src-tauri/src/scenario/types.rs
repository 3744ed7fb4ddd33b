//! Wire types for the scenario API.
//!
//! Request bodies are owned by this crate; replies are read as loose JSON
//! (see extract.rs) except for the upload reply, which only needs `id`.

use serde::{Deserialize, Serialize};

pub const RESPONSE_MODE_BLOCKING: &str = "blocking";

/// Body of `POST /v1/scenarios/run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest<'a> {
    pub inputs: RunInputs<'a>,
    pub response_mode: &'static str,
    pub user: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunInputs<'a> {
    /// Image inlined as standard base64 without a `data:` prefix.
    Inline { base64: String },
    /// Reference to a previously uploaded file.
    Uploaded { image: UploadedImage<'a> },
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedImage<'a> {
    pub transfer_method: &'static str,
    pub upload_file_id: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl<'a> RunRequest<'a> {
    pub fn inline(base64: String, user: &'a str) -> Self {
        Self {
            inputs: RunInputs::Inline { base64 },
            response_mode: RESPONSE_MODE_BLOCKING,
            user,
        }
    }

    pub fn uploaded(upload_file_id: &'a str, user: &'a str) -> Self {
        Self {
            inputs: RunInputs::Uploaded {
                image: UploadedImage {
                    transfer_method: "local_file",
                    upload_file_id,
                    kind: "image",
                },
            },
            response_mode: RESPONSE_MODE_BLOCKING,
            user,
        }
    }
}

/// Reply of `POST /v1/files/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReply {
    pub id: Option<String>,
}

//! `data:` URI handling for images passed in from the webview.

use crate::error::OcrError;
use base64::Engine;

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Decode a base64 `data:` URI into its MIME type and bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>), OcrError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| OcrError::Format("not a data URI".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| OcrError::Format("data URI has no payload".to_string()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| OcrError::Format("data URI is not base64-encoded".to_string()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| OcrError::Format(format!("invalid base64 payload: {}", e)))?;
    Ok((mime_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mime_and_payload() {
        let (mime, bytes) = decode("data:image/jpeg;base64,QUJD").unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, b"ABC");
    }

    #[test]
    fn rejects_non_base64_uris() {
        assert!(decode("data:text/plain,hello").is_err());
        assert!(decode("image/png;base64,QUJD").is_err());
        assert!(decode("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn encode_matches_decode() {
        let uri = encode("image/gif", b"GIF89a");
        assert!(uri.starts_with("data:image/gif;base64,"));
        assert_eq!(decode(&uri).unwrap().1, b"GIF89a");
    }
}

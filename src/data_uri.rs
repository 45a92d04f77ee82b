//! `data:` URI helpers for generated images.

use crate::{Error, Result};
use base64::Engine as _;

const PNG_HEADER: &str = "data:image/png;base64,";

/// Decoded contents of a base64 `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Prefix a base64 payload with the PNG header. The payload is not
/// re-encoded or validated.
pub fn to_png_data_uri(b64: &str) -> String {
    format!("{}{}", PNG_HEADER, b64)
}

pub fn is_data_uri(url: &str) -> bool {
    url.starts_with("data:")
}

pub fn parse(uri: &str) -> Result<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::DataUri("missing 'data:' scheme".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::DataUri("missing ',' separator".to_string()))?;
    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| Error::DataUri("only base64 payloads are supported".to_string()))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::DataUri(format!("invalid base64 payload: {}", e)))?;

    Ok(DataUri {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_png_data_uri_keeps_payload() {
        assert_eq!(to_png_data_uri("iVBORw=="), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_parse_png_uri() {
        let parsed = parse("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.bytes, vec![0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_parse_rejects_remote_url() {
        let err = parse("https://example.com/a.png").unwrap_err();
        assert!(matches!(err, Error::DataUri(_)));
    }

    #[test]
    fn test_parse_rejects_non_base64() {
        assert!(parse("data:text/plain,hello").is_err());
        assert!(parse("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_is_data_uri() {
        assert!(is_data_uri("data:image/png;base64,AA=="));
        assert!(!is_data_uri("https://example.com/a.png"));
    }
}

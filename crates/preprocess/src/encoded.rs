use crate::error::NormalizeError;
use crate::raw::RawImage;
use base64::{Engine, engine::general_purpose::STANDARD};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Wrap the raw bytes in a self-describing `data:<mime>;base64,` URI.
///
/// No decoding or resizing happens here; the receiving service owns that.
pub fn to_data_uri(raw: &RawImage) -> Result<String, NormalizeError> {
    if raw.is_empty() {
        return Err(NormalizeError::Decode("image payload is empty".into()));
    }

    let mime = match raw.mime_type().trim() {
        "" => FALLBACK_MIME,
        declared => declared,
    };

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(raw.bytes())))
}

/// Parse a data URI (or a bare base64 payload) back into a [`RawImage`].
///
/// Anything up to the first comma is treated as the header. Without a
/// header the MIME type is sniffed from the decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<RawImage, NormalizeError> {
    let uri = uri.trim();

    let (declared_mime, payload) = match uri.split_once(',') {
        Some((header, payload)) => (parse_header(header)?, payload),
        None => (None, uri),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| NormalizeError::Decode(format!("invalid base64 payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(NormalizeError::Decode("image payload is empty".into()));
    }

    let mime = declared_mime.unwrap_or_else(|| {
        image::guess_format(&bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| FALLBACK_MIME.to_string())
    });

    Ok(RawImage::new(bytes, mime))
}

fn parse_header(header: &str) -> Result<Option<String>, NormalizeError> {
    let Some(meta) = header.strip_prefix("data:") else {
        // Not a data URI header; mirror lenient clients and keep the payload.
        return Ok(None);
    };

    let mut parts = meta.split(';');
    let mime = parts.next().unwrap_or_default().trim();

    if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(NormalizeError::Decode(
            "only base64 data URIs are supported".into(),
        ));
    }

    Ok((!mime.is_empty()).then(|| mime.to_string()))
}

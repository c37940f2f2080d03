/// `data:` URL encoding for self-contained card pictures

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::MediaError;

/// Decoded payload of a `data:` URL
#[derive(Debug, Clone, PartialEq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn is_data_url(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// Build `data:<mime>;base64,<payload>`
pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Parse a `data:` URL, base64 or percent-encoded
pub fn decode(url: &str) -> Result<DataUrl, MediaError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::InvalidDataUrl("missing data: prefix".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::InvalidDataUrl("missing payload separator".into()))?;

    let mut parts = header.split(';');
    let mime = match parts.next() {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| MediaError::InvalidDataUrl(e.to_string()))?
    } else {
        percent_decode(payload)?
    };

    Ok(DataUrl { mime, bytes })
}

/// MIME type of an encoded picture, from its magic bytes
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn percent_decode(input: &str) -> Result<Vec<u8>, MediaError> {
    let raw = input.as_bytes();
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let hex = raw
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| MediaError::InvalidDataUrl(format!("bad escape at byte {i}")))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    Ok(out)
}

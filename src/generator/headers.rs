//! Response header rewriting shared by both pipelines

use crate::models::UpstreamHeaders;

/// Prefix prepended to the upstream filename
pub const FILENAME_PREFIX: &str = "(. Y .) ";

/// A parsed `Content-Disposition` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDisposition {
    pub disposition_type: Option<String>,
    pub filename: Option<String>,
}

impl ContentDisposition {
    /// Parse a `Content-Disposition` header value.
    ///
    /// `filename*` (RFC 5987) takes precedence over a plain `filename`.
    pub fn parse(header: &str) -> Self {
        let mut parts = split_params(header).into_iter();
        let disposition_type = parts
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.contains('='))
            .map(str::to_string);

        let mut filename = None;
        let mut extended_filename = None;
        for part in parts {
            let Some((name, value)) = part.split_once('=') else {
                continue;
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "filename" => filename = Some(unquote(value.trim())),
                "filename*" => extended_filename = decode_extended(value.trim()),
                _ => {}
            }
        }

        ContentDisposition {
            disposition_type,
            filename: extended_filename.or(filename),
        }
    }

    /// Render the header value, or `None` unless both type and filename are known
    pub fn to_header(&self) -> Option<String> {
        let disposition_type = self.disposition_type.as_deref()?;
        let filename = self.filename.as_deref()?;
        if filename.is_ascii() {
            let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
            Some(format!("{}; filename=\"{}\"", disposition_type, escaped))
        } else {
            Some(format!(
                "{}; filename*=UTF-8''{}",
                disposition_type,
                urlencoding::encode(filename)
            ))
        }
    }
}

/// Split on `;` outside of double quoted strings
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in header.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

fn unquote(value: &str) -> String {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    inner.replace("\\\"", "\"").replace("\\\\", "\\")
}

fn decode_extended(value: &str) -> Option<String> {
    // charset'language'percent-encoded
    let mut pieces = value.splitn(3, '\'');
    let charset = pieces.next()?;
    let _language = pieces.next()?;
    let encoded = pieces.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}

/// Build the outgoing `Content-Disposition` with the decorated filename
pub fn rename_attachment(upstream: &UpstreamHeaders) -> Option<String> {
    let disposition_type = upstream.content_disposition_type.as_ref()?;
    let filename = upstream.content_disposition_filename.as_ref()?;
    ContentDisposition {
        disposition_type: Some(disposition_type.clone()),
        filename: Some(format!("{}{}", FILENAME_PREFIX, filename)),
    }
    .to_header()
}

//! Request path sanitisation.

use percent_encoding::percent_decode_str;

use crate::ResolveError;

/// A percent-decoded request path split into safe segments.
///
/// Empty and `.` segments are dropped. Construction through [`sanitize`]
/// guarantees no segment is `..` or contains a separator or NUL byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
}

impl RequestPath {
    /// Decoded path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments after `prefix` when the path lies under it.
    ///
    /// Matching is per segment, so `public` does not match `publicity`.
    pub fn strip_prefix(&self, prefix: &[String]) -> Option<&[String]> {
        self.segments.strip_prefix(prefix)
    }
}

/// Decode and validate a URL path.
///
/// # Errors
///
/// Returns [`ResolveError::Malformed`] for traversal segments, backslashes,
/// NUL bytes, encoded slashes, `%` not followed by two hex digits, or
/// percent-escapes that do not decode to UTF-8.
pub fn sanitize(path: &str) -> Result<RequestPath, ResolveError> {
    let mut segments = Vec::new();

    for raw in path.split('/') {
        if !has_valid_escapes(raw) {
            return Err(ResolveError::Malformed(format!(
                "{path}: invalid percent-encoding"
            )));
        }

        let decoded = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|_| ResolveError::Malformed(format!("{path}: not valid UTF-8")))?;

        match decoded.as_ref() {
            "" | "." => {}
            ".." => {
                return Err(ResolveError::Malformed(format!(
                    "{path}: parent directory segment"
                )));
            }
            segment if segment.contains(['/', '\\', '\0']) => {
                return Err(ResolveError::Malformed(format!(
                    "{path}: invalid character in segment"
                )));
            }
            segment => segments.push(segment.to_owned()),
        }
    }

    Ok(RequestPath { segments })
}

/// Every `%` must start a two-hex-digit escape.
fn has_valid_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

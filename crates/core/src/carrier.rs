//! Carrier attachment: hide a payload at the end of an arbitrary file.
//!
//! The carrier (typically an image) is never parsed; it is an opaque prefix.
//! Viewers stop reading at the end of their own format and ignore the tail.
//!
//! # Attachment Format
//!
//! ```text
//! carrier || MARKER || payload || payload_len (u64 little-endian)
//! ```
//!
//! # Extraction
//!
//! 1. If the trailer length points back at a `MARKER` sitting right before
//!    that many payload bytes, the payload is exactly those bytes. This holds
//!    even when the payload itself contains `MARKER`.
//! 2. Otherwise the rightmost `MARKER` wins and everything after it is the
//!    payload. Rightmost tolerates a marker-shaped run inside the carrier.
//! 3. No `MARKER` at all is `MarkerNotFound`.

use crate::error::{CarrierError, Result};
use std::path::Path;

/// Reserved token between the carrier and the payload.
///
/// The leading `\x89`, CR LF and `\x1a` keep it out of text carriers.
pub const MARKER: &[u8] = b"\x89CATC\r\n\x1a\n-PAYLOAD-";

/// Size of the payload length trailer.
const TRAILER_SIZE: usize = 8;

/// Append `payload` to `carrier` behind [`MARKER`].
pub fn attach(carrier: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(carrier.len() + MARKER.len() + payload.len() + TRAILER_SIZE);
    out.extend_from_slice(carrier);
    out.extend_from_slice(MARKER);
    out.extend_from_slice(payload);
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out
}

/// Recover the payload appended by [`attach`].
///
/// # Errors
/// `CarrierError::MarkerNotFound` if `combined` holds no marker.
pub fn extract(combined: &[u8]) -> Result<&[u8]> {
    if let Some(payload) = extract_by_trailer(combined) {
        return Ok(payload);
    }

    let start = rfind(combined, MARKER).ok_or(CarrierError::MarkerNotFound)?;
    log::debug!("no length trailer; using rightmost marker at offset {start}");
    Ok(&combined[start + MARKER.len()..])
}

fn extract_by_trailer(combined: &[u8]) -> Option<&[u8]> {
    let trailer_at = combined.len().checked_sub(TRAILER_SIZE)?;
    let len = u64::from_le_bytes(combined[trailer_at..].try_into().ok()?);
    let len = usize::try_from(len).ok()?;

    let payload_at = trailer_at.checked_sub(len)?;
    let marker_at = payload_at.checked_sub(MARKER.len())?;

    if &combined[marker_at..payload_at] != MARKER {
        return None;
    }
    Some(&combined[payload_at..trailer_at])
}

/// Start of the last occurrence of `needle` in `haystack`.
fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Read `carrier_path`, attach `payload`, write the result to `output_path`.
///
/// # Errors
/// `Error::Io` if the carrier cannot be read or the output written.
pub fn attach_file(carrier_path: &Path, payload: &[u8], output_path: &Path) -> Result<()> {
    let carrier = std::fs::read(carrier_path)?;
    let combined = attach(&carrier, payload);
    std::fs::write(output_path, &combined)?;

    log::debug!(
        "attached {} bytes to {} ({} bytes) -> {}",
        payload.len(),
        carrier_path.display(),
        carrier.len(),
        output_path.display()
    );
    Ok(())
}

/// Read a carrier file and return its attached payload.
///
/// # Errors
/// `Error::Io` on read failure, `CarrierError::MarkerNotFound` if nothing
/// is attached.
pub fn extract_file(path: &Path) -> Result<Vec<u8>> {
    let combined = std::fs::read(path)?;
    Ok(extract(&combined)?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SEPARATOR;
    use crate::error::Error;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR";

    #[test]
    fn test_attach_extract_round_trip() {
        let combined = attach(PNG_HEADER, b"payload bytes");
        assert!(combined.starts_with(PNG_HEADER));
        assert_eq!(extract(&combined).unwrap(), b"payload bytes");
    }

    #[test]
    fn test_marker_distinct_from_separator() {
        assert_ne!(MARKER, SEPARATOR.as_slice());
    }

    #[test]
    fn test_marker_not_found() {
        let result = extract(PNG_HEADER);
        assert!(matches!(
            result,
            Err(Error::Carrier(CarrierError::MarkerNotFound))
        ));
        assert!(result.unwrap_err().is_marker_not_found());
        assert!(extract(b"").is_err());
    }

    #[test]
    fn test_empty_payload_and_carrier() {
        assert_eq!(extract(&attach(b"", b"")).unwrap(), b"");
        assert_eq!(extract(&attach(PNG_HEADER, b"")).unwrap(), b"");
        assert_eq!(extract(&attach(b"", b"p")).unwrap(), b"p");
    }

    #[test]
    fn test_payload_containing_marker() {
        let mut payload = b"head".to_vec();
        payload.extend_from_slice(MARKER);
        payload.extend_from_slice(b"tail");
        payload.extend_from_slice(MARKER);

        let combined = attach(PNG_HEADER, &payload);
        assert_eq!(extract(&combined).unwrap(), payload.as_slice());
    }

    #[test]
    fn test_carrier_containing_marker() {
        let mut carrier = PNG_HEADER.to_vec();
        carrier.extend_from_slice(MARKER);
        carrier.extend_from_slice(b"more image data");

        let combined = attach(&carrier, b"payload");
        assert_eq!(extract(&combined).unwrap(), b"payload");
    }

    #[test]
    fn test_without_trailer_uses_rightmost_marker() {
        let mut combined = PNG_HEADER.to_vec();
        combined.extend_from_slice(MARKER);
        combined.extend_from_slice(b"early");
        combined.extend_from_slice(MARKER);
        combined.extend_from_slice(b"legacy payload");

        assert_eq!(extract(&combined).unwrap(), b"legacy payload");
    }

    #[test]
    fn test_attach_extract_files() {
        let dir = tempfile::tempdir().unwrap();
        let carrier_path = dir.path().join("cat.png");
        let output_path = dir.path().join("out.png");
        std::fs::write(&carrier_path, PNG_HEADER).unwrap();

        attach_file(&carrier_path, b"secret", &output_path).unwrap();
        assert_eq!(extract_file(&output_path).unwrap(), b"secret");
        assert!(matches!(extract_file(&carrier_path), Err(Error::Carrier(_))));
        assert!(matches!(
            extract_file(&dir.path().join("missing.png")),
            Err(Error::Io(_))
        ));
    }
}

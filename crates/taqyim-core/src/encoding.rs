//! Character-encoding recovery for legacy text uploads.
//!
//! Files from the older annotation tooling arrive with no declared encoding;
//! a byte-frequency detector makes the first guess and a fixed ladder of
//! Arabic code pages covers the rest.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, ISO_8859_6, UTF_8, WINDOWS_1256};

use crate::error::{CoreError, Result};

/// Decode raw bytes, trying the detected encoding first, then UTF-8, then
/// the legacy Arabic code pages, until one decodes cleanly.
pub fn decode_text(bytes: &[u8], filename: &str) -> Result<String> {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);

    let mut ladder: Vec<&'static Encoding> = Vec::with_capacity(4);
    for encoding in [guess, UTF_8, WINDOWS_1256, ISO_8859_6] {
        if !ladder.contains(&encoding) {
            ladder.push(encoding);
        }
    }

    for encoding in ladder {
        if let Some(decoded) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return Ok(decoded.into_owned());
        }
    }

    Err(CoreError::Encoding {
        filename: filename.to_string(),
    })
}

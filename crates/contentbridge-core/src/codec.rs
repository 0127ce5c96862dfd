// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Identifier codec: normalises user-facing resource strings so the final
// path segment carries exactly one layer of percent-encoding.

use crate::types::ResourceIdentifier;

/// Canonicalise a raw resource string.
///
/// The string is split at its last `/`. The prefix (separator included) is
/// kept verbatim; the trailing segment is percent-decoded and re-encoded.
/// Identifiers from a document picker may arrive encoded, half-encoded, or
/// not encoded at all, and all of them end up in the same form.
///
/// Malformed escapes are left alone by the decoder, so `100%.txt` becomes
/// `100%25.txt` rather than an error.
pub fn canonicalize(raw: &str) -> ResourceIdentifier {
    let split = raw.rfind('/').map_or(0, |idx| idx + 1);
    let (prefix, segment) = raw.split_at(split);

    let decoded = urlencoding::decode_binary(segment.as_bytes());
    let encoded = urlencoding::encode_binary(&decoded);

    ResourceIdentifier::from_canonical(format!("{prefix}{encoded}"))
}

/// Recover a local filesystem path from an identifier.
///
/// A `file://` URL is percent-decoded as a whole, scheme stripped. A bare
/// path keeps its directories verbatim, matching `canonicalize`, and only
/// the final segment is decoded. Invalid UTF-8 produced by decoding is
/// replaced lossily.
pub fn decode_path(id: &ResourceIdentifier) -> String {
    let raw = id.as_str();
    if let Some(url_path) = raw.strip_prefix("file://") {
        return decode_lossy(url_path);
    }

    let split = raw.rfind('/').map_or(0, |idx| idx + 1);
    let (prefix, segment) = raw.split_at(split);
    format!("{prefix}{}", decode_lossy(segment))
}

fn decode_lossy(encoded: &str) -> String {
    let decoded = urlencoding::decode_binary(encoded.as_bytes());
    String::from_utf8_lossy(&decoded).into_owned()
}

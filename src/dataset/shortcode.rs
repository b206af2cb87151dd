//! Numeric media id → URL shortcode.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

/// Largest id that fits the 9-byte encoding.
pub const MAX_MEDIA_ID: u128 = (1u128 << 72) - 1;

/// Convert a numeric media id into its shortcode.
///
/// The id is written as 9 big-endian bytes, encoded with the URL-safe base64
/// alphabet, and leading `A` characters (encoded zero bits) are dropped.
/// Returns `None` for ids wider than 72 bits.
pub fn id_to_shortcode(media_id: u128) -> Option<String> {
    if media_id > MAX_MEDIA_ID {
        return None;
    }
    let bytes = media_id.to_be_bytes();
    let encoded = URL_SAFE.encode(&bytes[bytes.len() - 9..]);
    Some(encoded.trim_start_matches('A').to_string())
}

/// Extract the media id from a downloaded file name such as `2616109190035207246.jpg`.
pub fn media_id_from_filename(file_name: &str) -> Option<u128> {
    let stem = file_name.split('.').next()?;
    stem.parse().ok()
}

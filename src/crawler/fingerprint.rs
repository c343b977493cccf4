use sha2::{Digest, Sha256};

/// Computes the content fingerprint of a page text or asset body
///
/// Returns 64 lowercase hex characters.
///
/// # Example
///
/// ```
/// use llms_txt_monitor::crawler::sha256_hex;
///
/// assert_eq!(
///     sha256_hex("test"),
///     "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
/// );
/// ```
pub fn sha256_hex(content: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(content.as_ref()))
}

// Fingerprints for generated narration artifacts.

use sha2::{Digest, Sha256};

// Domain separation constant so narration fingerprints never collide with other digests.
const NARRATION_DOMAIN: &[u8] = b"PRODNARR";

/// Fingerprint of everything that determines a narration artifact's audio.
///
/// Fields are length-prefixed so `("ab", "c")` and `("a", "bc")` hash differently.
pub fn narration_fingerprint(voice: Option<&str>, language: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(NARRATION_DOMAIN);
    for field in [voice.unwrap_or(""), language, text] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

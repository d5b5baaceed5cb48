use crate::cipher::aes128_ecb_decrypt;
use crate::error::{NcmError, Result};

/// AES key unwrapping the stream-cipher key block. Fixed for the format.
const CORE_KEY: [u8; 16] = [
    0x68, 0x7A, 0x48, 0x52, 0x41, 0x6D, 0x73, 0x6F, 0x35, 0x6B, 0x49, 0x6E, 0x62, 0x61, 0x78, 0x57,
];

/// XOR constant applied to the key block before AES decryption.
const KEY_XOR: u8 = 0x64;

/// Plaintext prefix preceding the raw stream-cipher key.
const KEY_PREFIX: &[u8] = b"neteasecloudmusic";

/// Raw stream-cipher key recovered from the container's key block.
///
/// Produced once per file and only ever borrowed by the keystream schedule.
/// Intentionally carries no `Debug` impl beyond the derived struct name: the
/// key bytes are never logged or persisted.
pub struct UnwrappedKey(Vec<u8>);

impl UnwrappedKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Recover the stream-cipher key from the encrypted key block.
///
/// The block is XORed with a fixed constant, AES-128-ECB decrypted under the
/// format's compiled-in key, and stripped of its known plaintext prefix.
pub fn unwrap_key(block: &[u8]) -> Result<UnwrappedKey> {
    if block.is_empty() {
        return Err(NcmError::KeyRecovery("empty key block".into()));
    }

    let mut data = block.to_vec();
    for b in &mut data {
        *b ^= KEY_XOR;
    }

    let plain = aes128_ecb_decrypt(&CORE_KEY, &data)
        .map_err(|e| NcmError::KeyRecovery(e.to_string()))?;

    if !plain.starts_with(KEY_PREFIX) {
        return Err(NcmError::KeyRecovery("missing key prefix".into()));
    }
    let key = plain[KEY_PREFIX.len()..].to_vec();
    if key.is_empty() {
        return Err(NcmError::KeyRecovery("zero-length key".into()));
    }

    Ok(UnwrappedKey(key))
}

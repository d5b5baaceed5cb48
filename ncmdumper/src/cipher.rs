use aes::Aes128;
use ecb::cipher::{BlockDecryptMut, KeyInit, block_padding::Pkcs7};

use crate::error::{NcmError, Result};

type Aes128EcbDec = ecb::Decryptor<Aes128>;

/// AES-128-ECB decrypt with PKCS#7 unpadding.
pub fn aes128_ecb_decrypt(key: &[u8; 16], data: &[u8]) -> Result<Vec<u8>> {
    let mut buf = data.to_vec();
    Aes128EcbDec::new(key.into())
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map(<[u8]>::to_vec)
        .map_err(|e| NcmError::Decrypt(e.to_string()))
}

/// Substitution table driving the audio-stream decryption.
///
/// Built once per file from the unwrapped key by the standard RC4 key
/// schedule. The per-byte transform is a pure function of the byte position
/// and this table, so buffers can be processed in chunks of any size.
pub struct Keystream {
    sbox: [u8; 256],
}

impl Keystream {
    /// Run the swap-based key schedule over `key`, cycling through its bytes.
    #[allow(clippy::cast_possible_truncation)]
    pub fn schedule(key: &[u8]) -> Self {
        let mut sbox = [0u8; 256];
        for (i, slot) in sbox.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let key_len = key.len();
        let mut j: u8 = 0;
        for i in 0..256 {
            let swap = sbox[i];
            j = j.wrapping_add(swap).wrapping_add(key[i % key_len]);
            sbox[i] = sbox[j as usize];
            sbox[j as usize] = swap;
        }

        Self { sbox }
    }

    /// Keystream byte for the plaintext position `pos` (0-based).
    #[inline]
    pub fn byte_at(&self, pos: usize) -> u8 {
        let j = (pos + 1) & 0xff;
        let a = self.sbox[j] as usize;
        self.sbox[(a + self.sbox[(a + j) & 0xff] as usize) & 0xff]
    }

    /// XOR `buf` in place against the keystream, treating its first byte as
    /// stream position `start`.
    pub fn apply(&self, buf: &mut [u8], start: usize) {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte ^= self.byte_at(start + i);
        }
    }
}

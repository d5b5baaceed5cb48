//! Shared helpers: a synthetic NCM container builder that reverses the
//! decoder's steps, minimal-but-valid audio payloads, and scratch dirs.

#![allow(dead_code)] // shared across multiple test binaries

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::{env, fs};

use aes::Aes128;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ecb::cipher::{BlockEncryptMut, KeyInit, block_padding::Pkcs7};

type Aes128EcbEnc = ecb::Encryptor<Aes128>;

// Format constants, restated here so the tests do not depend on the
// decoder's internals.
const NCM_MAGIC: [u8; 8] = *b"CTENFDAM";
const CORE_KEY: [u8; 16] = [
    0x68, 0x7A, 0x48, 0x52, 0x41, 0x6D, 0x73, 0x6F, 0x35, 0x6B, 0x49, 0x6E, 0x62, 0x61, 0x78, 0x57,
];
const META_KEY: [u8; 16] = [
    0x23, 0x31, 0x34, 0x6C, 0x6A, 0x6B, 0x5F, 0x21, 0x5C, 0x5D, 0x26, 0x30, 0x55, 0x3C, 0x27, 0x28,
];
const KEY_PREFIX: &[u8] = b"neteasecloudmusic";
const META_LABEL: &[u8] = b"163 key(Don't modify):";

fn aes128_ecb_encrypt(key: &[u8; 16], plain: &[u8]) -> Vec<u8> {
    let len = plain.len();
    let mut buf = plain.to_vec();
    buf.resize(len + 16, 0);
    Aes128EcbEnc::new(key.into())
        .encrypt_padded_mut::<Pkcs7>(&mut buf, len)
        .unwrap()
        .to_vec()
}

/// Independent reimplementation of the stream transform, used to encrypt the
/// synthetic audio tail (the XOR keystream is its own inverse).
fn stream_xor(key: &[u8], data: &mut [u8]) {
    let mut sbox = [0u8; 256];
    for (i, slot) in sbox.iter_mut().enumerate() {
        *slot = i as u8;
    }
    let mut j: u8 = 0;
    for i in 0..256 {
        let swap = sbox[i];
        j = j.wrapping_add(swap).wrapping_add(key[i % key.len()]);
        sbox[i] = sbox[j as usize];
        sbox[j as usize] = swap;
    }

    for (pos, byte) in data.iter_mut().enumerate() {
        let idx = (pos + 1) & 0xff;
        let a = sbox[idx] as usize;
        *byte ^= sbox[(a + sbox[(a + idx) & 0xff] as usize) & 0xff];
    }
}

pub struct ContainerBuilder {
    audio: Vec<u8>,
    rc4_key: Vec<u8>,
    key_prefix: Vec<u8>,
    metadata_block: Vec<u8>,
    cover: Vec<u8>,
    cover_lengths: Option<(u32, u32)>,
}

impl ContainerBuilder {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            rc4_key: b"synthetic stream key 01".to_vec(),
            key_prefix: KEY_PREFIX.to_vec(),
            metadata_block: Vec::new(),
            cover: Vec::new(),
            cover_lengths: None,
        }
    }

    pub fn rc4_key(mut self, key: &[u8]) -> Self {
        self.rc4_key = key.to_vec();
        self
    }

    /// Encode the given JSON object as a proper metadata block.
    pub fn metadata_json(mut self, json: &[u8]) -> Self {
        let mut plain = b"music:".to_vec();
        plain.extend_from_slice(json);
        let encrypted = aes128_ecb_encrypt(&META_KEY, &plain);

        let mut block = META_LABEL.to_vec();
        block.extend_from_slice(BASE64.encode(&encrypted).as_bytes());
        for b in &mut block {
            *b ^= 0x63;
        }
        self.metadata_block = block;
        self
    }

    /// Use the given bytes verbatim as the metadata block (for corruption
    /// scenarios).
    pub fn raw_metadata(mut self, block: Vec<u8>) -> Self {
        self.metadata_block = block;
        self
    }

    pub fn cover(mut self, image: &[u8]) -> Self {
        self.cover = image.to_vec();
        self
    }

    /// Override the cover frame/image length fields without providing bytes.
    pub fn cover_lengths(mut self, frame_len: u32, image_len: u32) -> Self {
        self.cover_lengths = Some((frame_len, image_len));
        self
    }

    /// Wrap the stream key under a wrong plaintext prefix.
    pub fn bad_key_prefix(mut self) -> Self {
        self.key_prefix = b"somethingelseentirely".to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = NCM_MAGIC.to_vec();
        out.extend_from_slice(&[0, 0]); // gap

        // Key block: prefix + key, AES under the core key, then XOR 0x64.
        let mut key_plain = self.key_prefix.clone();
        key_plain.extend_from_slice(&self.rc4_key);
        let mut key_block = aes128_ecb_encrypt(&CORE_KEY, &key_plain);
        for b in &mut key_block {
            *b ^= 0x64;
        }
        out.extend_from_slice(&u32_le(key_block.len()));
        out.extend_from_slice(&key_block);

        // Metadata block (possibly empty).
        out.extend_from_slice(&u32_le(self.metadata_block.len()));
        out.extend_from_slice(&self.metadata_block);

        // CRC + gap, both ignored by the decoder.
        out.extend_from_slice(&[0, 0, 0, 0, 0]);

        // Cover frame.
        if let Some((frame_len, image_len)) = self.cover_lengths {
            out.extend_from_slice(&frame_len.to_le_bytes());
            out.extend_from_slice(&image_len.to_le_bytes());
        } else {
            out.extend_from_slice(&u32_le(self.cover.len()));
            out.extend_from_slice(&u32_le(self.cover.len()));
            out.extend_from_slice(&self.cover);
        }

        // Audio tail.
        let mut cipher = self.audio;
        stream_xor(&self.rc4_key, &mut cipher);
        out.extend_from_slice(&cipher);
        out
    }

    /// Build and write to `<dir>/<name>`.
    pub fn write_to(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.build()).unwrap();
        path
    }
}

#[allow(clippy::cast_possible_truncation)]
fn u32_le(n: usize) -> [u8; 4] {
    (n as u32).to_le_bytes()
}

/// A minimal MPEG stream: three valid 417-byte MPEG-1 Layer III frames
/// (128 kbps, 44.1 kHz), enough for the tag writer to operate on.
pub fn mp3_payload() -> Vec<u8> {
    let mut frame = vec![0xFF, 0xFB, 0x90, 0x00];
    frame.resize(417, 0);
    let mut out = Vec::new();
    for _ in 0..3 {
        out.extend_from_slice(&frame);
    }
    out
}

/// A minimal FLAC stream: `fLaC` marker plus a last-block STREAMINFO
/// (4096-sample blocks, 44.1 kHz, stereo, 16-bit) and a dummy frame sync.
pub fn flac_payload() -> Vec<u8> {
    let mut out = b"fLaC".to_vec();
    out.push(0x80); // last metadata block, type STREAMINFO
    out.extend_from_slice(&[0x00, 0x00, 0x22]); // length 34
    out.extend_from_slice(&[0x10, 0x00]); // min blocksize
    out.extend_from_slice(&[0x10, 0x00]); // max blocksize
    out.extend_from_slice(&[0x00, 0x00, 0x00]); // min framesize
    out.extend_from_slice(&[0x00, 0x00, 0x00]); // max framesize
    // 44100 Hz (20 bits), 2 channels, 16 bps, 0 total samples
    out.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&[0u8; 16]); // MD5
    out.extend_from_slice(&[0xFF, 0xF8, 0x00, 0x00]); // frame sync filler
    out
}

/// Tiny JPEG-looking blob for cover tests.
pub fn jpeg_cover() -> Vec<u8> {
    let mut img = vec![0xFF, 0xD8, 0xFF, 0xE0];
    img.extend_from_slice(b"fake jpeg body");
    img.extend_from_slice(&[0xFF, 0xD9]);
    img
}

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

/// Scratch directory under the system temp dir, removed on drop.
pub struct TestDir(PathBuf);

impl TestDir {
    pub fn new(label: &str) -> Self {
        let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = env::temp_dir().join(format!(
            "ncmdumper-test-{label}-{}-{seq}",
            std::process::id()
        ));
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

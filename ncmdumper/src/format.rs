/// FLAC stream marker.
const FLAC_MAGIC: [u8; 4] = *b"fLaC";

/// ID3v2 header prefix carried by most MP3 payloads.
const ID3_MAGIC: [u8; 3] = *b"ID3";

/// Audio container recognized inside a decrypted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Flac,
}

impl AudioFormat {
    /// Classify the decrypted payload by its magic prefix.
    ///
    /// MP3 is recognized either by an ID3v2 header or a bare MPEG frame sync;
    /// FLAC by the `fLaC` marker. Anything else is unknown, which usually
    /// means the input was not an NCM file or the key unwrap silently
    /// produced garbage.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&FLAC_MAGIC) {
            return Some(Self::Flac);
        }
        if data.starts_with(&ID3_MAGIC) {
            return Some(Self::Mp3);
        }
        // MPEG frame sync: 11 set bits.
        if data.len() >= 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0 {
            return Some(Self::Mp3);
        }
        None
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
        }
    }
}

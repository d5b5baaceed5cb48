use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::container::NcmContainer;
use crate::error::NcmError;
use crate::format::AudioFormat;
use crate::tag::TagStrategy;

/// Stable, ordinal dump result codes. The only values crossing the core
/// boundary; the FFI layer returns them verbatim.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpCode {
    Success = 0,
    InvalidInputFile = 1,
    InvalidOutputFolder = 2,
    NotAnNcmFile = 3,
    UnknownAudioFormat = 4,
    MetadataReadFailed = 5,
    CoverReadFailed = 6,
    AudioDecryptFailed = 7,
    SaveFailed = 8,
}

impl DumpCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Stable name for user-facing reporting.
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InvalidInputFile => "InvalidInputFile",
            Self::InvalidOutputFolder => "InvalidOutputFolder",
            Self::NotAnNcmFile => "NotAnNcmFile",
            Self::UnknownAudioFormat => "UnknownAudioFormat",
            Self::MetadataReadFailed => "MetadataReadFailed",
            Self::CoverReadFailed => "CoverReadFailed",
            Self::AudioDecryptFailed => "AudioDecryptFailed",
            Self::SaveFailed => "SaveFailed",
        }
    }
}

/// Outcome of a single dump operation.
///
/// `output` is `Some` whenever a file was written, which includes the soft
/// failure codes `MetadataReadFailed` and `CoverReadFailed`: those proceed
/// best-effort with the field missing and still produce playable output.
#[derive(Debug)]
pub struct DumpOutcome {
    pub code: DumpCode,
    pub output: Option<PathBuf>,
}

impl DumpOutcome {
    fn fail(code: DumpCode) -> Self {
        Self { code, output: None }
    }

    pub fn wrote_output(&self) -> bool {
        self.output.is_some()
    }
}

/// Options for a dump operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpOptions {
    /// Name the output `<artists> - <title>.<ext>` when metadata is available
    /// instead of reusing the input file stem.
    pub titled_output: bool,
}

/// Convert one NCM file, writing the result into `output_dir`.
///
/// Never panics and never returns an error type: every path folds into a
/// `DumpCode`. The output file name is the input stem with the extension
/// replaced by the sniffed container's.
pub fn dump(input: &Path, output_dir: &Path) -> DumpOutcome {
    dump_with(input, output_dir, DumpOptions::default())
}

/// `dump` with explicit options.
pub fn dump_with(input: &Path, output_dir: &Path, options: DumpOptions) -> DumpOutcome {
    // Cheap validation first; nothing is decrypted until both paths check out.
    let Ok(bytes) = fs::read(input) else {
        return DumpOutcome::fail(DumpCode::InvalidInputFile);
    };
    if !validate_output_dir(output_dir) {
        return DumpOutcome::fail(DumpCode::InvalidOutputFolder);
    }

    let mut ncm = match NcmContainer::parse(bytes) {
        Ok(ncm) => ncm,
        Err(NcmError::InvalidMagic) => return DumpOutcome::fail(DumpCode::NotAnNcmFile),
        // Key recovery and structural truncation past the magic.
        Err(_) => return DumpOutcome::fail(DumpCode::AudioDecryptFailed),
    };

    if ncm.audio_len() == 0 {
        return DumpOutcome::fail(DumpCode::AudioDecryptFailed);
    }
    let audio = ncm.decrypt_audio();

    let Some(format) = AudioFormat::sniff(&audio) else {
        return DumpOutcome::fail(DumpCode::UnknownAudioFormat);
    };

    let output_path = output_dir.join(output_file_name(input, &ncm, format, options));
    if write_output(&output_path, &audio, &ncm, format).is_err() {
        return DumpOutcome::fail(DumpCode::SaveFailed);
    }

    // Soft failures surface in the code but keep the written file; metadata
    // wins over cover when both blocks were bad (it is hit first).
    let code = if ncm.metadata_error.is_some() {
        DumpCode::MetadataReadFailed
    } else if ncm.cover_error.is_some() {
        DumpCode::CoverReadFailed
    } else {
        DumpCode::Success
    };

    DumpOutcome {
        code,
        output: Some(output_path),
    }
}

/// The output directory must exist (it is created if missing) and be
/// writable. Checked before any decryption work.
fn validate_output_dir(dir: &Path) -> bool {
    if !dir.exists() && fs::create_dir_all(dir).is_err() {
        return false;
    }
    let Ok(meta) = fs::metadata(dir) else {
        return false;
    };
    meta.is_dir() && !meta.permissions().readonly()
}

fn output_file_name(
    input: &Path,
    ncm: &NcmContainer,
    format: AudioFormat,
    options: DumpOptions,
) -> String {
    let ext = format.extension();
    if options.titled_output {
        if let Some(meta) = &ncm.metadata {
            if !meta.music_name.is_empty() {
                let artists = meta
                    .artists()
                    .into_iter()
                    .map(|(name, _)| name)
                    .collect::<Vec<_>>()
                    .join(", ");
                let title = if artists.is_empty() {
                    meta.music_name.clone()
                } else {
                    format!("{artists} - {}", meta.music_name)
                };
                return format!("{}.{ext}", sanitize_file_name(&title));
            }
        }
    }
    let stem = input.file_stem().unwrap_or_default();
    format!("{}.{ext}", stem.to_string_lossy())
}

/// Replace path separators and other reserved characters in a tag-derived
/// file name.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            other => other,
        })
        .collect()
}

/// Write the audio bytes and inject tags, removing the partial file on any
/// failure.
fn write_output(
    path: &Path,
    audio: &[u8],
    ncm: &NcmContainer,
    format: AudioFormat,
) -> crate::error::Result<()> {
    let mut guard = OutputGuard::new(path);

    {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(audio)?;
        writer.flush()?;
    }

    TagStrategy::for_format(format).write(path, ncm.metadata.as_ref(), ncm.cover.as_deref())?;

    guard.commit();
    Ok(())
}

/// Removes the output file on drop unless the write was committed.
struct OutputGuard<'a> {
    path: &'a Path,
    committed: bool,
}

impl<'a> OutputGuard<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(&mut self) {
        self.committed = true;
    }
}

impl Drop for OutputGuard<'_> {
    fn drop(&mut self) {
        if !self.committed && self.path.exists() {
            let _ = fs::remove_file(self.path);
        }
    }
}

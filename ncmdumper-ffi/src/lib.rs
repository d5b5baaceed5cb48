//! C ABI over the dump engine, matching the original native boundary: one
//! call in, one stable ordinal result code out (see `DumpCode`).

#![allow(unsafe_code, non_snake_case)]

use std::ffi::{CStr, c_char, c_int};
use std::path::Path;

use ncmdumper::{DumpCode, dump};

/// Convert one NCM file, writing the result into `output_dir`.
///
/// Returns the stable dump result code (0 = success). Invalid pointers,
/// non-UTF-8 paths, and panics all map to `InvalidInputFile`.
///
/// # Safety
/// `input_path` and `output_dir` must be valid null-terminated C strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn DumpNcmFile(
    input_path: *const c_char,
    output_dir: *const c_char,
) -> c_int {
    std::panic::catch_unwind(|| {
        if input_path.is_null() || output_dir.is_null() {
            return DumpCode::InvalidInputFile.as_u8();
        }
        let Ok(input) = unsafe { CStr::from_ptr(input_path) }.to_str() else {
            return DumpCode::InvalidInputFile.as_u8();
        };
        let Ok(out_dir) = unsafe { CStr::from_ptr(output_dir) }.to_str() else {
            return DumpCode::InvalidInputFile.as_u8();
        };

        dump(Path::new(input), Path::new(out_dir)).code.as_u8()
    })
    .unwrap_or(DumpCode::InvalidInputFile.as_u8())
    .into()
}

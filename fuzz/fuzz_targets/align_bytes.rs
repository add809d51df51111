//! Fuzz target for alignment and verification of arbitrary byte input.
//!
//! Exercises EOCD location, the central directory walk and the rewriter
//! with malformed or adversarial archives. Any successful alignment must
//! produce exactly the planned number of bytes.
//!
//! Run with: cargo +nightly fuzz run align_bytes

#![no_main]

use apkalign::{AlignOptions, ZipAligner, check_alignment, verify_integrity};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let options = AlignOptions::default();

    // We don't care about errors - we're looking for panics or hangs
    let _ = check_alignment(&mut Cursor::new(data), &options);
    let _ = verify_integrity(&mut Cursor::new(data));

    let mut output = Vec::new();
    let Ok(result) = ZipAligner::new(Cursor::new(data)).align(&mut output) else {
        return;
    };
    assert_eq!(result.output_size, output.len() as u64);
    assert_eq!(result.output_size, data.len() as u64 + result.padding_bytes);
});

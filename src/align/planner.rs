//! Alignment policy and padding arithmetic.
//!
//! Pure decision logic with no I/O. The policy is evaluated in order:
//!
//! 1. With library alignment enabled, an entry whose name ends with the
//!    library suffix is page-aligned whatever its compression method.
//! 2. Otherwise a stored entry gets the general alignment, if enabled.
//! 3. Everything else is left untouched.

use super::options::AlignOptions;
use crate::format::method;

/// Which rule selected an entry for alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentClass {
    /// Shared library page alignment.
    Library,
    /// General alignment of a stored entry.
    Stored,
}

/// The alignment an entry must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentRule {
    /// The rule that matched.
    pub class: AlignmentClass,
    /// Required boundary in bytes (never 0).
    pub alignment: u32,
}

/// Returns the alignment `name` must satisfy, or `None` if it is left alone.
pub fn required_alignment(
    name: &[u8],
    compression_method: u16,
    options: &AlignOptions,
) -> Option<AlignmentRule> {
    if options.so_alignment != 0
        && !options.library_suffix.is_empty()
        && name.ends_with(options.library_suffix.as_bytes())
    {
        return Some(AlignmentRule {
            class: AlignmentClass::Library,
            alignment: options.so_alignment,
        });
    }

    if compression_method == method::STORED && options.alignment != 0 {
        return Some(AlignmentRule {
            class: AlignmentClass::Stored,
            alignment: options.alignment,
        });
    }

    None
}

/// Bytes needed to move `data_offset` up to the next multiple of `alignment`.
///
/// `data_offset` must already include all padding inserted before the entry.
pub fn padding_for(data_offset: u64, alignment: u32) -> u32 {
    if alignment == 0 {
        return 0;
    }
    let remainder = (data_offset % u64::from(alignment)) as u32;
    if remainder == 0 {
        0
    } else {
        alignment - remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: u16 = method::STORED;
    const DEFLATED: u16 = method::DEFLATED;

    #[test]
    fn test_library_aligned_regardless_of_method() {
        let options = AlignOptions::default();
        for m in [STORED, DEFLATED] {
            let rule = required_alignment(b"lib/arm64-v8a/libfoo.so", m, &options).unwrap();
            assert_eq!(rule.class, AlignmentClass::Library);
            assert_eq!(rule.alignment, 16384);
        }
    }

    #[test]
    fn test_stored_entry_gets_general_alignment() {
        let options = AlignOptions::default();
        let rule = required_alignment(b"resources.arsc", STORED, &options).unwrap();
        assert_eq!(rule.class, AlignmentClass::Stored);
        assert_eq!(rule.alignment, 4);
    }

    #[test]
    fn test_compressed_entry_untouched() {
        let options = AlignOptions::default();
        assert_eq!(required_alignment(b"classes.dex", DEFLATED, &options), None);
    }

    #[test]
    fn test_library_alignment_disabled_falls_back_to_stored() {
        let options = AlignOptions::default().no_library_alignment();
        let rule = required_alignment(b"lib/x86/libfoo.so", STORED, &options).unwrap();
        assert_eq!(rule.class, AlignmentClass::Stored);
        assert_eq!(rule.alignment, 4);
        assert_eq!(
            required_alignment(b"lib/x86/libfoo.so", DEFLATED, &options),
            None
        );
    }

    #[test]
    fn test_general_alignment_disabled() {
        let options = AlignOptions::default().alignment(0).unwrap();
        assert_eq!(required_alignment(b"assets/a.bin", STORED, &options), None);
        assert!(required_alignment(b"libfoo.so", STORED, &options).is_some());
    }

    #[test]
    fn test_suffix_must_be_at_end() {
        let options = AlignOptions::default();
        assert_eq!(
            required_alignment(b"lib/libfoo.so.1", DEFLATED, &options),
            None
        );
        assert_eq!(required_alignment(b"notes.sox", DEFLATED, &options), None);
    }

    #[test]
    fn test_custom_suffix() {
        let options = AlignOptions::default().library_suffix(".bin").unwrap();
        assert_eq!(
            required_alignment(b"payload.bin", DEFLATED, &options).map(|r| r.class),
            Some(AlignmentClass::Library)
        );
    }

    #[test]
    fn test_empty_suffix_matches_nothing() {
        let options = AlignOptions {
            library_suffix: String::new(),
            ..AlignOptions::default()
        };
        assert_eq!(required_alignment(b"classes.dex", DEFLATED, &options), None);
        assert_eq!(
            required_alignment(b"resources.arsc", STORED, &options).map(|r| r.class),
            Some(AlignmentClass::Stored)
        );
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(1000, 16384), 15384);
        assert_eq!(padding_for(16384, 16384), 0);
        assert_eq!(padding_for(0, 4), 0);
        assert_eq!(padding_for(37, 4), 3);
        assert_eq!(padding_for(38, 4), 2);
        assert_eq!(padding_for(39, 4), 1);
        assert_eq!(padding_for(13, 12), 11);
        assert_eq!(padding_for(5, 0), 0);
    }

    #[test]
    fn test_padding_reaches_boundary() {
        for offset in 0u64..200 {
            for alignment in [1u32, 2, 3, 4, 8, 4096] {
                let padded = offset + u64::from(padding_for(offset, alignment));
                assert_eq!(padded % u64::from(alignment), 0);
                assert!(padded - offset < u64::from(alignment));
            }
        }
    }
}

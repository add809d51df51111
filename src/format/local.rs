//! Local file header access.
//!
//! The name and extra-field lengths stored in a local header may differ from
//! the central directory copy (aligners pad only the local extra field), so
//! data offsets are always computed from the local header itself.

use std::io::{self, Read, Seek};

use super::{LOCAL_HEADER_SIGNATURE, LOCAL_HEADER_SIZE, field, le_u16, le_u32};
use crate::{Error, Result};

/// Variable-length tail sizes of a local file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalHeaderLengths {
    /// File name length.
    pub name_length: u16,
    /// Extra field length.
    pub extra_length: u16,
}

impl LocalHeaderLengths {
    /// Offset of the entry data for a header located at `header_offset`.
    pub fn data_offset(&self, header_offset: u64) -> u64 {
        header_offset
            + LOCAL_HEADER_SIZE as u64
            + u64::from(self.name_length)
            + u64::from(self.extra_length)
    }

    /// Bytes between the end of the extra-length field and the entry data.
    pub fn tail_len(&self) -> u32 {
        u32::from(self.name_length) + u32::from(self.extra_length)
    }
}

/// Reads the name and extra-field lengths of the local header at `header_offset`.
///
/// The header signature is checked so that a wrong offset in the central
/// directory is reported instead of silently producing garbage lengths.
pub fn read_local_lengths<R: Read + Seek>(
    reader: &mut R,
    header_offset: u64,
) -> Result<LocalHeaderLengths> {
    let mut header = [0u8; LOCAL_HEADER_SIZE];
    super::read_exact_at(reader, header_offset, &mut header).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::corrupt_local_header(header_offset, "header extends past end of archive")
        } else {
            Error::Io(e)
        }
    })?;

    if le_u32(&header, 0) != LOCAL_HEADER_SIGNATURE {
        return Err(Error::corrupt_local_header(
            header_offset,
            "missing local file header signature",
        ));
    }

    Ok(LocalHeaderLengths {
        name_length: le_u16(&header, field::local::NAME_LENGTH as usize),
        extra_length: le_u16(&header, field::local::EXTRA_LENGTH as usize),
    })
}

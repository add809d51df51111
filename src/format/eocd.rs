//! End-of-central-directory location and parsing.
//!
//! The EOCD trailer anchors every other structure in the archive. Because the
//! archive comment can be up to 65535 bytes long, the record lies somewhere in
//! the last `0xFFFF + 22` bytes of the file. The window is read once and
//! scanned from its end towards its start, so the record closest to the end
//! of the file wins.

use std::io::{Read, Seek, SeekFrom};

use super::{EOCD_SEARCH_WINDOW, EOCD_SIGNATURE, EOCD_SIZE, field, le_u16, le_u32};
use crate::{Error, Result};

/// Parsed end-of-central-directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Position of the record's signature in the archive.
    pub offset: u64,
    /// Number of this disk.
    pub disk_number: u16,
    /// Central directory entries on this disk.
    pub entries_on_disk: u16,
    /// Total number of central directory entries.
    pub total_entries: u16,
    /// Size of the central directory in bytes.
    pub directory_size: u32,
    /// Offset of the first central directory record.
    pub directory_offset: u32,
    /// Length of the archive comment that follows the record.
    pub comment_length: u16,
}

impl EndOfCentralDirectory {
    /// Parses the fixed 22-byte record located at `offset`.
    ///
    /// `record` must hold at least [`EOCD_SIZE`] bytes starting with the
    /// signature.
    pub fn parse(offset: u64, record: &[u8]) -> Self {
        Self {
            offset,
            disk_number: le_u16(record, field::eocd::DISK_NUMBER),
            entries_on_disk: le_u16(record, field::eocd::ENTRIES_ON_DISK),
            total_entries: le_u16(record, field::eocd::TOTAL_ENTRIES),
            directory_size: le_u32(record, field::eocd::DIRECTORY_SIZE),
            directory_offset: le_u32(record, field::eocd::DIRECTORY_OFFSET),
            comment_length: le_u16(record, field::eocd::COMMENT_LENGTH),
        }
    }

    /// Position of the 4-byte central-directory-offset field.
    pub fn directory_offset_field(&self) -> u64 {
        self.offset + field::eocd::DIRECTORY_OFFSET as u64
    }

    /// Rejects records whose fields hold ZIP64 sentinel values.
    ///
    /// Such archives keep the real values in a ZIP64 trailer that this crate
    /// does not read.
    pub fn ensure_not_zip64(&self) -> Result<()> {
        if self.total_entries == u16::MAX || self.entries_on_disk == u16::MAX {
            return Err(Error::Zip64Unsupported {
                field: "entry count",
            });
        }
        if self.directory_offset == u32::MAX {
            return Err(Error::Zip64Unsupported {
                field: "central directory offset",
            });
        }
        if self.directory_size == u32::MAX {
            return Err(Error::Zip64Unsupported {
                field: "central directory size",
            });
        }
        Ok(())
    }
}

/// Returns the byte offset of the end-of-central-directory record.
///
/// Fails with [`Error::EocdNotFound`] when the trailer window holds no EOCD
/// signature, which indicates a corrupt or non-ZIP input.
pub fn locate_eocd<R: Read + Seek>(reader: &mut R) -> Result<u64> {
    let (window_start, window) = read_trailer_window(reader)?;
    find_signature_backwards(&window)
        .map(|pos| window_start + pos as u64)
        .ok_or(Error::EocdNotFound {
            searched: window.len() as u64,
        })
}

/// Locates and parses the end-of-central-directory record.
pub fn read_eocd<R: Read + Seek>(reader: &mut R) -> Result<EndOfCentralDirectory> {
    let (window_start, window) = read_trailer_window(reader)?;
    let pos = find_signature_backwards(&window).ok_or(Error::EocdNotFound {
        searched: window.len() as u64,
    })?;

    let eocd = EndOfCentralDirectory::parse(window_start + pos as u64, &window[pos..]);
    log::debug!(
        "EOCD at {:#x}: {} entries, central directory at {:#x}",
        eocd.offset,
        eocd.total_entries,
        eocd.directory_offset
    );
    Ok(eocd)
}

/// Reads the last `min(len, 0xFFFF + 22)` bytes of the archive.
fn read_trailer_window<R: Read + Seek>(reader: &mut R) -> Result<(u64, Vec<u8>)> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let window_len = file_len.min(EOCD_SEARCH_WINDOW as u64);
    let window_start = file_len - window_len;

    reader.seek(SeekFrom::Start(window_start))?;
    let mut window = vec![0u8; window_len as usize];
    reader.read_exact(&mut window)?;
    Ok((window_start, window))
}

/// Scans from the last position that can hold a complete record back to the
/// start of the window.
fn find_signature_backwards(window: &[u8]) -> Option<usize> {
    let last = window.len().checked_sub(EOCD_SIZE)?;
    let magic = EOCD_SIGNATURE.to_le_bytes();

    (0..=last)
        .rev()
        .find(|&i| window[i] == magic[0] && window[i..i + 4] == magic)
}

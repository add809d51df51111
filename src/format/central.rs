//! Central directory records and sequential directory traversal.
//!
//! Records are read one at a time and never collected: the cursor only keeps
//! the position of the next record and the number of records left, so the
//! caller is free to seek elsewhere (e.g. to a local header) between reads.

use std::io::{self, Read, Seek};

use super::eocd::EndOfCentralDirectory;
use super::{CENTRAL_HEADER_SIGNATURE, CENTRAL_HEADER_SIZE, field, le_u16, le_u32, method};
use crate::{Error, Result};

/// One central directory file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryRecord {
    /// Position of the record's signature in the archive.
    pub offset: u64,
    /// General purpose bit flag.
    pub flags: u16,
    /// Compression method.
    pub method: u16,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Compressed size of the entry data.
    pub compressed_size: u32,
    /// Uncompressed size of the entry data.
    pub uncompressed_size: u32,
    /// Length of the extra field stored in this record.
    pub extra_length: u16,
    /// Length of the file comment stored in this record.
    pub comment_length: u16,
    /// Offset of the entry's local file header.
    pub local_header_offset: u32,
    /// Raw file name bytes.
    pub name: Vec<u8>,
}

impl CentralDirectoryRecord {
    /// Total length of the record including its variable-length tail.
    pub fn record_len(&self) -> u64 {
        CENTRAL_HEADER_SIZE as u64
            + self.name.len() as u64
            + u64::from(self.extra_length)
            + u64::from(self.comment_length)
    }

    /// Position of the 4-byte local-header-offset field inside this record.
    pub fn local_header_offset_field(&self) -> u64 {
        self.offset + field::central::LOCAL_HEADER_OFFSET as u64
    }

    /// Returns `true` for entries stored without compression.
    pub fn is_stored(&self) -> bool {
        self.method == method::STORED
    }

    /// File name decoded as UTF-8, replacing invalid sequences.
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}

/// Forward-only position within the central directory.
#[derive(Debug, Clone)]
pub struct CentralDirectoryCursor {
    next: u64,
    remaining: u16,
    end: u64,
}

impl CentralDirectoryCursor {
    /// Creates a cursor positioned at the first record named by `eocd`.
    pub fn new(eocd: &EndOfCentralDirectory) -> Self {
        Self {
            next: u64::from(eocd.directory_offset),
            remaining: eocd.total_entries,
            end: eocd.offset,
        }
    }

    /// Number of records not yet read.
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    /// Reads the next record, or returns `None` once every record was read.
    ///
    /// Fails with [`Error::CorruptDirectory`] if the record does not start
    /// with the central directory signature or runs past the EOCD.
    pub fn read_next<R: Read + Seek>(
        &mut self,
        reader: &mut R,
    ) -> Result<Option<CentralDirectoryRecord>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let offset = self.next;
        if offset + CENTRAL_HEADER_SIZE as u64 > self.end {
            return Err(Error::corrupt_directory(
                offset,
                "record extends past end-of-central-directory",
            ));
        }

        let mut fixed = [0u8; CENTRAL_HEADER_SIZE];
        super::read_exact_at(reader, offset, &mut fixed).map_err(|e| truncated(offset, e))?;

        if le_u32(&fixed, 0) != CENTRAL_HEADER_SIGNATURE {
            return Err(Error::corrupt_directory(
                offset,
                "assumed central directory entry doesn't start with a signature",
            ));
        }

        let name_length = le_u16(&fixed, field::central::NAME_LENGTH);
        let mut name = vec![0u8; usize::from(name_length)];
        reader
            .read_exact(&mut name)
            .map_err(|e| truncated(offset, e))?;

        let record = CentralDirectoryRecord {
            offset,
            flags: le_u16(&fixed, field::central::FLAGS),
            method: le_u16(&fixed, field::central::METHOD),
            crc32: le_u32(&fixed, field::central::CRC32),
            compressed_size: le_u32(&fixed, field::central::COMPRESSED_SIZE),
            uncompressed_size: le_u32(&fixed, field::central::UNCOMPRESSED_SIZE),
            extra_length: le_u16(&fixed, field::central::EXTRA_LENGTH),
            comment_length: le_u16(&fixed, field::central::COMMENT_LENGTH),
            local_header_offset: le_u32(&fixed, field::central::LOCAL_HEADER_OFFSET),
            name,
        };

        self.next = offset + record.record_len();
        if self.next > self.end {
            return Err(Error::corrupt_directory(
                offset,
                "record extends past end-of-central-directory",
            ));
        }
        self.remaining -= 1;
        Ok(Some(record))
    }
}

fn truncated(offset: u64, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::corrupt_directory(offset, "truncated record")
    } else {
        Error::Io(e)
    }
}

//! ZIP record layouts, signatures and low-level field access.
//!
//! Only the three record types that alignment touches are modelled: the
//! end-of-central-directory trailer, central directory headers and local
//! file headers. All multi-byte fields are little-endian.

pub mod central;
pub mod eocd;
pub mod local;

use std::io::{self, Read, Seek, SeekFrom};

/// Local file header signature (`PK\x03\x04`).
pub const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;

/// Central directory file header signature (`PK\x01\x02`).
pub const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;

/// End-of-central-directory signature (`PK\x05\x06`).
pub const EOCD_SIGNATURE: u32 = 0x0605_4b50;

/// Fixed part of a local file header.
pub const LOCAL_HEADER_SIZE: usize = 30;

/// Fixed part of a central directory file header.
pub const CENTRAL_HEADER_SIZE: usize = 46;

/// Fixed part of the end-of-central-directory record.
pub const EOCD_SIZE: usize = 22;

/// Longest archive comment the 16-bit comment length can describe.
pub const MAX_COMMENT_LEN: usize = 0xFFFF;

/// Number of trailing bytes that can contain the EOCD record.
pub const EOCD_SEARCH_WINDOW: usize = MAX_COMMENT_LEN + EOCD_SIZE;

/// Compression method IDs.
pub mod method {
    /// Stored (no compression).
    pub const STORED: u16 = 0;
    /// Deflate.
    pub const DEFLATED: u16 = 8;
}

/// Field offsets relative to the start of each record.
pub mod field {
    /// Local file header fields.
    pub mod local {
        /// File name length (u16).
        pub const NAME_LENGTH: u64 = 26;
        /// Extra field length (u16).
        pub const EXTRA_LENGTH: u64 = 28;
    }

    /// Central directory file header fields.
    pub mod central {
        /// General purpose bit flag (u16).
        pub const FLAGS: usize = 8;
        /// Compression method (u16).
        pub const METHOD: usize = 10;
        /// CRC-32 of the uncompressed data (u32).
        pub const CRC32: usize = 16;
        /// Compressed size (u32).
        pub const COMPRESSED_SIZE: usize = 20;
        /// Uncompressed size (u32).
        pub const UNCOMPRESSED_SIZE: usize = 24;
        /// File name length (u16).
        pub const NAME_LENGTH: usize = 28;
        /// Extra field length (u16).
        pub const EXTRA_LENGTH: usize = 30;
        /// File comment length (u16).
        pub const COMMENT_LENGTH: usize = 32;
        /// Offset of the local file header (u32).
        pub const LOCAL_HEADER_OFFSET: usize = 42;
    }

    /// End-of-central-directory fields.
    pub mod eocd {
        /// Number of this disk (u16).
        pub const DISK_NUMBER: usize = 4;
        /// Central directory entries on this disk (u16).
        pub const ENTRIES_ON_DISK: usize = 8;
        /// Total central directory entries (u16).
        pub const TOTAL_ENTRIES: usize = 10;
        /// Size of the central directory (u32).
        pub const DIRECTORY_SIZE: usize = 12;
        /// Offset of the start of the central directory (u32).
        pub const DIRECTORY_OFFSET: usize = 16;
        /// Archive comment length (u16).
        pub const COMMENT_LENGTH: usize = 20;
    }
}

#[inline]
pub(crate) fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

#[inline]
pub(crate) fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Seeks to `offset` and fills `buf` completely.
pub(crate) fn read_exact_at<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    buf: &mut [u8],
) -> io::Result<()> {
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(buf)
}

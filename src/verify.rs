//! Verification of aligned archives.
//!
//! Two independent checks are provided:
//!
//! - [`check_alignment`] reports, per entry, whether its data starts on the
//!   boundary the alignment policy demands (the `zipalign -c` equivalent).
//! - [`verify_integrity`] recomputes the CRC-32 of every entry's payload and
//!   compares it with the central directory, confirming that a rewrite left
//!   all entry data intact.
//!
//! # Example
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, verify};
//! use std::fs::File;
//!
//! # fn main() -> apkalign::Result<()> {
//! let mut file = File::open("app-aligned.apk")?;
//! let report = verify::check_alignment(&mut file, &AlignOptions::default())?;
//! for entry in report.misaligned() {
//!     println!("{} at {:#x}", entry.name, entry.data_offset);
//! }
//!
//! let integrity = verify::verify_integrity(&mut file)?;
//! assert!(integrity.is_ok());
//! # Ok(())
//! # }
//! ```

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::align::{AlignOptions, AlignmentRule, required_alignment};
use crate::format::central::{CentralDirectoryCursor, CentralDirectoryRecord};
use crate::format::eocd::read_eocd;
use crate::format::local::read_local_lengths;
use crate::format::method;
use crate::{Error, Result};

/// General purpose flag bit marking encrypted entries.
const FLAG_ENCRYPTED: u16 = 0x0001;

/// Alignment state of a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryAlignment {
    /// Entry name (lossy UTF-8).
    pub name: String,
    /// Compression method.
    pub method: u16,
    /// Offset of the local file header.
    pub local_header_offset: u64,
    /// Offset of the first data byte.
    pub data_offset: u64,
    /// Boundary the policy requires, if any.
    pub required_alignment: Option<AlignmentRule>,
    /// Whether `data_offset` satisfies `required_alignment`.
    pub aligned: bool,
}

/// Result of [`check_alignment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    /// Every entry in central directory order.
    pub entries: Vec<EntryAlignment>,
}

impl AlignmentReport {
    /// Returns `true` if every entry satisfies its required alignment.
    pub fn is_aligned(&self) -> bool {
        self.entries.iter().all(|e| e.aligned)
    }

    /// Entries whose data does not start on the required boundary.
    pub fn misaligned(&self) -> impl Iterator<Item = &EntryAlignment> {
        self.entries.iter().filter(|e| !e.aligned)
    }

    /// Entries the policy requires to be aligned.
    pub fn constrained(&self) -> impl Iterator<Item = &EntryAlignment> {
        self.entries
            .iter()
            .filter(|e| e.required_alignment.is_some())
    }
}

/// Reports whether each entry of the archive in `reader` is aligned per `options`.
///
/// # Errors
///
/// Fails on the same structural problems as alignment itself: a missing
/// EOCD, ZIP64 sentinels, or corrupt directory and local header records.
pub fn check_alignment<R: Read + Seek>(
    reader: &mut R,
    options: &AlignOptions,
) -> Result<AlignmentReport> {
    options.validate()?;
    let mut report = AlignmentReport::default();

    for_each_entry(reader, |reader, record| {
        let header_offset = u64::from(record.local_header_offset);
        let data_offset = read_local_lengths(reader, header_offset)?.data_offset(header_offset);
        let rule = required_alignment(&record.name, record.method, options);

        report.entries.push(EntryAlignment {
            name: record.name_lossy(),
            method: record.method,
            local_header_offset: header_offset,
            data_offset,
            required_alignment: rule,
            aligned: rule.is_none_or(|r| data_offset % u64::from(r.alignment) == 0),
        });
        Ok(())
    })?;

    Ok(report)
}

/// Outcome of recomputing one entry's CRC-32.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrcStatus {
    /// The payload matches the central directory CRC.
    Match,
    /// The payload does not match.
    Mismatch {
        /// CRC recorded in the central directory.
        expected: u32,
        /// CRC of the payload as found.
        actual: u32,
    },
    /// The payload could not be decoded.
    Damaged {
        /// Description of the decoding failure.
        reason: String,
    },
    /// The payload was not checked (unsupported method or encrypted entry).
    Skipped {
        /// Compression method of the entry.
        method: u16,
    },
}

/// Integrity of a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryIntegrity {
    /// Entry name (lossy UTF-8).
    pub name: String,
    /// Compression method.
    pub method: u16,
    /// CRC comparison outcome.
    pub status: CrcStatus,
}

/// Result of [`verify_integrity`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Every entry in central directory order.
    pub entries: Vec<EntryIntegrity>,
}

impl IntegrityReport {
    /// Returns `true` if no checked entry failed.
    pub fn is_ok(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Entries whose CRC did not match or whose payload was undecodable.
    pub fn failures(&self) -> impl Iterator<Item = &EntryIntegrity> {
        self.entries.iter().filter(|e| {
            matches!(
                e.status,
                CrcStatus::Mismatch { .. } | CrcStatus::Damaged { .. }
            )
        })
    }

    /// Number of entries whose CRC was actually compared.
    pub fn checked(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !matches!(e.status, CrcStatus::Skipped { .. }))
            .count()
    }
}

/// Recomputes the CRC-32 of every entry in `reader` and compares it with the
/// central directory.
///
/// Stored entries are always checked. Deflated entries are checked when the
/// `deflate` feature is enabled; other methods and encrypted entries are
/// reported as [`CrcStatus::Skipped`].
pub fn verify_integrity<R: Read + Seek>(reader: &mut R) -> Result<IntegrityReport> {
    let mut report = IntegrityReport::default();

    for_each_entry(reader, |reader, record| {
        let status = entry_crc_status(reader, record)?;
        if let CrcStatus::Mismatch { expected, actual } = status {
            log::warn!(
                "CRC mismatch in {}: expected {:08x}, got {:08x}",
                record.name_lossy(),
                expected,
                actual
            );
        }
        report.entries.push(EntryIntegrity {
            name: record.name_lossy(),
            method: record.method,
            status,
        });
        Ok(())
    })?;

    Ok(report)
}

fn entry_crc_status<R: Read + Seek>(
    reader: &mut R,
    record: &CentralDirectoryRecord,
) -> Result<CrcStatus> {
    if record.flags & FLAG_ENCRYPTED != 0 || !is_checkable(record.method) {
        return Ok(CrcStatus::Skipped {
            method: record.method,
        });
    }

    let header_offset = u64::from(record.local_header_offset);
    let data_offset = read_local_lengths(reader, header_offset)?.data_offset(header_offset);
    reader.seek(SeekFrom::Start(data_offset))?;
    let mut payload = (&mut *reader).take(u64::from(record.compressed_size));

    let mut sink = Crc32Sink::new();
    let copied = match record.method {
        method::STORED => io::copy(&mut payload, &mut sink),
        #[cfg(feature = "deflate")]
        method::DEFLATED => io::copy(&mut flate2::read::DeflateDecoder::new(payload), &mut sink),
        _ => {
            return Ok(CrcStatus::Skipped {
                method: record.method,
            });
        }
    };

    match copied {
        Ok(_) => {}
        Err(e) if is_decode_error(&e) => {
            return Ok(CrcStatus::Damaged {
                reason: e.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    }

    if record.method == method::STORED
        && sink.bytes_processed() < u64::from(record.compressed_size)
    {
        return Err(Error::corrupt_local_header(
            header_offset,
            "entry data extends past end of archive",
        ));
    }

    let actual = sink.finalize();
    if actual == record.crc32 {
        Ok(CrcStatus::Match)
    } else {
        Ok(CrcStatus::Mismatch {
            expected: record.crc32,
            actual,
        })
    }
}

fn is_decode_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

fn is_checkable(compression_method: u16) -> bool {
    match compression_method {
        method::STORED => true,
        method::DEFLATED => cfg!(feature = "deflate"),
        _ => false,
    }
}

/// Walks the central directory of `reader`, calling `visit` for every record.
fn for_each_entry<R, F>(reader: &mut R, mut visit: F) -> Result<()>
where
    R: Read + Seek,
    F: FnMut(&mut R, &CentralDirectoryRecord) -> Result<()>,
{
    let eocd = read_eocd(reader)?;
    eocd.ensure_not_zip64()?;

    let mut cursor = CentralDirectoryCursor::new(&eocd);
    while let Some(record) = cursor.read_next(reader)? {
        visit(reader, &record)?;
    }
    Ok(())
}

/// CRC-32 computed over everything written to it.
#[derive(Debug, Default)]
struct Crc32Sink {
    hasher: crc32fast::Hasher,
    bytes_processed: u64,
}

impl Crc32Sink {
    fn new() -> Self {
        Self::default()
    }

    fn bytes_processed(&self) -> u64 {
        self.bytes_processed
    }

    fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

impl Write for Crc32Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.hasher.update(buf);
        self.bytes_processed += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_sink() {
        let mut sink = Crc32Sink::new();
        sink.write_all(b"Hello, ").unwrap();
        sink.write_all(b"World!").unwrap();
        assert_eq!(sink.bytes_processed(), 13);
        assert_eq!(sink.finalize(), 0xEC4A_C3D0);
    }

    #[test]
    fn test_checkable_methods() {
        assert!(is_checkable(method::STORED));
        assert_eq!(is_checkable(method::DEFLATED), cfg!(feature = "deflate"));
        assert!(!is_checkable(14));
    }

    #[test]
    fn test_report_predicates() {
        let report = IntegrityReport {
            entries: vec![
                EntryIntegrity {
                    name: "a".into(),
                    method: 0,
                    status: CrcStatus::Match,
                },
                EntryIntegrity {
                    name: "b".into(),
                    method: 12,
                    status: CrcStatus::Skipped { method: 12 },
                },
            ],
        };
        assert!(report.is_ok());
        assert_eq!(report.checked(), 1);

        let mut broken = report.clone();
        broken.entries[0].status = CrcStatus::Mismatch {
            expected: 1,
            actual: 2,
        };
        assert!(!broken.is_ok());
        assert_eq!(broken.failures().count(), 1);
    }
}

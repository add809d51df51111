//! Shared test utilities for integration tests.
//!
//! This module provides an in-memory ZIP builder and an independent ZIP
//! reader used to inspect aligned output without going through the library's
//! own parsing code.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use apkalign::{AlignOptions, AlignResult, ZipAligner};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

pub const STORED: u16 = 0;
pub const DEFLATED: u16 = 8;

const LOCAL_SIG: u32 = 0x0403_4b50;
const CENTRAL_SIG: u32 = 0x0201_4b50;
const EOCD_SIG: u32 = 0x0605_4b50;

/// One entry to be written by [`ZipBuilder`].
#[derive(Debug, Clone)]
pub struct TestEntry {
    pub name: Vec<u8>,
    pub method: u16,
    pub content: Vec<u8>,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub comment: Vec<u8>,
}

impl TestEntry {
    pub fn new(name: &str, method: u16, content: &[u8]) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            method,
            content: content.to_vec(),
            local_extra: Vec::new(),
            central_extra: Vec::new(),
            comment: Vec::new(),
        }
    }

    pub fn local_extra(mut self, extra: &[u8]) -> Self {
        self.local_extra = extra.to_vec();
        self
    }

    pub fn central_extra(mut self, extra: &[u8]) -> Self {
        self.central_extra = extra.to_vec();
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }
}

/// Builds ZIP archives in memory, entry by entry.
///
/// # Example
///
/// ```ignore
/// let zip = ZipBuilder::new()
///     .stored("assets/a.bin", b"hello")
///     .deflated("classes.dex", b"dex\n035")
///     .comment(b"signed later")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZipBuilder {
    entries: Vec<TestEntry>,
    prefix: Vec<u8>,
    comment: Vec<u8>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: &str, content: &[u8]) -> Self {
        self.entry(TestEntry::new(name, STORED, content))
    }

    pub fn deflated(self, name: &str, content: &[u8]) -> Self {
        self.entry(TestEntry::new(name, DEFLATED, content))
    }

    pub fn entry(mut self, entry: TestEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Bytes placed before the first local header (e.g. a stub).
    pub fn prefix(mut self, prefix: &[u8]) -> Self {
        self.prefix = prefix.to_vec();
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.prefix.clone();
        let mut central = Vec::new();

        for entry in &self.entries {
            let offset = out.len() as u32;
            let crc = crc32fast::hash(&entry.content);
            let payload = match entry.method {
                DEFLATED => deflate(&entry.content),
                _ => entry.content.clone(),
            };

            out.extend_from_slice(&LOCAL_SIG.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&0u16.to_le_bytes()); // flags
            out.extend_from_slice(&entry.method.to_le_bytes());
            out.extend_from_slice(&[0u8; 4]); // time, date
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&(entry.content.len() as u32).to_le_bytes());
            out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            out.extend_from_slice(&(entry.local_extra.len() as u16).to_le_bytes());
            out.extend_from_slice(&entry.name);
            out.extend_from_slice(&entry.local_extra);
            out.extend_from_slice(&payload);

            central.extend_from_slice(&CENTRAL_SIG.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes()); // version made by
            central.extend_from_slice(&20u16.to_le_bytes()); // version needed
            central.extend_from_slice(&0u16.to_le_bytes()); // flags
            central.extend_from_slice(&entry.method.to_le_bytes());
            central.extend_from_slice(&[0u8; 4]); // time, date
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            central.extend_from_slice(&(entry.content.len() as u32).to_le_bytes());
            central.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            central.extend_from_slice(&(entry.central_extra.len() as u16).to_le_bytes());
            central.extend_from_slice(&(entry.comment.len() as u16).to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes()); // disk start
            central.extend_from_slice(&0u16.to_le_bytes()); // internal attrs
            central.extend_from_slice(&0u32.to_le_bytes()); // external attrs
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(&entry.name);
            central.extend_from_slice(&entry.central_extra);
            central.extend_from_slice(&entry.comment);
        }

        let directory_offset = out.len() as u32;
        out.extend_from_slice(&central);
        out.extend_from_slice(&eocd(
            self.entries.len() as u16,
            central.len() as u32,
            directory_offset,
            &self.comment,
        ));
        out
    }
}

/// Encodes an end-of-central-directory record followed by its comment.
pub fn eocd(entries: u16, directory_size: u32, directory_offset: u32, comment: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&EOCD_SIG.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // disk number
    out.extend_from_slice(&0u16.to_le_bytes()); // directory disk
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&directory_size.to_le_bytes());
    out.extend_from_slice(&directory_offset.to_le_bytes());
    out.extend_from_slice(&(comment.len() as u16).to_le_bytes());
    out.extend_from_slice(comment);
    out
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    DeflateDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

// =============================================================================
// Independent reader
// =============================================================================

/// An entry as seen by [`parse_zip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub name: String,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub central_record_offset: u64,
    pub local_header_offset: u64,
    pub data_offset: u64,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub comment: Vec<u8>,
}

/// A whole archive as seen by [`parse_zip`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedZip {
    pub entries: Vec<ParsedEntry>,
    pub eocd_offset: u64,
    pub directory_offset: u64,
    pub directory_size: u32,
    pub comment: Vec<u8>,
}

impl ParsedZip {
    pub fn entry(&self, name: &str) -> &ParsedEntry {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .unwrap_or_else(|| panic!("no entry named {name}"))
    }
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

/// Parses `bytes`, panicking on anything malformed.
///
/// Every central directory offset is followed to its local header, and the
/// local header signature is asserted.
pub fn parse_zip(bytes: &[u8]) -> ParsedZip {
    let eocd_offset = (0..=bytes.len() - 22)
        .rev()
        .find(|&i| u32_at(bytes, i) == EOCD_SIG)
        .expect("EOCD signature");

    let total = u16_at(bytes, eocd_offset + 10);
    let directory_size = u32_at(bytes, eocd_offset + 12);
    let directory_offset = u32_at(bytes, eocd_offset + 16) as usize;
    let comment_len = u16_at(bytes, eocd_offset + 20) as usize;
    let comment = bytes[eocd_offset + 22..eocd_offset + 22 + comment_len].to_vec();

    let mut entries = Vec::new();
    let mut pos = directory_offset;
    for _ in 0..total {
        assert_eq!(u32_at(bytes, pos), CENTRAL_SIG, "central record at {pos}");
        let name_len = u16_at(bytes, pos + 28) as usize;
        let extra_len = u16_at(bytes, pos + 30) as usize;
        let comment_len = u16_at(bytes, pos + 32) as usize;
        let local = u32_at(bytes, pos + 42) as usize;
        let name = String::from_utf8_lossy(&bytes[pos + 46..pos + 46 + name_len]).into_owned();
        let central_extra = bytes[pos + 46 + name_len..pos + 46 + name_len + extra_len].to_vec();
        let entry_comment = bytes
            [pos + 46 + name_len + extra_len..pos + 46 + name_len + extra_len + comment_len]
            .to_vec();

        assert_eq!(
            u32_at(bytes, local),
            LOCAL_SIG,
            "local header of {name} at {local}"
        );
        let local_name_len = u16_at(bytes, local + 26) as usize;
        let local_extra_len = u16_at(bytes, local + 28) as usize;
        let local_extra =
            bytes[local + 30 + local_name_len..local + 30 + local_name_len + local_extra_len]
                .to_vec();

        entries.push(ParsedEntry {
            name,
            method: u16_at(bytes, pos + 10),
            crc32: u32_at(bytes, pos + 16),
            compressed_size: u32_at(bytes, pos + 20),
            uncompressed_size: u32_at(bytes, pos + 24),
            central_record_offset: pos as u64,
            local_header_offset: local as u64,
            data_offset: (local + 30 + local_name_len + local_extra_len) as u64,
            local_extra,
            central_extra,
            comment: entry_comment,
        });
        pos += 46 + name_len + extra_len + comment_len;
    }

    ParsedZip {
        entries,
        eocd_offset: eocd_offset as u64,
        directory_offset: directory_offset as u64,
        directory_size,
        comment,
    }
}

/// Decompressed content of `entry`.
pub fn entry_content(bytes: &[u8], entry: &ParsedEntry) -> Vec<u8> {
    let start = entry.data_offset as usize;
    let raw = &bytes[start..start + entry.compressed_size as usize];
    match entry.method {
        DEFLATED => inflate(raw),
        _ => raw.to_vec(),
    }
}

// =============================================================================
// Alignment helpers
// =============================================================================

/// Aligns `input` in memory.
pub fn align_bytes(
    input: &[u8],
    options: &AlignOptions,
) -> apkalign::Result<(Vec<u8>, AlignResult)> {
    let mut output = Vec::new();
    let result = ZipAligner::new(Cursor::new(input))
        .with_options(options.clone())
        .align(&mut output)?;
    Ok((output, result))
}

/// Returns the error of a result that must have failed.
pub fn expect_err<T, E>(result: Result<T, E>) -> E {
    match result {
        Ok(_) => panic!("Expected error but got Ok"),
        Err(e) => e,
    }
}

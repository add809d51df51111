//! Patch lists accumulated while scanning the central directory.
//!
//! Two ordered lists are built: extra-field insertions inside local headers
//! (front of the archive) and 4-byte offset rewrites inside the central
//! directory (back of the archive). Both are pushed in strictly increasing
//! file position so the rewriter can apply them in a single forward pass.

use crate::format::eocd::EndOfCentralDirectory;
use crate::{Error, Result};

/// An edit inside a local file header.
///
/// The 2-byte extra-field length at `field_position` is replaced by
/// `new_extra_length`, the following `pass_before_padding` bytes (file name
/// and existing extra field) are copied unchanged, then `padding_length` zero
/// bytes are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentPatch {
    /// Position of the local header's extra-field-length field.
    pub field_position: u64,
    /// Extra-field length after padding.
    pub new_extra_length: u16,
    /// Unchanged bytes to copy between the length field and the padding.
    pub pass_before_padding: u32,
    /// Zero bytes to insert.
    pub padding_length: u32,
}

/// A 4-byte little-endian overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPatch {
    /// Position of the 4-byte field.
    pub field_position: u64,
    /// Value to write.
    pub new_value: u32,
}

/// Everything the rewriter needs: both patch lists plus the trailer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    alignment_patches: Vec<AlignmentPatch>,
    offset_patches: Vec<OffsetPatch>,
    shift: u64,
    eocd: EndOfCentralDirectory,
    input_size: u64,
    entries_scanned: usize,
}

impl PatchPlan {
    pub(crate) fn new(eocd: EndOfCentralDirectory, input_size: u64) -> Self {
        Self {
            alignment_patches: Vec::new(),
            offset_patches: Vec::new(),
            shift: 0,
            eocd,
            input_size,
            entries_scanned: 0,
        }
    }

    /// Padding inserted so far (the cumulative shift).
    pub fn shift(&self) -> u64 {
        self.shift
    }

    /// Total padding the rewrite will insert.
    pub fn total_padding(&self) -> u64 {
        self.shift
    }

    /// Extra-field insertions, in ascending file order.
    pub fn alignment_patches(&self) -> &[AlignmentPatch] {
        &self.alignment_patches
    }

    /// Central directory offset rewrites, in ascending file order.
    pub fn offset_patches(&self) -> &[OffsetPatch] {
        &self.offset_patches
    }

    /// The end-of-central-directory record of the source archive.
    pub fn eocd(&self) -> &EndOfCentralDirectory {
        &self.eocd
    }

    /// Size of the source archive.
    pub fn input_size(&self) -> u64 {
        self.input_size
    }

    /// Size the rewritten archive will have.
    pub fn output_size(&self) -> u64 {
        self.input_size + self.shift
    }

    /// Number of central directory entries visited.
    pub fn entries_scanned(&self) -> usize {
        self.entries_scanned
    }

    /// Number of entries that receive padding.
    pub fn entries_padded(&self) -> usize {
        self.alignment_patches.len()
    }

    /// Returns `true` when the output will be byte-identical to the input.
    pub fn is_noop(&self) -> bool {
        self.alignment_patches.is_empty()
    }

    /// The EOCD central-directory-offset rewrite: original offset plus total shift.
    pub fn directory_offset_patch(&self) -> Result<OffsetPatch> {
        Ok(OffsetPatch {
            field_position: self.eocd.directory_offset_field(),
            new_value: self.shifted(u64::from(self.eocd.directory_offset))?,
        })
    }

    /// `offset` displaced by the current shift, checked against 32 bits.
    pub(crate) fn shifted(&self, offset: u64) -> Result<u32> {
        u32::try_from(offset + self.shift).map_err(|_| Error::OffsetOverflow {
            offset,
            shift: self.shift,
        })
    }

    pub(crate) fn record_entry(&mut self) {
        self.entries_scanned += 1;
    }

    /// Appends an extra-field insertion and grows the shift by its padding.
    pub(crate) fn push_alignment(&mut self, patch: AlignmentPatch) -> Result<()> {
        if self
            .alignment_patches
            .last()
            .is_some_and(|last| patch.field_position <= last.field_position)
        {
            return Err(Error::corrupt_directory(
                patch.field_position,
                "local headers are not in ascending order",
            ));
        }
        self.shift += u64::from(patch.padding_length);
        self.alignment_patches.push(patch);
        Ok(())
    }

    /// Appends a central directory offset rewrite.
    pub(crate) fn push_offset(&mut self, patch: OffsetPatch) -> Result<()> {
        if self
            .offset_patches
            .last()
            .is_some_and(|last| patch.field_position <= last.field_position)
        {
            return Err(Error::corrupt_directory(
                patch.field_position,
                "central directory records overlap",
            ));
        }
        self.offset_patches.push(patch);
        Ok(())
    }
}

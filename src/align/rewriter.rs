//! Single forward pass that applies a [`PatchPlan`].
//!
//! The source is read exactly once from offset 0 to its end. Unpatched bytes
//! are copied in [`READ_BUFFER_SIZE`] chunks; patched fields are replaced and
//! padding is inserted inline, so memory use does not depend on archive size.

use std::io::{self, Read, Seek, SeekFrom, Write};

use super::patch::{OffsetPatch, PatchPlan};
use crate::progress::{AlignEvent, EventSink};
use crate::{Error, READ_BUFFER_SIZE, Result};

/// Source bytes between two [`AlignEvent::Progress`] events during bulk copies.
const PROGRESS_INTERVAL: u64 = 1024 * 1024;

/// Streams the source archive into the destination, applying patches.
pub(crate) struct StreamRewriter<'a, R, W, E: ?Sized> {
    reader: &'a mut R,
    writer: &'a mut W,
    events: &'a mut E,
    /// Source bytes consumed.
    position: u64,
    /// Destination bytes produced.
    written: u64,
    total: u64,
    last_reported: u64,
    buffer: Vec<u8>,
}

impl<'a, R, W, E> StreamRewriter<'a, R, W, E>
where
    R: Read + Seek,
    W: Write,
    E: EventSink + ?Sized,
{
    pub(crate) fn new(
        reader: &'a mut R,
        writer: &'a mut W,
        events: &'a mut E,
        total: u64,
    ) -> Self {
        Self {
            reader,
            writer,
            events,
            position: 0,
            written: 0,
            total,
            last_reported: 0,
            buffer: vec![0u8; READ_BUFFER_SIZE],
        }
    }

    /// Writes the aligned archive and returns the number of bytes produced.
    pub(crate) fn rewrite(mut self, plan: &PatchPlan) -> Result<u64> {
        self.reader.seek(SeekFrom::Start(0))?;

        if plan.is_noop() {
            self.events.on_event(AlignEvent::Passthrough);
            self.copy_to(self.total)?;
            self.writer.flush()?;
            self.report();
            return Ok(self.written);
        }

        for patch in plan.alignment_patches() {
            self.copy_to(patch.field_position)?;
            self.replace(&patch.new_extra_length.to_le_bytes())?;
            self.copy_exact(u64::from(patch.pass_before_padding))?;
            self.write_padding(patch.padding_length)?;
            self.writer.flush()?;
            self.report();
        }

        let directory_patch = plan.directory_offset_patch()?;
        for patch in plan
            .offset_patches()
            .iter()
            .chain(std::iter::once(&directory_patch))
        {
            self.apply_offset(patch)?;
        }

        self.copy_to(self.total)?;
        self.writer.flush()?;
        self.report();

        debug_assert_eq!(self.written, plan.output_size());
        Ok(self.written)
    }

    fn apply_offset(&mut self, patch: &OffsetPatch) -> Result<()> {
        self.copy_to(patch.field_position)?;
        self.replace(&patch.new_value.to_le_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Copies source bytes up to (not including) `target`.
    fn copy_to(&mut self, target: u64) -> Result<()> {
        if target < self.position {
            return Err(Error::corrupt_directory(
                target,
                "patch position lies behind data already written",
            ));
        }
        self.copy_exact(target - self.position)
    }

    fn copy_exact(&mut self, mut remaining: u64) -> Result<()> {
        while remaining > 0 {
            let chunk = remaining.min(self.buffer.len() as u64) as usize;
            let read = self.fill(chunk)?;
            self.writer.write_all(&self.buffer[..read])?;
            self.written += read as u64;
            remaining -= read as u64;

            if self.position - self.last_reported >= PROGRESS_INTERVAL {
                self.report();
            }
        }
        Ok(())
    }

    /// Writes `bytes` in place of the same number of source bytes.
    fn replace(&mut self, bytes: &[u8]) -> Result<()> {
        let mut skipped = 0;
        while skipped < bytes.len() {
            skipped += self.fill(bytes.len() - skipped)?;
        }
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn write_padding(&mut self, length: u32) -> Result<()> {
        let copied = io::copy(&mut io::repeat(0).take(u64::from(length)), &mut *self.writer)?;
        self.written += copied;
        Ok(())
    }

    /// Reads up to `len` source bytes into the buffer, failing at end of input.
    fn fill(&mut self, len: usize) -> Result<usize> {
        loop {
            match self.reader.read(&mut self.buffer[..len]) {
                Ok(0) => {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source archive ended at offset {}", self.position),
                    )));
                }
                Ok(read) => {
                    self.position += read as u64;
                    return Ok(read);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn report(&mut self) {
        self.last_reported = self.position;
        self.events.on_event(AlignEvent::Progress {
            bytes_read: self.position,
            total_bytes: self.total,
        });
    }
}

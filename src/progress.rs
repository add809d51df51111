//! Progress and diagnostic events for alignment runs.
//!
//! Every alignment call takes an explicit [`EventSink`] instead of reporting
//! through a globally installed logger, so the engine stays independent of
//! whatever UI or reporting layer drives it.
//!
//! Provided sinks:
//! - [`NoEvents`]: discards everything
//! - [`LogEvents`]: forwards to the `log` facade
//! - [`CollectEvents`]: keeps every event in memory
//! - closures via [`events_fn`]
//! - `std::sync::mpsc::Sender<AlignEvent>` for an event channel
//!
//! # Example
//!
//! ```rust,no_run
//! use apkalign::{AlignOptions, ZipAligner, progress::events_fn, AlignEvent};
//! use std::fs::File;
//!
//! # fn main() -> apkalign::Result<()> {
//! let aligner = ZipAligner::open_path("app-unaligned.apk")?.with_options(AlignOptions::default());
//! let output = File::create("app-aligned.apk")?;
//! aligner.align_with_events(output, &mut events_fn(|event| {
//!     if let AlignEvent::EntryPadded { name, padding, .. } = event {
//!         println!("{name}: +{padding}");
//!     }
//! }))?;
//! # Ok(())
//! # }
//! ```

use std::sync::mpsc::Sender;

/// Something that happened during an alignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AlignEvent {
    /// The run started.
    Started {
        /// Size of the source archive.
        input_size: u64,
        /// General alignment in effect (0 = disabled).
        alignment: u32,
        /// Shared-library alignment in effect (0 = disabled).
        so_alignment: u32,
    },
    /// The end-of-central-directory record was found.
    DirectoryLocated {
        /// Position of the EOCD record.
        eocd_offset: u64,
        /// Position of the first central directory record.
        directory_offset: u64,
        /// Number of entries the directory declares.
        entries: u16,
    },
    /// An entry received padding.
    EntryPadded {
        /// Entry name.
        name: String,
        /// Data offset in the output archive after padding.
        data_offset: u64,
        /// Alignment that was applied.
        alignment: u32,
        /// Padding bytes inserted.
        padding: u32,
    },
    /// Scanning finished and the patch lists are complete.
    Planned {
        /// Entries that need padding.
        entries_padded: usize,
        /// Total padding bytes to insert.
        total_padding: u64,
    },
    /// No entry needs padding; the archive is copied unchanged.
    Passthrough,
    /// Source bytes consumed by the rewriter so far.
    Progress {
        /// Source bytes read.
        bytes_read: u64,
        /// Size of the source archive.
        total_bytes: u64,
    },
    /// The output archive is complete.
    Finished {
        /// Bytes written to the output.
        output_size: u64,
    },
}

/// Receiver of [`AlignEvent`]s.
pub trait EventSink {
    /// Called for every event, in the order events occur.
    fn on_event(&mut self, event: AlignEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_event(&mut self, event: AlignEvent) {
        (**self).on_event(event);
    }
}

/// A sink that discards every event (null object pattern).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvents;

impl EventSink for NoEvents {
    fn on_event(&mut self, _event: AlignEvent) {}
}

/// A sink that forwards events to the `log` facade under the `apkalign` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEvents;

impl EventSink for LogEvents {
    fn on_event(&mut self, event: AlignEvent) {
        match event {
            AlignEvent::Started {
                alignment,
                so_alignment,
                ..
            } => {
                log::info!(target: "apkalign", "Starting zip alignment");
                log::debug!(
                    target: "apkalign",
                    "Alignment: {}, SO alignment: {}",
                    alignment,
                    so_alignment
                );
            }
            AlignEvent::DirectoryLocated {
                eocd_offset,
                entries,
                ..
            } => {
                log::debug!(target: "apkalign", "Found EOCD at position: {}", eocd_offset);
                log::debug!(target: "apkalign", "Total entries: {}", entries);
            }
            AlignEvent::EntryPadded {
                name,
                data_offset,
                padding,
                ..
            } => {
                log::debug!(
                    target: "apkalign",
                    "Padding {} by {} bytes (data at {})",
                    name,
                    padding,
                    data_offset
                );
            }
            AlignEvent::Planned { entries_padded, .. } if entries_padded > 0 => {
                log::info!(target: "apkalign", "Aligning {} files", entries_padded);
            }
            AlignEvent::Planned { .. } => {}
            AlignEvent::Passthrough => {
                log::info!(target: "apkalign", "No alignment needed, copying as-is");
            }
            AlignEvent::Progress {
                bytes_read,
                total_bytes,
            } => {
                log::trace!(target: "apkalign", "{}/{} bytes", bytes_read, total_bytes);
            }
            AlignEvent::Finished { .. } => {
                log::info!(target: "apkalign", "Zip alignment complete");
            }
        }
    }
}

/// A sink that records every event.
#[derive(Debug, Default, Clone)]
pub struct CollectEvents {
    /// Events in arrival order.
    pub events: Vec<AlignEvent>,
}

impl CollectEvents {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names and padding of every padded entry.
    pub fn padded_entries(&self) -> Vec<(&str, u32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AlignEvent::EntryPadded { name, padding, .. } => Some((name.as_str(), *padding)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for CollectEvents {
    fn on_event(&mut self, event: AlignEvent) {
        self.events.push(event);
    }
}

/// Forwards events over a channel; a disconnected receiver is ignored.
impl EventSink for Sender<AlignEvent> {
    fn on_event(&mut self, event: AlignEvent) {
        let _ = self.send(event);
    }
}

/// A sink that wraps a closure.
pub struct ClosureEvents<F> {
    callback: F,
}

impl<F> ClosureEvents<F>
where
    F: FnMut(AlignEvent),
{
    /// Creates a sink from a closure.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> EventSink for ClosureEvents<F>
where
    F: FnMut(AlignEvent),
{
    fn on_event(&mut self, event: AlignEvent) {
        (self.callback)(event);
    }
}

/// Creates a closure-based event sink.
pub fn events_fn<F>(f: F) -> ClosureEvents<F>
where
    F: FnMut(AlignEvent),
{
    ClosureEvents::new(f)
}

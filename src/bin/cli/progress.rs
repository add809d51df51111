//! Progress bar implementation for CLI operations.

use apkalign::{AlignEvent, EventSink};
use indicatif::{ProgressBar, ProgressStyle};

/// An entry that received padding.
#[derive(Debug, Clone)]
pub struct PaddedEntry {
    pub name: String,
    pub data_offset: u64,
    pub alignment: u32,
    pub padding: u32,
}

impl PaddedEntry {
    /// Extracts the padded entry from an [`AlignEvent::EntryPadded`] event.
    pub fn from_event(event: &AlignEvent) -> Option<Self> {
        match event {
            AlignEvent::EntryPadded {
                name,
                data_offset,
                alignment,
                padding,
            } => Some(Self {
                name: name.clone(),
                data_offset: *data_offset,
                alignment: *alignment,
                padding: *padding,
            }),
            _ => None,
        }
    }
}

/// Byte progress bar for an alignment run, driven by alignment events
pub struct AlignProgress {
    bar: ProgressBar,
    padded: Vec<PaddedEntry>,
}

impl AlignProgress {
    /// Creates a new progress display
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        };

        Self {
            bar,
            padded: Vec::new(),
        }
    }

    /// Entries padded so far
    pub fn padded(&self) -> &[PaddedEntry] {
        &self.padded
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Finishes with a custom message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.abandon_with_message(msg.into());
    }
}

impl EventSink for AlignProgress {
    fn on_event(&mut self, event: AlignEvent) {
        if let Some(entry) = PaddedEntry::from_event(&event) {
            self.padded.push(entry);
            return;
        }

        match event {
            AlignEvent::Started { input_size, .. } => {
                self.bar.set_length(input_size);
                self.bar.set_message("Scanning...");
            }
            AlignEvent::Planned { entries_padded, .. } => {
                self.bar
                    .set_message(format!("Aligning {} entries...", entries_padded));
            }
            AlignEvent::Passthrough => {
                self.bar.set_message("Copying unchanged...");
            }
            AlignEvent::Progress { bytes_read, .. } => {
                self.bar.set_position(bytes_read);
            }
            _ => {}
        }
    }
}

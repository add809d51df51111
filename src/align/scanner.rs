//! Central directory scan that produces a [`PatchPlan`].
//!
//! Every record is read, decided upon and discarded in file order. The only
//! state carried from one record to the next is the plan itself (both patch
//! lists and the cumulative shift) and the position of the last padded local
//! header.

use std::io::{Read, Seek, SeekFrom};

use super::options::AlignOptions;
use super::patch::{AlignmentPatch, OffsetPatch, PatchPlan};
use super::planner::{padding_for, required_alignment};
use crate::format::central::CentralDirectoryCursor;
use crate::format::eocd::read_eocd;
use crate::format::field;
use crate::format::local::read_local_lengths;
use crate::progress::{AlignEvent, EventSink};
use crate::{Error, Result};

/// Locates the EOCD and walks the central directory, planning every edit.
pub(crate) fn scan<R: Read + Seek>(
    reader: &mut R,
    options: &AlignOptions,
    events: &mut dyn EventSink,
) -> Result<PatchPlan> {
    let input_size = reader.seek(SeekFrom::End(0))?;
    let eocd = read_eocd(reader)?;
    eocd.ensure_not_zip64()?;

    let directory_offset = u64::from(eocd.directory_offset);
    events.on_event(AlignEvent::DirectoryLocated {
        eocd_offset: eocd.offset,
        directory_offset,
        entries: eocd.total_entries,
    });

    if directory_offset > eocd.offset {
        return Err(Error::corrupt_directory(
            directory_offset,
            "central directory starts after the end-of-central-directory record",
        ));
    }

    let mut plan = PatchPlan::new(eocd, input_size);
    let mut cursor = CentralDirectoryCursor::new(&eocd);
    let mut furthest_header: Option<u64> = None;
    let mut last_padded_header: Option<u64> = None;

    while let Some(record) = cursor.read_next(reader)? {
        plan.record_entry();
        let header_offset = u64::from(record.local_header_offset);

        if header_offset >= directory_offset {
            return Err(Error::corrupt_directory(
                record.offset,
                "local header offset points into the central directory",
            ));
        }

        // Shift from earlier entries only; this entry's own padding moves later entries.
        if plan.shift() != 0 {
            if last_padded_header.is_some_and(|padded| header_offset <= padded) {
                return Err(Error::corrupt_directory(
                    record.offset,
                    "entry is stored before an entry that was already padded",
                ));
            }
            plan.push_offset(OffsetPatch {
                field_position: record.local_header_offset_field(),
                new_value: plan.shifted(header_offset)?,
            })?;
        }

        let earlier_header = furthest_header;
        furthest_header = Some(earlier_header.map_or(header_offset, |h| h.max(header_offset)));

        let Some(rule) = required_alignment(&record.name, record.method, options) else {
            continue;
        };

        let lengths = read_local_lengths(reader, header_offset)?;
        let data_offset = lengths.data_offset(header_offset) + plan.shift();
        let padding = padding_for(data_offset, rule.alignment);
        if padding == 0 {
            continue;
        }

        if earlier_header.is_some_and(|earlier| header_offset <= earlier) {
            return Err(Error::corrupt_directory(
                record.offset,
                "padded entry is stored before earlier directory entries",
            ));
        }

        let extra_length = u32::from(lengths.extra_length) + padding;
        let new_extra_length =
            u16::try_from(extra_length).map_err(|_| Error::ExtraFieldOverflow {
                entry: record.name_lossy(),
                length: extra_length,
            })?;

        plan.push_alignment(AlignmentPatch {
            field_position: header_offset + field::local::EXTRA_LENGTH,
            new_extra_length,
            pass_before_padding: lengths.tail_len(),
            padding_length: padding,
        })?;
        last_padded_header = Some(header_offset);

        events.on_event(AlignEvent::EntryPadded {
            name: record.name_lossy(),
            data_offset: data_offset + u64::from(padding),
            alignment: rule.alignment,
            padding,
        });
    }

    events.on_event(AlignEvent::Planned {
        entries_padded: plan.entries_padded(),
        total_padding: plan.total_padding(),
    });
    Ok(plan)
}

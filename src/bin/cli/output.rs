//! Output formatting for CLI operations.

use serde_json::json;
use std::path::Path;

use apkalign::verify::EntryAlignment;
use apkalign::{AlignResult, AlignmentReport, CrcStatus, IntegrityReport, PatchPlan};

use crate::progress::PaddedEntry;

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the result of an alignment run
    fn format_align_result(
        &self,
        input: &Path,
        output: &Path,
        result: &AlignResult,
        padded: &[PaddedEntry],
    ) -> String;

    /// Formats a dry-run plan
    fn format_plan(&self, archive: &Path, plan: &PatchPlan, padded: &[PaddedEntry]) -> String;

    /// Formats alignment check results, with optional CRC results
    fn format_check(
        &self,
        archive: &Path,
        report: &AlignmentReport,
        integrity: Option<&IntegrityReport>,
        verbose: bool,
    ) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_align_result(
        &self,
        input: &Path,
        output: &Path,
        result: &AlignResult,
        padded: &[PaddedEntry],
    ) -> String {
        let mut out = String::new();

        for entry in padded {
            out.push_str(&format_padded(entry));
        }

        if result.is_unchanged() {
            out.push_str(&format!(
                "{} already aligned, copied to {} ({})\n",
                input.display(),
                output.display(),
                humanize_bytes(result.output_size)
            ));
        } else {
            out.push_str(&format!(
                "Aligned {} of {} entries, {} padding bytes ({} -> {})\n",
                result.entries_padded,
                result.entries_total,
                result.padding_bytes,
                humanize_bytes(result.input_size),
                humanize_bytes(result.output_size)
            ));
        }

        out
    }

    fn format_plan(&self, archive: &Path, plan: &PatchPlan, padded: &[PaddedEntry]) -> String {
        let mut out = String::new();

        out.push_str(&format!("Alignment plan for {}:\n", archive.display()));
        out.push_str(&"-".repeat(40));
        out.push('\n');
        out.push_str(&format!("  Entries:        {}\n", plan.entries_scanned()));
        out.push_str(&format!("  To pad:         {}\n", plan.entries_padded()));
        out.push_str(&format!("  Padding:        {} bytes\n", plan.total_padding()));
        out.push_str(&format!(
            "  Offsets moved:  {}\n",
            plan.offset_patches().len()
        ));
        out.push_str(&format!(
            "  Size:           {} -> {}\n",
            humanize_bytes(plan.input_size()),
            humanize_bytes(plan.output_size())
        ));

        if !padded.is_empty() {
            out.push('\n');
            for entry in padded {
                out.push_str(&format_padded(entry));
            }
        }

        out
    }

    fn format_check(
        &self,
        archive: &Path,
        report: &AlignmentReport,
        integrity: Option<&IntegrityReport>,
        verbose: bool,
    ) -> String {
        let mut out = String::new();

        out.push_str(&format!("Verifying alignment of {}\n", archive.display()));
        for entry in &report.entries {
            if verbose || !entry.aligned {
                out.push_str(&format_entry_alignment(entry));
            }
        }

        let misaligned = report.misaligned().count();
        if misaligned == 0 {
            out.push_str("Verification successful\n");
        } else {
            out.push_str(&format!(
                "Verification FAILED: {} of {} entries misaligned\n",
                misaligned,
                report.entries.len()
            ));
        }

        if let Some(integrity) = integrity {
            for entry in integrity.failures() {
                out.push_str(&format!(
                    "  {}: {}\n",
                    entry.name,
                    describe_crc(&entry.status)
                ));
            }
            let skipped = integrity.entries.len() - integrity.checked();
            if integrity.is_ok() {
                out.push_str(&format!(
                    "CRC OK - {} entries checked, {} skipped\n",
                    integrity.checked(),
                    skipped
                ));
            } else {
                out.push_str(&format!(
                    "CRC FAILED: {} of {} checked entries\n",
                    integrity.failures().count(),
                    integrity.checked()
                ));
            }
        }

        out
    }
}

fn format_padded(entry: &PaddedEntry) -> String {
    format!(
        "{:>10} {} (+{} -> {}-byte boundary)\n",
        entry.data_offset, entry.name, entry.padding, entry.alignment
    )
}

fn format_entry_alignment(entry: &EntryAlignment) -> String {
    let status = match (&entry.required_alignment, entry.aligned) {
        (None, _) => "(not required)".to_string(),
        (Some(rule), true) => format!("(OK - {})", rule.alignment),
        (Some(rule), false) => format!("(BAD - {})", rule.alignment),
    };
    let compressed = if entry.method == 0 { "" } else { " (compressed)" };
    format!(
        "{:>10} {}{} {}\n",
        entry.data_offset, entry.name, compressed, status
    )
}

fn describe_crc(status: &CrcStatus) -> String {
    match status {
        CrcStatus::Match => "OK".to_string(),
        CrcStatus::Mismatch { expected, actual } => {
            format!("CRC mismatch (expected {:08X}, got {:08X})", expected, actual)
        }
        CrcStatus::Damaged { reason } => format!("damaged: {}", reason),
        CrcStatus::Skipped { method } => format!("skipped (method {})", method),
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_align_result(
        &self,
        input: &Path,
        output: &Path,
        result: &AlignResult,
        padded: &[PaddedEntry],
    ) -> String {
        let obj = json!({
            "input": input.display().to_string(),
            "output": output.display().to_string(),
            "entries_total": result.entries_total,
            "entries_padded": result.entries_padded,
            "padding_bytes": result.padding_bytes,
            "input_size": result.input_size,
            "output_size": result.output_size,
            "padded": padded_json(padded),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_plan(&self, archive: &Path, plan: &PatchPlan, padded: &[PaddedEntry]) -> String {
        let obj = json!({
            "archive": archive.display().to_string(),
            "entries_total": plan.entries_scanned(),
            "entries_padded": plan.entries_padded(),
            "padding_bytes": plan.total_padding(),
            "offsets_moved": plan.offset_patches().len(),
            "eocd_offset": plan.eocd().offset,
            "directory_offset": plan.eocd().directory_offset,
            "input_size": plan.input_size(),
            "output_size": plan.output_size(),
            "padded": padded_json(padded),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_check(
        &self,
        archive: &Path,
        report: &AlignmentReport,
        integrity: Option<&IntegrityReport>,
        _verbose: bool,
    ) -> String {
        let entries: Vec<_> = report
            .entries
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "method": e.method,
                    "local_header_offset": e.local_header_offset,
                    "data_offset": e.data_offset,
                    "required_alignment": e.required_alignment.map(|r| r.alignment),
                    "aligned": e.aligned,
                })
            })
            .collect();

        let crc = integrity.map(|integrity| {
            json!({
                "success": integrity.is_ok(),
                "entries_checked": integrity.checked(),
                "failures": integrity
                    .failures()
                    .map(|e| json!({"name": e.name, "error": describe_crc(&e.status)}))
                    .collect::<Vec<_>>(),
            })
        });

        let obj = json!({
            "archive": archive.display().to_string(),
            "aligned": report.is_aligned(),
            "entries": entries,
            "crc": crc,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

fn padded_json(padded: &[PaddedEntry]) -> Vec<serde_json::Value> {
    padded
        .iter()
        .map(|e| {
            json!({
                "name": e.name,
                "data_offset": e.data_offset,
                "alignment": e.alignment,
                "padding": e.padding,
            })
        })
        .collect()
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

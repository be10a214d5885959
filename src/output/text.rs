//! Human-readable output for terminals.
//!
//! Colors come from `yansi` and follow its global switch, which the binary
//! turns off for `--no-color`, `NO_COLOR` or a non-terminal stdout.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use super::normalize_path;
use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text formatter for groups and the scan summary.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write every group followed by the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(writer, "{}", "No duplicates found.".yellow())?;
            writeln!(writer)?;
        }

        for (idx, group) in self.groups.iter().enumerate() {
            self.write_group(writer, idx + 1, group)?;
        }

        self.write_summary(writer)
    }

    fn write_group<W: Write>(
        &self,
        writer: &mut W,
        number: usize,
        group: &DuplicateGroup,
    ) -> io::Result<()> {
        let size = ByteSize::b(group.size);
        if group.has_duplicates() {
            writeln!(
                writer,
                "{} {} files, {} each, {} reclaimable",
                format!("Group {number}:").bold().cyan(),
                group.len(),
                size,
                ByteSize::b(group.wasted_space()).green()
            )?;
        } else {
            writeln!(
                writer,
                "{} 1 file, {}",
                format!("Unique {number}:").dim(),
                size
            )?;
        }

        for path in &group.files {
            writeln!(writer, "  {}", normalize_path(path))?;
        }
        writeln!(writer)
    }

    fn write_summary<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let s = self.summary;
        writeln!(writer, "{}", "Summary".bold())?;
        writeln!(
            writer,
            "  Files compared:   {} ({})",
            s.total_files,
            s.total_size_display()
        )?;
        writeln!(writer, "  Duplicate groups: {}", s.duplicate_groups)?;
        writeln!(writer, "  Duplicate files:  {}", s.duplicate_files)?;
        writeln!(
            writer,
            "  Reclaimable:      {}",
            s.reclaimable_display().green().bold()
        )?;
        writeln!(writer, "  Rounds:           {}", s.rounds)?;
        writeln!(
            writer,
            "  Bytes read:       {} ({:.1}%)",
            s.bytes_read_display(),
            s.read_percentage()
        )?;
        if s.walk_errors > 0 {
            writeln!(
                writer,
                "  Walk errors:      {}",
                s.walk_errors.to_string().red()
            )?;
        }
        if s.failed_files > 0 {
            writeln!(
                writer,
                "  Unreadable files: {}",
                s.failed_files.to_string().red()
            )?;
        }
        writeln!(writer, "  Duration:         {:.2?}", s.scan_duration)
    }

    /// Render to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if formatting fails.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

use std::fmt;

/// Statistics collected during one transcode call.
///
/// # Fields
///
/// * `physical_lines` - Lines read from the input, blank ones included
/// * `records` - CSV lines emitted for logical records
/// * `fields` - Total fields written across all records
/// * `blank_lines` - Blank lines passed through between records
/// * `largest_record` - Size in bytes of the largest record body
/// * `dropped_trailing_bytes` - Bytes of an unterminated final record that were discarded
/// * `flushed_trailing` - Whether an unterminated final record was emitted anyway
///
/// # Example
///
/// ```
/// use csv_cleaner::transcoder::TranscodeStats;
///
/// let stats = TranscodeStats::default();
/// assert_eq!(stats.records, 0);
/// assert!(!stats.lost_content());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranscodeStats {
    pub physical_lines: u64,
    pub records: u64,
    pub fields: u64,
    pub blank_lines: u64,
    pub largest_record: usize,
    pub dropped_trailing_bytes: usize,
    pub flushed_trailing: bool,
}

impl TranscodeStats {
    /// True when input content was discarded because the final record was
    /// never terminated.
    pub fn lost_content(&self) -> bool {
        self.dropped_trailing_bytes > 0
    }

    pub(crate) fn record_emitted(&mut self, body_len: usize, fields: usize) {
        self.records += 1;
        self.fields += fields as u64;
        if body_len > self.largest_record {
            self.largest_record = body_len;
        }
    }
}

impl fmt::Display for TranscodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transcode Report")?;
        writeln!(f, "================")?;
        writeln!(f, "  Physical lines:    {:>10}", self.physical_lines)?;
        writeln!(f, "  Records:           {:>10}", self.records)?;
        writeln!(f, "  Fields:            {:>10}", self.fields)?;
        writeln!(f, "  Blank lines:       {:>10}", self.blank_lines)?;
        writeln!(f, "  Largest record:    {:>10} bytes", self.largest_record)?;

        if self.flushed_trailing {
            writeln!(f)?;
            writeln!(f, "Unterminated final record was flushed.")?;
        } else if self.lost_content() {
            writeln!(f)?;
            writeln!(
                f,
                "Unterminated final record dropped ({} bytes).",
                self.dropped_trailing_bytes
            )?;
        }

        Ok(())
    }
}

//! End-of-shift summary log: one CSV row per completed shift, newest last.
//! Best-effort like every other persistence path; callers log and move on.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row per completed shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftLogRow {
    pub date: String,
    pub shift: String,
    pub cycles: u32,
    pub expected_cycles: i64,
    pub andons: u32,
}

/// Append one row, writing headers only when the file is new.
pub fn append_row(path: &Path, row: &ShiftLogRow) -> eyre::Result<()> {
    let new_file = !path.exists();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(new_file)
        .from_writer(file);
    wtr.serialize(row)?;
    wtr.flush()?;
    Ok(())
}

/// Read back the most recent `n` rows (the display shows the last 3 shifts).
/// Malformed rows are skipped with a warning rather than failing the read.
pub fn last_rows(path: &Path, n: usize) -> eyre::Result<Vec<ShiftLogRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = Vec::new();
    for record in rdr.deserialize::<ShiftLogRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(error = %e, "skipping malformed shift log row"),
        }
    }
    let keep_from = rows.len().saturating_sub(n);
    Ok(rows.split_off(keep_from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, cycles: u32) -> ShiftLogRow {
        ShiftLogRow {
            date: date.to_string(),
            shift: "day".to_string(),
            cycles,
            expected_cycles: 96,
            andons: 1,
        }
    }

    #[test]
    fn appends_and_reads_back_last_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shifts.csv");
        for (i, date) in ["2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04"]
            .iter()
            .enumerate()
        {
            append_row(&path, &row(date, i as u32)).expect("append");
        }
        let rows = last_rows(&path, 3).expect("read back");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "2024-06-02");
        assert_eq!(rows[2].date, "2024-06-04");
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rows = last_rows(&dir.path().join("none.csv"), 3).expect("read");
        assert!(rows.is_empty());
    }
}

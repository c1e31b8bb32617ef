//! CSV export of the full session history.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Result, SessionError};
use crate::history::StreamBuffer;
use crate::sample::{datetime_label, mean_cpu_load};

/// Lets spreadsheet tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const SUMMARY_COLUMNS: [&str; 5] = [
    "Timestamp",
    "FPS",
    "CPU Avg Load (%)",
    "GPU Load (%)",
    "Power (mW)",
];

/// Serialize every sample in `buffer`. Per-core columns cover the largest core
/// set seen this session; rows with fewer cores get empty cells.
pub fn export(buffer: &StreamBuffer) -> Result<Vec<u8>> {
    if buffer.is_empty() {
        return Err(SessionError::NothingToExport);
    }
    let core_columns = buffer
        .full_history()
        .map(|s| s.cores.len())
        .max()
        .unwrap_or(0);

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.to_vec());

    let mut header: Vec<String> = SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend((0..core_columns).map(|i| format!("CPU Core {i} Load (%)")));
    wtr.write_record(&header).map_err(csv_err)?;

    for s in buffer.full_history() {
        let mut row = vec![
            datetime_label(s.timestamp),
            s.fps.to_string(),
            format!("{:.2}", mean_cpu_load(s)?),
            s.gpu_load.to_string(),
            s.power.to_string(),
        ];
        // cores are already in index order
        row.extend(s.cores.iter().map(|c| c.load_pct.to_string()));
        row.resize(SUMMARY_COLUMNS.len() + core_columns, String::new());
        wtr.write_record(&row).map_err(csv_err)?;
    }

    wtr.into_inner()
        .map_err(|e| SessionError::Io(std::io::Error::other(e.to_string())))
}

fn csv_err(e: csv::Error) -> SessionError {
    SessionError::Io(std::io::Error::other(e))
}

pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("perf_data_{}.csv", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Write an export into `dir` (created if missing), returning the file path.
pub fn save_export(dir: &Path, now: DateTime<Utc>, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(now));
    fs::write(&path, bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::tests::sample;
    use chrono::TimeZone;

    fn body(bytes: &[u8]) -> &str {
        assert!(bytes.starts_with(UTF8_BOM));
        std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap()
    }

    #[test]
    fn empty_buffer_has_nothing_to_export() {
        let buf = StreamBuffer::new();
        assert!(matches!(export(&buf), Err(SessionError::NothingToExport)));
    }

    #[test]
    fn one_sample_four_cores() {
        let mut buf = StreamBuffer::new();
        buf.append(sample(1_700_000_000.0, &[10.0, 20.0, 30.5, 40.5]));
        let out = export(&buf).unwrap();
        let text = body(&out);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(',').count(), 9);
        assert!(lines[0].starts_with("Timestamp,FPS,CPU Avg Load (%)"));
        assert!(lines[0].ends_with("CPU Core 3 Load (%)"));

        let row: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(row.len(), 9);
        assert_eq!(row[0], datetime_label(1_700_000_000.0));
        assert_eq!(&row[1..], ["60", "25.25", "42", "1400", "10", "20", "30.5", "40.5"]);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn varying_core_count_pads_instead_of_misaligning() {
        let mut buf = StreamBuffer::new();
        buf.append(sample(1.0, &[10.0, 20.0]));
        buf.append(sample(2.0, &[1.0, 2.0, 3.0, 4.0]));
        let out = export(&buf).unwrap();
        let lines: Vec<&str> = body(&out).lines().collect();
        assert_eq!(lines.len(), 3);
        for l in &lines {
            assert_eq!(l.split(',').count(), 9);
        }
        assert!(lines[1].ends_with(",10,20,,"));
        assert!(lines[2].ends_with(",1,2,3,4"));
    }

    #[test]
    fn filename_stamped_with_export_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(export_filename(now), "perf_data_2026-03-04T05-06-07.csv");
    }

    #[test]
    fn save_writes_into_dir() {
        let td = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let dir = td.path().join("exports");
        let path = save_export(&dir, now, b"abc").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
        assert!(path.ends_with("perf_data_2026-01-01T00-00-00.csv"));
    }
}

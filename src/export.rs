use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::store::Sample;

#[derive(Serialize)]
struct Row<'a> {
    timestamp: String,
    wpm: u32,
    user_id: &'a str,
}

/// Write samples as CSV with a `timestamp,wpm,user_id` header
pub fn write_csv<W: Write>(samples: &[Sample], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for s in samples {
        wtr.serialize(Row {
            timestamp: s.timestamp.to_rfc3339(),
            wpm: s.wpm,
            user_id: &s.user_id,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn writes_header_and_rows() {
        let t0 = Local.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap();
        let samples = vec![
            Sample::new(t0, 42, "defaultUser"),
            Sample::new(t0 + chrono::Duration::seconds(10), 0, "defaultUser"),
        ];
        let mut out = Vec::new();
        write_csv(&samples, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,wpm,user_id");
        assert!(lines[1].ends_with(",42,defaultUser"));
        assert!(lines[2].starts_with(&(t0 + chrono::Duration::seconds(10)).to_rfc3339()));
    }

    #[test]
    fn empty_export_writes_nothing() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}

use std::path::Path;

use anyhow::{bail, Context};
use inner_orbit_analytics::{JournalRecord, LogKind};

/// Reads records from a JSON backup array or a CSV file, chosen by extension.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<JournalRecord>> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => read_json(path),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => read_csv(path),
        _ => bail!(
            "unsupported record file {} (expected .json or .csv)",
            path.display()
        ),
    }
}

pub fn read_json(path: &Path) -> anyhow::Result<Vec<JournalRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<JournalRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of entries", path.display()))?;
    tracing::info!(count = records.len(), path = %path.display(), "loaded JSON backup");
    Ok(records)
}

pub fn read_csv(path: &Path) -> anyhow::Result<Vec<JournalRecord>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        id: i64,
        timestamp: String,
        content: String,
        gravity: i32,
        stability: i32,
        log_type: Option<String>,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("bad CSV row {} in {}", line + 1, path.display()))?;
        let kind = match row.log_type.as_deref().map(str::trim) {
            None | Some("") => LogKind::Daily,
            Some(value) => match value.parse() {
                Ok(kind) => kind,
                Err(err) => {
                    tracing::warn!(id = row.id, %err, "unknown log type, treating as daily");
                    LogKind::Daily
                }
            },
        };

        records.push(JournalRecord {
            id: row.id,
            timestamp: row.timestamp,
            content: row.content,
            external_pull: row.gravity,
            core_stability: row.stability,
            kind,
        });
    }

    tracing::info!(count = records.len(), path = %path.display(), "loaded CSV entries");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_frontend_backup_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"id": 2, "date": "2024년 12월 5일 09:18", "content": "[Log]: tired", "gravity": 80, "stability": 25}},
                {{"id": 1, "createdAt": "2024-12-04T21:00:00", "content": "ok", "gravity": 30, "stability": 70, "logType": "SENSORY"}}
            ]"#
        )
        .unwrap();

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, "2024년 12월 5일 09:18");
        assert_eq!(records[1].kind, LogKind::Sensory);
    }

    #[test]
    fn reads_csv_with_optional_log_type() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,timestamp,content,gravity,stability,log_type").unwrap();
        writeln!(file, "1,2024-12-04T21:00:00,calm evening,30,70,insight").unwrap();
        writeln!(file, "2,2024-12-05T09:18:00,\"[Log]: rough, long day\",85,20,").unwrap();
        writeln!(file, "3,2024-12-06T09:18:00,odd,50,50,travel").unwrap();

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, LogKind::Insight);
        assert_eq!(records[1].content, "[Log]: rough, long day");
        assert_eq!(records[1].kind, LogKind::Daily);
        assert_eq!(records[2].kind, LogKind::Daily);
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(read_records(file.path()).is_err());
    }
}

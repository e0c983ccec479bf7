//! Append-only injection log.
//!
//! Injections are appended to a CSV file with a header row and a
//! sortable `YYYY-MM-DD HH:MM` timestamp column. Records are never
//! mutated or deleted. Reads are fail-fast: a row with an unparsable
//! timestamp or non-positive amount fails the whole read, so corrupt
//! history cannot silently under-report administered doses.

use crate::{Error, Injection, InsulinKind, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

const FIELDNAMES: [&str; 3] = ["type", "amount", "timestamp"];

/// CSV row format for injection records
#[derive(Debug, Serialize, Deserialize)]
struct InjectionRow {
    #[serde(rename = "type")]
    kind: String,
    amount: String,
    timestamp: String,
}

impl From<&Injection> for InjectionRow {
    fn from(injection: &Injection) -> Self {
        InjectionRow {
            kind: injection.kind().to_string(),
            amount: injection.amount().to_string(),
            timestamp: injection.timestamp_string(),
        }
    }
}

impl TryFrom<InjectionRow> for Injection {
    type Error = Error;

    fn try_from(row: InjectionRow) -> Result<Self> {
        let kind: InsulinKind = row.kind.parse()?;

        let amount = row.amount.trim().parse::<i64>().map_err(|_| {
            Error::validation(
                "amount",
                format!("'{}' is not a valid integer amount", row.amount),
            )
        })?;
        if amount <= 0 {
            return Err(Error::validation(
                "amount",
                format!("stored amount {} is not positive", amount),
            ));
        }
        let amount = u32::try_from(amount)
            .map_err(|_| Error::validation("amount", format!("amount {} out of range", amount)))?;

        let timestamp = Injection::parse_timestamp(&row.timestamp)?;

        Injection::new(kind, amount, timestamp)
    }
}

/// Append-only CSV log of administered injections
pub struct InjectionStore {
    path: PathBuf,
}

impl InjectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one injection to the end of the log.
    ///
    /// Creates the log with its header row when absent. The write is
    /// flushed and synced to disk before returning.
    pub fn append(&self, injection: &Injection) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Write headers only when the file is empty
        let needs_headers = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_headers)
            .from_writer(file);

        writer.serialize(InjectionRow::from(injection))?;
        writer.flush()?;

        let file = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        file.sync_all()?;

        tracing::debug!(
            "Appended {} injection of {} units to {:?}",
            injection.kind(),
            injection.amount(),
            self.path
        );
        Ok(())
    }

    /// Return the injections whose date component equals `day`, in file
    /// order (oldest first).
    ///
    /// `Ok(None)` is the explicit "none found" signal, returned when the
    /// log is absent, empty, or has no rows for that day; callers must
    /// distinguish it from a failed read.
    pub fn list_for_date(&self, day: NaiveDate) -> Result<Option<Vec<Injection>>> {
        if !self.path.exists() {
            self.create_with_header()?;
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let mut matches = Vec::new();
        for result in reader.deserialize::<InjectionRow>() {
            let injection = Injection::try_from(result?)?;
            if injection.timestamp().date() == day {
                matches.push(injection);
            }
        }

        tracing::debug!(
            "Found {} injections for {} in {:?}",
            matches.len(),
            day.format("%Y-%m-%d"),
            self.path
        );

        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches))
        }
    }

    fn create_with_header(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(FIELDNAMES)?;
        writer.flush()?;
        tracing::info!("Created empty injection log at {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injection(kind: InsulinKind, amount: u32, timestamp: &str) -> Injection {
        Injection::new(kind, amount, Injection::parse_timestamp(timestamp).unwrap()).unwrap()
    }

    #[test]
    fn test_append_creates_log_with_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = InjectionStore::new(temp_dir.path().join("injections.csv"));

        store
            .append(&injection(InsulinKind::Short, 3, "2024-03-08 15:35"))
            .unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.starts_with("type,amount,timestamp"));
        assert!(contents.contains("short,3,2024-03-08 15:35"));
    }

    #[test]
    fn test_list_filters_by_day_preserving_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = InjectionStore::new(temp_dir.path().join("injections.csv"));

        store
            .append(&injection(InsulinKind::Short, 3, "2024-03-08 08:10"))
            .unwrap();
        store
            .append(&injection(InsulinKind::Long, 24, "2024-03-08 22:00"))
            .unwrap();
        store
            .append(&injection(InsulinKind::Short, 2, "2024-03-09 07:45"))
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        let found = store.list_for_date(day).unwrap().unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].amount(), 3);
        assert_eq!(found[1].amount(), 24);
    }

    #[test]
    fn test_no_matches_is_explicit_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = InjectionStore::new(temp_dir.path().join("injections.csv"));

        store
            .append(&injection(InsulinKind::Short, 3, "2024-03-08 08:10"))
            .unwrap();

        let other_day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(store.list_for_date(other_day).unwrap(), None);
    }

    #[test]
    fn test_missing_log_is_created_and_reports_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = InjectionStore::new(temp_dir.path().join("injections.csv"));

        let day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(store.list_for_date(day).unwrap(), None);

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.trim(), "type,amount,timestamp");
    }

    #[test]
    fn test_unparsable_timestamp_fails_whole_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("injections.csv");
        std::fs::write(
            &path,
            "type,amount,timestamp\nshort,3,2024-03-08 08:10\nshort,2,yesterday\n",
        )
        .unwrap();

        let store = InjectionStore::new(&path);
        let day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        match store.list_for_date(day) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "timestamp"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_amount_fails_whole_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("injections.csv");
        std::fs::write(
            &path,
            "type,amount,timestamp\nshort,0,2024-03-08 08:10\n",
        )
        .unwrap();

        let store = InjectionStore::new(&path);
        let day = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        match store.list_for_date(day) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "amount"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}

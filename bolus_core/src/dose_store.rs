//! Insulin dose ratio store.
//!
//! Doses live in a small CSV file with one row per insulin kind. The
//! first read of a missing store seeds it with the configured defaults.
//! Updates use read-modify-rewrite-whole-file semantics: the matching
//! row is replaced, every other row passes through unchanged, and the
//! result is written to a temp file and atomically renamed over the
//! store, so a crash cannot leave a half-written file behind.

use crate::{Dose, Error, InsulinKind, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// CSV row format for dose records
#[derive(Debug, Serialize, Deserialize)]
struct DoseRow {
    #[serde(rename = "type")]
    kind: String,
    insulin_amount: String,
    carbs_amount: String,
}

impl From<&Dose> for DoseRow {
    fn from(dose: &Dose) -> Self {
        DoseRow {
            kind: dose.kind().to_string(),
            insulin_amount: dose.insulin_amount().to_string(),
            carbs_amount: dose.carbs_amount().to_string(),
        }
    }
}

impl TryFrom<DoseRow> for Dose {
    type Error = Error;

    fn try_from(row: DoseRow) -> Result<Self> {
        let kind: InsulinKind = row
            .kind
            .parse()
            .map_err(|_| Error::Parse(format!("unknown insulin type '{}'", row.kind)))?;
        let insulin_amount = parse_amount(&row.insulin_amount, "insulin_amount")?;
        let carbs_amount = parse_amount(&row.carbs_amount, "carbs_amount")?;
        Dose::new(kind, insulin_amount, carbs_amount)
    }
}

fn parse_amount(value: &str, field: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| Error::Parse(format!("non-integer {} '{}': {}", field, value, e)))
}

/// CSV-backed store holding exactly one dose record per insulin kind
pub struct DoseStore {
    path: PathBuf,
    seed_short: Dose,
    seed_long: Dose,
}

impl DoseStore {
    /// Create a store handle with the built-in seed doses
    /// (short 1u/10g, long 24u/0g)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_seed(path, Dose::default_short(), Dose::default_long())
    }

    /// Create a store handle with explicit seed doses for first access
    pub fn with_seed(path: impl Into<PathBuf>, seed_short: Dose, seed_long: Dose) -> Self {
        Self {
            path: path.into(),
            seed_short,
            seed_long,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all dose records.
    ///
    /// If the backing file is absent it is created with the seed doses
    /// and those are returned. Malformed stored rows fail the whole read
    /// with a parse error.
    pub fn load(&self) -> Result<BTreeMap<InsulinKind, Dose>> {
        if !self.path.exists() {
            tracing::info!(
                "No dose store found at {:?}, seeding default doses",
                self.path
            );
            let seeds = [self.seed_short, self.seed_long];
            self.write_all(&seeds)?;
            return Ok(seeds.iter().map(|d| (d.kind(), *d)).collect());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let mut doses = BTreeMap::new();
        for result in reader.deserialize::<DoseRow>() {
            let dose = Dose::try_from(result?)?;
            doses.insert(dose.kind(), dose);
        }

        tracing::debug!("Loaded {} dose records from {:?}", doses.len(), self.path);
        Ok(doses)
    }

    /// Read the dose record for one insulin kind
    pub fn get(&self, kind: InsulinKind) -> Result<Dose> {
        self.load()?
            .get(&kind)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("no {} dose configured", kind)))
    }

    /// Replace the record whose kind matches `dose`, leaving every other
    /// record unchanged, and rewrite the whole store atomically.
    pub fn upsert(&self, dose: &Dose) -> Result<()> {
        let mut doses = self.load()?;
        doses.insert(dose.kind(), *dose);

        let rows: Vec<Dose> = doses.into_values().collect();
        self.write_all(&rows)?;

        tracing::info!("Updated {} dose in {:?}", dose.kind(), self.path);
        Ok(())
    }

    /// Rewrite the store by writing a temp file in the same directory,
    /// syncing it, and renaming it over the old file.
    fn write_all(&self, doses: &[Dose]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "dose store path missing parent")
        })?)?;

        {
            let mut writer = csv::Writer::from_writer(temp.as_file());
            for dose in doses {
                writer.serialize(DoseRow::from(dose))?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} dose records to {:?}", doses.len(), self.path);
        Ok(())
    }
}

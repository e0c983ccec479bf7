//! Core domain types for the Bolus insulin assistant.
//!
//! This module defines the fundamental types used throughout the system:
//! - Insulin kinds (short- and long-acting)
//! - Dose ratios and recorded injections
//! - Food items returned by the nutrition lookup and their totals
//!
//! Doses and injections validate at construction and are immutable
//! afterwards, so a value of either type is always in a valid state.

use crate::{Error, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Canonical timestamp format for the injection log (`YYYY-MM-DD HH:MM`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

// ============================================================================
// Insulin Kind
// ============================================================================

/// Kind of insulin a dose ratio or injection refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InsulinKind {
    /// Meal-time insulin, sized by carbohydrate ratio
    Short,
    /// Background insulin, not carbohydrate-dependent
    Long,
}

impl InsulinKind {
    /// The stored/wire representation of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            InsulinKind::Short => "short",
            InsulinKind::Long => "long",
        }
    }
}

impl FromStr for InsulinKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "short" => Ok(InsulinKind::Short),
            "long" => Ok(InsulinKind::Long),
            other => Err(Error::validation(
                "type",
                format!("must be either 'short' or 'long', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for InsulinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Dose
// ============================================================================

/// A configured insulin dose ratio.
///
/// For short-acting insulin this reads "inject `insulin_amount` units per
/// `carbs_amount` grams of carbohydrate"; for long-acting insulin
/// `carbs_amount` is 0 and `insulin_amount` is the fixed background dose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dose {
    kind: InsulinKind,
    insulin_amount: u32,
    carbs_amount: u32,
}

impl Dose {
    /// Construct a validated dose, or fail naming the offending field.
    ///
    /// Rules: `insulin_amount` must be strictly positive; `carbs_amount`
    /// must be strictly positive for short-acting doses and may be 0 for
    /// long-acting ones.
    pub fn new(kind: InsulinKind, insulin_amount: u32, carbs_amount: u32) -> Result<Self> {
        if insulin_amount == 0 {
            return Err(Error::validation(
                "insulin_amount",
                "amount of insulin must be a positive number",
            ));
        }
        if kind == InsulinKind::Short && carbs_amount == 0 {
            return Err(Error::validation(
                "carbs_amount",
                "a short-acting dose must specify a positive amount of carbohydrates",
            ));
        }
        Ok(Self {
            kind,
            insulin_amount,
            carbs_amount,
        })
    }

    /// Built-in seed ratio for short-acting insulin (1 unit per 10 g)
    pub fn default_short() -> Self {
        Self {
            kind: InsulinKind::Short,
            insulin_amount: 1,
            carbs_amount: 10,
        }
    }

    /// Built-in seed dose for long-acting insulin (24 units, time-based)
    pub fn default_long() -> Self {
        Self {
            kind: InsulinKind::Long,
            insulin_amount: 24,
            carbs_amount: 0,
        }
    }

    pub fn kind(&self) -> InsulinKind {
        self.kind
    }

    pub fn insulin_amount(&self) -> u32 {
        self.insulin_amount
    }

    pub fn carbs_amount(&self) -> u32 {
        self.carbs_amount
    }
}

// ============================================================================
// Injection
// ============================================================================

/// A recorded insulin injection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Injection {
    kind: InsulinKind,
    amount: u32,
    timestamp: NaiveDateTime,
}

impl Injection {
    /// Construct a validated injection record.
    ///
    /// `amount` must be strictly positive. The timestamp is stored at
    /// minute precision; seconds are truncated.
    pub fn new(kind: InsulinKind, amount: u32, timestamp: NaiveDateTime) -> Result<Self> {
        if amount == 0 {
            return Err(Error::validation(
                "amount",
                "amount of insulin injected must be a positive number",
            ));
        }
        Ok(Self {
            kind,
            amount,
            timestamp: truncate_to_minute(timestamp),
        })
    }

    /// Parse a timestamp in the canonical `YYYY-MM-DD HH:MM` format
    pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map_err(|e| {
            Error::validation(
                "timestamp",
                format!("'{}' is not a valid 'YYYY-MM-DD HH:MM' date-time: {}", s, e),
            )
        })
    }

    /// Current local wall-clock time at minute precision
    pub fn timestamp_now() -> NaiveDateTime {
        truncate_to_minute(Local::now().naive_local())
    }

    pub fn kind(&self) -> InsulinKind {
        self.kind
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The stored form of this injection's timestamp
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

// ============================================================================
// Food and Nutrient Totals
// ============================================================================

/// A single food item from the nutrition lookup.
///
/// Transient: derived from one lookup call, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Food {
    pub name: String,
    /// Calories (kcal)
    pub calories: f64,
    /// Total fat (g)
    pub fat: f64,
    /// Total carbohydrates (g)
    pub carbohydrates: f64,
    /// Protein (g)
    pub protein: f64,
}

impl Food {
    /// Display row: name followed by each nutrient as its decimal string
    pub fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.calories.to_string(),
            self.fat.to_string(),
            self.carbohydrates.to_string(),
            self.protein.to_string(),
        ]
    }
}

/// Field-wise nutrient sums over a lookup result
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NutrientTotals {
    pub calories: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub protein: f64,
}

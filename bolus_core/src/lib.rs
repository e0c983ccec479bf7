#![forbid(unsafe_code)]

//! Core domain model and business logic for the Bolus insulin assistant.
//!
//! This crate provides:
//! - Domain types (insulin kinds, dose ratios, injections, foods)
//! - Validated record construction
//! - Persistence (dose store, injection log)
//! - Nutrition lookup client
//! - Dose suggestion engine and nutrient reporting

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod dose_store;
pub mod injection_store;
pub mod lookup;
pub mod engine;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use dose_store::DoseStore;
pub use injection_store::InjectionStore;
pub use lookup::{NutrientLookup, NutritionClient, NutritionConfig};
pub use engine::suggest_insulin;
pub use report::{aggregate, format_report};

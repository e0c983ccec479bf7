//! Nutrition lookup client.
//!
//! Queries a CalorieNinjas-style nutrition endpoint with a free-text
//! meal description and returns per-item nutrient values. The caller
//! treats any failure here as "no data" rather than a crash; this
//! module only maps transport, auth, and decoding problems into the
//! lookup error variant.

use crate::{Error, Food, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default nutrition endpoint
const DEFAULT_BASE_URL: &str = "https://api.calorieninjas.com/v1/nutrition";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Seam for the external nutrition collaborator
pub trait NutrientLookup {
    /// Resolve a free-text food description into nutrient items
    fn lookup(&self, query: &str) -> Result<Vec<Food>>;
}

/// Configuration for the nutrition client
#[derive(Clone, Debug)]
pub struct NutritionConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl NutritionConfig {
    /// Creates a new configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the endpoint base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Blocking HTTP client for the nutrition endpoint
pub struct NutritionClient {
    config: NutritionConfig,
    client: reqwest::blocking::Client,
}

impl NutritionClient {
    pub fn new(config: NutritionConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Lookup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

impl NutrientLookup for NutritionClient {
    fn lookup(&self, query: &str) -> Result<Vec<Food>> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("query", query)])
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .map_err(|e| Error::Lookup(format!("nutrition request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Lookup(format!(
                "nutrition service returned {}",
                status
            )));
        }

        let body: NutritionResponse = response
            .json()
            .map_err(|e| Error::Lookup(format!("malformed nutrition response: {}", e)))?;

        tracing::debug!(
            "Nutrition lookup for '{}' returned {} items",
            query,
            body.items.len()
        );

        Ok(body.items.into_iter().map(Food::from).collect())
    }
}

/// Response envelope of the nutrition endpoint
#[derive(Debug, Deserialize)]
struct NutritionResponse {
    items: Vec<NutritionItem>,
}

/// One item of the nutrition response (field names follow the wire format)
#[derive(Debug, Deserialize)]
struct NutritionItem {
    name: String,
    calories: f64,
    fat_total_g: f64,
    carbohydrates_total_g: f64,
    protein_g: f64,
}

impl From<NutritionItem> for Food {
    fn from(item: NutritionItem) -> Self {
        Food {
            name: title_case(&item.name),
            calories: item.calories,
            fat: item.fat_total_g,
            carbohydrates: item.carbohydrates_total_g,
            protein: item.protein_g,
        }
    }
}

/// Title-case a lookup item name for display ("orange juice" -> "Orange Juice")
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

//! Country Catalog - Fixed, Ordered Reference List
//!
//! Order is insertion order. Filtering never sorts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Region sentinel that matches every country.
pub const ALL_REGIONS: &str = "All";

pub type CountryCode = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountryRef {
    pub code: CountryCode,
    pub name: String,
    pub flag_glyph: String,
    pub region: String,
}

impl CountryRef {
    pub fn new(code: &str, name: &str, flag_glyph: &str, region: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            flag_glyph: flag_glyph.to_string(),
            region: region.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Country not found: {0}")]
    CountryNotFound(String),

    #[error("Duplicate country code: {0}")]
    DuplicateCode(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

const BUILTIN: [(&str, &str, &str, &str); 20] = [
    ("US", "United States", "🇺🇸", "North America"),
    ("GB", "United Kingdom", "🇬🇧", "Europe"),
    ("CA", "Canada", "🇨🇦", "North America"),
    ("FR", "France", "🇫🇷", "Europe"),
    ("DE", "Germany", "🇩🇪", "Europe"),
    ("JP", "Japan", "🇯🇵", "Asia"),
    ("AU", "Australia", "🇦🇺", "Oceania"),
    ("BR", "Brazil", "🇧🇷", "South America"),
    ("IN", "India", "🇮🇳", "Asia"),
    ("CN", "China", "🇨🇳", "Asia"),
    ("IT", "Italy", "🇮🇹", "Europe"),
    ("ES", "Spain", "🇪🇸", "Europe"),
    ("MX", "Mexico", "🇲🇽", "North America"),
    ("RU", "Russia", "🇷🇺", "Europe/Asia"),
    ("ZA", "South Africa", "🇿🇦", "Africa"),
    ("KR", "South Korea", "🇰🇷", "Asia"),
    ("NL", "Netherlands", "🇳🇱", "Europe"),
    ("CH", "Switzerland", "🇨🇭", "Europe"),
    ("SE", "Sweden", "🇸🇪", "Europe"),
    ("NO", "Norway", "🇳🇴", "Europe"),
];

/// Country catalog - immutable once built
#[derive(Debug, Clone)]
pub struct Catalog {
    countries: Vec<CountryRef>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate codes.
    pub fn new(countries: Vec<CountryRef>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for country in &countries {
            if !seen.insert(country.code.as_str()) {
                return Err(CatalogError::DuplicateCode(country.code.clone()));
            }
        }
        Ok(Self { countries })
    }

    /// The 20-entry catalog shipped with the wizard.
    pub fn builtin() -> Self {
        Self {
            countries: BUILTIN
                .iter()
                .map(|(code, name, flag, region)| CountryRef::new(code, name, flag, region))
                .collect(),
        }
    }

    /// Load a catalog from a JSON array of countries.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let countries: Vec<CountryRef> = serde_json::from_str(&content)?;
        debug!(path = %path.display(), count = countries.len(), "loaded country catalog");
        Self::new(countries)
    }

    pub fn list(&self) -> &[CountryRef] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CountryRef> {
        self.countries.iter().find(|c| c.code == code)
    }

    /// Case-insensitive name match ANDed with region equality.
    ///
    /// An empty result is a normal outcome, not an error.
    pub fn filter(&self, search: &str, region: &str) -> Vec<&CountryRef> {
        let needle = search.to_lowercase();
        let matches: Vec<_> = self
            .countries
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .filter(|c| region == ALL_REGIONS || c.region == region)
            .collect();
        debug!(search, region, matches = matches.len(), "filtered catalog");
        matches
    }

    /// Distinct regions in first-seen order, led by the `All` sentinel.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions = vec![ALL_REGIONS];
        for country in &self.countries {
            if !regions.contains(&country.region.as_str()) {
                regions.push(&country.region);
            }
        }
        regions
    }

    /// Resolve a code to the catalog entry handed to the controller.
    pub fn select(&self, code: &str) -> Result<CountryRef, CatalogError> {
        self.get(code)
            .cloned()
            .ok_or_else(|| CatalogError::CountryNotFound(code.to_string()))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

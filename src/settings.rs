//! Wizard Settings

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WizardSettings {
    /// Days added to today when no expiry date is given
    #[serde(default = "default_validity_days")]
    pub validity_days: u64,
    /// Length of the random part of a generated document number
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    #[serde(default = "default_authority_prefix")]
    pub authority_prefix: String,
}

fn default_validity_days() -> u64 { 3650 }
fn default_token_length() -> usize { 7 }
fn default_authority_prefix() -> String { "Ministry of Foreign Affairs".to_string() }

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            validity_days: default_validity_days(),
            token_length: default_token_length(),
            authority_prefix: default_authority_prefix(),
        }
    }
}

impl WizardSettings {
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would break document numbers or authorities.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.token_length == 0 {
            return Err(SettingsError::Invalid("tokenLength", "must be at least 1".into()));
        }
        if self.authority_prefix.trim().is_empty() {
            return Err(SettingsError::Invalid("authorityPrefix", "must not be blank".into()));
        }
        Ok(())
    }
}

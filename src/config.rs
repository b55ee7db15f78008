//! Editor configuration.
//!
//! Every field has a default, so an empty TOML file (or an empty JS object
//! in the browser) yields the stock configuration.
//!
//! ```toml
//! storage_key = "cctv_proposal_data"
//!
//! [currency]
//! symbol = "$"
//!
//! [roi]
//! years = 5
//! discount_rate = 0.10
//!
//! [branding]
//! company = "JEIVIAN Smart Security"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PropviewError, Result};
use crate::numfmt::CurrencyFormat;

/// Storage key of the persisted snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "cctv_proposal_data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub storage_key: String,
    pub currency: CurrencyFormat,
    pub roi: RoiSettings,
    pub branding: Branding,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency: CurrencyFormat::default(),
            roi: RoiSettings::default(),
            branding: Branding::default(),
        }
    }
}

/// Horizon and discount rate of the ROI analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoiSettings {
    pub years: u32,
    pub discount_rate: f64,
}

impl Default for RoiSettings {
    fn default() -> Self {
        Self {
            years: 5,
            discount_rate: 0.10,
        }
    }
}

/// Vendor identity printed on generated documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Branding {
    pub company: String,
    /// Short name used in output file names.
    pub short_name: String,
    /// Legal name printed in the running footer.
    pub footer_name: String,
    pub document_code: String,
    pub website: String,
    pub client_label: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company: "JEIVIAN Smart Security".into(),
            short_name: "JEIVIAN".into(),
            footer_name: "JEIVIAN Smart Security Solutions".into(),
            document_code: "Propuesta CCTV 2026-v2".into(),
            website: "www.jeivian.com".into(),
            client_label: "GERENCIA GENERAL".into(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| PropviewError::InvalidConfig {
            field: "path",
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(PropviewError::InvalidConfig {
                field: "storage_key",
                reason: "must not be empty".to_string(),
            });
        }
        if self.roi.years == 0 {
            return Err(PropviewError::InvalidConfig {
                field: "roi.years",
                reason: "must be > 0".to_string(),
            });
        }
        if !self.roi.discount_rate.is_finite() || self.roi.discount_rate <= -1.0 {
            return Err(PropviewError::InvalidConfig {
                field: "roi.discount_rate",
                reason: format!("must be a finite rate above -1 (got {})", self.roi.discount_rate),
            });
        }
        if self.currency.decimals > 6 {
            return Err(PropviewError::InvalidConfig {
                field: "currency.decimals",
                reason: "must be at most 6".to_string(),
            });
        }
        Ok(())
    }
}

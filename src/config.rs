use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{validation, AppResult};

pub const CONFIG_FILE: &str = "config.json";
pub const DATA_DIR_ENV: &str = "PARTSDESK_DATA_DIR";

/// One trading identity. Invoices carry its name and numbering prefix.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CompanyProfile {
    pub key: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub invoice_prefix: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct NumberPrefixes {
    pub purchase: String,
    pub challan: String,
    pub quotation: String,
    pub quotation_request: String,
}

impl Default for NumberPrefixes {
    fn default() -> Self {
        Self {
            purchase: "PUR".to_string(),
            challan: "DC".to_string(),
            quotation: "QT".to_string(),
            quotation_request: "RFQ".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub companies: Vec<CompanyProfile>,
    pub active_company: String,
    pub prefixes: NumberPrefixes,
    pub default_min_stock: i64,
    /// Legacy behaviour: let a committed sale drive stock below zero.
    pub allow_negative_stock: bool,
    pub database_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            companies: vec![CompanyProfile {
                key: "main".to_string(),
                name: "Main Store".to_string(),
                address: None,
                phone: None,
                invoice_prefix: "INV".to_string(),
            }],
            active_company: "main".to_string(),
            prefixes: NumberPrefixes::default(),
            default_min_stock: 5,
            allow_negative_stock: false,
            database_file: "parts_inventory.db".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path`, falling back to defaults when the file does not exist yet.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.companies.is_empty() {
            return Err(validation("At least one company profile is required"));
        }
        if self.active_company().is_none() {
            return Err(validation(format!(
                "Active company '{}' is not configured",
                self.active_company
            )));
        }
        Ok(())
    }

    pub fn active_company(&self) -> Option<&CompanyProfile> {
        self.companies.iter().find(|c| c.key == self.active_company)
    }

    pub fn set_active_company(&mut self, key: &str) -> AppResult<()> {
        if !self.companies.iter().any(|c| c.key == key) {
            return Err(validation(format!("Unknown company: {}", key)));
        }
        self.active_company = key.to_string();
        Ok(())
    }

    /// Name printed on documents when a request does not name a company.
    pub fn company_name(&self) -> String {
        self.active_company()
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    pub fn sale_prefix(&self) -> String {
        self.active_company()
            .map(|c| c.invoice_prefix.clone())
            .unwrap_or_else(|| "INV".to_string())
    }
}

/// Directory override for the database and config, read from the environment.
pub fn data_dir_override() -> Option<PathBuf> {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.company_name(), "Main Store");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.companies.push(CompanyProfile {
            key: "branch".to_string(),
            name: "Branch Traders".to_string(),
            address: Some("Mill Road".to_string()),
            phone: None,
            invoice_prefix: "BT".to_string(),
        });
        config.set_active_company("branch").unwrap();
        config.allow_negative_stock = true;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.active_company, "branch");
        assert_eq!(loaded.sale_prefix(), "BT");
        assert!(loaded.allow_negative_stock);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "default_min_stock": 12 }"#).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.default_min_stock, 12);
        assert_eq!(loaded.prefixes.purchase, "PUR");
        assert_eq!(loaded.active_company, "main");
    }

    #[test]
    fn test_unknown_company_rejected() {
        let mut config = AppConfig::default();
        assert!(config.set_active_company("nowhere").is_err());
        assert_eq!(config.active_company, "main");
    }
}

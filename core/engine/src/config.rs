//! FILENAME: core/engine/src/config.rs
//! PURPOSE: Table configuration loaded by the host (page size, debounce window,
//! currency presentation).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Digit grouping used by currency amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Grouping {
    /// 1,234,567
    Western,
    /// 12,34,567
    #[default]
    Indian,
}

/// How currency renderers present amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrencyConfig {
    pub symbol: String,
    pub decimal_places: u8,
    pub grouping: Grouping,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        CurrencyConfig {
            symbol: "₹".to_string(),
            decimal_places: 2,
            grouping: Grouping::Indian,
        }
    }
}

/// Per-table settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    /// Rows per page when paginating.
    pub page_size: usize,

    /// Disable client pagination: the page size follows the dataset length.
    pub show_all_rows: bool,

    /// Quiet period before the selection callback fires.
    pub selection_debounce_ms: u64,

    pub currency: CurrencyConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            page_size: 10,
            show_all_rows: false,
            selection_debounce_ms: 200,
            currency: CurrencyConfig::default(),
        }
    }
}

impl TableConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        if config.page_size == 0 {
            return Err(ConfigError::Invalid("pageSize must be at least 1".to_string()));
        }
        Ok(config)
    }
}

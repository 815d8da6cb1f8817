#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::CatalogItem;
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{validate_range, validate_url, Validate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// 續藥建議 API 使用的 Bearer token
    pub auth_token: Option<String>,
    /// 處方 API 使用的 session cookie（例如 `token=...`）
    pub session_cookie: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            auth_token: None,
            session_cookie: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogMode {
    #[default]
    Remote,
    Demo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub mode: CatalogMode,
    #[serde(default = "default_true")]
    pub discard_stale_responses: bool,
    #[serde(default)]
    pub demo_items: Vec<DemoItemConfig>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            mode: CatalogMode::Remote,
            discard_stale_responses: true,
            demo_items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoItemConfig {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub prescription_required: bool,
    pub notes: Option<String>,
}

impl From<&DemoItemConfig> for CatalogItem {
    fn from(demo: &DemoItemConfig) -> Self {
        let mut item = CatalogItem::new(&demo.id, &demo.name, demo.price, demo.prescription_required);
        item.notes = demo.notes.clone();
        item
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl StorefrontConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StoreError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StoreError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PHARMA_TOKEN})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StoreError::ConfigError {
            message: format!("env pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 示範模式的目錄；未設定時使用內建清單
    pub fn demo_catalog_items(&self) -> Vec<CatalogItem> {
        if self.catalog.demo_items.is_empty() {
            crate::adapters::demo::builtin_items()
        } else {
            self.catalog.demo_items.iter().map(CatalogItem::from).collect()
        }
    }
}

impl Validate for StorefrontConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 300)?;

        for item in &self.catalog.demo_items {
            if item.id.trim().is_empty() {
                return Err(StoreError::InvalidConfigValueError {
                    field: "catalog.demo_items.id".to_string(),
                    value: item.id.clone(),
                    reason: "id cannot be empty".to_string(),
                });
            }
            if item.price < Decimal::ZERO {
                return Err(StoreError::InvalidConfigValueError {
                    field: "catalog.demo_items.price".to_string(),
                    value: item.price.to_string(),
                    reason: "price cannot be negative".to_string(),
                });
            }
        }

        Ok(())
    }
}

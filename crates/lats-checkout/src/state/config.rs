//! # POS Configuration
//!
//! Store-level settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`LATS_*`)
//! 2. Config file (`pos.toml`)
//! 3. Defaults (this file)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PosConfig::load(path)                                                  │
//! │       │                                                                 │
//! │       ├── defaults (TZS, 16% VAT, discounts on)                         │
//! │       ├── pos.toml  ~/.config/lats-pos/pos.toml (Linux)                 │
//! │       │             ~/Library/Application Support/com.lats.pos (macOS)  │
//! │       ├── LATS_* environment                                            │
//! │       └── validate()                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read-only after load; no mutex needed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use lats_core::validation::validate_tax_rate_bps;
use lats_core::{BusinessInfo, Money, PaymentMethod, TaxRate, DEFAULT_TAX_RATE_BPS};

const CONFIG_FILE_NAME: &str = "pos.toml";
const DATABASE_FILE_NAME: &str = "lats.db";

/// Configuration failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Application configuration.
///
/// ## Example Config File
/// ```toml
/// store_name = "LATS Mobile Shop"
/// currency_code = "TZS"
/// currency_symbol = "TSh"
/// currency_decimals = 0
/// tax_rate_bps = 1600
/// tax_enabled = true
/// discounts_enabled = true
/// default_payment_method = "cash"
/// operator = "amina"
/// receipt_footer = "Asante kwa kununua!"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    /// Store name (printed on receipts)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// VAT in basis points, e.g. 1600 = 16%
    pub tax_rate_bps: u32,

    /// When false, sales carry no VAT.
    pub tax_enabled: bool,

    /// When false, `set_discount` is refused.
    pub discounts_enabled: bool,

    /// Payment method preselected for every new session.
    pub default_payment_method: Option<PaymentMethod>,

    /// Recorded as `sold_by` on every sale.
    pub operator: String,

    pub receipt_header: Option<String>,

    pub receipt_footer: Option<String>,

    /// SQLite file. Defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for PosConfig {
    fn default() -> Self {
        PosConfig {
            store_name: "LATS POS".to_string(),
            currency_code: "TZS".to_string(),
            currency_symbol: "TSh".to_string(),
            currency_decimals: 0,
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            tax_enabled: true,
            discounts_enabled: true,
            default_payment_method: None,
            operator: "cashier".to_string(),
            receipt_header: None,
            receipt_footer: Some("Thank you for your business!".to_string()),
            database_path: None,
        }
    }
}

impl PosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = PosConfig::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading POS config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Absent keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `LATS_*` overrides read through `lookup`.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `LATS_STORE_NAME` | store_name |
    /// | `LATS_CURRENCY_CODE` | currency_code |
    /// | `LATS_CURRENCY_SYMBOL` | currency_symbol |
    /// | `LATS_CURRENCY_DECIMALS` | currency_decimals |
    /// | `LATS_TAX_RATE` | tax_rate_bps, given as a percentage ("16", "7.5") |
    /// | `LATS_TAX_ENABLED` | tax_enabled |
    /// | `LATS_DISCOUNTS_ENABLED` | discounts_enabled |
    /// | `LATS_PAYMENT_METHOD` | default_payment_method |
    /// | `LATS_OPERATOR` | operator |
    /// | `LATS_DB_PATH` | database_path |
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("LATS_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(code) = lookup("LATS_CURRENCY_CODE") {
            self.currency_code = code;
        }

        if let Some(symbol) = lookup("LATS_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(decimals) = lookup("LATS_CURRENCY_DECIMALS") {
            self.currency_decimals = decimals
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("LATS_CURRENCY_DECIMALS", "expected 0-4"))?;
        }

        if let Some(rate) = lookup("LATS_TAX_RATE") {
            let bps = Money::parse_decimal(&rate, 2)
                .filter(|m| !m.is_negative())
                .and_then(|m| u32::try_from(m.minor()).ok())
                .ok_or_else(|| {
                    ConfigError::invalid("LATS_TAX_RATE", format!("'{}' is not a percentage", rate))
                })?;
            debug!(bps, "Overriding tax rate from environment");
            self.tax_rate_bps = bps;
        }

        if let Some(flag) = lookup("LATS_TAX_ENABLED") {
            self.tax_enabled = parse_flag("LATS_TAX_ENABLED", &flag)?;
        }

        if let Some(flag) = lookup("LATS_DISCOUNTS_ENABLED") {
            self.discounts_enabled = parse_flag("LATS_DISCOUNTS_ENABLED", &flag)?;
        }

        if let Some(method) = lookup("LATS_PAYMENT_METHOD") {
            let method = method
                .parse::<PaymentMethod>()
                .map_err(|e| ConfigError::invalid("LATS_PAYMENT_METHOD", e.to_string()))?;
            self.default_payment_method = Some(method);
        }

        if let Some(operator) = lookup("LATS_OPERATOR") {
            self.operator = operator;
        }

        if let Some(path) = lookup("LATS_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tax_rate_bps(self.tax_rate_bps)
            .map_err(|e| ConfigError::invalid("tax_rate_bps", e.to_string()))?;

        if self.currency_decimals > 4 {
            return Err(ConfigError::invalid("currency_decimals", "must be at most 4"));
        }

        if self.operator.trim().is_empty() {
            return Err(ConfigError::invalid("operator", "must not be blank"));
        }

        Ok(())
    }

    /// VAT applied to sales. Zero when tax is disabled.
    pub fn tax_rate(&self) -> TaxRate {
        if self.tax_enabled {
            TaxRate::from_bps(self.tax_rate_bps)
        } else {
            TaxRate::zero()
        }
    }

    /// Store details written into every receipt.
    pub fn business_info(&self) -> BusinessInfo {
        BusinessInfo {
            name: self.store_name.clone(),
            currency_code: self.currency_code.clone(),
            currency_symbol: self.currency_symbol.clone(),
            header: self.receipt_header.clone(),
            footer: self.receipt_footer.clone(),
        }
    }

    /// Database file: the configured path, else `lats.db` in the platform data directory.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        self.database_path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "lats", "pos")
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        })
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lats", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Formats an amount for display, with thousands separators.
    ///
    /// ## Example
    /// ```rust
    /// use lats_checkout::PosConfig;
    /// use lats_core::Money;
    ///
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_currency(Money::from_minor(1_234_500)), "TSh 1,234,500");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let minor = amount.minor();
        let divisor = 10_i64.pow(u32::from(self.currency_decimals));
        let whole = (minor / divisor).unsigned_abs();
        let frac = (minor % divisor).unsigned_abs();

        let mut formatted = format!(
            "{}{} {}",
            if minor < 0 { "-" } else { "" },
            self.currency_symbol,
            group_thousands(whole)
        );
        if self.currency_decimals > 0 {
            formatted.push_str(&format!(
                ".{:0width$}",
                frac,
                width = usize::from(self.currency_decimals)
            ));
        }
        formatted
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("'{}' is not a boolean", other))),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

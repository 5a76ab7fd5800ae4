//! Configuration loading and typed config structures.
//!
//! Configuration lives in a YAML file (default `claimsale.yaml`). Every
//! field has a default, so an empty file is a valid configuration. A few
//! values can be overridden from the environment:
//!
//! - `CLAIMSALE_ECONOMY_MODE` overrides `economy.economy_mode`
//! - `CLAIMSALE_DEPOSIT_TIMEOUT_MS` overrides `timeouts.deposit_timeout_ms`

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use claimsale_types::Currency;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::store::AccountDefaults;
use crate::transaction::SaleSettings;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

const ECONOMY_MODE_VAR: &str = "CLAIMSALE_ECONOMY_MODE";
const DEPOSIT_TIMEOUT_VAR: &str = "CLAIMSALE_DEPOSIT_TIMEOUT_MS";

/// An environment override that could not be parsed and was ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ignoring invalid {variable}={value:?}: {reason}")]
pub struct EnvOverrideError {
    /// Name of the environment variable.
    pub variable: &'static str,
    /// The raw value found.
    pub value: String,
    /// Why it failed to parse.
    pub reason: String,
}

impl EnvOverrideError {
    fn new(variable: &'static str, value: String, reason: &impl std::fmt::Display) -> Self {
        Self {
            variable,
            value,
            reason: reason.to_string(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SaleConfig {
    /// Economy toggles, pricing, and currency.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Bounds on calls into the external ledger.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Message template overrides keyed by message name
    /// (e.g. `sell-error`). Used for localization.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SaleConfig {
    /// Load configuration from a YAML file. Environment overrides are
    /// applied separately with [`SaleConfig::apply_env_overrides`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override selected values from environment variables.
    ///
    /// Unparseable values are skipped and returned, so the caller can log
    /// them once a subscriber is installed.
    pub fn apply_env_overrides(&mut self) -> Vec<EnvOverrideError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Override selected values from `lookup`, keyed by environment
    /// variable name.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Vec<EnvOverrideError> {
        let mut ignored = Vec::new();

        if let Some(val) = lookup(ECONOMY_MODE_VAR) {
            match val.parse::<bool>() {
                Ok(enabled) => self.economy.economy_mode = enabled,
                Err(e) => ignored.push(EnvOverrideError::new(ECONOMY_MODE_VAR, val, &e)),
            }
        }
        if let Some(val) = lookup(DEPOSIT_TIMEOUT_VAR) {
            match val.parse::<u64>() {
                Ok(ms) => self.timeouts.deposit_timeout_ms = ms,
                Err(e) => ignored.push(EnvOverrideError::new(DEPOSIT_TIMEOUT_VAR, val, &e)),
            }
        }

        ignored
    }

    /// Runtime settings for the sale transaction.
    pub const fn settings(&self) -> SaleSettings {
        SaleSettings {
            deposit_timeout: Duration::from_millis(self.timeouts.deposit_timeout_ms),
            balance_timeout: Duration::from_millis(self.timeouts.balance_timeout_ms),
        }
    }

    /// The currency deposits are made in.
    pub fn currency(&self) -> Currency {
        Currency::new(
            self.economy.currency_name.clone(),
            self.economy.currency_symbol.clone(),
        )
    }

    /// Values given to newly created player accounts.
    pub const fn account_defaults(&self) -> AccountDefaults {
        AccountDefaults {
            unit_sell_price: self.economy.default_sell_price,
            economy_mode: self.economy.economy_mode,
        }
    }
}

/// Economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Availability is `accrued + bonus` when true, the legacy remaining
    /// total otherwise.
    #[serde(default)]
    pub economy_mode: bool,

    /// Sell price per block for new accounts. Negative means unset.
    #[serde(default = "default_sell_price")]
    pub default_sell_price: Decimal,

    /// Name of the default currency.
    #[serde(default = "default_currency_name")]
    pub currency_name: String,

    /// Symbol of the default currency.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            economy_mode: false,
            default_sell_price: default_sell_price(),
            currency_name: default_currency_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// Timeouts for external ledger calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline for the deposit call. Expiry counts as a failed deposit.
    #[serde(default = "default_deposit_timeout_ms")]
    pub deposit_timeout_ms: u64,

    /// Deadline for reading the balance after a successful deposit.
    #[serde(default = "default_balance_timeout_ms")]
    pub balance_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            deposit_timeout_ms: default_deposit_timeout_ms(),
            balance_timeout_ms: default_balance_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
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

const fn default_sell_price() -> Decimal {
    Decimal::NEGATIVE_ONE
}

fn default_currency_name() -> String {
    String::from("Dollar")
}

fn default_currency_symbol() -> String {
    String::from("$")
}

const fn default_deposit_timeout_ms() -> u64 {
    5000
}

const fn default_balance_timeout_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_disables_selling() {
        let config = SaleConfig::default();
        assert!(!config.economy.economy_mode);
        assert!(config.economy.default_sell_price.is_sign_negative());
        assert_eq!(config.timeouts.deposit_timeout_ms, 5000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        assert_eq!(SaleConfig::parse("").unwrap(), SaleConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
economy:
  economy_mode: true
  default_sell_price: "2.5"
  currency_name: "Emerald"
  currency_symbol: "E"

timeouts:
  deposit_timeout_ms: 750
  balance_timeout_ms: 250

messages:
  sell-error: "Verkauf fehlgeschlagen: {{ reason }}"

logging:
  level: "debug"
  json: true
"#;
        let config = SaleConfig::parse(yaml).unwrap();
        assert!(config.economy.economy_mode);
        assert_eq!(config.economy.default_sell_price, Decimal::new(25, 1));
        assert_eq!(config.currency(), Currency::new("Emerald", "E"));
        assert_eq!(config.settings().deposit_timeout, Duration::from_millis(750));
        assert_eq!(config.settings().balance_timeout, Duration::from_millis(250));
        assert_eq!(config.messages.len(), 1);
        assert!(config.logging.json);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = SaleConfig::parse("economy:\n  economy_mode: true\n").unwrap();
        assert!(config.economy.economy_mode);
        assert_eq!(config.economy.currency_symbol, "$");
        assert_eq!(config.timeouts, TimeoutConfig::default());
    }

    #[test]
    fn account_defaults_follow_economy_section() {
        let config = SaleConfig::parse("economy:\n  default_sell_price: \"0\"\n").unwrap();
        let defaults = config.account_defaults();
        assert!(defaults.unit_sell_price.is_zero());
        assert!(!defaults.economy_mode);
    }

    #[test]
    fn valid_overrides_replace_file_values() {
        let mut config = SaleConfig::default();
        let ignored = config.apply_overrides(|name| match name {
            "CLAIMSALE_ECONOMY_MODE" => Some(String::from("true")),
            "CLAIMSALE_DEPOSIT_TIMEOUT_MS" => Some(String::from("1200")),
            _ => None,
        });
        assert!(ignored.is_empty());
        assert!(config.economy.economy_mode);
        assert_eq!(config.timeouts.deposit_timeout_ms, 1200);
    }

    #[test]
    fn invalid_overrides_are_returned_and_ignored() {
        let mut config = SaleConfig::parse("timeouts:\n  deposit_timeout_ms: 750\n").unwrap();
        let ignored = config.apply_overrides(|name| match name {
            "CLAIMSALE_ECONOMY_MODE" => Some(String::from("yes please")),
            "CLAIMSALE_DEPOSIT_TIMEOUT_MS" => Some(String::from("-5")),
            _ => None,
        });

        let variables: Vec<_> = ignored.iter().map(|e| e.variable).collect();
        assert_eq!(
            variables,
            ["CLAIMSALE_ECONOMY_MODE", "CLAIMSALE_DEPOSIT_TIMEOUT_MS"]
        );
        assert_eq!(ignored.last().map(|e| e.value.as_str()), Some("-5"));
        assert!(!config.economy.economy_mode);
        assert_eq!(config.timeouts.deposit_timeout_ms, 750);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SaleConfig::parse("economy: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}

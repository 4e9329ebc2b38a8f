//! Deployment configuration for a token and its sale
//!
//! Defaults describe the RC Token deployment. Every field can be overridden
//! from the environment with [`DeploymentConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::info;

use crate::types::TokenMetadata;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Token parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub standard: String,
    pub initial_supply: u128,
}

impl TokenConfig {
    pub fn metadata(&self) -> TokenMetadata {
        TokenMetadata::new(
            self.name.clone(),
            self.symbol.clone(),
            self.standard.clone(),
        )
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "RC Token".to_string(),
            symbol: "RC".to_string(),
            standard: "RC Token v1.0".to_string(),
            initial_supply: 1_000_000,
        }
    }
}

/// Sale parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Price of one unit in smallest currency units
    pub token_price: u128,
    /// Units provisioned to the sale at deployment
    pub tokens_available: u128,
    /// Decimal places of the native currency, for reporting only
    pub currency_decimals: u32,
}

impl Default for SaleConfig {
    fn default() -> Self {
        Self {
            token_price: 10_000_000,
            tokens_available: 750_000,
            currency_decimals: 18,
        }
    }
}

/// Full deployment configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub sale: SaleConfig,
}

impl DeploymentConfig {
    /// Load configuration, overriding defaults from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(name) = env::var("TOKEN_NAME") {
            config.token.name = name;
        }
        if let Ok(symbol) = env::var("TOKEN_SYMBOL") {
            config.token.symbol = symbol;
        }
        if let Ok(standard) = env::var("TOKEN_STANDARD") {
            config.token.standard = standard;
        }
        if let Some(supply) = parse_env("TOKEN_INITIAL_SUPPLY")? {
            config.token.initial_supply = supply;
        }
        if let Some(price) = parse_env("SALE_TOKEN_PRICE")? {
            config.sale.token_price = price;
        }
        if let Some(available) = parse_env("SALE_TOKENS_AVAILABLE")? {
            config.sale.tokens_available = available;
        }
        if let Some(decimals) = parse_env("SALE_CURRENCY_DECIMALS")? {
            config.sale.currency_decimals = decimals;
        }

        config.validate()?;

        info!(
            "Deployment configuration loaded: token={}, supply={}, price={}, available={}",
            config.token.symbol,
            config.token.initial_supply,
            config.sale.token_price,
            config.sale.tokens_available
        );

        Ok(config)
    }

    /// Check the configuration describes a deployable token and sale
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("token name", &self.token.name),
            ("token symbol", &self.token.symbol),
            ("token standard", &self.token.standard),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidConfig(format!(
                    "{} cannot be empty",
                    field
                )));
            }
        }

        if self.token.initial_supply == 0 {
            return Err(ConfigError::InvalidConfig(
                "Initial supply must be positive".to_string(),
            ));
        }

        if self.sale.token_price == 0 {
            return Err(ConfigError::InvalidConfig(
                "Token price must be positive".to_string(),
            ));
        }

        if self.sale.tokens_available > self.token.initial_supply {
            return Err(ConfigError::InvalidConfig(format!(
                "Cannot provision {} units out of a supply of {}",
                self.sale.tokens_available, self.token.initial_supply
            )));
        }

        // u128 holds at most 38 decimal digits
        if self.sale.currency_decimals > 38 {
            return Err(ConfigError::InvalidConfig(
                "Currency decimals cannot exceed 38".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map(Some).map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            })
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_rc_deployment() {
        let config = DeploymentConfig::default();
        assert_eq!(config.token.name, "RC Token");
        assert_eq!(config.token.symbol, "RC");
        assert_eq!(config.token.standard, "RC Token v1.0");
        assert_eq!(config.token.initial_supply, 1_000_000);
        assert_eq!(config.sale.token_price, 10_000_000);
        assert_eq!(config.sale.tokens_available, 750_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = DeploymentConfig::default();
        config.sale.tokens_available = 2_000_000;
        assert!(config.validate().is_err());

        let mut config = DeploymentConfig::default();
        config.sale.token_price = 0;
        assert!(config.validate().is_err());

        let mut config = DeploymentConfig::default();
        config.token.symbol = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: DeploymentConfig =
            serde_json::from_str(r#"{"sale":{"token_price":5,"tokens_available":10,"currency_decimals":6}}"#)
                .unwrap();
        assert_eq!(config.token, TokenConfig::default());
        assert_eq!(config.sale.token_price, 5);
        assert_eq!(config.sale.currency_decimals, 6);
    }

    #[test]
    fn test_parse_env_reports_bad_number() {
        // Unique variable name; tests share the process environment
        env::set_var("TOKEN_SALE_CORE_TEST_BAD_NUMBER", "ten");
        let result = parse_env::<u128>("TOKEN_SALE_CORE_TEST_BAD_NUMBER");
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                name: "TOKEN_SALE_CORE_TEST_BAD_NUMBER".to_string(),
                value: "ten".to_string()
            })
        );
        assert_eq!(parse_env::<u128>("TOKEN_SALE_CORE_TEST_UNSET").unwrap(), None);
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{Decimal, MAX_AMOUNT};
use crate::engine::LedgerConfig;

pub const AVERAGE_FEE_VAR: &str = "TRADEBOOK_AVERAGE_FEE";
pub const DATA_DIR_VAR: &str = "TRADEBOOK_DATA_DIR";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory with the history and legend files.
    pub data_dir: PathBuf,
    /// Expected fee of one future sell order.
    pub average_fee: Decimal,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let data_dir: PathBuf = env_map
            .get(DATA_DIR_VAR)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("data")
            .into();

        let raw_fee = env_map
            .get(AVERAGE_FEE_VAR)
            .ok_or_else(|| ConfigError::MissingEnv(AVERAGE_FEE_VAR.to_string()))?;
        let average_fee = Decimal::from_str_canonical(raw_fee).map_err(|_| {
            ConfigError::InvalidValue(
                AVERAGE_FEE_VAR.to_string(),
                format!("must be a decimal number, got {}", raw_fee),
            )
        })?;
        if average_fee.is_negative() {
            return Err(ConfigError::InvalidValue(
                AVERAGE_FEE_VAR.to_string(),
                format!("must not be negative, got {}", raw_fee),
            ));
        }
        if average_fee > Decimal::from_qty(MAX_AMOUNT) {
            return Err(ConfigError::InvalidValue(
                AVERAGE_FEE_VAR.to_string(),
                format!("must be <= {}, got {}", MAX_AMOUNT, raw_fee),
            ));
        }

        Ok(Config {
            data_dir,
            average_fee,
        })
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new(self.average_fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(AVERAGE_FEE_VAR.to_string(), "4.90".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(
            config.ledger_config().average_fee,
            Decimal::from_str_canonical("4.9").unwrap()
        );
    }

    #[test]
    fn test_data_dir_override() {
        let mut env_map = setup_required_env();
        env_map.insert(DATA_DIR_VAR.to_string(), "/tmp/ledger".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/ledger"));
    }

    #[test]
    fn test_missing_average_fee() {
        let result = Config::from_env_map(HashMap::new());
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, AVERAGE_FEE_VAR),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_average_fee() {
        let mut env_map = setup_required_env();
        env_map.insert(AVERAGE_FEE_VAR.to_string(), "cheap".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, AVERAGE_FEE_VAR),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_negative_average_fee() {
        let mut env_map = setup_required_env();
        env_map.insert(AVERAGE_FEE_VAR.to_string(), "-1".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, AVERAGE_FEE_VAR),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_average_fee_above_order_limit() {
        let mut env_map = setup_required_env();
        env_map.insert(AVERAGE_FEE_VAR.to_string(), "1000000000.5".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, AVERAGE_FEE_VAR),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}

use anyhow::{Context, Result};

pub const DEFAULT_SYMBOLS: [&str; 3] = ["BTCUSDT", "ETHUSDT", "BNBUSDT"];

#[derive(Debug, Clone, PartialEq)]
pub struct SeederConfig {
    pub mongo_uri: String,
    pub database: String,
    pub service_user: String,
    /// Account creation is skipped when unset.
    pub service_password: Option<String>,
    pub symbols: Vec<String>,
    /// Hourly bars per symbol.
    pub candles: usize,
}

impl Default for SeederConfig {
    fn default() -> Self {
        SeederConfig {
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: "Cryptobot".to_string(),
            service_user: "CryptoBot".to_string(),
            service_password: None,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            candles: 48,
        }
    }
}

impl SeederConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::from_filename(".env").ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let symbols = match get("SEED_SYMBOLS") {
            Some(raw) => raw
                .split(',')
                .map(|symbol| symbol.trim().to_uppercase())
                .filter(|symbol| !symbol.is_empty())
                .collect(),
            None => defaults.symbols,
        };

        let candles = match get("SEED_CANDLES") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("Invalid SEED_CANDLES: {raw}"))?,
            None => defaults.candles,
        };

        Ok(SeederConfig {
            mongo_uri: get("MONGO_URI").unwrap_or(defaults.mongo_uri),
            database: get("MONGO_DATABASE").unwrap_or(defaults.database),
            service_user: get("SERVICE_USER").unwrap_or(defaults.service_user),
            service_password: get("SERVICE_PASSWORD"),
            symbols,
            candles,
        })
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use common::sources::api::DEFAULT_API_URL;
use common::timeframe::parse_indicators;
use common::{Indicator, Timeframe};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_url: String,
    /// Symbol loaded at startup, nothing is fetched when unset.
    pub default_symbol: Option<String>,
    pub default_timeframe: Timeframe,
    pub default_indicators: Vec<Indicator>,
    pub chart_output_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            api_url: DEFAULT_API_URL.to_string(),
            default_symbol: None,
            default_timeframe: Timeframe::default(),
            default_indicators: vec![Indicator::Bb],
            chart_output_dir: PathBuf::from("charts"),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::from_filename(".env").ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let default_timeframe = match get("DEFAULT_TIMEFRAME") {
            Some(raw) => raw
                .trim()
                .to_uppercase()
                .parse::<Timeframe>()
                .with_context(|| format!("Invalid DEFAULT_TIMEFRAME: {raw}"))?,
            None => defaults.default_timeframe,
        };

        let default_indicators = match get("DEFAULT_INDICATORS") {
            Some(raw) => parse_indicators(&raw)?,
            None => defaults.default_indicators,
        };

        Ok(DashboardConfig {
            api_url: get("ANALYSIS_API_URL").unwrap_or(defaults.api_url),
            default_symbol: get("DEFAULT_SYMBOL").map(|symbol| symbol.trim().to_uppercase()),
            default_timeframe,
            default_indicators,
            chart_output_dir: get("CHART_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.chart_output_dir),
        })
    }
}

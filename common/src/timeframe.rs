use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// Chart periods offered by the timeframe button group
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum Timeframe {
    #[default]
    #[strum(serialize = "1D")]
    #[serde(rename = "1D")]
    Day1,
    #[strum(serialize = "7D")]
    #[serde(rename = "7D")]
    Day7,
    #[strum(serialize = "1M")]
    #[serde(rename = "1M")]
    Month1,
    #[strum(serialize = "3M")]
    #[serde(rename = "3M")]
    Month3,
    #[strum(serialize = "6M")]
    #[serde(rename = "6M")]
    Month6,
    #[strum(serialize = "1Y")]
    #[serde(rename = "1Y")]
    Year1,
    #[strum(serialize = "ALL")]
    #[serde(rename = "ALL")]
    All,
}

// Technical overlays the backend knows how to compute and plot
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Indicator {
    Bb,
    Rsi,
    Ema,
    Macd,
    Stoch,
}

pub fn indicators_csv(indicators: &[Indicator]) -> String {
    indicators
        .iter()
        .map(|indicator| indicator.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn parse_indicators(csv: &str) -> Result<Vec<Indicator>> {
    let mut indicators = Vec::new();
    for name in csv.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let indicator = name
            .to_uppercase()
            .parse::<Indicator>()
            .map_err(|_| anyhow!("Unknown indicator: {name}"))?;
        if !indicators.contains(&indicator) {
            indicators.push(indicator);
        }
    }
    Ok(indicators)
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_timeframe_strings() {
        let labels: Vec<String> = Timeframe::iter().map(|tf| tf.to_string()).collect();
        assert_eq!(labels, vec!["1D", "7D", "1M", "3M", "6M", "1Y", "ALL"]);

        for tf in Timeframe::iter() {
            assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
        }
        assert!("2W".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::default(), Timeframe::Day1);
    }

    #[test]
    fn test_timeframe_serde_matches_display() {
        let json = serde_json::to_string(&Timeframe::Month3).unwrap();
        assert_eq!(json, "\"3M\"");
        let tf: Timeframe = serde_json::from_str("\"ALL\"").unwrap();
        assert_eq!(tf, Timeframe::All);
    }

    #[test]
    fn test_indicators_csv() {
        assert_eq!(indicators_csv(&[]), "");
        assert_eq!(
            indicators_csv(&[Indicator::Bb, Indicator::Rsi, Indicator::Macd]),
            "BB,RSI,MACD"
        );
    }

    #[test]
    fn test_parse_indicators() {
        let parsed = parse_indicators(" bb, RSI,,stoch ,BB").unwrap();
        assert_eq!(parsed, vec![Indicator::Bb, Indicator::Rsi, Indicator::Stoch]);
        assert!(parse_indicators("").unwrap().is_empty());
        assert!(parse_indicators("BB,VWAP").is_err());
    }
}

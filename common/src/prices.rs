use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

// A processed OHLCV bar as stored in `market_data`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MarketDataDocument {
    pub symbol: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_updated: DateTime<Utc>,
    pub rows: i64,
    #[serde(rename = "openTime", with = "chrono_datetime_as_bson_datetime")]
    pub open_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_price")]
    pub open: f64,
    #[serde(serialize_with = "serialize_price")]
    pub high: f64,
    #[serde(serialize_with = "serialize_price")]
    pub low: f64,
    #[serde(serialize_with = "serialize_price")]
    pub close: f64,
    #[serde(serialize_with = "serialize_volume")]
    pub volume: f64,
    pub trend: i32,
    pub volume_price_ratio: f64,
    pub indicator: IndicatorValues,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct IndicatorValues {
    #[serde(serialize_with = "serialize_price")]
    pub bb_ma: f64,
    #[serde(serialize_with = "serialize_price")]
    pub bb_upper: f64,
    #[serde(serialize_with = "serialize_price")]
    pub bb_lower: f64,
    pub rsi: f64,
    pub doji: i32,
    pub hammer: i32,
    pub shooting_star: i32,
}

// The same bar before any indicator pass, as stored in `raw_market_data`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawCandleDocument {
    pub symbol: String,
    #[serde(rename = "openTime", with = "chrono_datetime_as_bson_datetime")]
    pub open_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_price")]
    pub open: f64,
    #[serde(serialize_with = "serialize_price")]
    pub high: f64,
    #[serde(serialize_with = "serialize_price")]
    pub low: f64,
    #[serde(serialize_with = "serialize_price")]
    pub close: f64,
    #[serde(serialize_with = "serialize_volume")]
    pub volume: f64,
}

impl From<&MarketDataDocument> for RawCandleDocument {
    fn from(bar: &MarketDataDocument) -> Self {
        RawCandleDocument {
            symbol: bar.symbol.clone(),
            open_time: bar.open_time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

fn serialize_price<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rounded = if *value >= 1.0 {
        (*value * 100.0).round() / 100.0 // 2 decimals
    } else {
        (*value * 10000000.0).round() / 10000000.0 // 7 decimals
    };
    serializer.serialize_f64(rounded)
}

// Same for volume, adjust decimals
fn serialize_volume<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rounded = if *value >= 1.0 {
        (*value * 1000.0).round() / 1000.0 // 3 decimals
    } else {
        (*value * 10000000.0).round() / 10000000.0 // 7 decimals
    };
    serializer.serialize_f64(rounded)
}

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// One forecast series per symbol, as stored in `prediction_ml`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionDocument {
    pub symbol: String,
    pub predictions: Vec<PredictionPoint>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionPoint {
    // Forecast target, a BSON date once stored
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    pub prediction: f64,
}

impl PredictionDocument {
    pub fn latest(&self) -> Option<&PredictionPoint> {
        self.predictions.iter().max_by_key(|point| point.timestamp)
    }
}

/// Query-filter body for the most recent forecast point of `symbol`:
/// match the symbol, unwind the series, newest first, keep one.
pub fn latest_prediction_query(symbol: &str) -> Value {
    json!({
        "pipeline": [
            { "$match": { "symbol": symbol } },
            { "$unwind": "$predictions" },
            { "$sort": { "predictions.timestamp": -1 } },
            { "$limit": 1 }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 2, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_latest_prediction_query() {
        let query = latest_prediction_query("ETHUSDT");
        let stages = query["pipeline"].as_array().unwrap();
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[0]["$match"]["symbol"], "ETHUSDT");
        assert_eq!(stages[1]["$unwind"], "$predictions");
        assert_eq!(stages[2]["$sort"]["predictions.timestamp"], -1);
        assert_eq!(stages[3]["$limit"], 1);
    }

    #[test]
    fn test_latest_point() {
        let document = PredictionDocument {
            symbol: "BTCUSDT".to_string(),
            predictions: vec![
                PredictionPoint { timestamp: at(8), prediction: 101.0 },
                PredictionPoint { timestamp: at(12), prediction: 102.5 },
                PredictionPoint { timestamp: at(4), prediction: 100.0 },
            ],
        };
        assert_eq!(document.latest().unwrap().prediction, 102.5);

        let empty = PredictionDocument { symbol: "BTCUSDT".to_string(), predictions: vec![] };
        assert!(empty.latest().is_none());
    }

    #[test]
    fn test_timestamp_stored_as_date() {
        let document = PredictionDocument {
            symbol: "BTCUSDT".to_string(),
            predictions: vec![PredictionPoint { timestamp: at(4), prediction: 100.0 }],
        };
        let stored = bson::to_document(&document).unwrap();
        let points = stored.get_array("predictions").unwrap();
        let point = points[0].as_document().unwrap();
        assert_eq!(
            *point.get_datetime("timestamp").unwrap(),
            bson::DateTime::from_chrono(at(4))
        );
    }
}

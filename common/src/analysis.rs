use serde::{Deserialize, Serialize};

// Payload of `GET /api/analysis/{symbol}`. Every statistic is optional, the
// backend omits what it could not compute for the requested window.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
    #[serde(default)]
    pub volume_change_24h: Option<f64>,
    // Both charts arrive as JSON text, not as nested objects
    #[serde(default)]
    pub price_volume_chart: Option<String>,
    #[serde(default)]
    pub technical_chart: Option<String>,
    #[serde(default)]
    pub prediction: Option<PredictionSummary>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PredictionSummary {
    pub last_price: f64,
    pub predicted_price: f64,
    pub prediction_diff: f64,
}

// Payload of `POST /api/predictions/{symbol}`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PredictionQueryResult {
    #[serde(default)]
    pub predicted_price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let payload = json!({
            "symbol": "BTCUSDT",
            "timeframe": "1D",
            "last_update": "2024-11-02 14:00:00",
            "current_price": 69420.5,
            "price_change_24h": -512.25,
            "price_change_percentage_24h": -0.73,
            "high_24h": 70210.0,
            "low_24h": 68900.0,
            "volume_24h": 1523400.75,
            "volume_change_24h": 12.5,
            "price_volume_chart": "{\"data\":[],\"layout\":{}}",
            "technical_chart": "{\"data\":[],\"layout\":{}}",
            "prediction": {
                "last_price": 69420.5,
                "predicted_price": 70100.0,
                "prediction_diff": 679.5
            }
        });

        let parsed: AnalysisResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.symbol.as_deref(), Some("BTCUSDT"));
        assert_eq!(parsed.price_change_24h, Some(-512.25));
        assert_eq!(parsed.prediction.unwrap().prediction_diff, 679.5);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_sparse_payload() {
        let parsed: AnalysisResponse =
            serde_json::from_value(json!({ "current_price": 1.5, "high_24h": null })).unwrap();
        assert_eq!(parsed.current_price, Some(1.5));
        assert_eq!(parsed.high_24h, None);
        assert_eq!(parsed.technical_chart, None);

        let failed: AnalysisResponse =
            serde_json::from_value(json!({ "error": "Analysis failed" })).unwrap();
        assert_eq!(failed.error.as_deref(), Some("Analysis failed"));
    }

    #[test]
    fn test_prediction_query_result() {
        let result: PredictionQueryResult =
            serde_json::from_value(json!({ "predicted_price": 3120.75 })).unwrap();
        assert_eq!(result.predicted_price, Some(3120.75));

        let empty: PredictionQueryResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.predicted_price, None);
    }
}

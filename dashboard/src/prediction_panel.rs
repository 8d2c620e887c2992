use common::transforms::numbers::{
    format_number, format_percent, format_usd, percentage_of, round_to, Sentiment, PLACEHOLDER,
};

use crate::view::{Field, FieldUpdate};

/// Derived figures comparing the latest forecast with the live price.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionMetrics {
    pub predicted_price: f64,
    pub current_price: f64,
    /// `predicted - current`
    pub difference: f64,
    /// `|predicted - current|`
    pub variation: f64,
    pub variation_pct: Option<f64>,
    pub pnl: f64,
    pub pnl_pct: Option<f64>,
}

impl PredictionMetrics {
    pub fn compute(predicted_price: f64, current_price: f64) -> Self {
        let difference = predicted_price - current_price;
        let variation = difference.abs();
        PredictionMetrics {
            predicted_price,
            current_price,
            difference,
            variation,
            variation_pct: percentage_of(variation, current_price),
            pnl: round_to(difference, 2),
            pnl_pct: percentage_of(difference, current_price).map(|pct| round_to(pct, 2)),
        }
    }

    pub fn updates(&self) -> Vec<FieldUpdate> {
        let pnl_pct = self.pnl_pct.map(format_percent);
        let pnl_text = format!(
            "PNL {} USDT ({})",
            format_number(self.pnl, 2),
            pnl_pct.as_deref().unwrap_or(PLACEHOLDER)
        );
        let variation_pct = self
            .variation_pct
            .map(|pct| format!("({})", format_percent(pct)))
            .unwrap_or_else(|| PLACEHOLDER.to_string());

        vec![
            FieldUpdate::text(Field::PredictedPrice, format_usd(self.predicted_price)),
            FieldUpdate::styled(
                Field::PredictedPricePercentage,
                pnl_text,
                Sentiment::of(self.pnl),
            ),
            FieldUpdate::text(Field::PriceVariation, format_usd(self.variation)),
            FieldUpdate::styled(
                Field::PriceVariationPercentage,
                variation_pct,
                Sentiment::of(self.variation_pct.unwrap_or(0.0)),
            ),
        ]
    }
}

/// What the prediction panel shows when no forecast could be loaded.
pub fn placeholder_updates() -> Vec<FieldUpdate> {
    Field::PREDICTION_FIELDS
        .iter()
        .map(|field| FieldUpdate::text(*field, PLACEHOLDER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pnl_is_predicted_minus_current() {
        let metrics = PredictionMetrics::compute(70100.0, 69420.5);
        assert_eq!(metrics.pnl, 679.5);
        assert_eq!(metrics.pnl_pct, Some(0.98));
        assert_eq!(metrics.difference, 679.5);
        assert_eq!(metrics.variation, 679.5);
    }

    #[test]
    fn test_loss_is_negative() {
        let metrics = PredictionMetrics::compute(95.0, 100.0);
        assert_eq!(metrics.pnl, -5.0);
        assert_eq!(metrics.pnl_pct, Some(-5.0));
        assert_eq!(metrics.variation, 5.0);
        assert_eq!(metrics.variation_pct, Some(5.0));

        let updates = metrics.updates();
        assert_eq!(updates[0].text, "$95.00");
        assert_eq!(updates[1].text, "PNL -5.00 USDT (-5.00%)");
        assert_eq!(updates[1].sentiment, Some(Sentiment::Negative));
        assert_eq!(updates[2].text, "$5.00");
        assert_eq!(updates[3].text, "(5.00%)");
        assert_eq!(updates[3].sentiment, Some(Sentiment::Positive));
    }

    #[test]
    fn test_updates_cover_prediction_fields() {
        let updates = PredictionMetrics::compute(3150.0, 3000.0).updates();
        let fields: Vec<Field> = updates.iter().map(|update| update.field).collect();
        assert_eq!(fields, Field::PREDICTION_FIELDS.to_vec());
        assert_eq!(updates[1].text, "PNL 150.00 USDT (5.00%)");
        assert_eq!(updates[1].sentiment, Some(Sentiment::Positive));
    }

    #[test]
    fn test_zero_current_price() {
        let metrics = PredictionMetrics::compute(10.0, 0.0);
        assert_eq!(metrics.pnl_pct, None);
        assert_eq!(metrics.variation_pct, None);
        let updates = metrics.updates();
        assert_eq!(updates[1].text, "PNL 10.00 USDT (-)");
        assert_eq!(updates[3].text, "-");
    }

    #[test]
    fn test_placeholders() {
        let updates = placeholder_updates();
        assert_eq!(updates.len(), 4);
        assert!(updates.iter().all(|update| update.text == "-" && update.sentiment.is_none()));
    }
}

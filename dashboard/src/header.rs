use common::transforms::numbers::{
    format_percent, format_signed_percent, format_signed_usd, format_usd, Sentiment,
};
use common::AnalysisResponse;

use crate::view::{Field, FieldUpdate};

/// Header and "real price" mutations for a successful analysis. Fields whose
/// inputs are absent are left out rather than rendered as garbage.
pub fn header_updates(analysis: &AnalysisResponse) -> Vec<FieldUpdate> {
    let mut updates = Vec::new();

    if let Some(price) = analysis.current_price {
        updates.push(FieldUpdate::text(Field::CurrentPrice, format_usd(price)));
    }
    if let Some(symbol) = analysis.symbol.as_deref().filter(|s| !s.is_empty()) {
        updates.push(FieldUpdate::text(Field::SelectedSymbol, symbol));
    }

    if let (Some(amount), Some(percent)) = (
        analysis.price_change_24h,
        analysis.price_change_percentage_24h,
    ) {
        updates.push(FieldUpdate::styled(
            Field::PriceChange,
            format!("{} ({})", format_signed_usd(amount), format_percent(percent)),
            Sentiment::of(amount),
        ));
    }

    if let Some(high) = analysis.high_24h {
        updates.push(FieldUpdate::text(Field::PriceHigh, format_usd(high)));
    }
    if let Some(low) = analysis.low_24h {
        updates.push(FieldUpdate::text(Field::PriceLow, format_usd(low)));
    }

    if let Some(volume) = analysis.volume_24h {
        let text = format_usd(volume);
        updates.push(match analysis.volume_change_24h {
            Some(change) => FieldUpdate::styled(Field::Volume, text, Sentiment::of(change)),
            None => FieldUpdate::text(Field::Volume, text),
        });
    }

    if let Some(price) = analysis.current_price {
        updates.push(FieldUpdate::text(Field::RealPrice, format_usd(price)));
        if let Some(percent) = analysis.price_change_percentage_24h {
            updates.push(FieldUpdate::styled(
                Field::RealPricePercentage,
                format!("({})", format_signed_percent(percent)),
                Sentiment::of(percent),
            ));
        }
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(updates: &[FieldUpdate], field: Field) -> Option<&FieldUpdate> {
        updates.iter().find(|update| update.field == field)
    }

    #[test]
    fn test_header_reflects_response() {
        let analysis = AnalysisResponse {
            symbol: Some("BTCUSDT".to_string()),
            current_price: Some(69420.5),
            price_change_24h: Some(1234.5),
            price_change_percentage_24h: Some(1.81),
            high_24h: Some(70210.0),
            low_24h: Some(68900.25),
            volume_24h: Some(1523400.75),
            volume_change_24h: Some(-3.2),
            ..Default::default()
        };

        let updates = header_updates(&analysis);

        assert_eq!(find(&updates, Field::CurrentPrice).unwrap().text, "$69,420.50");
        assert_eq!(find(&updates, Field::SelectedSymbol).unwrap().text, "BTCUSDT");

        let change = find(&updates, Field::PriceChange).unwrap();
        assert_eq!(change.text, "+$1,234.50 (1.81%)");
        assert_eq!(change.sentiment, Some(Sentiment::Positive));

        assert_eq!(find(&updates, Field::PriceHigh).unwrap().text, "$70,210.00");
        assert_eq!(find(&updates, Field::PriceLow).unwrap().text, "$68,900.25");

        let volume = find(&updates, Field::Volume).unwrap();
        assert_eq!(volume.text, "$1,523,400.75");
        assert_eq!(volume.sentiment, Some(Sentiment::Negative));

        assert_eq!(find(&updates, Field::RealPrice).unwrap().text, "$69,420.50");
        let real_change = find(&updates, Field::RealPricePercentage).unwrap();
        assert_eq!(real_change.text, "(+1.81%)");
        assert_eq!(real_change.sentiment, Some(Sentiment::Positive));
    }

    #[test]
    fn test_negative_change_is_negative() {
        let analysis = AnalysisResponse {
            price_change_24h: Some(-512.25),
            price_change_percentage_24h: Some(-0.73),
            ..Default::default()
        };
        let updates = header_updates(&analysis);
        let change = find(&updates, Field::PriceChange).unwrap();
        assert_eq!(change.text, "$-512.25 (-0.73%)");
        assert_eq!(change.sentiment, Some(Sentiment::Negative));
    }

    #[test]
    fn test_zero_change_is_positive() {
        let analysis = AnalysisResponse {
            price_change_24h: Some(0.0),
            price_change_percentage_24h: Some(0.0),
            ..Default::default()
        };
        let updates = header_updates(&analysis);
        assert_eq!(
            find(&updates, Field::PriceChange).unwrap().sentiment,
            Some(Sentiment::Positive)
        );
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let analysis = AnalysisResponse {
            high_24h: Some(10.0),
            price_change_24h: Some(1.0),
            volume_24h: Some(5.0),
            ..Default::default()
        };
        let updates = header_updates(&analysis);
        let fields: Vec<Field> = updates.iter().map(|update| update.field).collect();
        assert_eq!(fields, vec![Field::PriceHigh, Field::Volume]);
        assert_eq!(find(&updates, Field::Volume).unwrap().sentiment, None);

        assert!(header_updates(&AnalysisResponse::default()).is_empty());
    }
}

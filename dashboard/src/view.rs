use common::transforms::numbers::Sentiment;
use strum::{AsRefStr, Display, EnumIter};

// Scalar fields of the page, displayed as their element ids
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Field {
    CurrentPrice,
    SelectedSymbol,
    PriceChange,
    PriceHigh,
    PriceLow,
    Volume,
    RealPrice,
    RealPricePercentage,
    PredictedPrice,
    PredictedPricePercentage,
    PriceVariation,
    PriceVariationPercentage,
}

impl Field {
    pub const PREDICTION_FIELDS: [Field; 4] = [
        Field::PredictedPrice,
        Field::PredictedPricePercentage,
        Field::PriceVariation,
        Field::PriceVariationPercentage,
    ];
}

/// The page surface the controller writes to.
pub trait DashboardView {
    fn set_text(&mut self, field: Field, text: &str);

    /// Replaces any previous sentiment on `field`.
    fn set_sentiment(&mut self, field: Field, sentiment: Sentiment);

    /// Loading indicator and its overlay.
    fn set_loading(&mut self, visible: bool);

    fn show_error(&mut self, message: &str);

    fn hide_error(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub field: Field,
    pub text: String,
    pub sentiment: Option<Sentiment>,
}

impl FieldUpdate {
    pub fn text(field: Field, text: impl Into<String>) -> Self {
        FieldUpdate {
            field,
            text: text.into(),
            sentiment: None,
        }
    }

    pub fn styled(field: Field, text: impl Into<String>, sentiment: Sentiment) -> Self {
        FieldUpdate {
            field,
            text: text.into(),
            sentiment: Some(sentiment),
        }
    }

    pub fn apply<V: DashboardView + ?Sized>(&self, view: &mut V) {
        view.set_text(self.field, &self.text);
        if let Some(sentiment) = self.sentiment {
            view.set_sentiment(self.field, sentiment);
        }
    }
}

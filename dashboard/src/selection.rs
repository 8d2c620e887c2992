use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use common::{indicators_csv, parse_indicators, Indicator, Timeframe};

/// Immutable snapshot of what one refresh cycle asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshParams {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub indicators: Vec<Indicator>,
}

impl RefreshParams {
    pub fn indicators_csv(&self) -> String {
        indicators_csv(&self.indicators)
    }
}

/// Mirrors the control surface: symbol selector, active timeframe button,
/// indicator multi-select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub indicators: Vec<Indicator>,
}

impl Default for Selection {
    fn default() -> Self {
        Selection {
            symbol: String::new(),
            timeframe: Timeframe::default(),
            indicators: vec![Indicator::Bb],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PageLoaded,
    SymbolChanged(String),
    TimeframeClicked(Timeframe),
    IndicatorsChanged(Vec<Indicator>),
    Resized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Refresh(RefreshParams),
    Relayout,
    Nothing,
}

impl Selection {
    pub fn snapshot(&self) -> Option<RefreshParams> {
        if self.symbol.is_empty() {
            return None;
        }
        Some(RefreshParams {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            indicators: self.indicators.clone(),
        })
    }

    pub fn apply(&mut self, event: UiEvent) -> Trigger {
        match event {
            UiEvent::PageLoaded => {}
            UiEvent::SymbolChanged(symbol) => self.symbol = symbol.trim().to_string(),
            UiEvent::TimeframeClicked(timeframe) => self.timeframe = timeframe,
            UiEvent::IndicatorsChanged(indicators) => self.indicators = indicators,
            UiEvent::Resized => return Trigger::Relayout,
        }

        self.snapshot()
            .map(Trigger::Refresh)
            .unwrap_or(Trigger::Nothing)
    }
}

// Driver commands: `symbol BTCUSDT`, `timeframe 7D`, `indicators BB,RSI`,
// `resize`, `load`
impl FromStr for UiEvent {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        let event = match command.to_lowercase().as_str() {
            "load" => UiEvent::PageLoaded,
            "resize" => UiEvent::Resized,
            "symbol" => UiEvent::SymbolChanged(argument.to_uppercase()),
            "timeframe" => UiEvent::TimeframeClicked(
                argument
                    .to_uppercase()
                    .parse()
                    .map_err(|_| anyhow!("Unknown timeframe: {argument}"))?,
            ),
            "indicators" => UiEvent::IndicatorsChanged(parse_indicators(argument)?),
            "" => bail!("Empty command"),
            other => bail!("Unknown command: {other}"),
        };
        Ok(event)
    }
}

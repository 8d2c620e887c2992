use chrono::{DateTime, Duration, DurationRound, Utc};
use common::{IndicatorValues, MarketDataDocument, PredictionDocument, PredictionPoint};

pub const BB_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
/// Forecast spacing, matches the backend's default interval.
pub const PREDICTION_STEP_HOURS: i64 = 4;
pub const PREDICTION_POINTS: usize = 6;

/// Everything the seeder writes for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub market_data: Vec<MarketDataDocument>,
    pub predictions: Vec<PredictionDocument>,
}

// Rough price level per symbol so the sample looks plausible on a chart
fn base_price(symbol: &str) -> f64 {
    match symbol {
        "BTCUSDT" => 65_000.0,
        "ETHUSDT" => 3_200.0,
        "BNBUSDT" => 580.0,
        "SOLUSDT" => 150.0,
        _ => 100.0,
    }
}

/// Builds `candles` hourly bars per symbol ending at the hour containing
/// `now`, plus one forecast series per symbol. Same inputs, same output.
pub fn generate(symbols: &[String], candles: usize, now: DateTime<Utc>) -> SampleSet {
    let end = now.duration_trunc(Duration::hours(1)).unwrap_or(now);

    let mut market_data = Vec::with_capacity(symbols.len() * candles);
    let mut predictions = Vec::with_capacity(symbols.len());
    for (seed, symbol) in symbols.iter().enumerate() {
        let bars = market_series(symbol, seed, candles, end);
        if let Some(last) = bars.last() {
            predictions.push(forecast(symbol, last.close, end, seed));
        }
        market_data.extend(bars);
    }

    SampleSet {
        market_data,
        predictions,
    }
}

fn market_series(
    symbol: &str,
    seed: usize,
    candles: usize,
    end: DateTime<Utc>,
) -> Vec<MarketDataDocument> {
    let base = base_price(symbol);
    let phase = seed as f64 * 0.9;
    let start = end - Duration::hours(candles as i64 - 1);

    let mut closes = Vec::with_capacity(candles);
    let mut bars = Vec::with_capacity(candles);
    let mut open = base;
    for i in 0..candles {
        let t = i as f64;
        let close = base * (1.0 + 0.012 * (t * 0.35 + phase).sin() + 0.0004 * t);
        let wick = base * 0.0015 * (1.0 + (t * 0.7 + phase).cos().abs());
        let high = open.max(close) + wick;
        let low = open.min(close) - wick * 0.8;
        let volume = 1_000_000.0 / base * (1.0 + 0.3 * (t * 0.5 + phase).cos());
        closes.push(close);

        let (bb_ma, bb_upper, bb_lower) = bollinger(&closes, BB_PERIOD);
        let rsi = rsi(&closes, RSI_PERIOD);
        let open_time = start + Duration::hours(i as i64);

        bars.push(MarketDataDocument {
            symbol: symbol.to_string(),
            last_updated: end,
            rows: candles as i64,
            open_time,
            open,
            high,
            low,
            close,
            volume,
            trend: trend(close, bb_ma),
            volume_price_ratio: volume / close,
            indicator: IndicatorValues {
                bb_ma,
                bb_upper,
                bb_lower,
                rsi,
                doji: doji(open, high, low, close).into(),
                hammer: hammer(open, high, low, close).into(),
                shooting_star: shooting_star(open, high, low, close).into(),
            },
        });
        open = close;
    }
    bars
}

fn forecast(symbol: &str, last_close: f64, end: DateTime<Utc>, seed: usize) -> PredictionDocument {
    let drift = if seed % 2 == 0 { 0.004 } else { -0.003 };
    let predictions = (1..=PREDICTION_POINTS)
        .map(|step| PredictionPoint {
            timestamp: end + Duration::hours(PREDICTION_STEP_HOURS * step as i64),
            prediction: last_close * (1.0 + drift * step as f64),
        })
        .collect();

    PredictionDocument {
        symbol: symbol.to_string(),
        predictions,
    }
}

/// Mean and +/- 2 sigma over the trailing `period` closes, or fewer while
/// the window is still filling.
pub fn bollinger(closes: &[f64], period: usize) -> (f64, f64, f64) {
    let window = &closes[closes.len().saturating_sub(period)..];
    if window.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let n = window.len() as f64;
    let avg = window.iter().sum::<f64>() / n;
    let sigma = (window.iter().map(|c| (c - avg).powi(2)).sum::<f64>() / n).sqrt();
    (avg, avg + 2.0 * sigma, avg - 2.0 * sigma)
}

/// Wilder-smoothed RSI of the last close. Neutral 50 until there is more
/// than one full period of data.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() <= period {
        return 50.0;
    }

    let change = |i: usize| closes[i] - closes[i - 1];
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = change(i);
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss += delta.abs();
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    for i in (period + 1)..closes.len() {
        let delta = change(i);
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

fn trend(close: f64, bb_ma: f64) -> i32 {
    if close > bb_ma {
        1
    } else if close < bb_ma {
        -1
    } else {
        0
    }
}

fn doji(open: f64, high: f64, low: f64, close: f64) -> bool {
    (close - open).abs() <= (high - low) * 0.1
}

fn hammer(open: f64, high: f64, low: f64, close: f64) -> bool {
    let body = (close - open).abs();
    let lower_shadow = open.min(close) - low;
    let upper_shadow = high - open.max(close);
    body > 0.0 && lower_shadow >= 2.0 * body && upper_shadow <= body
}

fn shooting_star(open: f64, high: f64, low: f64, close: f64) -> bool {
    let body = (close - open).abs();
    let lower_shadow = open.min(close) - low;
    let upper_shadow = high - open.max(close);
    body > 0.0 && upper_shadow >= 2.0 * body && lower_shadow <= body
}

use std::future::Future;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Response};

use crate::{
    indicators_csv, latest_prediction_query, AnalysisResponse, Indicator, PredictionQueryResult,
    Timeframe,
};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Where the dashboard gets its precomputed analysis from.
pub trait AnalysisSource {
    fn fetch_analysis(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        indicators: &[Indicator],
    ) -> impl Future<Output = Result<AnalysisResponse>> + Send;

    fn fetch_latest_prediction(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<PredictionQueryResult>> + Send;
}

/// HTTP client for the analysis backend.
#[derive(Debug, Clone)]
pub struct AnalysisApi {
    client: Client,
    base_url: String,
}

impl AnalysisApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        AnalysisApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn analysis_url(&self, symbol: &str) -> String {
        format!("{}/api/analysis/{symbol}", self.base_url)
    }

    pub fn predictions_url(&self, symbol: &str) -> String {
        format!("{}/api/predictions/{symbol}", self.base_url)
    }
}

impl AnalysisSource for AnalysisApi {
    async fn fetch_analysis(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        indicators: &[Indicator],
    ) -> Result<AnalysisResponse> {
        let url = self.analysis_url(symbol);
        log::debug!("Fetching analysis from: {url}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("timeframe", timeframe.to_string()),
                ("indicators", indicators_csv(indicators)),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request: {}", e))?;

        let response = ensure_success(response)?;

        let analysis = response
            .json::<AnalysisResponse>()
            .await
            .context("Failed to deserialize analysis response")?;

        check_analysis_payload(analysis)
    }

    async fn fetch_latest_prediction(&self, symbol: &str) -> Result<PredictionQueryResult> {
        let url = self.predictions_url(symbol);
        log::debug!("Fetching latest prediction from: {url}");

        let response = self
            .client
            .post(&url)
            .json(&latest_prediction_query(symbol))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send request: {}", e))?;

        let response = ensure_success(response)?;

        response
            .json::<PredictionQueryResult>()
            .await
            .context("Failed to deserialize prediction response")
    }
}

fn ensure_success(response: Response) -> Result<Response> {
    if !response.status().is_success() {
        return Err(anyhow!(
            "Request failed with status: {}",
            response.status()
        ));
    }
    Ok(response)
}

/// A decoded payload carrying `error` is a failure, same as a bad status.
pub fn check_analysis_payload(analysis: AnalysisResponse) -> Result<AnalysisResponse> {
    if let Some(error) = analysis.error.as_deref() {
        bail!("{}", if error.is_empty() { "Analysis failed" } else { error });
    }
    Ok(analysis)
}

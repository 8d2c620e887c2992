use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Result};
use common::sources::api::AnalysisSource;
use common::{
    AnalysisResponse, ChartSpec, ChartTheme, MountPoint, PredictionQueryResult, RenderConfig,
    DARK_THEME,
};
use strum::IntoEnumIterator;

use crate::header::header_updates;
use crate::prediction_panel::{placeholder_updates, PredictionMetrics};
use crate::renderer::ChartRenderer;
use crate::scheduler::{Deferred, Scheduler, ERROR_DISMISS_DELAY, RELAYOUT_DELAY};
use crate::selection::RefreshParams;
use crate::view::{DashboardView, FieldUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Shown(PredictionMetrics),
    Placeholder,
    /// A newer cycle started before the forecast arrived.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// No symbol selected, nothing was touched.
    Skipped,
    Failed { token: u64, message: String },
    Rendered { token: u64, prediction: PredictionOutcome },
    /// The analysis arrived after a newer cycle started and was dropped.
    Superseded { token: u64 },
}

struct PreparedCharts {
    technical: ChartSpec,
    price_volume: Option<ChartSpec>,
}

impl PreparedCharts {
    fn mounts(&self) -> impl Iterator<Item = (MountPoint, &ChartSpec)> {
        std::iter::once((MountPoint::TechnicalChart, &self.technical)).chain(
            self.price_volume
                .as_ref()
                .map(|spec| (MountPoint::PriceVolumeChart, spec)),
        )
    }
}

/// Drives one refresh cycle at a time per trigger: fetch, charts, header,
/// prediction panel. The header only changes once every chart rendered. Every cycle takes a sequence token and anything that
/// completes under a token that is no longer the latest is thrown away.
pub struct RefreshController<S, V, R, T> {
    source: S,
    view: Mutex<V>,
    renderer: Mutex<R>,
    scheduler: T,
    theme: ChartTheme,
    render_config: RenderConfig,
    latest_token: AtomicU64,
    error_generation: AtomicU64,
}

impl<S, V, R, T> RefreshController<S, V, R, T>
where
    S: AnalysisSource,
    V: DashboardView,
    R: ChartRenderer,
    T: Scheduler,
{
    pub fn new(source: S, view: V, renderer: R, scheduler: T) -> Self {
        RefreshController {
            source,
            view: Mutex::new(view),
            renderer: Mutex::new(renderer),
            scheduler,
            theme: DARK_THEME,
            render_config: RenderConfig::default(),
            latest_token: AtomicU64::new(0),
            error_generation: AtomicU64::new(0),
        }
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token.load(Ordering::SeqCst)
    }

    pub fn with_view<O>(&self, read: impl FnOnce(&V) -> O) -> O {
        read(&self.view())
    }

    pub async fn refresh(&self, params: &RefreshParams) -> RefreshOutcome {
        if params.symbol.is_empty() {
            log::warn!("Refresh requested without a symbol");
            return RefreshOutcome::Skipped;
        }

        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!(
            "Refresh #{token}: {} {} [{}]",
            params.symbol,
            params.timeframe,
            params.indicators_csv()
        );

        self.view().set_loading(true);

        let fetched = self
            .source
            .fetch_analysis(&params.symbol, params.timeframe, &params.indicators)
            .await
            .and_then(|analysis| {
                let charts = self.prepare_charts(&analysis)?;
                Ok((analysis, charts))
            });

        if !self.is_current(token) {
            log::info!("Refresh #{token} superseded, dropping analysis for {}", params.symbol);
            return RefreshOutcome::Superseded { token };
        }

        let (analysis, charts) = match fetched {
            Ok(fetched) => fetched,
            Err(error) => return self.fail(token, error),
        };

        if let Err(error) = self.render_charts(&charts) {
            return self.fail(token, error);
        }

        {
            let mut view = self.view();
            for update in header_updates(&analysis) {
                update.apply(&mut *view);
            }
            view.set_loading(false);
        }

        let prediction = self
            .refresh_prediction(token, &params.symbol, analysis.current_price)
            .await;

        log::info!("Refresh #{token} rendered {}", params.symbol);
        RefreshOutcome::Rendered { token, prediction }
    }

    /// Re-lays-out whatever is mounted, returns how many charts were touched.
    pub fn resize(&self) -> usize {
        let mut renderer = self.renderer();
        let mut relaid = 0;
        for mount in MountPoint::iter() {
            if !renderer.is_mounted(mount) {
                continue;
            }
            match renderer.relayout(mount) {
                Ok(true) => relaid += 1,
                Ok(false) => {}
                Err(error) => log::error!("Relayout of {mount} failed: {error:#}"),
            }
        }
        relaid
    }

    pub fn run_deferred(&self, task: Deferred) {
        match task {
            Deferred::DismissError { generation } => {
                // A newer banner owns its own dismissal
                if generation == self.error_generation.load(Ordering::SeqCst) {
                    self.view().hide_error();
                }
            }
            Deferred::Relayout { mount } => {
                let mut renderer = self.renderer();
                if !renderer.is_mounted(mount) {
                    log::debug!("Skipping relayout of {mount}, nothing mounted");
                    return;
                }
                if let Err(error) = renderer.relayout(mount) {
                    log::error!("Relayout of {mount} failed: {error:#}");
                }
            }
        }
    }

    fn prepare_charts(&self, analysis: &AnalysisResponse) -> Result<PreparedCharts> {
        let technical = analysis
            .technical_chart
            .as_deref()
            .ok_or_else(|| anyhow!("Analysis response has no technical chart"))?;
        let technical = ChartSpec::parse(technical)?.themed(&self.theme);

        let price_volume = match analysis.price_volume_chart.as_deref() {
            Some(raw) => Some(ChartSpec::parse(raw)?.themed(&self.theme)),
            None => None,
        };

        Ok(PreparedCharts {
            technical,
            price_volume,
        })
    }

    fn render_charts(&self, charts: &PreparedCharts) -> Result<()> {
        let mut renderer = self.renderer();
        for (mount, spec) in charts.mounts() {
            renderer.render(mount, spec, &self.render_config)?;
        }
        // First layout pass of the charting library is often off
        for (mount, _) in charts.mounts() {
            self.scheduler
                .schedule(RELAYOUT_DELAY, Deferred::Relayout { mount });
        }
        Ok(())
    }

    async fn refresh_prediction(
        &self,
        token: u64,
        symbol: &str,
        current_price: Option<f64>,
    ) -> PredictionOutcome {
        let result = self.source.fetch_latest_prediction(symbol).await;

        if !self.is_current(token) {
            log::info!("Refresh #{token} superseded, dropping prediction for {symbol}");
            return PredictionOutcome::Discarded;
        }

        let (outcome, updates) = match (result, current_price) {
            (
                Ok(PredictionQueryResult {
                    predicted_price: Some(predicted),
                }),
                Some(current),
            ) => {
                let metrics = PredictionMetrics::compute(predicted, current);
                let updates = metrics.updates();
                (PredictionOutcome::Shown(metrics), updates)
            }
            (Ok(_), _) => {
                log::warn!("No forecast to compare for {symbol}");
                (PredictionOutcome::Placeholder, placeholder_updates())
            }
            (Err(error), _) => {
                log::error!("Failed to load predictions for {symbol}: {error:#}");
                (PredictionOutcome::Placeholder, placeholder_updates())
            }
        };

        self.apply_updates(&updates);
        outcome
    }

    fn fail(&self, token: u64, error: anyhow::Error) -> RefreshOutcome {
        log::error!("Refresh #{token} failed: {error:#}");
        let message = format!("Error: {error:#}");
        self.view().set_loading(false);
        self.show_error(&message);
        RefreshOutcome::Failed { token, message }
    }

    fn show_error(&self, message: &str) {
        let generation = self.error_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.view().show_error(message);
        self.scheduler
            .schedule(ERROR_DISMISS_DELAY, Deferred::DismissError { generation });
    }

    fn apply_updates(&self, updates: &[FieldUpdate]) {
        let mut view = self.view();
        for update in updates {
            update.apply(&mut *view);
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.latest_token.load(Ordering::SeqCst) == token
    }

    fn view(&self) -> MutexGuard<'_, V> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn renderer(&self) -> MutexGuard<'_, R> {
        self.renderer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

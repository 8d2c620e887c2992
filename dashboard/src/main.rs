use std::sync::Arc;

use anyhow::Result;
use common::sources::api::AnalysisApi;
use dashboard::{
    DashboardConfig, HtmlFileRenderer, RefreshController, RefreshOutcome, Selection,
    TerminalView, TokioScheduler, Trigger, UiEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

type Controller = RefreshController<AnalysisApi, TerminalView, HtmlFileRenderer, TokioScheduler>;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env()?;
    log::info!(
        "Analysis API at {}, charts in {}",
        config.api_url,
        config.chart_output_dir.display()
    );

    let (deferred_tx, mut deferred_rx) = mpsc::unbounded_channel();
    let controller: Arc<Controller> = Arc::new(RefreshController::new(
        AnalysisApi::new(&config.api_url),
        TerminalView::new(),
        HtmlFileRenderer::new(config.chart_output_dir.clone()),
        TokioScheduler::new(deferred_tx),
    ));

    let mut selection = Selection {
        symbol: config.default_symbol.clone().unwrap_or_default(),
        timeframe: config.default_timeframe,
        indicators: config.default_indicators.clone(),
    };
    dispatch(&controller, selection.apply(UiEvent::PageLoaded));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match line.parse::<UiEvent>() {
                    Ok(event) => dispatch(&controller, selection.apply(event)),
                    Err(error) => log::warn!("{error}"),
                },
                None => break,
            },
            Some(task) = deferred_rx.recv() => controller.run_deferred(task),
        }
    }

    log::info!("Input closed, shutting down");
    Ok(())
}

fn dispatch(controller: &Arc<Controller>, trigger: Trigger) {
    match trigger {
        Trigger::Refresh(params) => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                match controller.refresh(&params).await {
                    RefreshOutcome::Rendered { .. } | RefreshOutcome::Failed { .. } => {
                        println!("{}", controller.with_view(TerminalView::summary));
                    }
                    RefreshOutcome::Superseded { .. } | RefreshOutcome::Skipped => {}
                }
            });
        }
        Trigger::Relayout => {
            let count = controller.resize();
            log::info!("Relaid out {count} chart(s)");
        }
        Trigger::Nothing => log::debug!("No symbol selected, nothing to refresh"),
    }
}

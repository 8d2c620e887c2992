pub mod config;
pub mod controller;
pub mod header;
pub mod prediction_panel;
pub mod renderer;
pub mod scheduler;
pub mod selection;
pub mod terminal;
pub mod view;

pub use config::DashboardConfig;
pub use controller::{PredictionOutcome, RefreshController, RefreshOutcome};
pub use renderer::{ChartRenderer, HtmlFileRenderer};
pub use scheduler::{Deferred, Scheduler, TokioScheduler};
pub use selection::{RefreshParams, Selection, Trigger, UiEvent};
pub use terminal::TerminalView;
pub use view::{DashboardView, Field, FieldUpdate};

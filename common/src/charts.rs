use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{AsRefStr, Display, EnumIter};

// Dark palette
pub const DARK_BG: &str = "#161B22";
pub const DARK_FONT: &str = "#E6EDF3";
pub const DARK_GRID: &str = "#30363D";

/// Mode bar buttons stripped from every chart.
pub const REMOVED_MODE_BAR_BUTTONS: [&str; 6] = [
    "zoom2d",
    "pan2d",
    "select2d",
    "lasso2d",
    "autoScale2d",
    "toggleSpikelines",
];

// Mount points on the page, displayed as their element ids
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumIter)]
pub enum MountPoint {
    #[strum(serialize = "technical-chart")]
    TechnicalChart,
    #[strum(serialize = "price-volume-chart")]
    PriceVolumeChart,
}

/// A Plotly figure: ordered traces plus a free-form layout mapping.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ChartSpec {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub layout: Map<String, Value>,
    // Frames, templates and whatever else the encoder emitted
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartSpec {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse chart specification")
    }

    /// Merges `theme` into the layout. Existing axis settings survive, only
    /// the colour keys are overwritten.
    pub fn apply_theme(&mut self, theme: &ChartTheme) {
        let layout = &mut self.layout;
        layout.insert("paper_bgcolor".to_string(), json!(theme.paper_bgcolor));
        layout.insert("plot_bgcolor".to_string(), json!(theme.plot_bgcolor));
        layout.insert("font".to_string(), json!({ "color": theme.font_color }));

        let secondary_axes: Vec<String> = layout
            .keys()
            .filter(|key| is_secondary_y_axis(key))
            .cloned()
            .collect();

        let axes = ["xaxis".to_string(), "yaxis".to_string()]
            .into_iter()
            .chain(secondary_axes);

        for axis in axes {
            let entry = layout
                .entry(axis)
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Some(settings) = entry.as_object_mut() {
                settings.insert("gridcolor".to_string(), json!(theme.grid_color));
                settings.insert("linecolor".to_string(), json!(theme.line_color));
            }
        }
    }

    pub fn themed(mut self, theme: &ChartTheme) -> Self {
        self.apply_theme(theme);
        self
    }
}

// `yaxis2`, `yaxis3`, ... but not `yaxis` itself
fn is_secondary_y_axis(key: &str) -> bool {
    key.strip_prefix("yaxis")
        .map(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartTheme {
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub font_color: &'static str,
    pub grid_color: &'static str,
    pub line_color: &'static str,
}

pub const DARK_THEME: ChartTheme = ChartTheme {
    paper_bgcolor: DARK_BG,
    plot_bgcolor: DARK_BG,
    font_color: DARK_FONT,
    grid_color: DARK_GRID,
    line_color: DARK_GRID,
};

// Plotly `config` argument
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub responsive: bool,
    pub display_mode_bar: bool,
    pub displaylogo: bool,
    pub mode_bar_buttons_to_remove: Vec<&'static str>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            responsive: true,
            display_mode_bar: true,
            displaylogo: false,
            mode_bar_buttons_to_remove: REMOVED_MODE_BAR_BUTTONS.to_vec(),
        }
    }
}

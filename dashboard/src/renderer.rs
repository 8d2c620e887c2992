use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use common::{ChartSpec, MountPoint, RenderConfig};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Narrow seam over the charting library.
pub trait ChartRenderer {
    /// Draws `spec` into `mount`, replacing whatever was there.
    fn render(&mut self, mount: MountPoint, spec: &ChartSpec, config: &RenderConfig)
        -> Result<()>;

    /// Re-lays-out the chart already in `mount`. Returns `false` when
    /// nothing is mounted there.
    fn relayout(&mut self, mount: MountPoint) -> Result<bool>;

    fn is_mounted(&self, mount: MountPoint) -> bool;
}

/// Writes one standalone Plotly page per mount point.
#[derive(Debug)]
pub struct HtmlFileRenderer {
    output_dir: PathBuf,
    mounted: BTreeSet<MountPoint>,
}

impl HtmlFileRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        HtmlFileRenderer {
            output_dir: output_dir.into(),
            mounted: BTreeSet::new(),
        }
    }

    pub fn chart_path(&self, mount: MountPoint) -> PathBuf {
        self.output_dir.join(format!("{mount}.html"))
    }
}

impl ChartRenderer for HtmlFileRenderer {
    fn render(
        &mut self,
        mount: MountPoint,
        spec: &ChartSpec,
        config: &RenderConfig,
    ) -> Result<()> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create chart directory {}", self.output_dir.display())
        })?;

        let page = chart_page(mount, spec, config)?;
        let path = self.chart_path(mount);
        fs::write(&path, page)
            .with_context(|| format!("Failed to write chart {}", path.display()))?;

        self.mounted.insert(mount);
        log::info!("Rendered {mount} -> {}", path.display());
        Ok(())
    }

    fn relayout(&mut self, mount: MountPoint) -> Result<bool> {
        if !self.mounted.contains(&mount) {
            return Ok(false);
        }
        // The page is responsive, a file on disk has nothing left to resize
        log::debug!("Relayout {mount}");
        Ok(true)
    }

    fn is_mounted(&self, mount: MountPoint) -> bool {
        self.mounted.contains(&mount)
    }
}

fn chart_page(mount: MountPoint, spec: &ChartSpec, config: &RenderConfig) -> Result<String> {
    let data = serde_json::to_string(&spec.data)?;
    let layout = serde_json::to_string(&spec.layout)?;
    let config = serde_json::to_string(config)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{mount}</title>
    <script src="{PLOTLY_CDN}"></script>
    <style>html, body {{ margin: 0; height: 100%; background: #0D1117; }} #{mount} {{ width: 100%; height: 100%; }}</style>
</head>
<body>
    <div id="{mount}"></div>
    <script>
        Plotly.newPlot('{mount}', {data}, {layout}, {config}).then(function () {{
            setTimeout(function () {{ Plotly.Plots.resize('{mount}'); }}, 100);
        }});
        window.addEventListener('resize', function () {{ Plotly.Plots.resize('{mount}'); }});
    </script>
</body>
</html>"#
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::DARK_THEME;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dashboard-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_render_writes_page() {
        let dir = scratch_dir("render");
        let mut renderer = HtmlFileRenderer::new(&dir);
        let spec = ChartSpec::parse(r#"{"data":[{"type":"scatter","y":[1,2,3]}],"layout":{}}"#)
            .unwrap()
            .themed(&DARK_THEME);

        assert!(!renderer.is_mounted(MountPoint::TechnicalChart));
        renderer
            .render(MountPoint::TechnicalChart, &spec, &RenderConfig::default())
            .unwrap();
        assert!(renderer.is_mounted(MountPoint::TechnicalChart));

        let page = fs::read_to_string(renderer.chart_path(MountPoint::TechnicalChart)).unwrap();
        assert!(page.contains("Plotly.newPlot('technical-chart'"));
        assert!(page.contains("\"displaylogo\":false"));
        assert!(page.contains("#161B22"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_relayout_without_chart_is_noop() {
        let mut renderer = HtmlFileRenderer::new(scratch_dir("relayout"));
        assert!(!renderer.relayout(MountPoint::TechnicalChart).unwrap());
        assert!(!renderer.is_mounted(MountPoint::TechnicalChart));
    }
}

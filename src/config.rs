use std::path::Path;

use serde::Deserialize;

use crate::error::{DashError, Result};

/// File looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "panda-dash.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Tunables for loading and rendering. Every field has a default, so a
/// config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Uploads larger than this many MiB are rejected before parsing.
    pub max_upload_mb: f64,
    /// Rows shown in the preview table.
    pub preview_rows: usize,
    /// Upper bound of the "number of plots" slider.
    pub max_charts: usize,
    /// Height of a single chart in points.
    pub chart_height: f32,
    /// Numeric columns included in a pairplot grid.
    pub pairplot_max_columns: usize,
    /// Bins per axis of the density contour grid.
    pub density_bins: usize,
    /// Filled bands of the density contour plot.
    pub density_levels: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: 20.0,
            preview_rows: 5,
            max_charts: 6,
            chart_height: 320.0,
            pairplot_max_columns: 4,
            density_bins: 20,
            density_levels: 6,
        }
    }
}

impl DashboardConfig {
    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| DashError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DashboardConfig =
            serde_json::from_str(&text).map_err(|source| DashError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.sanitized())
    }

    /// Like [`DashboardConfig::load`], but logs problems and falls back to the
    /// defaults instead of failing.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    /// Byte threshold matching `max_upload_mb`.
    pub fn max_upload_bytes(&self) -> u64 {
        (self.max_upload_mb * 1024.0 * 1024.0) as u64
    }

    fn sanitized(mut self) -> Self {
        self.max_charts = self.max_charts.max(1);
        self.pairplot_max_columns = self.pairplot_max_columns.max(1);
        self.density_bins = self.density_bins.max(2);
        self.density_levels = self.density_levels.max(1);
        self
    }
}

use std::path::Path;

use crate::chart::selection::Selection;
use crate::config::DashboardConfig;
use crate::data::loader;
use crate::data::model::Dataset;
use crate::error::DashError;

pub const AWAITING_MESSAGE: &str = "Awaiting dataset to be uploaded.";
pub const SUCCESS_MESSAGE: &str = "Dataset uploaded successfully!";

// ---------------------------------------------------------------------------
// Pipeline state
// ---------------------------------------------------------------------------

/// Where the upload pipeline stands. A failed load discards any previous
/// dataset.
#[derive(Debug, Default)]
pub enum Pipeline {
    #[default]
    AwaitingUpload,
    Failed(String),
    Ready(Dataset),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    pub pipeline: Pipeline,

    /// Widget state; survives uploads so picks that still exist keep working.
    pub selection: Selection,

    pub config: DashboardConfig,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.pipeline {
            Pipeline::Ready(ds) => Some(ds),
            _ => None,
        }
    }

    /// Load `path` and move the pipeline to `Ready` or `Failed`.
    pub fn open(&mut self, path: &Path) {
        let result = loader::load_file(path, &self.config);
        self.ingest(result);
    }

    /// Replace the pipeline with the result of a load.
    pub fn ingest(&mut self, result: Result<Dataset, DashError>) {
        self.pipeline = match result {
            Ok(dataset) => {
                let (rows, cols) = dataset.shape();
                log::info!("Loaded {} with {rows} rows and {cols} columns", dataset.source);
                Pipeline::Ready(dataset)
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                Pipeline::Failed(e.to_string())
            }
        };
        // Keep the cap inside the configured slider range.
        self.selection.max_charts = self.selection.max_charts.clamp(1, self.config.max_charts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnKind};

    fn dataset() -> Dataset {
        Dataset::new(
            "d.csv",
            vec![Column::new("a", ColumnKind::Integer, vec![CellValue::Integer(1)])],
        )
    }

    #[test]
    fn starts_awaiting_upload() {
        let state = AppState::default();
        assert!(matches!(state.pipeline, Pipeline::AwaitingUpload));
        assert!(state.dataset().is_none());
    }

    #[test]
    fn failure_discards_previous_dataset() {
        let mut state = AppState::default();
        state.ingest(Ok(dataset()));
        assert_eq!(state.dataset().map(|d| d.len()), Some(1));

        state.ingest(Err(DashError::UnsupportedExtension("txt".to_string())));
        assert!(state.dataset().is_none());
        assert!(matches!(&state.pipeline, Pipeline::Failed(msg) if msg.contains(".txt")));
    }

    #[test]
    fn oversized_file_fails_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.csv");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(2 * 1024 * 1024).unwrap();

        let mut state = AppState::new(DashboardConfig {
            max_upload_mb: 1.0,
            ..DashboardConfig::default()
        });
        state.open(&path);
        assert!(matches!(
            &state.pipeline,
            Pipeline::Failed(msg) if msg == "File size exceeds 1MB, please upload a smaller file."
        ));
    }

    #[test]
    fn csv_upload_becomes_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.csv");
        std::fs::write(&path, "a,b\n1,x\n2,y\n").unwrap();

        let mut state = AppState::default();
        state.open(&path);
        let ds = state.dataset().unwrap();
        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.source, "ok.csv");
    }
}

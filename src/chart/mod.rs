//! Chart layer: chart kinds, selection state, construction and dispatch.
//!
//! Architecture:
//! ```text
//!   Dataset + Selection
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ dispatch  │  plan kinds under the cap, resolve column picks
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  build    │  pure constructors → ChartArtifact
//!   └──────────┘
//!        │
//!        ▼
//!   Outcome (chart / note / warning / error) per slot
//! ```

use std::fmt;

use crate::data::stats::{Bin, BoxStats, DensityGrid};

pub mod build;
pub mod dispatch;
pub mod geometry;
pub mod selection;

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

/// A visualization type offered in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Pie,
    Histogram,
    Box,
    Heatmap,
    Spider,
    Pairplot,
    Violin,
    DensityContour,
    Bubble,
    Scatter3d,
    Treemap,
    OneVsMany,
}

impl ChartKind {
    /// Offered order.
    pub const ALL: [ChartKind; 15] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Histogram,
        ChartKind::Box,
        ChartKind::Heatmap,
        ChartKind::Spider,
        ChartKind::Pairplot,
        ChartKind::Violin,
        ChartKind::DensityContour,
        ChartKind::Bubble,
        ChartKind::Scatter3d,
        ChartKind::Treemap,
        ChartKind::OneVsMany,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Histogram => "Histogram",
            ChartKind::Box => "Box Plot",
            ChartKind::Heatmap => "Heatmap",
            ChartKind::Spider => "Spider Plot",
            ChartKind::Pairplot => "Pairplot",
            ChartKind::Violin => "Violin Plot",
            ChartKind::DensityContour => "Density Contour Plot",
            ChartKind::Bubble => "Bubble Chart",
            ChartKind::Scatter3d => "3D Scatter Plot",
            ChartKind::Treemap => "Treemap",
            ChartKind::OneVsMany => "One vs Multiple Features",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relationship chart drawn for one (primary, comparison) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ComparisonKind {
    #[default]
    Scatter,
    Bar,
    Box,
    Line,
    Heatmap,
    Spider,
    Violin,
}

impl ComparisonKind {
    pub const ALL: [ComparisonKind; 7] = [
        ComparisonKind::Scatter,
        ComparisonKind::Bar,
        ComparisonKind::Box,
        ComparisonKind::Line,
        ComparisonKind::Heatmap,
        ComparisonKind::Spider,
        ComparisonKind::Violin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComparisonKind::Scatter => "Scatter Plot",
            ComparisonKind::Bar => "Bar Chart",
            ComparisonKind::Box => "Box Plot",
            ComparisonKind::Line => "Line Chart",
            ComparisonKind::Heatmap => "Heatmap",
            ComparisonKind::Spider => "Spider Plot",
            ComparisonKind::Violin => "Violin Plot",
        }
    }
}

// ---------------------------------------------------------------------------
// Chart artifacts: plain data, consumed by the renderer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub title: String,
    pub body: ChartBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViolinGroup {
    pub label: String,
    pub stats: BoxStats,
    /// `(value, density)` samples of the kernel estimate.
    pub density: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub label: String,
    pub count: usize,
    /// `[x, y, width, height]` inside the unit square.
    pub rect: [f64; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Bars {
        x_label: String,
        y_label: String,
        bars: Vec<(String, f64)>,
    },
    /// Missing values split the line into separate segments.
    Line {
        x_label: String,
        y_label: String,
        segments: Vec<Vec<[f64; 2]>>,
    },
    Scatter {
        x_label: String,
        y_label: String,
        points: Vec<[f64; 2]>,
    },
    Bubble {
        x_label: String,
        y_label: String,
        size_label: String,
        points: Vec<[f64; 2]>,
        /// Marker radius per point, already scaled for display.
        radii: Vec<f32>,
    },
    /// Slices with their share of the whole, largest first.
    Pie { slices: Vec<(String, f64)> },
    Histogram { x_label: String, bins: Vec<Bin> },
    Boxes {
        x_label: Option<String>,
        y_label: String,
        groups: Vec<(String, BoxStats)>,
    },
    Violins {
        x_label: Option<String>,
        y_label: String,
        groups: Vec<ViolinGroup>,
    },
    /// Square correlation matrix; `None` where the coefficient is undefined.
    Heatmap {
        labels: Vec<String>,
        cells: Vec<Vec<Option<f64>>>,
    },
    Radar { axes: Vec<String>, values: Vec<f64> },
    Pairplot {
        columns: Vec<String>,
        /// Histogram per column, shown on the diagonal.
        diagonal: Vec<Vec<Bin>>,
        /// `points[row][col]`: x from `columns[col]`, y from `columns[row]`.
        points: Vec<Vec<Vec<[f64; 2]>>>,
    },
    DensityContour {
        x_label: String,
        y_label: String,
        grid: DensityGrid,
        /// Band index per grid cell, 0 meaning empty.
        bands: Vec<Vec<usize>>,
        levels: usize,
    },
    /// Points normalised to the unit cube.
    Scatter3d {
        labels: [String; 3],
        points: Vec<[f64; 3]>,
    },
    Treemap { tiles: Vec<Tile> },
}

/// What one dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Chart(ChartArtifact),
    /// Informational text in place of a chart.
    Note(String),
    Warning(String),
    Error(String),
}

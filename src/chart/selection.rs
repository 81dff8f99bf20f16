use std::collections::BTreeMap;

use super::{ChartKind, ComparisonKind};

// ---------------------------------------------------------------------------
// Selection state: what the widgets currently hold
// ---------------------------------------------------------------------------

/// Column choices for one chart kind. `None` means "not chosen yet", which
/// resolves to the default column of the relevant bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPicks {
    /// Single-column kinds (bar, line, pie, histogram, box, violin, treemap).
    pub column: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub size: Option<String>,
    /// Spider plot axes; `None` means every numeric column.
    pub columns: Option<Vec<String>>,
    /// Composite comparison: primary feature.
    pub primary: Option<String>,
    /// Composite comparison: features compared with the primary one.
    pub comparisons: Vec<String>,
    /// Nested chart per `(primary, comparison)` pair.
    pub pair_kinds: BTreeMap<(String, String), ComparisonKind>,
}

impl ColumnPicks {
    pub fn pair_kind(&self, primary: &str, feature: &str) -> ComparisonKind {
        self.pair_kinds
            .get(&(primary.to_string(), feature.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_pair_kind(&mut self, primary: &str, feature: &str, kind: ComparisonKind) {
        self.pair_kinds
            .insert((primary.to_string(), feature.to_string()), kind);
    }
}

/// The full user selection, independent of rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Chosen kinds, in the order they were ticked.
    pub kinds: Vec<ChartKind>,
    /// How many of `kinds` to render.
    pub max_charts: usize,
    pub picks: BTreeMap<ChartKind, ColumnPicks>,
    /// Whether the summary block is shown.
    pub show_info: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            max_charts: 1,
            picks: BTreeMap::new(),
            show_info: false,
        }
    }
}

impl Selection {
    pub fn is_selected(&self, kind: ChartKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Tick appends to the selection order, untick removes.
    pub fn set_selected(&mut self, kind: ChartKind, selected: bool) {
        if selected {
            if !self.is_selected(kind) {
                self.kinds.push(kind);
            }
        } else {
            self.kinds.retain(|k| *k != kind);
        }
    }

    pub fn picks(&self, kind: ChartKind) -> ColumnPicks {
        self.picks.get(&kind).cloned().unwrap_or_default()
    }

    pub fn picks_mut(&mut self, kind: ChartKind) -> &mut ColumnPicks {
        self.picks.entry(kind).or_default()
    }
}

/// Resolve a pick against the columns it may come from. An unset or stale
/// pick falls back to `bucket[fallback]`, or the first column when the
/// bucket is shorter than that.
pub fn resolve(pick: Option<&str>, bucket: &[String], fallback: usize) -> Option<String> {
    match pick {
        Some(name) if bucket.iter().any(|c| c == name) => Some(name.to_string()),
        _ => bucket.get(fallback).or_else(|| bucket.first()).cloned(),
    }
}

use super::build;
use super::selection::{resolve, ColumnPicks, Selection};
use super::{ChartArtifact, ChartKind, ComparisonKind, Outcome};
use crate::config::DashboardConfig;
use crate::data::classify::{classify, Classification, Role};
use crate::data::model::Dataset;

pub const NO_KINDS_WARNING: &str = "Please select at least one plot type to display.";
pub const HEATMAP_NOTE: &str = "Heatmap between selected features not supported in this case.";

// ---------------------------------------------------------------------------
// Composite comparison: compatibility table
// ---------------------------------------------------------------------------

/// What a (primary, comparison, nested kind) combination yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Chart,
    Note,
    Unsupported,
}

/// Rules checked in order; `None` matches any role. Combinations not listed
/// are unsupported.
const COMPARISON_RULES: &[(ComparisonKind, Option<Role>, Option<Role>, Verdict)] = &[
    (ComparisonKind::Scatter, Some(Role::Numeric), Some(Role::Numeric), Verdict::Chart),
    (ComparisonKind::Bar, Some(Role::Categorical), Some(Role::Numeric), Verdict::Chart),
    (ComparisonKind::Box, Some(Role::Numeric), Some(Role::Categorical), Verdict::Chart),
    (ComparisonKind::Line, Some(Role::Numeric), Some(Role::Numeric), Verdict::Chart),
    (ComparisonKind::Heatmap, Some(Role::Numeric), Some(Role::Numeric), Verdict::Note),
    (ComparisonKind::Spider, None, None, Verdict::Chart),
    (ComparisonKind::Violin, Some(Role::Numeric), Some(Role::Categorical), Verdict::Chart),
];

pub fn verdict(kind: ComparisonKind, primary: Option<Role>, feature: Option<Role>) -> Verdict {
    let fits = |rule: Option<Role>, actual: Option<Role>| rule.is_none() || rule == actual;
    COMPARISON_RULES
        .iter()
        .find(|(k, p, f, _)| *k == kind && fits(*p, primary) && fits(*f, feature))
        .map_or(Verdict::Unsupported, |rule| rule.3)
}

// ---------------------------------------------------------------------------
// Dashboard: one slot per rendered chart kind
// ---------------------------------------------------------------------------

/// A (primary, comparison) pair of the composite view with its nested kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub primary: String,
    pub feature: String,
    pub kind: ComparisonKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Zero-based position among the rendered slots.
    pub position: usize,
    pub kind: ChartKind,
    /// Columns the picks resolved to.
    pub columns: Vec<String>,
    /// Composite view only; index aligned with `outcomes`.
    pub pairs: Vec<Pair>,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub classification: Classification,
    pub warning: Option<String>,
    pub slots: Vec<Slot>,
}

impl Dashboard {
    /// Number of chart artifacts across all slots.
    pub fn chart_count(&self) -> usize {
        self.slots
            .iter()
            .flat_map(|s| &s.outcomes)
            .filter(|o| matches!(o, Outcome::Chart(_)))
            .count()
    }
}

/// The kinds that will be rendered: the first `max_charts` in selection order.
pub fn plan(kinds: &[ChartKind], max_charts: usize) -> &[ChartKind] {
    &kinds[..kinds.len().min(max_charts)]
}

/// Run the whole dispatch for the current dataset and selection.
pub fn build_dashboard(
    dataset: &Dataset,
    selection: &Selection,
    config: &DashboardConfig,
) -> Dashboard {
    let classification = classify(dataset);
    if selection.kinds.is_empty() {
        return Dashboard {
            classification,
            warning: Some(NO_KINDS_WARNING.to_string()),
            slots: Vec::new(),
        };
    }

    let planned = plan(&selection.kinds, selection.max_charts);
    log::debug!(
        "dispatching {} of {} selected chart kinds",
        planned.len(),
        selection.kinds.len()
    );
    let slots = planned
        .iter()
        .enumerate()
        .map(|(position, &kind)| {
            let mut slot = dispatch(
                dataset,
                &classification,
                kind,
                &selection.picks(kind),
                config,
            );
            slot.position = position;
            slot
        })
        .collect();

    Dashboard {
        classification,
        warning: None,
        slots,
    }
}

fn no_columns(kind: ChartKind, bucket: &str) -> Outcome {
    Outcome::Warning(format!("No {bucket} columns available for {kind}."))
}

fn finish(result: anyhow::Result<ChartArtifact>) -> Outcome {
    match result {
        Ok(chart) => Outcome::Chart(chart),
        Err(e) => {
            log::error!("chart construction failed: {e:#}");
            Outcome::Error(format!("Error: {e:#}"))
        }
    }
}

/// Resolve the picks of one chart kind and construct its outcome(s).
pub fn dispatch(
    dataset: &Dataset,
    classification: &Classification,
    kind: ChartKind,
    picks: &ColumnPicks,
    config: &DashboardConfig,
) -> Slot {
    let numeric = &classification.numeric;
    let categorical = &classification.categorical;
    let mut slot = Slot {
        position: 0,
        kind,
        columns: Vec::new(),
        pairs: Vec::new(),
        outcomes: Vec::new(),
    };

    let single = |bucket: &[String]| resolve(picks.column.as_deref(), bucket, 0);
    let xy = || {
        Some((
            resolve(picks.x.as_deref(), numeric, 0)?,
            resolve(picks.y.as_deref(), numeric, 1)?,
        ))
    };

    let outcome = match kind {
        ChartKind::Bar | ChartKind::Pie | ChartKind::Treemap => match single(categorical) {
            Some(col) => {
                let result = match kind {
                    ChartKind::Bar => build::bar_counts(dataset, &col),
                    ChartKind::Pie => build::pie(dataset, &col),
                    _ => build::treemap(dataset, &col),
                };
                slot.columns.push(col);
                finish(result)
            }
            None => no_columns(kind, "categorical"),
        },
        ChartKind::Line | ChartKind::Histogram | ChartKind::Box | ChartKind::Violin => {
            match single(numeric) {
                Some(col) => {
                    let result = match kind {
                        ChartKind::Line => build::line_over_rows(dataset, &col),
                        ChartKind::Histogram => build::histogram(dataset, &col),
                        ChartKind::Box => build::box_single(dataset, &col),
                        _ => build::violin_single(dataset, &col),
                    };
                    slot.columns.push(col);
                    finish(result)
                }
                None => no_columns(kind, "numeric"),
            }
        }
        ChartKind::Scatter | ChartKind::DensityContour => match xy() {
            Some((x, y)) => {
                let result = if kind == ChartKind::Scatter {
                    build::scatter(dataset, &x, &y, format!("Scatter Plot of {y} vs {x}"))
                } else {
                    build::density_contour(
                        dataset,
                        &x,
                        &y,
                        config.density_bins,
                        config.density_levels,
                    )
                };
                slot.columns.extend([x, y]);
                finish(result)
            }
            None => no_columns(kind, "numeric"),
        },
        ChartKind::Bubble | ChartKind::Scatter3d => {
            let third = if kind == ChartKind::Bubble {
                &picks.size
            } else {
                &picks.z
            };
            match (xy(), resolve(third.as_deref(), numeric, 2)) {
                (Some((x, y)), Some(t)) => {
                    let result = if kind == ChartKind::Bubble {
                        build::bubble(dataset, &x, &y, &t)
                    } else {
                        build::scatter3d(dataset, &x, &y, &t)
                    };
                    slot.columns.extend([x, y, t]);
                    finish(result)
                }
                _ => no_columns(kind, "numeric"),
            }
        }
        ChartKind::Heatmap => {
            if numeric.is_empty() {
                no_columns(kind, "numeric")
            } else {
                slot.columns = numeric.clone();
                finish(build::correlation_heatmap(dataset, numeric))
            }
        }
        ChartKind::Pairplot => {
            if numeric.is_empty() {
                no_columns(kind, "numeric")
            } else {
                slot.columns = numeric
                    .iter()
                    .take(config.pairplot_max_columns)
                    .cloned()
                    .collect();
                finish(build::pairplot(dataset, &slot.columns))
            }
        }
        ChartKind::Spider => {
            let axes: Vec<String> = match &picks.columns {
                Some(chosen) => chosen
                    .iter()
                    .filter(|c| numeric.contains(c))
                    .cloned()
                    .collect(),
                None => numeric.clone(),
            };
            if axes.is_empty() {
                no_columns(kind, "numeric")
            } else {
                slot.columns = axes;
                finish(build::radar_means(
                    dataset,
                    &slot.columns,
                    "Spider Plot of column means".to_string(),
                ))
            }
        }
        ChartKind::OneVsMany => {
            compare_many(dataset, classification, picks, &mut slot);
            return slot;
        }
    };

    slot.outcomes.push(outcome);
    slot
}

/// Fill `slot` with one outcome per comparison column.
fn compare_many(
    dataset: &Dataset,
    classification: &Classification,
    picks: &ColumnPicks,
    slot: &mut Slot,
) {
    let comparable = classification.comparable();
    let Some(primary) = resolve(picks.primary.as_deref(), &comparable, 0) else {
        slot.outcomes
            .push(no_columns(ChartKind::OneVsMany, "numeric or categorical"));
        return;
    };

    slot.columns.push(primary.clone());
    for feature in picks.comparisons.iter().filter(|c| comparable.contains(c)) {
        let kind = picks.pair_kind(&primary, feature);
        slot.columns.push(feature.clone());
        slot.outcomes
            .push(compare(dataset, classification, &primary, feature, kind));
        slot.pairs.push(Pair {
            primary: primary.clone(),
            feature: feature.clone(),
            kind,
        });
    }
}

/// One relationship chart between `primary` and `feature`, gated by the
/// compatibility table.
pub fn compare(
    dataset: &Dataset,
    classification: &Classification,
    primary: &str,
    feature: &str,
    kind: ComparisonKind,
) -> Outcome {
    let primary_role = classification.role(primary);
    let feature_role = classification.role(feature);
    match verdict(kind, primary_role, feature_role) {
        Verdict::Unsupported => {
            log::warn!(
                "{} not supported for {primary} ({primary_role:?}) vs {feature} ({feature_role:?})",
                kind.label()
            );
            Outcome::Warning(format!("Plot type not supported for {primary} vs {feature}."))
        }
        Verdict::Note => Outcome::Note(HEATMAP_NOTE.to_string()),
        Verdict::Chart => finish(match kind {
            ComparisonKind::Scatter => {
                build::scatter(dataset, primary, feature, format!("{primary} vs {feature}"))
            }
            ComparisonKind::Bar => build::bar_sums(dataset, primary, feature),
            ComparisonKind::Box => build::box_grouped(dataset, primary, feature),
            ComparisonKind::Line => build::line_xy(dataset, primary, feature),
            ComparisonKind::Violin => build::violin_grouped(dataset, primary, feature),
            ComparisonKind::Spider | ComparisonKind::Heatmap => build::radar_means(
                dataset,
                &[primary.to_string(), feature.to_string()],
                format!("{primary} vs {feature}"),
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnKind};

    fn dataset() -> Dataset {
        let ints = |v: &[i64]| v.iter().map(|i| CellValue::Integer(*i)).collect::<Vec<_>>();
        let text = |v: &[&str]| {
            v.iter()
                .map(|s| CellValue::Text(s.to_string()))
                .collect::<Vec<_>>()
        };
        Dataset::new(
            "t",
            vec![
                Column::new("units", ColumnKind::Integer, ints(&[1, 2, 3, 4])),
                Column::new("price", ColumnKind::Integer, ints(&[10, 8, 6, 4])),
                Column::new("region", ColumnKind::Text, text(&["n", "s", "n", "e"])),
                Column::new("store", ColumnKind::Text, text(&["a", "a", "b", "b"])),
                Column::new(
                    "open",
                    ColumnKind::Boolean,
                    vec![CellValue::Bool(true); 4],
                ),
            ],
        )
    }

    fn selection(kinds: &[ChartKind], max_charts: usize) -> Selection {
        let mut sel = Selection {
            max_charts,
            ..Selection::default()
        };
        for kind in kinds {
            sel.set_selected(*kind, true);
        }
        sel
    }

    fn only_outcome(
        dataset: &Dataset,
        kind: ComparisonKind,
        primary: &str,
        feature: &str,
    ) -> Outcome {
        compare(dataset, &classify(dataset), primary, feature, kind)
    }

    #[test]
    fn zero_kinds_gives_one_warning_and_no_charts() {
        let dash = build_dashboard(&dataset(), &selection(&[], 6), &DashboardConfig::default());
        assert!(dash.slots.is_empty());
        assert_eq!(dash.chart_count(), 0);
        assert_eq!(dash.warning.as_deref(), Some(NO_KINDS_WARNING));
    }

    #[test]
    fn cap_keeps_the_first_kinds_in_selection_order() {
        let kinds = [
            ChartKind::Pie,
            ChartKind::Histogram,
            ChartKind::Bar,
            ChartKind::Line,
        ];
        let dash = build_dashboard(&dataset(), &selection(&kinds, 2), &DashboardConfig::default());
        let rendered: Vec<ChartKind> = dash.slots.iter().map(|s| s.kind).collect();
        assert_eq!(rendered, vec![ChartKind::Pie, ChartKind::Histogram]);
        assert_eq!(dash.chart_count(), 2);
        assert_eq!(dash.slots[1].position, 1);
        assert_eq!(plan(&kinds, 10), &kinds[..]);
    }

    #[test]
    fn every_offered_kind_is_dispatched() {
        let mut sel = selection(&ChartKind::ALL, ChartKind::ALL.len());
        sel.picks_mut(ChartKind::OneVsMany)
            .comparisons
            .push("price".to_string());
        let dash = build_dashboard(&dataset(), &sel, &DashboardConfig::default());
        assert_eq!(dash.slots.len(), ChartKind::ALL.len());
        for slot in &dash.slots {
            assert!(
                slot.outcomes.iter().all(|o| matches!(o, Outcome::Chart(_))),
                "{} produced {:?}",
                slot.kind,
                slot.outcomes
            );
        }
    }

    #[test]
    fn picks_default_to_bucket_columns() {
        let cls = classify(&dataset());
        let config = DashboardConfig::default();
        let slot = dispatch(&dataset(), &cls, ChartKind::Scatter, &ColumnPicks::default(), &config);
        assert_eq!(slot.columns, vec!["units", "price"]);

        let picks = ColumnPicks {
            column: Some("store".to_string()),
            ..ColumnPicks::default()
        };
        let slot = dispatch(&dataset(), &cls, ChartKind::Bar, &picks, &config);
        assert_eq!(slot.columns, vec!["store"]);

        // Booleans are never offered.
        let picks = ColumnPicks {
            column: Some("open".to_string()),
            ..ColumnPicks::default()
        };
        let slot = dispatch(&dataset(), &cls, ChartKind::Pie, &picks, &config);
        assert_eq!(slot.columns, vec!["region"]);
    }

    #[test]
    fn missing_bucket_warns_instead_of_charting() {
        let ds = Dataset::new(
            "t",
            vec![Column::new("n", ColumnKind::Float, vec![CellValue::Float(1.0)])],
        );
        let slot = dispatch(
            &ds,
            &classify(&ds),
            ChartKind::Bar,
            &ColumnPicks::default(),
            &DashboardConfig::default(),
        );
        assert_eq!(
            slot.outcomes,
            vec![Outcome::Warning(
                "No categorical columns available for Bar Chart.".to_string()
            )]
        );
    }

    #[test]
    fn numeric_pair_scatter_always_charts() {
        let ds = dataset();
        assert!(matches!(
            only_outcome(&ds, ComparisonKind::Scatter, "units", "price"),
            Outcome::Chart(_)
        ));
    }

    #[test]
    fn numeric_pair_heatmap_is_only_a_note() {
        let ds = dataset();
        assert_eq!(
            only_outcome(&ds, ComparisonKind::Heatmap, "units", "price"),
            Outcome::Note(HEATMAP_NOTE.to_string())
        );
    }

    #[test]
    fn categorical_pair_scatter_is_not_supported() {
        let ds = dataset();
        assert_eq!(
            only_outcome(&ds, ComparisonKind::Scatter, "region", "store"),
            Outcome::Warning("Plot type not supported for region vs store.".to_string())
        );
    }

    #[test]
    fn compatibility_table() {
        use ComparisonKind::*;
        let n = Some(Role::Numeric);
        let c = Some(Role::Categorical);
        assert_eq!(verdict(Bar, c, n), Verdict::Chart);
        assert_eq!(verdict(Bar, n, c), Verdict::Unsupported);
        assert_eq!(verdict(Box, n, c), Verdict::Chart);
        assert_eq!(verdict(Box, c, n), Verdict::Unsupported);
        assert_eq!(verdict(Violin, n, c), Verdict::Chart);
        assert_eq!(verdict(Line, n, n), Verdict::Chart);
        assert_eq!(verdict(Line, n, c), Verdict::Unsupported);
        assert_eq!(verdict(Heatmap, c, c), Verdict::Unsupported);
        assert_eq!(verdict(Spider, c, c), Verdict::Chart);
        assert_eq!(verdict(Spider, n, c), Verdict::Chart);
    }

    #[test]
    fn spider_on_text_column_fails_only_that_pair() {
        let ds = dataset();
        let mut sel = selection(&[ChartKind::OneVsMany], 1);
        let picks = sel.picks_mut(ChartKind::OneVsMany);
        picks.primary = Some("units".to_string());
        picks.comparisons = vec!["region".to_string(), "price".to_string()];
        picks.set_pair_kind("units", "region", ComparisonKind::Spider);
        picks.set_pair_kind("units", "price", ComparisonKind::Spider);

        let dash = build_dashboard(&ds, &sel, &DashboardConfig::default());
        let slot = &dash.slots[0];
        assert_eq!(slot.columns, vec!["units", "region", "price"]);
        assert_eq!(slot.pairs.len(), 2);
        assert!(matches!(&slot.outcomes[0], Outcome::Error(msg) if msg.contains("region")));
        assert!(matches!(slot.outcomes[1], Outcome::Chart(_)));
    }

    #[test]
    fn comparison_without_features_renders_nothing() {
        let ds = dataset();
        let sel = selection(&[ChartKind::OneVsMany], 1);
        let dash = build_dashboard(&ds, &sel, &DashboardConfig::default());
        assert!(dash.slots[0].outcomes.is_empty());
        assert_eq!(dash.slots[0].columns, vec!["units"]);
    }

    #[test]
    fn unchanged_input_gives_identical_dashboard() {
        let ds = dataset();
        let mut sel = selection(
            &[ChartKind::Heatmap, ChartKind::Bar, ChartKind::OneVsMany, ChartKind::Bubble],
            6,
        );
        let picks = sel.picks_mut(ChartKind::OneVsMany);
        picks.primary = Some("region".to_string());
        picks.comparisons = vec!["units".to_string(), "store".to_string()];
        picks.set_pair_kind("region", "units", ComparisonKind::Bar);

        let config = DashboardConfig::default();
        let first = build_dashboard(&ds, &sel, &config);
        let second = build_dashboard(&ds, &sel, &config);
        assert_eq!(first, second);
    }
}

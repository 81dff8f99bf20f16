use std::hash::Hash;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use super::plot;
use crate::chart::dispatch::{build_dashboard, Slot};
use crate::chart::selection::{ColumnPicks, Selection};
use crate::chart::{ChartKind, ComparisonKind, Outcome};
use crate::config::DashboardConfig;
use crate::data::classify::Classification;
use crate::data::model::Dataset;
use crate::data::stats::{self, Describe};
use crate::state::{AppState, Pipeline, AWAITING_MESSAGE, SUCCESS_MESSAGE};

const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 30);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(60, 170, 90);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render whatever the pipeline currently holds.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Interactive Data Dashboard");
    ui.separator();

    let AppState {
        pipeline,
        selection,
        config,
    } = state;

    match &*pipeline {
        Pipeline::AwaitingUpload => {
            ui.label(RichText::new(AWAITING_MESSAGE).color(Color32::LIGHT_BLUE));
            ui.label("Use File → Open… to choose a .csv or .xlsx file.");
        }
        Pipeline::Failed(message) => {
            ui.label(RichText::new(message.as_str()).color(Color32::RED));
        }
        Pipeline::Ready(dataset) => {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| ready(ui, dataset, selection, config));
        }
    }
}

fn ready(ui: &mut Ui, dataset: &Dataset, selection: &mut Selection, config: &DashboardConfig) {
    ui.label(RichText::new(SUCCESS_MESSAGE).color(SUCCESS_COLOR));
    if dataset.is_empty() {
        ui.label(RichText::new("The file has a header but no rows.").weak());
    }
    preview_table(ui, dataset, config.preview_rows);

    ui.checkbox(&mut selection.show_info, "Show dataset info");
    // Rebuilt every frame from the current widget state.
    let dashboard = build_dashboard(dataset, selection, config);
    if selection.show_info {
        summary(ui, dataset, &dashboard.classification);
    }

    ui.add_space(8.0);
    if let Some(warning) = &dashboard.warning {
        ui.label(RichText::new(warning.as_str()).color(WARNING_COLOR));
        return;
    }

    ui.heading("Dashboard");
    for slot in &dashboard.slots {
        ui.group(|ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.strong(slot.kind.label());
            let picks = selection.picks_mut(slot.kind);
            if slot.kind == ChartKind::OneVsMany {
                comparison_view(ui, slot, &dashboard.classification, picks, config.chart_height);
            } else {
                pickers(ui, slot, &dashboard.classification, picks);
                let id = format!("slot-{}-{}", slot.position, slot.kind.label());
                for outcome in &slot.outcomes {
                    show_outcome(ui, &id, outcome, config.chart_height);
                }
            }
        });
        ui.add_space(8.0);
    }
}

fn show_outcome(ui: &mut Ui, id: &str, outcome: &Outcome, height: f32) {
    match outcome {
        Outcome::Chart(artifact) => plot::chart(ui, id, artifact, height),
        Outcome::Note(text) => {
            ui.label(text.as_str());
        }
        Outcome::Warning(text) => {
            ui.label(RichText::new(text.as_str()).color(WARNING_COLOR));
        }
        Outcome::Error(text) => {
            ui.label(RichText::new(text.as_str()).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// Tables: preview and summary block
// ---------------------------------------------------------------------------

fn text_table(ui: &mut Ui, id: &str, headers: &[String], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(TableColumn::auto().at_least(48.0), headers.len())
                .header(20.0, |mut header| {
                    for name in headers {
                        header.col(|ui| {
                            ui.strong(name.as_str());
                        });
                    }
                })
                .body(|mut body| {
                    for row in rows {
                        body.row(18.0, |mut table_row| {
                            for cell in row {
                                table_row.col(|ui| {
                                    ui.label(cell.as_str());
                                });
                            }
                        });
                    }
                });
        });
    });
}

/// First rows of the table with a leading row index, as `DataFrame.head()`.
fn preview_table(ui: &mut Ui, dataset: &Dataset, rows: usize) {
    let headers: Vec<String> = std::iter::once(String::new())
        .chain(dataset.column_names())
        .collect();
    let body: Vec<Vec<String>> = dataset
        .head(rows)
        .into_iter()
        .enumerate()
        .map(|(i, cells)| {
            std::iter::once(i.to_string())
                .chain(cells.into_iter().map(|c| c.to_string()))
                .collect()
        })
        .collect();
    text_table(ui, "preview", &headers, &body);
}

fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.4}")
    }
}

/// `describe()` laid out as pandas prints it: one row per statistic, one
/// column per numeric column.
fn describe_rows(described: &[Describe]) -> Vec<Vec<String>> {
    let stat_rows: [(&str, fn(&Describe) -> String); 8] = [
        ("count", |d| d.count.to_string()),
        ("mean", |d| fmt_stat(d.mean)),
        ("std", |d| fmt_stat(d.std)),
        ("min", |d| fmt_stat(d.min)),
        ("25%", |d| fmt_stat(d.q1)),
        ("50%", |d| fmt_stat(d.median)),
        ("75%", |d| fmt_stat(d.q3)),
        ("max", |d| fmt_stat(d.max)),
    ];
    stat_rows
        .iter()
        .map(|(name, get)| {
            std::iter::once(name.to_string())
                .chain(described.iter().map(get))
                .collect()
        })
        .collect()
}

fn summary(ui: &mut Ui, dataset: &Dataset, classification: &Classification) {
    let described = stats::describe_all(dataset, &classification.numeric);
    if described.is_empty() {
        ui.label("No numeric columns to describe.");
    } else {
        let headers: Vec<String> = std::iter::once(String::new())
            .chain(described.iter().map(|d| d.column.clone()))
            .collect();
        text_table(ui, "describe", &headers, &describe_rows(&described));
    }

    let (rows, cols) = dataset.shape();
    ui.label(format!("Shape of the dataset: ({rows}, {cols})"));

    ui.label("Number of missing values:");
    let headers = ["column", "dtype", "missing"].map(String::from);
    let missing: Vec<Vec<String>> = stats::missing_counts(dataset)
        .into_iter()
        .map(|(name, dtype, n)| vec![name, dtype.to_string(), n.to_string()])
        .collect();
    text_table(ui, "missing", &headers, &missing);
}

// ---------------------------------------------------------------------------
// Column pickers
// ---------------------------------------------------------------------------

/// A labelled combo box over `options`. Writes the new choice into `pick`.
fn column_combo(
    ui: &mut Ui,
    id: impl Hash,
    label: &str,
    options: &[String],
    current: Option<&str>,
    pick: &mut Option<String>,
) {
    let Some(current) = current else {
        return;
    };
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current)
            .show_ui(ui, |ui: &mut Ui| {
                for option in options {
                    if ui
                        .selectable_label(option == current, option.as_str())
                        .clicked()
                    {
                        *pick = Some(option.clone());
                    }
                }
            });
    });
}

fn pickers(ui: &mut Ui, slot: &Slot, classification: &Classification, picks: &mut ColumnPicks) {
    let kind = slot.kind;
    let n = slot.position + 1;
    let current = |i: usize| slot.columns.get(i).map(String::as_str);
    let numeric = &classification.numeric;

    match kind {
        ChartKind::Bar | ChartKind::Pie | ChartKind::Treemap => column_combo(
            ui,
            (kind, "column"),
            &format!("Select column for {kind} {n}"),
            &classification.categorical,
            current(0),
            &mut picks.column,
        ),
        ChartKind::Line | ChartKind::Histogram | ChartKind::Box | ChartKind::Violin => {
            column_combo(
                ui,
                (kind, "column"),
                &format!("Select column for {kind} {n}"),
                numeric,
                current(0),
                &mut picks.column,
            )
        }
        ChartKind::Scatter
        | ChartKind::DensityContour
        | ChartKind::Bubble
        | ChartKind::Scatter3d => {
            column_combo(
                ui,
                (kind, "x"),
                &format!("Select X-axis for {kind} {n}"),
                numeric,
                current(0),
                &mut picks.x,
            );
            column_combo(
                ui,
                (kind, "y"),
                &format!("Select Y-axis for {kind} {n}"),
                numeric,
                current(1),
                &mut picks.y,
            );
            if kind == ChartKind::Bubble {
                column_combo(
                    ui,
                    (kind, "size"),
                    &format!("Select size column for {kind} {n}"),
                    numeric,
                    current(2),
                    &mut picks.size,
                );
            } else if kind == ChartKind::Scatter3d {
                column_combo(
                    ui,
                    (kind, "z"),
                    &format!("Select Z-axis for {kind} {n}"),
                    numeric,
                    current(2),
                    &mut picks.z,
                );
            }
        }
        ChartKind::Spider => {
            if numeric.is_empty() {
                return;
            }
            ui.label(format!("Select columns for {kind} {n}"));
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for col in numeric {
                    let mut checked = slot.columns.contains(col);
                    if ui.checkbox(&mut checked, col.as_str()).changed() {
                        let chosen: Vec<String> = numeric
                            .iter()
                            .filter(|c| if *c == col { checked } else { slot.columns.contains(c) })
                            .cloned()
                            .collect();
                        // At least one axis stays ticked.
                        if !chosen.is_empty() {
                            picks.columns = Some(chosen);
                        }
                    }
                }
            });
        }
        ChartKind::Heatmap | ChartKind::Pairplot => {
            if !slot.columns.is_empty() {
                ui.label(
                    RichText::new(format!("Columns: {}", slot.columns.join(", ")))
                        .small()
                        .weak(),
                );
            }
        }
        ChartKind::OneVsMany => {}
    }
}

/// Primary / comparison pickers, then one nested chart per pair.
fn comparison_view(
    ui: &mut Ui,
    slot: &Slot,
    classification: &Classification,
    picks: &mut ColumnPicks,
    height: f32,
) {
    let kind = slot.kind;
    let n = slot.position + 1;
    let comparable = classification.comparable();

    let Some(primary) = slot.columns.first() else {
        for outcome in &slot.outcomes {
            show_outcome(ui, "comparison", outcome, height);
        }
        return;
    };
    column_combo(
        ui,
        (kind, "primary"),
        &format!("Select primary feature for comparison {n}"),
        &comparable,
        Some(primary.as_str()),
        &mut picks.primary,
    );

    ui.label(format!("Select features to compare with {primary}"));
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for col in &comparable {
            let mut checked = picks.comparisons.contains(col);
            if ui.checkbox(&mut checked, col.as_str()).changed() {
                if checked {
                    picks.comparisons.push(col.clone());
                } else {
                    picks.comparisons.retain(|c| c != col);
                }
            }
        }
    });

    for (i, (pair, outcome)) in slot.pairs.iter().zip(&slot.outcomes).enumerate() {
        ui.separator();
        ui.strong(format!("Comparison: {} vs {}", pair.primary, pair.feature));
        ui.horizontal(|ui: &mut Ui| {
            ui.label(format!(
                "Choose plot type for {} vs {}",
                pair.primary, pair.feature
            ));
            egui::ComboBox::from_id_salt((kind, "pair", i))
                .selected_text(pair.kind.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for choice in ComparisonKind::ALL {
                        if ui
                            .selectable_label(choice == pair.kind, choice.label())
                            .clicked()
                        {
                            picks.set_pair_kind(&pair.primary, &pair.feature, choice);
                        }
                    }
                });
        });
        show_outcome(ui, &format!("comparison-{i}"), outcome, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_rows_follow_pandas_layout() {
        let described = vec![
            stats::describe("a", &[1.0, 2.0, 3.0]).unwrap(),
            stats::describe("b", &[5.0]).unwrap(),
        ];
        let rows = describe_rows(&described);
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], vec!["count", "3", "1"]);
        assert_eq!(rows[1], vec!["mean", "2.0000", "5.0000"]);
        assert_eq!(rows[2][2], "NaN");
        assert_eq!(rows[5][0], "50%");
    }
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::state::{AppState, Pipeline};

// ---------------------------------------------------------------------------
// Left side panel – plot customization
// ---------------------------------------------------------------------------

/// Render the chart selection widgets.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Plot Customization");
    ui.separator();

    if state.dataset().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let max_charts = state.config.max_charts;
    let selection = &mut state.selection;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Select the types of plots to include");
            for kind in ChartKind::ALL {
                let mut checked = selection.is_selected(kind);
                // Show where the kind sits in the render order.
                let text = match selection.kinds.iter().position(|k| *k == kind) {
                    Some(i) => format!("{kind}  ({})", i + 1),
                    None => kind.to_string(),
                };
                if ui.checkbox(&mut checked, text).changed() {
                    selection.set_selected(kind, checked);
                }
            }
            ui.separator();

            ui.strong("Select number of plots");
            ui.add(egui::Slider::new(&mut selection.max_charts, 1..=max_charts));
            if selection.kinds.len() > selection.max_charts {
                ui.label(
                    RichText::new(format!(
                        "Showing the first {} of {} selected plots.",
                        selection.max_charts,
                        selection.kinds.len()
                    ))
                    .small()
                    .weak(),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.pipeline {
            Pipeline::Ready(ds) => {
                let (rows, cols) = ds.shape();
                ui.label(format!("{}: {rows} rows, {cols} columns", ds.source));
            }
            Pipeline::Failed(_) => {
                ui.label(RichText::new("Load failed").color(Color32::RED));
            }
            Pipeline::AwaitingUpload => {
                ui.label(
                    RichText::new(format!("CSV or XLSX, up to {}MB", state.config.max_upload_mb))
                        .weak(),
                );
            }
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload your dataset")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

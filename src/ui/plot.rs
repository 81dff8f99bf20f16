use std::collections::BTreeMap;
use std::hash::Hash;

use eframe::egui::{Align2, Color32, Grid, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotUi, Points,
    Polygon, Text,
};

use crate::chart::geometry;
use crate::chart::{ChartArtifact, ChartBody, Tile, ViolinGroup};
use crate::color;
use crate::data::stats::{Bin, BoxStats, DensityGrid};

const ACCENT: Color32 = Color32::LIGHT_BLUE;

// ---------------------------------------------------------------------------
// Entry point: one chart artifact → one egui_plot view
// ---------------------------------------------------------------------------

/// Draw `artifact` under its title. `id` must be unique per chart on screen.
pub fn chart(ui: &mut Ui, id: &str, artifact: &ChartArtifact, height: f32) {
    ui.strong(artifact.title.as_str());
    match &artifact.body {
        ChartBody::Bars {
            x_label,
            y_label,
            bars,
        } => bars_plot(ui, id, x_label, y_label, bars, height),
        ChartBody::Line {
            x_label,
            y_label,
            segments,
        } => {
            axis_plot(id, height, Some(x_label.as_str()), y_label).show(ui, |plot_ui| {
                for segment in segments {
                    plot_ui.line(
                        Line::new(segment.clone())
                            .name(y_label)
                            .color(ACCENT)
                            .width(1.5),
                    );
                }
            });
        }
        ChartBody::Scatter {
            x_label,
            y_label,
            points,
        } => {
            axis_plot(id, height, Some(x_label.as_str()), y_label).show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(points.clone())
                        .radius(2.5)
                        .color(ACCENT)
                        .name(y_label),
                );
            });
        }
        ChartBody::Bubble {
            x_label,
            y_label,
            size_label,
            points,
            radii,
        } => {
            ui.label(format!("Marker size: {size_label}"));
            bubble_plot(ui, id, x_label, y_label, points, radii, height);
        }
        ChartBody::Pie { slices } => pie_plot(ui, id, slices, height),
        ChartBody::Histogram { x_label, bins } => {
            axis_plot(id, height, Some(x_label.as_str()), "count").show(ui, |plot_ui| {
                plot_ui.bar_chart(histogram_bars(bins).color(ACCENT).name(x_label));
            });
        }
        ChartBody::Boxes {
            x_label,
            y_label,
            groups,
        } => boxes_plot(ui, id, x_label.as_deref(), y_label, groups, height),
        ChartBody::Violins {
            x_label,
            y_label,
            groups,
        } => violins_plot(ui, id, x_label.as_deref(), y_label, groups, height),
        ChartBody::Heatmap { labels, cells } => heatmap_plot(ui, id, labels, cells, height),
        ChartBody::Radar { axes, values } => radar_plot(ui, id, axes, values, height),
        ChartBody::Pairplot {
            columns,
            diagonal,
            points,
        } => pairplot_grid(ui, id, columns, diagonal, points, height),
        ChartBody::DensityContour {
            x_label,
            y_label,
            grid,
            bands,
            levels,
        } => {
            axis_plot(id, height, Some(x_label.as_str()), y_label)
                .legend(Legend::default())
                .show(ui, |plot_ui| density_cells(plot_ui, grid, bands, *levels));
        }
        ChartBody::Scatter3d { labels, points } => scatter3d_plot(ui, id, labels, points, height),
        ChartBody::Treemap { tiles } => treemap_plot(ui, id, tiles, height),
    }
}

// ---------------------------------------------------------------------------
// Shared plot setup
// ---------------------------------------------------------------------------

fn axis_plot<'a>(id: impl Hash, height: f32, x_label: Option<&str>, y_label: &str) -> Plot<'a> {
    let plot = Plot::new(id)
        .height(height)
        .allow_scroll(false)
        .y_axis_label(y_label.to_string());
    match x_label {
        Some(x) => plot.x_axis_label(x.to_string()),
        None => plot,
    }
}

/// A plot in its own unit-aspect coordinate frame, without axes.
fn canvas<'a>(id: impl Hash, height: f32) -> Plot<'a> {
    Plot::new(id)
        .height(height)
        .allow_scroll(false)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
}

fn rect_points([x, y, w, h]: [f64; 4]) -> Vec<[f64; 2]> {
    vec![[x, y], [x + w, y], [x + w, y + h], [x, y + h]]
}

fn close(outline: &mut Vec<[f64; 2]>) {
    if let Some(first) = outline.first().copied() {
        outline.push(first);
    }
}

/// Category names under integer x positions.
fn category_labels(plot_ui: &mut PlotUi, labels: &[&str], y: f64) {
    for (i, label) in labels.iter().enumerate() {
        plot_ui.text(
            Text::new(PlotPoint::new(i as f64, y), *label)
                .anchor(Align2::CENTER_TOP)
                .color(Color32::GRAY),
        );
    }
}

fn spread(stats: &BoxStats) -> BoxSpread {
    BoxSpread::new(
        stats.lower_whisker,
        stats.q1,
        stats.median,
        stats.q3,
        stats.upper_whisker,
    )
}

fn histogram_bars(bins: &[Bin]) -> BarChart {
    let bars = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.2}..{:.2}", b.start, b.end))
        })
        .collect();
    BarChart::new(bars)
}

/// Lowest value drawn by a set of box summaries, for placing labels below.
fn floor_of<'a>(stats: impl Iterator<Item = &'a BoxStats>) -> f64 {
    stats
        .flat_map(|s| std::iter::once(s.lower_whisker).chain(s.outliers.iter().copied()))
        .fold(f64::INFINITY, f64::min)
}

// ---------------------------------------------------------------------------
// Category charts
// ---------------------------------------------------------------------------

fn bars_plot(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    bars: &[(String, f64)],
    height: f32,
) {
    let colors = color::generate_palette(bars.len());
    let chart_bars: Vec<Bar> = bars
        .iter()
        .zip(&colors)
        .enumerate()
        .map(|(i, ((label, value), c))| Bar::new(i as f64, *value).name(label).width(0.7).fill(*c))
        .collect();
    let labels: Vec<&str> = bars.iter().map(|(l, _)| l.as_str()).collect();

    Plot::new(id)
        .height(height)
        .allow_scroll(false)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars));
            category_labels(plot_ui, &labels, 0.0);
        });
}

fn pie_plot(ui: &mut Ui, id: &str, slices: &[(String, f64)], height: f32) {
    let colors = color::generate_palette(slices.len());
    canvas(id, height)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for ((label, share), c) in slices.iter().zip(&colors) {
                let end = start + share;
                // Filled polygons must be convex, so draw at most a quarter turn at a time.
                let mut from = start;
                while from < end {
                    let to = (from + 0.25).min(end);
                    plot_ui.polygon(
                        Polygon::new(geometry::pie_wedge(from, to, 1.0))
                            .fill_color(*c)
                            .stroke(Stroke::new(1.0, *c))
                            .name(label),
                    );
                    from = to;
                }
                if *share >= 0.03 {
                    let [x, y] = geometry::pie_label_anchor(start, end, 1.0);
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), format!("{:.1}%", share * 100.0))
                            .color(Color32::BLACK),
                    );
                }
                start = end;
            }
        });
}

fn treemap_plot(ui: &mut Ui, id: &str, tiles: &[Tile], height: f32) {
    let colors = color::generate_palette(tiles.len());
    Plot::new(id)
        .height(height)
        .allow_scroll(false)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui| {
            for (tile, c) in tiles.iter().zip(&colors) {
                let [x, y, w, h] = tile.rect;
                if w <= 0.0 || h <= 0.0 {
                    continue;
                }
                plot_ui.polygon(
                    Polygon::new(rect_points(tile.rect))
                        .fill_color(*c)
                        .stroke(Stroke::new(2.0, Color32::WHITE))
                        .name(&tile.label),
                );
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x + w / 2.0, y + h / 2.0),
                        format!("{}\n{}", tile.label, tile.count),
                    )
                    .color(Color32::BLACK),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Numeric charts
// ---------------------------------------------------------------------------

fn bubble_plot(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    points: &[[f64; 2]],
    radii: &[f32],
    height: f32,
) {
    // One series per rounded radius keeps the item count small.
    let mut by_radius: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
    for (p, r) in points.iter().zip(radii) {
        by_radius.entry(r.round() as u32).or_default().push(*p);
    }
    axis_plot(id, height, Some(x_label), y_label).show(ui, |plot_ui| {
        for (radius, series) in by_radius {
            plot_ui.points(
                Points::new(series)
                    .radius(radius as f32)
                    .filled(true)
                    .color(ACCENT.gamma_multiply(0.6)),
            );
        }
    });
}

fn boxes_plot(
    ui: &mut Ui,
    id: &str,
    x_label: Option<&str>,
    y_label: &str,
    groups: &[(String, BoxStats)],
    height: f32,
) {
    let colors = color::generate_palette(groups.len());
    let labels: Vec<&str> = groups.iter().map(|(l, _)| l.as_str()).collect();
    let floor = floor_of(groups.iter().map(|(_, s)| s));

    axis_plot(id, height, x_label, y_label).show(ui, |plot_ui| {
        for (i, ((label, stats), c)) in groups.iter().zip(&colors).enumerate() {
            let x = i as f64;
            let elem = BoxElem::new(x, spread(stats))
                .name(label)
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(c.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, *c));
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label));
            if !stats.outliers.is_empty() {
                let outliers: Vec<[f64; 2]> = stats.outliers.iter().map(|v| [x, *v]).collect();
                plot_ui.points(Points::new(outliers).radius(2.5).color(*c));
            }
        }
        if labels.len() > 1 {
            category_labels(plot_ui, &labels, floor);
        }
    });
}

fn violins_plot(
    ui: &mut Ui,
    id: &str,
    x_label: Option<&str>,
    y_label: &str,
    groups: &[ViolinGroup],
    height: f32,
) {
    let colors = color::generate_palette(groups.len());
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    let floor = groups
        .iter()
        .flat_map(|g| g.density.first().map(|d| d[0]))
        .fold(f64::INFINITY, f64::min);

    axis_plot(id, height, x_label, y_label).show(ui, |plot_ui| {
        for (i, (group, c)) in groups.iter().zip(&colors).enumerate() {
            let x = i as f64;
            let peak = group.density.iter().map(|d| d[1]).fold(0.0, f64::max);
            if peak > 0.0 {
                let half = |d: f64| d / peak * 0.4;
                // The outline is not convex; fill it as a stack of trapezoids.
                for pair in group.density.windows(2) {
                    let ([y0, d0], [y1, d1]) = (pair[0], pair[1]);
                    let quad = vec![
                        [x - half(d0), y0],
                        [x + half(d0), y0],
                        [x + half(d1), y1],
                        [x - half(d1), y1],
                    ];
                    plot_ui.polygon(
                        Polygon::new(quad)
                            .fill_color(c.gamma_multiply(0.5))
                            .stroke(Stroke::NONE),
                    );
                }
            }
            let inner = BoxElem::new(x, spread(&group.stats))
                .name(&group.label)
                .box_width(0.08)
                .whisker_width(0.0)
                .fill(Color32::DARK_GRAY)
                .stroke(Stroke::new(1.0, Color32::DARK_GRAY));
            plot_ui.box_plot(BoxPlot::new(vec![inner]));
        }
        if labels.len() > 1 {
            category_labels(plot_ui, &labels, floor);
        }
    });
}

fn density_cells(plot_ui: &mut PlotUi, grid: &DensityGrid, bands: &[Vec<usize>], levels: usize) {
    let bins = grid.counts.len().max(1) as f64;
    let (x0, x1) = grid.x_range;
    let (y0, y1) = grid.y_range;
    let cw = (x1 - x0) / bins;
    let ch = (y1 - y0) / bins;
    for (row, cells) in bands.iter().enumerate() {
        for (col, &band) in cells.iter().enumerate() {
            if band == 0 {
                continue;
            }
            let rect = [x0 + col as f64 * cw, y0 + row as f64 * ch, cw, ch];
            plot_ui.polygon(
                Polygon::new(rect_points(rect))
                    .fill_color(color::sequential(band as f64 / levels.max(1) as f64))
                    .stroke(Stroke::NONE)
                    .name(format!("level {band}")),
            );
        }
    }
}

fn scatter3d_plot(ui: &mut Ui, id: &str, labels: &[String; 3], points: &[[f64; 3]], height: f32) {
    let view = |p: [f64; 3]| geometry::project(p, geometry::AZIMUTH, geometry::ELEVATION);
    canvas(id, height).show(ui, |plot_ui| {
        for (edge, label) in geometry::axis_edges().iter().zip(labels.iter()) {
            let from = view(edge[0]);
            let to = view(edge[1]);
            plot_ui.line(Line::new(vec![from, to]).color(Color32::GRAY).width(1.0));
            plot_ui.text(
                Text::new(PlotPoint::new(to[0], to[1]), label.as_str())
                    .anchor(Align2::LEFT_BOTTOM)
                    .color(Color32::GRAY),
            );
        }
        let projected: Vec<[f64; 2]> = points.iter().map(|p| view(*p)).collect();
        plot_ui.points(Points::new(projected).radius(3.0).color(ACCENT));
    });
}

// ---------------------------------------------------------------------------
// Whole-table views
// ---------------------------------------------------------------------------

fn heatmap_plot(
    ui: &mut Ui,
    id: &str,
    labels: &[String],
    cells: &[Vec<Option<f64>>],
    height: f32,
) {
    let n = labels.len();
    canvas(id, height).show(ui, |plot_ui| {
        for (row, values) in cells.iter().enumerate() {
            // Row 0 at the top.
            let y = (n - 1 - row) as f64;
            for (col, &value) in values.iter().enumerate() {
                let x = col as f64;
                let fill = value.map_or(Color32::LIGHT_GRAY, color::diverging);
                plot_ui.polygon(
                    Polygon::new(rect_points([x - 0.5, y - 0.5, 1.0, 1.0]))
                        .fill_color(fill)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );
                let text = value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"));
                plot_ui.text(Text::new(PlotPoint::new(x, y), text).color(Color32::BLACK));
            }
        }
        for (i, label) in labels.iter().enumerate() {
            plot_ui.text(
                Text::new(PlotPoint::new(i as f64, -0.6), label.as_str())
                    .anchor(Align2::CENTER_TOP),
            );
            plot_ui.text(
                Text::new(PlotPoint::new(-0.6, (n - 1 - i) as f64), label.as_str())
                    .anchor(Align2::RIGHT_CENTER),
            );
        }
    });
}

fn radar_plot(ui: &mut Ui, id: &str, axes: &[String], values: &[f64], height: f32) {
    let n = axes.len();
    let max = values.iter().copied().fold(0.0, f64::max);
    canvas(id, height).show(ui, |plot_ui| {
        for ring in [0.25, 0.5, 0.75, 1.0] {
            let mut outline = geometry::radar_polygon(&vec![ring; n], 1.0);
            close(&mut outline);
            plot_ui.line(Line::new(outline).color(Color32::GRAY).width(0.5));
        }
        for (i, axis) in axes.iter().enumerate() {
            let [x, y] = geometry::radar_axis(i, n);
            plot_ui.line(Line::new(vec![[0.0, 0.0], [x, y]]).color(Color32::GRAY).width(0.5));
            plot_ui.text(Text::new(PlotPoint::new(x * 1.15, y * 1.15), axis.as_str()));
        }
        let mut trace = geometry::radar_polygon(values, max);
        close(&mut trace);
        plot_ui.line(Line::new(trace.clone()).color(ACCENT).width(2.0).name("mean"));
        plot_ui.points(Points::new(trace).radius(3.0).color(ACCENT));
        plot_ui.text(
            Text::new(PlotPoint::new(0.0, -1.3), format!("outer ring = {max:.3}"))
                .color(Color32::GRAY),
        );
    });
}

fn pairplot_grid(
    ui: &mut Ui,
    id: &str,
    columns: &[String],
    diagonal: &[Vec<Bin>],
    points: &[Vec<Vec<[f64; 2]>>],
    height: f32,
) {
    let n = columns.len().max(1);
    let cell_height = (height * 1.5 / n as f32).max(90.0);
    let cell_width = ((ui.available_width() - 8.0 * n as f32) / n as f32).max(60.0);

    Grid::new((id, "pairplot")).spacing([4.0, 4.0]).show(ui, |ui| {
        for row in 0..columns.len() {
            for col in 0..columns.len() {
                let mut plot = Plot::new((id, row, col))
                    .width(cell_width)
                    .height(cell_height)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .allow_scroll(false)
                    .allow_boxed_zoom(false)
                    .show_x(false)
                    .show_y(false);
                if row + 1 == columns.len() {
                    plot = plot.x_axis_label(columns[col].clone());
                }
                if col == 0 {
                    plot = plot.y_axis_label(columns[row].clone());
                }
                plot.show(ui, |plot_ui| {
                    if row == col {
                        plot_ui.bar_chart(histogram_bars(&diagonal[row]).color(ACCENT));
                    } else {
                        plot_ui.points(
                            Points::new(points[row][col].clone())
                                .radius(1.5)
                                .color(ACCENT),
                        );
                    }
                });
            }
            ui.end_row();
        }
    });
}

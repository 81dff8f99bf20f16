use anyhow::{bail, Context, Result};

use super::geometry;
use super::{ChartArtifact, ChartBody, Tile, ViolinGroup};
use crate::data::classify::Role;
use crate::data::model::{Column, Dataset};
use crate::data::stats;

/// Kernel density samples per violin.
const VIOLIN_SAMPLES: usize = 64;
/// Largest bubble radius in points.
const MAX_BUBBLE_RADIUS: f32 = 20.0;

// ---------------------------------------------------------------------------
// Column access
// ---------------------------------------------------------------------------

fn column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column> {
    dataset
        .column(name)
        .with_context(|| format!("Column '{name}' not found"))
}

fn numbers(dataset: &Dataset, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(column(dataset, name)?.numbers())
}

fn labels(dataset: &Dataset, name: &str) -> Result<Vec<Option<String>>> {
    Ok(column(dataset, name)?.labels())
}

/// Rows where both coordinates are present.
fn pairs(xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<[f64; 2]> {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
        .collect()
}

/// Split a sequence at missing points.
fn segments<I: IntoIterator<Item = Option<[f64; 2]>>>(points: I) -> Vec<Vec<[f64; 2]>> {
    let mut out: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for point in points {
        match point {
            Some(p) => current.push(p),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn normalise(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![0.5; values.len()];
    }
    values.iter().map(|v| (v - min) / (max - min)).collect()
}

// ---------------------------------------------------------------------------
// Category charts
// ---------------------------------------------------------------------------

/// One bar per category, height = occurrences.
pub fn bar_counts(dataset: &Dataset, col: &str) -> Result<ChartArtifact> {
    let bars = stats::value_counts(&labels(dataset, col)?)
        .into_iter()
        .map(|(label, n)| (label, n as f64))
        .collect();
    Ok(ChartArtifact {
        title: format!("Bar Chart of {col}"),
        body: ChartBody::Bars {
            x_label: col.to_string(),
            y_label: "count".to_string(),
            bars,
        },
    })
}

/// One bar per category of `cat`, height = sum of `num` in that category.
pub fn bar_sums(dataset: &Dataset, cat: &str, num: &str) -> Result<ChartArtifact> {
    let bars = stats::group_values(&labels(dataset, cat)?, &numbers(dataset, num)?)
        .into_iter()
        .map(|(label, values)| (label, values.iter().sum::<f64>()))
        .collect();
    Ok(ChartArtifact {
        title: format!("{cat} vs {num}"),
        body: ChartBody::Bars {
            x_label: cat.to_string(),
            y_label: num.to_string(),
            bars,
        },
    })
}

/// Category shares, largest slice first.
pub fn pie(dataset: &Dataset, col: &str) -> Result<ChartArtifact> {
    let mut counts = stats::value_counts(&labels(dataset, col)?);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    let slices = counts
        .into_iter()
        .map(|(label, n)| (label, n as f64 / total.max(1) as f64))
        .collect();
    Ok(ChartArtifact {
        title: format!("Pie Chart of {col}"),
        body: ChartBody::Pie { slices },
    })
}

pub fn treemap(dataset: &Dataset, col: &str) -> Result<ChartArtifact> {
    let counts = stats::value_counts(&labels(dataset, col)?);
    let weights: Vec<f64> = counts.iter().map(|(_, n)| *n as f64).collect();
    let rects = geometry::treemap(&weights, [0.0, 0.0, 1.0, 1.0]);
    let tiles = counts
        .into_iter()
        .zip(rects)
        .map(|((label, count), rect)| Tile { label, count, rect })
        .collect();
    Ok(ChartArtifact {
        title: format!("Treemap of {col}"),
        body: ChartBody::Treemap { tiles },
    })
}

// ---------------------------------------------------------------------------
// Numeric series
// ---------------------------------------------------------------------------

/// A numeric column against its row position.
pub fn line_over_rows(dataset: &Dataset, col: &str) -> Result<ChartArtifact> {
    let values = numbers(dataset, col)?;
    let segments = segments(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| v.map(|v| [i as f64, v])),
    );
    Ok(ChartArtifact {
        title: format!("Line Chart of {col}"),
        body: ChartBody::Line {
            x_label: "index".to_string(),
            y_label: col.to_string(),
            segments,
        },
    })
}

/// `y` against `x`, joined in row order.
pub fn line_xy(dataset: &Dataset, x: &str, y: &str) -> Result<ChartArtifact> {
    let xs = numbers(dataset, x)?;
    let ys = numbers(dataset, y)?;
    let segments = segments(xs.iter().zip(&ys).map(|(a, b)| Some([(*a)?, (*b)?])));
    Ok(ChartArtifact {
        title: format!("{x} vs {y}"),
        body: ChartBody::Line {
            x_label: x.to_string(),
            y_label: y.to_string(),
            segments,
        },
    })
}

pub fn scatter(dataset: &Dataset, x: &str, y: &str, title: String) -> Result<ChartArtifact> {
    let points = pairs(&numbers(dataset, x)?, &numbers(dataset, y)?);
    Ok(ChartArtifact {
        title,
        body: ChartBody::Scatter {
            x_label: x.to_string(),
            y_label: y.to_string(),
            points,
        },
    })
}

/// Scatter with marker area proportional to `size`. Negative sizes are
/// drawn as the smallest marker.
pub fn bubble(dataset: &Dataset, x: &str, y: &str, size: &str) -> Result<ChartArtifact> {
    let xs = numbers(dataset, x)?;
    let ys = numbers(dataset, y)?;
    let ss = numbers(dataset, size)?;
    let rows: Vec<([f64; 2], f64)> = xs
        .iter()
        .zip(&ys)
        .zip(&ss)
        .filter_map(|((a, b), s)| Some(([(*a)?, (*b)?], (*s)?.max(0.0))))
        .collect();
    let max_size = rows.iter().map(|r| r.1).fold(0.0, f64::max);
    let radii = rows
        .iter()
        .map(|(_, s)| {
            if max_size > 0.0 {
                ((s / max_size).sqrt() as f32 * MAX_BUBBLE_RADIUS).max(1.0)
            } else {
                1.0
            }
        })
        .collect();
    Ok(ChartArtifact {
        title: format!("Bubble Chart of {y} vs {x}"),
        body: ChartBody::Bubble {
            x_label: x.to_string(),
            y_label: y.to_string(),
            size_label: size.to_string(),
            points: rows.into_iter().map(|r| r.0).collect(),
            radii,
        },
    })
}

pub fn scatter3d(dataset: &Dataset, x: &str, y: &str, z: &str) -> Result<ChartArtifact> {
    let xs = numbers(dataset, x)?;
    let ys = numbers(dataset, y)?;
    let zs = numbers(dataset, z)?;
    let rows: Vec<[f64; 3]> = xs
        .iter()
        .zip(&ys)
        .zip(&zs)
        .filter_map(|((a, b), c)| Some([(*a)?, (*b)?, (*c)?]))
        .collect();
    let axes: Vec<Vec<f64>> = (0..3)
        .map(|axis| normalise(&rows.iter().map(|r| r[axis]).collect::<Vec<_>>()))
        .collect();
    let points = (0..rows.len())
        .map(|i| [axes[0][i], axes[1][i], axes[2][i]])
        .collect();
    Ok(ChartArtifact {
        title: format!("3D Scatter Plot of {x}, {y}, {z}"),
        body: ChartBody::Scatter3d {
            labels: [x.to_string(), y.to_string(), z.to_string()],
            points,
        },
    })
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

pub fn histogram(dataset: &Dataset, col: &str) -> Result<ChartArtifact> {
    let values = stats::present(&numbers(dataset, col)?);
    Ok(ChartArtifact {
        title: format!("Histogram of {col}"),
        body: ChartBody::Histogram {
            x_label: col.to_string(),
            bins: stats::histogram(&values),
        },
    })
}

pub fn box_single(dataset: &Dataset, col: &str) -> Result<ChartArtifact> {
    let values = stats::present(&numbers(dataset, col)?);
    let summary =
        stats::box_stats(&values).with_context(|| format!("Column '{col}' has no numeric values"))?;
    Ok(ChartArtifact {
        title: format!("Box Plot of {col}"),
        body: ChartBody::Boxes {
            x_label: None,
            y_label: col.to_string(),
            groups: vec![(col.to_string(), summary)],
        },
    })
}

/// Boxes of `num`, one per category of `cat`.
pub fn box_grouped(dataset: &Dataset, num: &str, cat: &str) -> Result<ChartArtifact> {
    let groups: Vec<(String, stats::BoxStats)> =
        stats::group_values(&labels(dataset, cat)?, &numbers(dataset, num)?)
            .into_iter()
            .filter_map(|(label, values)| Some((label, stats::box_stats(&values)?)))
            .collect();
    if groups.is_empty() {
        bail!("No rows with both '{num}' and '{cat}' present");
    }
    Ok(ChartArtifact {
        title: format!("{num} vs {cat}"),
        body: ChartBody::Boxes {
            x_label: Some(cat.to_string()),
            y_label: num.to_string(),
            groups,
        },
    })
}

fn violin_group(label: String, values: &[f64]) -> Option<ViolinGroup> {
    Some(ViolinGroup {
        label,
        stats: stats::box_stats(values)?,
        density: stats::kde(values, VIOLIN_SAMPLES),
    })
}

pub fn violin_single(dataset: &Dataset, col: &str) -> Result<ChartArtifact> {
    let values = stats::present(&numbers(dataset, col)?);
    let group = violin_group(col.to_string(), &values)
        .with_context(|| format!("Column '{col}' has no numeric values"))?;
    Ok(ChartArtifact {
        title: format!("Violin Plot of {col}"),
        body: ChartBody::Violins {
            x_label: None,
            y_label: col.to_string(),
            groups: vec![group],
        },
    })
}

/// Violins of `num`, one per category of `cat`.
pub fn violin_grouped(dataset: &Dataset, num: &str, cat: &str) -> Result<ChartArtifact> {
    let groups: Vec<ViolinGroup> =
        stats::group_values(&labels(dataset, cat)?, &numbers(dataset, num)?)
            .into_iter()
            .filter_map(|(label, values)| violin_group(label, &values))
            .collect();
    if groups.is_empty() {
        bail!("No rows with both '{num}' and '{cat}' present");
    }
    Ok(ChartArtifact {
        title: format!("{num} vs {cat}"),
        body: ChartBody::Violins {
            x_label: Some(cat.to_string()),
            y_label: num.to_string(),
            groups,
        },
    })
}

/// 2-D binned counts, each non-empty cell assigned one of `levels` bands.
pub fn density_contour(
    dataset: &Dataset,
    x: &str,
    y: &str,
    bins: usize,
    levels: usize,
) -> Result<ChartArtifact> {
    let points = pairs(&numbers(dataset, x)?, &numbers(dataset, y)?);
    let grid = stats::density_grid(&points, bins)
        .with_context(|| format!("No rows with both '{x}' and '{y}' present"))?;
    let peak = grid.counts.iter().flatten().copied().max().unwrap_or(0).max(1);
    let levels = levels.max(1);
    let bands = grid
        .counts
        .iter()
        .map(|row| {
            row.iter()
                .map(|&n| {
                    if n == 0 {
                        0
                    } else {
                        ((n as f64 / peak as f64 * levels as f64).ceil() as usize).clamp(1, levels)
                    }
                })
                .collect()
        })
        .collect();
    Ok(ChartArtifact {
        title: format!("Density Contour of {y} vs {x}"),
        body: ChartBody::DensityContour {
            x_label: x.to_string(),
            y_label: y.to_string(),
            grid,
            bands,
            levels,
        },
    })
}

// ---------------------------------------------------------------------------
// Whole-table views
// ---------------------------------------------------------------------------

/// Pearson correlation across every given numeric column at once.
pub fn correlation_heatmap(dataset: &Dataset, numeric: &[String]) -> Result<ChartArtifact> {
    if numeric.is_empty() {
        bail!("No numeric columns to correlate");
    }
    let columns = numeric
        .iter()
        .map(|name| numbers(dataset, name))
        .collect::<Result<Vec<_>>>()?;
    Ok(ChartArtifact {
        title: "Correlation Heatmap".to_string(),
        body: ChartBody::Heatmap {
            labels: numeric.to_vec(),
            cells: stats::correlation_matrix(&columns),
        },
    })
}

/// Radar trace of column means, one axis per column.
pub fn radar_means(dataset: &Dataset, cols: &[String], title: String) -> Result<ChartArtifact> {
    let mut values = Vec::with_capacity(cols.len());
    for name in cols {
        let col = column(dataset, name)?;
        if Role::of(col.kind) != Some(Role::Numeric) {
            bail!("Cannot compute the mean of non-numeric column '{name}'");
        }
        let mean = stats::mean(&stats::present(&col.numbers()))
            .with_context(|| format!("Column '{name}' has no values"))?;
        values.push(mean);
    }
    Ok(ChartArtifact {
        title,
        body: ChartBody::Radar {
            axes: cols.to_vec(),
            values,
        },
    })
}

/// Histograms on the diagonal, pairwise scatter elsewhere.
pub fn pairplot(dataset: &Dataset, cols: &[String]) -> Result<ChartArtifact> {
    if cols.is_empty() {
        bail!("No numeric columns for a pairplot");
    }
    let columns = cols
        .iter()
        .map(|name| numbers(dataset, name))
        .collect::<Result<Vec<_>>>()?;
    let diagonal = columns
        .iter()
        .map(|c| stats::histogram(&stats::present(c)))
        .collect();
    let points = columns
        .iter()
        .map(|row| columns.iter().map(|col| pairs(col, row)).collect())
        .collect();
    Ok(ChartArtifact {
        title: "Pairplot".to_string(),
        body: ChartBody::Pairplot {
            columns: cols.to_vec(),
            diagonal,
            points,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, ColumnKind};

    fn dataset() -> Dataset {
        let num = |v: &[Option<f64>]| {
            v.iter()
                .map(|x| x.map_or(CellValue::Null, CellValue::Float))
                .collect::<Vec<_>>()
        };
        let text = |v: &[&str]| {
            v.iter()
                .map(|s| CellValue::Text(s.to_string()))
                .collect::<Vec<_>>()
        };
        Dataset::new(
            "t",
            vec![
                Column::new(
                    "x",
                    ColumnKind::Float,
                    num(&[Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)]),
                ),
                Column::new(
                    "y",
                    ColumnKind::Float,
                    num(&[Some(2.0), Some(4.0), Some(6.0), Some(8.0), Some(10.0)]),
                ),
                Column::new("g", ColumnKind::Text, text(&["a", "b", "a", "a", "c"])),
            ],
        )
    }

    #[test]
    fn bar_counts_per_category() {
        let chart = bar_counts(&dataset(), "g").unwrap();
        let ChartBody::Bars { bars, .. } = chart.body else {
            panic!("expected bars");
        };
        assert_eq!(
            bars,
            vec![("a".to_string(), 3.0), ("b".to_string(), 1.0), ("c".to_string(), 1.0)]
        );
    }

    #[test]
    fn bar_sums_add_up_per_category() {
        let chart = bar_sums(&dataset(), "g", "y").unwrap();
        let ChartBody::Bars { bars, .. } = chart.body else {
            panic!("expected bars");
        };
        assert_eq!(bars[0], ("a".to_string(), 16.0));
    }

    #[test]
    fn pie_slices_are_shares_largest_first() {
        let chart = pie(&dataset(), "g").unwrap();
        let ChartBody::Pie { slices } = chart.body else {
            panic!("expected pie");
        };
        assert_eq!(slices[0].0, "a");
        let total: f64 = slices.iter().map(|s| s.1).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn line_breaks_at_missing_values() {
        let chart = line_over_rows(&dataset(), "x").unwrap();
        let ChartBody::Line { segments, .. } = chart.body else {
            panic!("expected line");
        };
        assert_eq!(segments, vec![vec![[0.0, 1.0], [1.0, 2.0]], vec![[3.0, 4.0], [4.0, 5.0]]]);
    }

    #[test]
    fn scatter_drops_incomplete_rows() {
        let chart = scatter(&dataset(), "x", "y", "x vs y".into()).unwrap();
        let ChartBody::Scatter { points, .. } = chart.body else {
            panic!("expected scatter");
        };
        assert_eq!(points.len(), 4);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let err = histogram(&dataset(), "nope").unwrap_err();
        assert_eq!(err.to_string(), "Column 'nope' not found");
    }

    #[test]
    fn radar_rejects_text_columns() {
        let cols = vec!["x".to_string(), "g".to_string()];
        let err = radar_means(&dataset(), &cols, "x vs g".into()).unwrap_err();
        assert!(err.to_string().contains("non-numeric column 'g'"));

        let cols = vec!["x".to_string(), "y".to_string()];
        let chart = radar_means(&dataset(), &cols, "x vs y".into()).unwrap();
        let ChartBody::Radar { values, .. } = chart.body else {
            panic!("expected radar");
        };
        assert_eq!(values, vec![3.0, 6.0]);
    }

    #[test]
    fn heatmap_covers_all_numeric_columns() {
        let numeric = vec!["x".to_string(), "y".to_string()];
        let chart = correlation_heatmap(&dataset(), &numeric).unwrap();
        let ChartBody::Heatmap { labels, cells } = chart.body else {
            panic!("expected heatmap");
        };
        assert_eq!(labels, numeric);
        assert_eq!(cells.len(), 2);
        assert!((cells[0][1].unwrap() - 1.0).abs() < 1e-9);
        assert!(correlation_heatmap(&dataset(), &[]).is_err());
    }

    #[test]
    fn grouped_boxes_follow_categories() {
        let chart = box_grouped(&dataset(), "y", "g").unwrap();
        let ChartBody::Boxes { groups, x_label, .. } = chart.body else {
            panic!("expected boxes");
        };
        assert_eq!(x_label.as_deref(), Some("g"));
        let names: Vec<&str> = groups.iter().map(|g| g.0.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn density_bands_stay_in_range() {
        let chart = density_contour(&dataset(), "x", "y", 4, 3).unwrap();
        let ChartBody::DensityContour { bands, levels, .. } = chart.body else {
            panic!("expected density");
        };
        assert_eq!(levels, 3);
        assert!(bands.iter().flatten().all(|b| *b <= 3));
        // The two largest points share the top-right cell.
        assert_eq!(bands.iter().flatten().filter(|b| **b > 0).count(), 3);
        assert_eq!(bands[3][3], 3);
    }

    #[test]
    fn scatter3d_points_fit_the_unit_cube() {
        let chart = scatter3d(&dataset(), "x", "y", "x").unwrap();
        let ChartBody::Scatter3d { points, .. } = chart.body else {
            panic!("expected 3d scatter");
        };
        assert_eq!(points.len(), 4);
        assert!(points.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn normalise_spreads_tiny_ranges() {
        let tiny = 2f64.powi(-50);
        assert_eq!(normalise(&[0.0, tiny, 2.0 * tiny]), vec![0.0, 0.5, 1.0]);
        assert_eq!(normalise(&[7.0, 7.0]), vec![0.5, 0.5]);
    }

    #[test]
    fn bubble_radius_tracks_size() {
        let chart = bubble(&dataset(), "x", "y", "y").unwrap();
        let ChartBody::Bubble { radii, .. } = chart.body else {
            panic!("expected bubbles");
        };
        assert_eq!(radii.len(), 4);
        assert_eq!(*radii.last().unwrap(), MAX_BUBBLE_RADIUS);
        assert!(radii[0] < radii[1]);
    }

    #[test]
    fn treemap_tiles_per_category() {
        let chart = treemap(&dataset(), "g").unwrap();
        let ChartBody::Treemap { tiles } = chart.body else {
            panic!("expected treemap");
        };
        assert_eq!(tiles.len(), 3);
        let area: f64 = tiles.iter().map(|t| t.rect[2] * t.rect[3]).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pairplot_grid_is_square() {
        let cols = vec!["x".to_string(), "y".to_string()];
        let chart = pairplot(&dataset(), &cols).unwrap();
        let ChartBody::Pairplot { diagonal, points, .. } = chart.body else {
            panic!("expected pairplot");
        };
        assert_eq!(diagonal.len(), 2);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0][1].len(), 4);
    }
}

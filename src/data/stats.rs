use std::collections::HashMap;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Descriptive statistics (`DataFrame.describe()`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1); NaN for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Summarise non-missing values. `None` when nothing is left.
pub fn describe(column: &str, values: &[f64]) -> Option<Describe> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        (ss / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    let sorted = sorted(values);
    Some(Describe {
        column: column.to_string(),
        count,
        mean,
        std,
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// `describe()` for every numeric column that has at least one value.
pub fn describe_all(dataset: &Dataset, numeric: &[String]) -> Vec<Describe> {
    numeric
        .iter()
        .filter_map(|name| {
            let values = present(&dataset.column(name)?.numbers());
            describe(name, &values)
        })
        .collect()
}

/// `(column, dtype, missing)` per column, in file order.
pub fn missing_counts(dataset: &Dataset) -> Vec<(String, &'static str, usize)> {
    dataset
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.kind.dtype_name(), c.missing_count()))
        .collect()
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Linear-interpolated percentile of already sorted data, `p` in `[0, 1]`.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }
    let idx = p * (sorted_data.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let w = idx - lo as f64;
    sorted_data[lo] * (1.0 - w) + sorted_data[hi] * w
}

/// Drop missing entries.
pub fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over rows where both values are present.
/// `None` when fewer than two such rows exist or either side has no variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let numerator: f64 = pairs
        .iter()
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    let ss_x: f64 = pairs.iter().map(|(a, _)| (a - mean_x).powi(2)).sum();
    let ss_y: f64 = pairs.iter().map(|(_, b)| (b - mean_y).powi(2)).sum();
    if ss_x == 0.0 || ss_y == 0.0 {
        return None;
    }
    // Square roots taken separately so the product cannot overflow.
    Some((numerator / (ss_x.sqrt() * ss_y.sqrt())).clamp(-1.0, 1.0))
}

/// Pairwise Pearson matrix over the given columns, row-major.
pub fn correlation_matrix(columns: &[Vec<Option<f64>>]) -> Vec<Vec<Option<f64>>> {
    columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Occurrences per label in first-appearance order; missing labels skipped.
pub fn value_counts(labels: &[Option<String>]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for label in labels.iter().flatten() {
        match index.get(label) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(label.clone(), order.len());
                order.push((label.clone(), 1));
            }
        }
    }
    order
}

/// Values of `numbers` collected per label of `labels`, first-appearance
/// order. Rows missing either side are skipped.
pub fn group_values(labels: &[Option<String>], numbers: &[Option<f64>]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (label, value) in labels.iter().zip(numbers) {
        let (Some(label), Some(value)) = (label, value) else {
            continue;
        };
        match index.get(label) {
            Some(&i) => groups[i].1.push(*value),
            None => {
                index.insert(label.clone(), groups.len());
                groups.push((label.clone(), vec![*value]));
            }
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram with Sturges' bin count. The last bin is closed.
pub fn histogram(values: &[f64]) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![Bin {
            start: min - 0.5,
            end: max + 0.5,
            count: values.len(),
        }];
    }
    let n_bins = ((values.len() as f64).log2().ceil() as usize + 1).max(1);
    let width = (max - min) / n_bins as f64;
    let mut bins: Vec<Bin> = (0..n_bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - min) / width) as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Box-and-whisker summary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Whiskers reach the furthest data within 1.5 IQR of the box.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let q1 = percentile(&sorted, 0.25);
    let median = percentile(&sorted, 0.5);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let inside: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|v| *v >= lo_fence && *v <= hi_fence)
        .collect();
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();
    Some(BoxStats {
        lower_whisker: inside.first().copied().unwrap_or(q1),
        q1,
        median,
        q3,
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

/// Gaussian kernel density estimate with Scott's bandwidth, sampled at
/// `samples` evenly spaced points spanning the data plus three bandwidths.
/// Returns `(position, density)` pairs.
pub fn kde(values: &[f64], samples: usize) -> Vec<[f64; 2]> {
    if values.is_empty() || samples < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let m = values.iter().sum::<f64>() / n;
    let sd = if values.len() > 1 {
        (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    let mut bandwidth = sd * n.powf(-0.2);
    if bandwidth == 0.0 {
        bandwidth = (m.abs() * 0.1).max(1.0);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min) - 3.0 * bandwidth;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 3.0 * bandwidth;
    let step = (max - min) / (samples - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..samples)
        .map(|i| {
            let x = min + step * i as f64;
            let density = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            [x, density]
        })
        .collect()
}

/// Counts of `(x, y)` pairs on a `bins` x `bins` grid spanning the data.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// `counts[row][col]`, row 0 at the lowest y.
    pub counts: Vec<Vec<usize>>,
}

pub fn density_grid(points: &[[f64; 2]], bins: usize) -> Option<DensityGrid> {
    if points.is_empty() || bins == 0 {
        return None;
    }
    let span = |axis: usize| {
        let lo = points.iter().map(|p| p[axis]).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(|p| p[axis]).fold(f64::NEG_INFINITY, f64::max);
        if hi == lo {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    };
    let x_range = span(0);
    let y_range = span(1);
    let cell = |v: f64, (lo, hi): (f64, f64)| {
        (((v - lo) / (hi - lo) * bins as f64) as usize).min(bins - 1)
    };

    let mut counts = vec![vec![0usize; bins]; bins];
    for p in points {
        counts[cell(p[1], y_range)][cell(p[0], x_range)] += 1;
    }
    Some(DensityGrid {
        x_range,
        y_range,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn describe_matches_pandas() {
        let d = describe("v", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(d.count, 5);
        assert!(approx(d.mean, 3.0));
        assert!(approx(d.std, 1.5811388300841898));
        assert!(approx(d.q1, 2.0));
        assert!(approx(d.median, 3.0));
        assert!(approx(d.q3, 4.0));
        assert!(describe("v", &[]).is_none());
        assert!(describe("v", &[7.0]).unwrap().std.is_nan());
    }

    #[test]
    fn percentile_interpolates() {
        assert!(approx(percentile(&[1.0, 2.0, 3.0, 4.0], 0.25), 1.75));
    }

    #[test]
    fn pearson_uses_pairwise_complete_rows() {
        let x = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let y = vec![Some(2.0), Some(4.0), Some(100.0), Some(8.0)];
        assert!(approx(pearson(&x, &y).unwrap(), 1.0));

        let flat = vec![Some(3.0); 4];
        assert_eq!(pearson(&x, &flat), None);
    }

    #[test]
    fn pearson_is_scale_independent() {
        let tiny: Vec<Option<f64>> = [1e-9, 2e-9, 3e-9, 4e-9].iter().map(|v| Some(*v)).collect();
        let doubled: Vec<Option<f64>> = tiny.iter().map(|v| v.map(|v| v * 2.0)).collect();
        assert!(approx(pearson(&tiny, &doubled).unwrap(), 1.0));

        let huge: Vec<Option<f64>> = [1e160, 2e160, 3e160].iter().map(|v| Some(*v)).collect();
        assert!(approx(pearson(&huge, &huge).unwrap(), 1.0));
    }

    #[test]
    fn correlation_matrix_is_symmetric() {
        let cols = vec![
            vec![Some(1.0), Some(2.0), Some(3.0)],
            vec![Some(3.0), Some(2.0), Some(1.0)],
        ];
        let m = correlation_matrix(&cols);
        assert!(approx(m[0][0].unwrap(), 1.0));
        assert!(approx(m[0][1].unwrap(), -1.0));
        assert_eq!(m[0][1], m[1][0]);
    }

    #[test]
    fn value_counts_keep_first_appearance() {
        let labels: Vec<Option<String>> = ["b", "a", "b", "c"]
            .iter()
            .map(|s| Some(s.to_string()))
            .chain(std::iter::once(None))
            .collect();
        assert_eq!(
            value_counts(&labels),
            vec![
                ("b".to_string(), 2usize),
                ("a".to_string(), 1),
                ("c".to_string(), 1),
            ]
        );
    }

    #[test]
    fn histogram_covers_every_value() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values);
        assert_eq!(bins.len(), 8);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(histogram(&[2.0, 2.0]).len(), 1);
    }

    #[test]
    fn histogram_splits_tiny_ranges() {
        let bins = histogram(&[1e-12, 2e-12, 3e-12, 4e-12]);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn box_stats_flag_outliers() {
        let b = box_stats(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(b.outliers, vec![100.0]);
        assert!(approx(b.upper_whisker, 4.0));
        assert!(approx(b.lower_whisker, 1.0));
    }

    #[test]
    fn kde_integrates_to_about_one() {
        let curve = kde(&[0.0, 1.0, 2.0, 3.0], 200);
        let step = curve[1][0] - curve[0][0];
        let area: f64 = curve.iter().map(|p| p[1] * step).sum();
        assert!((area - 1.0).abs() < 0.02, "area {area}");
    }

    #[test]
    fn density_grid_counts_all_points() {
        let points = [[0.0, 0.0], [1.0, 1.0], [1.0, 1.0], [0.5, 0.2]];
        let grid = density_grid(&points, 4).unwrap();
        let total: usize = grid.counts.iter().flatten().sum();
        assert_eq!(total, 4);
        assert_eq!(grid.counts[3][3], 2);
    }

    #[test]
    fn density_grid_keeps_tiny_ranges() {
        let points = [[0.0, 0.0], [1e-12, 1e-12]];
        let grid = density_grid(&points, 2).unwrap();
        assert_eq!(grid.x_range, (0.0, 1e-12));
        assert_eq!(grid.counts[0][0], 1);
        assert_eq!(grid.counts[1][1], 1);
    }
}

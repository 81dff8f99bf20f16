use std::f64::consts::{FRAC_PI_2, TAU};

// ---------------------------------------------------------------------------
// Pie / radar: angles start at 12 o'clock and run clockwise
// ---------------------------------------------------------------------------

fn polar(turn: f64, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - TAU * turn;
    [radius * angle.cos(), radius * angle.sin()]
}

/// Closed wedge outline between two fractions of a full turn.
pub fn pie_wedge(start: f64, end: f64, radius: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start) * 128.0).ceil() as usize).max(2);
    let mut outline = Vec::with_capacity(steps + 2);
    outline.push([0.0, 0.0]);
    for i in 0..=steps {
        let t = start + (end - start) * i as f64 / steps as f64;
        outline.push(polar(t, radius));
    }
    outline
}

/// Anchor for a wedge label, halfway out along its bisector.
pub fn pie_label_anchor(start: f64, end: f64, radius: f64) -> [f64; 2] {
    polar((start + end) / 2.0, radius * 0.6)
}

/// Unit-length end of radar axis `i` out of `n`.
pub fn radar_axis(i: usize, n: usize) -> [f64; 2] {
    polar(i as f64 / n.max(1) as f64, 1.0)
}

/// Radar trace vertices, each value scaled by `max` onto its axis.
pub fn radar_polygon(values: &[f64], max: f64) -> Vec<[f64; 2]> {
    let n = values.len();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let r = if max > 0.0 { (v / max).max(0.0) } else { 0.0 };
            polar(i as f64 / n.max(1) as f64, r)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Treemap: recursive weighted bisection along the longer side
// ---------------------------------------------------------------------------

/// Lay out `weights` inside `rect` (`[x, y, w, h]`). The result is index
/// aligned with `weights`; non-positive weights get an empty rectangle.
pub fn treemap(weights: &[f64], rect: [f64; 4]) -> Vec<[f64; 4]> {
    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0.0).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    let mut out = vec![[0.0; 4]; weights.len()];
    bisect(&order, weights, rect, &mut out);
    out
}

fn bisect(items: &[usize], weights: &[f64], rect: [f64; 4], out: &mut [[f64; 4]]) {
    match items {
        [] => {}
        [only] => out[*only] = rect,
        _ => {
            let total: f64 = items.iter().map(|&i| weights[i]).sum();
            let mut acc = 0.0;
            let mut split = 1;
            for (k, &i) in items.iter().enumerate().take(items.len() - 1) {
                acc += weights[i];
                split = k + 1;
                if acc >= total / 2.0 {
                    break;
                }
            }
            let (head, tail) = items.split_at(split);
            let frac = head.iter().map(|&i| weights[i]).sum::<f64>() / total;

            let [x, y, w, h] = rect;
            let (first, second) = if w >= h {
                ([x, y, w * frac, h], [x + w * frac, y, w * (1.0 - frac), h])
            } else {
                ([x, y, w, h * frac], [x, y + h * frac, w, h * (1.0 - frac)])
            };
            bisect(head, weights, first, out);
            bisect(tail, weights, second, out);
        }
    }
}

// ---------------------------------------------------------------------------
// 3-D scatter: fixed orthographic camera
// ---------------------------------------------------------------------------

/// Camera rotation around the vertical axis, radians.
pub const AZIMUTH: f64 = 0.6;
/// Camera tilt above the horizontal plane, radians.
pub const ELEVATION: f64 = 0.45;

/// Project a point of the unit cube onto the screen plane. The cube centre
/// maps to the origin.
pub fn project(p: [f64; 3], azimuth: f64, elevation: f64) -> [f64; 2] {
    let [x, y, z] = [p[0] - 0.5, p[1] - 0.5, p[2] - 0.5];
    let (sa, ca) = azimuth.sin_cos();
    let (se, ce) = elevation.sin_cos();
    let rx = x * ca - y * sa;
    let ry = x * sa + y * ca;
    [rx, z * ce + ry * se]
}

/// The three cube edges leaving the origin corner, one per axis.
pub fn axis_edges() -> [[[f64; 3]; 2]; 3] {
    [
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
    ]
}

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

fn mix(a: Srgb, b: Srgb, t: f32) -> Color32 {
    let a: LinSrgb = a.into_linear();
    let b: LinSrgb = b.into_linear();
    to_color32(Srgb::from_linear(a.mix(b, t.clamp(0.0, 1.0))))
}

// ---------------------------------------------------------------------------
// Continuous colour maps
// ---------------------------------------------------------------------------

const COOL: Srgb = Srgb::new(0.23, 0.30, 0.75);
const NEUTRAL: Srgb = Srgb::new(0.95, 0.95, 0.95);
const WARM: Srgb = Srgb::new(0.71, 0.02, 0.15);

/// Blue → white → red for values in `[-1, 1]`, e.g. correlation coefficients.
pub fn diverging(value: f64) -> Color32 {
    let v = value.clamp(-1.0, 1.0) as f32;
    if v < 0.0 {
        mix(NEUTRAL, COOL, -v)
    } else {
        mix(NEUTRAL, WARM, v)
    }
}

const LOW: Srgb = Srgb::new(0.97, 0.98, 1.00);
const HIGH: Srgb = Srgb::new(0.03, 0.19, 0.42);

/// White → dark blue for `t` in `[0, 1]`, e.g. density levels.
pub fn sequential(t: f64) -> Color32 {
    mix(LOW, HIGH, t as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn diverging_is_neutral_at_zero_and_clamped() {
        assert_eq!(diverging(0.0), to_color32(NEUTRAL));
        assert_eq!(diverging(1.0), to_color32(WARM));
        assert_eq!(diverging(5.0), diverging(1.0));
        assert_eq!(diverging(-1.0), to_color32(COOL));
    }

    #[test]
    fn sequential_ends() {
        assert_eq!(sequential(0.0), to_color32(LOW));
        assert_eq!(sequential(1.0), to_color32(HIGH));
    }
}

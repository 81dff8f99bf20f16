use anyhow::{Context, Result};

const ROWS: usize = 240;
const OUTPUT_PATH: &str = "sample_data.csv";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo"];
    let base_price = |product: &str| match product {
        "Widget" => 12.5,
        "Gadget" => 24.0,
        _ => 40.0,
    };

    let mut writer = csv::Writer::from_path(OUTPUT_PATH)
        .with_context(|| format!("creating {OUTPUT_PATH}"))?;
    writer.write_record([
        "order_id",
        "region",
        "product",
        "units",
        "unit_price",
        "revenue",
        "satisfaction",
        "order_date",
        "returned",
    ])?;

    for i in 0..ROWS {
        let region = rng.pick(&regions);
        let product = rng.pick(&products);
        let units = (rng.gauss(20.0, 6.0).round() as i64).max(1);
        let price = (base_price(product) * (1.0 + rng.gauss(0.0, 0.08))).max(1.0);
        let revenue = units as f64 * price;
        let satisfaction = rng.gauss(3.8, 0.7).clamp(1.0, 5.0);
        // Roughly one in twelve prices is missing.
        let price_cell = if rng.next_f64() < 0.08 {
            String::new()
        } else {
            format!("{price:.2}")
        };
        let date = format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1);
        let returned = rng.next_f64() < 0.1;

        writer.write_record([
            (1000 + i).to_string(),
            region.to_string(),
            product.to_string(),
            units.to_string(),
            price_cell,
            format!("{revenue:.2}"),
            format!("{satisfaction:.1}"),
            date,
            returned.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {ROWS} rows to {OUTPUT_PATH}");
    Ok(())
}

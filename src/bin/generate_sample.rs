//! Writes a deliberately messy sales table (duplicate rows, gaps in the
//! numeric columns) as `sales.csv` and `sales.xlsx` for trying out the app.
//!
//! Usage: generate_sample [OUT_DIR]   (default: `samples`)

use std::path::PathBuf;

use anyhow::{Context, Result};

use data_sweeper::data::{export, CellValue, Column, Dataset, ExportTarget};

const ROWS: usize = 200;
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PRODUCTS: [&str; 5] = ["Widget", "Gadget", "Doohickey", "Sprocket", "Gizmo"];

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

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated order.
#[derive(Clone)]
struct Order {
    id: i64,
    region: &'static str,
    product: &'static str,
    units: Option<i64>,
    unit_price: Option<f64>,
    shipped: bool,
}

fn generate_orders(rng: &mut SimpleRng) -> Vec<Order> {
    let mut orders: Vec<Order> = Vec::with_capacity(ROWS + ROWS / 10);
    for i in 0..ROWS {
        let units = (1 + rng.next_u64() % 40) as i64;
        let price = ((5.0 + rng.next_f64() * 95.0) * 100.0).round() / 100.0;
        let order = Order {
            id: 1000 + i as i64,
            region: rng.pick(&REGIONS),
            product: rng.pick(&PRODUCTS),
            units: (!rng.chance(0.08)).then_some(units),
            unit_price: (!rng.chance(0.10)).then_some(price),
            shipped: rng.chance(0.7),
        };
        // Re-submitted orders show up as exact duplicates.
        let resubmitted = rng.chance(0.1);
        orders.push(order.clone());
        if resubmitted {
            orders.push(order);
        }
    }
    orders
}

fn column(orders: &[Order], name: &str, cell: impl Fn(&Order) -> CellValue) -> Column {
    Column::from_cells(name, orders.iter().map(cell).collect())
}

fn to_dataset(orders: &[Order]) -> Result<Dataset> {
    let dataset = Dataset::from_columns(vec![
        column(orders, "order_id", |o| CellValue::Integer(o.id)),
        column(orders, "region", |o| CellValue::Text(o.region.to_string())),
        column(orders, "product", |o| CellValue::Text(o.product.to_string())),
        column(orders, "units", |o| o.units.map_or(CellValue::Null, CellValue::Integer)),
        column(orders, "unit_price", |o| {
            o.unit_price.map_or(CellValue::Null, CellValue::Float)
        }),
        column(orders, "shipped", |o| CellValue::Bool(o.shipped)),
    ])?;
    Ok(dataset)
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("samples"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let orders = generate_orders(&mut rng);
    let dataset = to_dataset(&orders)?;

    for target in [ExportTarget::Csv, ExportTarget::Spreadsheet] {
        let file = export(&dataset, "sales", target)?;
        let path = out_dir.join(&file.file_name);
        std::fs::write(&path, &file.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        println!(
            "Wrote {} orders ({} columns) to {}",
            dataset.num_rows(),
            dataset.num_columns(),
            path.display()
        );
    }

    Ok(())
}

//! Writes a synthetic transaction CSV suitable for `StoreLoader::from_csv`.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CATEGORIES: [&str; 4] = ["Electronics", "Grocery", "Apparel", "Home"];
const BRANDS: [&str; 5] = ["Acme", "Bolt", "Crest", "Delta", "Ember"];
const CHANNELS: [&str; 3] = ["online", "store", "marketplace"];
const SEGMENTS: [&str; 3] = ["Premium", "Regular", "Occasional"];
const CITIES: [&str; 4] = ["Berlin", "Hamburg", "Munich", "Cologne"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "transactions.csv".to_string());
    let days: i64 = std::env::args()
        .nth(2)
        .and_then(|v| v.parse().ok())
        .unwrap_or(365);

    let mut rng = StdRng::seed_from_u64(42);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "product_id",
        "quantity",
        "unit_price",
        "final_amount",
        "sale_date",
        "sales_channel",
        "store_location",
        "category",
        "brand",
        "list_price",
        "customer_segment",
        "customer_city",
    ])?;

    let mut rows = 0usize;
    for day in 1..=days {
        let date = Utc::now() - Duration::days(day);
        for product_id in 1..=10u32 {
            // Not every product sells every day
            if rng.gen_bool(0.35) {
                continue;
            }
            let list_price = 5.0 + product_id as f64 * 3.0;
            let unit_price = list_price * rng.gen_range(0.8..1.0);
            let quantity = rng.gen_range(1..=8) as f64;
            writer.write_record([
                product_id.to_string(),
                format!("{quantity:.1}"),
                format!("{unit_price:.2}"),
                format!("{:.2}", quantity * unit_price),
                date.timestamp().to_string(),
                (*CHANNELS.choose(&mut rng).unwrap()).to_string(),
                format!("Store {}", rng.gen_range(1..=5)),
                CATEGORIES[(product_id as usize - 1) % CATEGORIES.len()].to_string(),
                (*BRANDS.choose(&mut rng).unwrap()).to_string(),
                format!("{list_price:.2}"),
                (*SEGMENTS.choose(&mut rng).unwrap()).to_string(),
                (*CITIES.choose(&mut rng).unwrap()).to_string(),
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!("Wrote {rows} transactions across {days} days to {path}");
    Ok(())
}

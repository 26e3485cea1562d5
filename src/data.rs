//! Transaction and product records plus the store contracts the core reads from

use crate::error::{ForecastError, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Placeholder for absent categorical attributes, applied once at ingestion.
pub const UNKNOWN: &str = "Unknown";

/// One recorded sale, joined with product and customer attributes.
///
/// Immutable once recorded; the forecasting core only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub product_id: u32,
    pub quantity: f64,
    pub unit_price: f64,
    pub final_amount: f64,
    pub sale_date: DateTime<Utc>,
    pub sales_channel: String,
    pub store_location: String,
    pub category: String,
    pub brand: String,
    /// Product list price at time of sale
    pub list_price: f64,
    pub customer_segment: String,
    pub customer_city: String,
}

impl Transaction {
    /// Build a transaction, defaulting absent categorical attributes to
    /// [`UNKNOWN`]. Feature code downstream can then assume non-empty strings.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        product_id: u32,
        quantity: f64,
        unit_price: f64,
        final_amount: f64,
        sale_date: DateTime<Utc>,
        sales_channel: Option<String>,
        store_location: Option<String>,
        category: Option<String>,
        brand: Option<String>,
        list_price: f64,
        customer_segment: Option<String>,
        customer_city: Option<String>,
    ) -> Self {
        let or_unknown = |v: Option<String>| match v {
            Some(s) if !s.trim().is_empty() => s,
            _ => UNKNOWN.to_string(),
        };

        Self {
            product_id,
            quantity,
            unit_price,
            final_amount,
            sale_date,
            sales_channel: or_unknown(sales_channel),
            store_location: or_unknown(store_location),
            category: or_unknown(category),
            brand: or_unknown(brand),
            list_price,
            customer_segment: or_unknown(customer_segment),
            customer_city: or_unknown(customer_city),
        }
    }
}

/// Product master data needed for prediction and stock recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub stock_quantity: f64,
    pub reorder_level: f64,
}

/// Read-only contract against the relational transaction store.
///
/// Implementations must return rows joined with product and customer
/// attributes, ordered by sale date ascending.
pub trait TransactionStore {
    /// Fetch transactions recorded at or after `since`, optionally filtered
    /// to a single product.
    fn fetch_transactions(
        &self,
        product_id: Option<u32>,
        since: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;

    /// Look up a product by id, or `None` when unknown.
    fn get_product(&self, product_id: u32) -> Result<Option<Product>>;
}

/// In-process transaction store backed by vectors and maps.
///
/// Used by tests and demos; production callers wrap their own database
/// access in [`TransactionStore`] instead.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
    products: HashMap<u32, Product>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl TransactionStore for MemoryStore {
    fn fetch_transactions(
        &self,
        product_id: Option<u32>,
        since: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.sale_date >= since)
            .filter(|tx| product_id.map_or(true, |id| tx.product_id == id))
            .cloned()
            .collect();
        rows.sort_by_key(|tx| tx.sale_date);
        Ok(rows)
    }

    fn get_product(&self, product_id: u32) -> Result<Option<Product>> {
        Ok(self.products.get(&product_id).cloned())
    }
}

/// Loader for transaction history exported as CSV
#[derive(Debug)]
pub struct StoreLoader;

impl StoreLoader {
    /// Load a [`MemoryStore`] from a transaction CSV export.
    ///
    /// Expected columns: `product_id, quantity, unit_price, final_amount,
    /// sale_date, sales_channel, store_location, category, brand,
    /// list_price, customer_segment, customer_city` with `sale_date` as a
    /// unix timestamp (seconds). Empty categorical cells default to
    /// [`UNKNOWN`]. Products are synthesized from the distinct product ids
    /// seen, with zero stock until the caller overrides them.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<MemoryStore> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers()?.clone();
        let col = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    ForecastError::ValidationError(format!("missing CSV column '{name}'"))
                })
        };

        let product_id = col("product_id")?;
        let quantity = col("quantity")?;
        let unit_price = col("unit_price")?;
        let final_amount = col("final_amount")?;
        let sale_date = col("sale_date")?;
        let list_price = col("list_price")?;
        let optional = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let sales_channel = optional("sales_channel");
        let store_location = optional("store_location");
        let category = optional("category");
        let brand = optional("brand");
        let customer_segment = optional("customer_segment");
        let customer_city = optional("customer_city");

        let mut store = MemoryStore::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim();
            let opt_field = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .map(|s| s.trim().to_string())
            };

            let parse_f64 = |idx: usize, name: &str| -> Result<f64> {
                field(idx).parse::<f64>().map_err(|_| {
                    ForecastError::ValidationError(format!(
                        "cannot parse '{}' as {name}",
                        field(idx)
                    ))
                })
            };

            let pid = field(product_id).parse::<u32>().map_err(|_| {
                ForecastError::ValidationError(format!(
                    "cannot parse '{}' as product_id",
                    field(product_id)
                ))
            })?;
            let ts = field(sale_date).parse::<i64>().map_err(|_| {
                ForecastError::ValidationError(format!(
                    "cannot parse '{}' as sale_date timestamp",
                    field(sale_date)
                ))
            })?;
            let when = Utc
                .timestamp_opt(ts, 0)
                .single()
                .ok_or_else(|| {
                    ForecastError::ValidationError(format!("timestamp {ts} out of range"))
                })?;

            store.add_transaction(Transaction::new(
                pid,
                parse_f64(quantity, "quantity")?,
                parse_f64(unit_price, "unit_price")?,
                parse_f64(final_amount, "final_amount")?,
                when,
                opt_field(sales_channel),
                opt_field(store_location),
                opt_field(category),
                opt_field(brand),
                parse_f64(list_price, "list_price")?,
                opt_field(customer_segment),
                opt_field(customer_city),
            ));
        }

        // Synthesized master rows so lookups succeed on a bare CSV import.
        let ids: Vec<u32> = store.transactions.iter().map(|tx| tx.product_id).collect();
        for id in ids {
            store.products.entry(id).or_insert_with(|| Product {
                id,
                name: format!("Product {id}"),
                stock_quantity: 0.0,
                reorder_level: 0.0,
            });
        }

        Ok(store)
    }
}

//! Feature engineering: daily aggregation, calendar features and rolling means

use crate::data::Transaction;
use crate::encoder::CategoricalEncoder;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Number of input features the regressor consumes.
pub const FEATURE_COUNT: usize = 10;

/// Ordered feature-name list; feature vectors follow this layout exactly.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "unit_price",
    "list_price",
    "day_of_week",
    "month",
    "quarter",
    "is_weekend",
    "qty_7d_avg",
    "qty_30d_avg",
    "category_code",
    "brand_code",
];

/// One product's one day of summed and derived features.
///
/// A pure function of the transaction window at aggregation time; computed
/// on demand and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub product_id: u32,
    pub date: NaiveDate,
    /// Units sold that day
    pub quantity: f64,
    /// Summed final amounts
    pub revenue: f64,
    /// Mean unit price across the day's transactions
    pub unit_price: f64,
    /// First-observed static attributes
    pub list_price: f64,
    pub category: String,
    pub brand: String,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    pub month: u32,
    pub quarter: u32,
    pub is_weekend: bool,
    /// Trailing mean of quantity over at most 7 observed days, current
    /// included
    pub qty_7d_avg: f64,
    /// Trailing mean of quantity over at most 30 observed days, current
    /// included
    pub qty_30d_avg: f64,
}

/// Calendar features derived deterministically from a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub day_of_week: u32,
    pub month: u32,
    pub quarter: u32,
    pub is_weekend: bool,
}

impl CalendarFeatures {
    pub fn for_date(date: NaiveDate) -> Self {
        let day_of_week = date.weekday().num_days_from_monday();
        let month = date.month();
        Self {
            day_of_week,
            month,
            quarter: (month - 1) / 3 + 1,
            is_weekend: day_of_week >= 5,
        }
    }
}

/// Transforms a transaction window into the daily aggregate feature table
#[derive(Debug)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Aggregate a transaction window into one row per (product, day).
    ///
    /// Rows come back grouped by product and ordered by date ascending
    /// within each product. Rolling means use only past-and-current rows of
    /// the same product; the first row of a product's series is its own 7d
    /// and 30d average.
    pub fn daily_aggregates(transactions: &[Transaction]) -> Result<Vec<AggregateRow>> {
        if transactions.is_empty() {
            return Err(ForecastError::InsufficientData(
                "no transactions available for feature preparation".to_string(),
            ));
        }

        // BTreeMap keys give (product, date) ascending order for free.
        let mut groups: BTreeMap<(u32, NaiveDate), Vec<&Transaction>> = BTreeMap::new();
        for tx in transactions {
            groups
                .entry((tx.product_id, tx.sale_date.date_naive()))
                .or_default()
                .push(tx);
        }

        let mut rows = Vec::with_capacity(groups.len());
        for ((product_id, date), day_txs) in groups {
            let quantity: f64 = day_txs.iter().map(|tx| tx.quantity).sum();
            let revenue: f64 = day_txs.iter().map(|tx| tx.final_amount).sum();
            let unit_price: f64 =
                day_txs.iter().map(|tx| tx.unit_price).sum::<f64>() / day_txs.len() as f64;
            let first = day_txs[0];
            let calendar = CalendarFeatures::for_date(date);

            rows.push(AggregateRow {
                product_id,
                date,
                quantity,
                revenue,
                unit_price,
                list_price: first.list_price,
                category: first.category.clone(),
                brand: first.brand.clone(),
                day_of_week: calendar.day_of_week,
                month: calendar.month,
                quarter: calendar.quarter,
                is_weekend: calendar.is_weekend,
                qty_7d_avg: 0.0,
                qty_30d_avg: 0.0,
            });
        }

        Self::fill_rolling_means(&mut rows);
        Ok(rows)
    }

    /// Trailing per-product rolling means over the date-ordered series.
    /// Windows are clipped at the series start, so no future row ever
    /// contributes.
    fn fill_rolling_means(rows: &mut [AggregateRow]) {
        let mut start = 0;
        while start < rows.len() {
            let product_id = rows[start].product_id;
            let mut end = start;
            while end < rows.len() && rows[end].product_id == product_id {
                end += 1;
            }

            for i in start..end {
                let qty_7d = Self::trailing_mean(&rows[start..=i], 7);
                let qty_30d = Self::trailing_mean(&rows[start..=i], 30);
                rows[i].qty_7d_avg = qty_7d;
                rows[i].qty_30d_avg = qty_30d;
            }
            start = end;
        }
    }

    fn trailing_mean(series: &[AggregateRow], window: usize) -> f64 {
        let tail = &series[series.len().saturating_sub(window)..];
        tail.iter().map(|r| r.quantity).sum::<f64>() / tail.len() as f64
    }

    /// Assemble the model input vector for one aggregate row, in
    /// [`FEATURE_NAMES`] order. Category and brand codes come from the
    /// (fitted) encoder.
    pub fn feature_vector(
        row: &AggregateRow,
        encoder: &CategoricalEncoder,
    ) -> Result<[f64; FEATURE_COUNT]> {
        let category_code = encoder.encode("category", &row.category)?;
        let brand_code = encoder.encode("brand", &row.brand)?;

        Ok([
            row.unit_price,
            row.list_price,
            row.day_of_week as f64,
            row.month as f64,
            row.quarter as f64,
            row.is_weekend as u8 as f64,
            row.qty_7d_avg,
            row.qty_30d_avg,
            category_code as f64,
            brand_code as f64,
        ])
    }
}

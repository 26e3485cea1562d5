//! Stable categorical value to numeric code mappings

use crate::data::Transaction;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Code returned for values never observed during `fit`.
pub const UNSEEN_CODE: i64 = -1;

/// Categorical fields the encoder tracks, in fit order.
pub const CATEGORICAL_FIELDS: [&str; 6] = [
    "category",
    "brand",
    "sales_channel",
    "store_location",
    "customer_segment",
    "customer_city",
];

/// Maps categorical string values to contiguous integer codes, one mapping
/// per field.
///
/// Fit once per training cycle and frozen until the next one; every
/// prediction between two trainings shares the same mapping. Calling
/// [`encode`](CategoricalEncoder::encode) before any fit (or before loading
/// a previously fitted encoder from the registry) is a sequencing error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    mappings: HashMap<String, HashMap<String, i64>>,
}

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild every field's mapping from the given rows, wholesale
    /// replacing any prior state. Codes are assigned 0..n over the sorted
    /// distinct values of each field, so refitting identical data yields
    /// identical codes.
    pub fn fit(&mut self, transactions: &[Transaction]) {
        let mut mappings = HashMap::new();
        for field in CATEGORICAL_FIELDS {
            let distinct: BTreeSet<&str> = transactions
                .iter()
                .map(|tx| Self::field_value(tx, field))
                .collect();
            let mapping: HashMap<String, i64> = distinct
                .into_iter()
                .enumerate()
                .map(|(code, value)| (value.to_string(), code as i64))
                .collect();
            mappings.insert(field.to_string(), mapping);
        }
        self.mappings = mappings;
    }

    /// Code for `value` in `field`, or [`UNSEEN_CODE`] when the value was
    /// absent at fit time.
    pub fn encode(&self, field: &str, value: &str) -> Result<i64> {
        if self.mappings.is_empty() {
            return Err(ForecastError::EncoderNotFitted);
        }
        let mapping = self.mappings.get(field).ok_or_else(|| {
            ForecastError::InvalidParameter(format!("unknown categorical field '{field}'"))
        })?;
        Ok(mapping.get(value).copied().unwrap_or(UNSEEN_CODE))
    }

    pub fn is_fitted(&self) -> bool {
        !self.mappings.is_empty()
    }

    /// Number of distinct values fitted for a field, if the field exists.
    pub fn cardinality(&self, field: &str) -> Option<usize> {
        self.mappings.get(field).map(|m| m.len())
    }

    fn field_value<'a>(tx: &'a Transaction, field: &str) -> &'a str {
        match field {
            "category" => &tx.category,
            "brand" => &tx.brand,
            "sales_channel" => &tx.sales_channel,
            "store_location" => &tx.store_location,
            "customer_segment" => &tx.customer_segment,
            "customer_city" => &tx.customer_city,
            _ => unreachable!("field list is fixed"),
        }
    }
}

//! Narrative-report collaborator contract and its deterministic fallback
//!
//! The core hands the report generator a JSON aggregate keyed by report
//! kind and receives free text back; it never sends raw transaction rows.
//! Generation itself (LLM-backed or otherwise) lives outside this crate;
//! [`TemplateReporter`] is the deterministic fallback callers use when the
//! generation service is unavailable.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Report types the collaborator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    SalesSummary,
    InventoryStatus,
    CustomerInsights,
    ProductPerformance,
}

/// Generated narrative sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContent {
    pub summary: String,
    pub detailed_analysis: String,
    pub recommendations: Vec<String>,
}

/// Contract for the narrative-report collaborator.
pub trait ReportGenerator {
    /// Produce a report from a JSON-serializable aggregate.
    fn generate(&self, kind: ReportKind, data: &Value) -> Result<ReportContent>;
}

/// Template-based generator producing the same report for the same input
/// every time.
#[derive(Debug, Default)]
pub struct TemplateReporter;

impl TemplateReporter {
    pub fn new() -> Self {
        Self
    }

    fn num(data: &Value, key: &str) -> f64 {
        data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    fn count(data: &Value, key: &str) -> usize {
        data.get(key)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

impl ReportGenerator for TemplateReporter {
    fn generate(&self, kind: ReportKind, data: &Value) -> Result<ReportContent> {
        let content = match kind {
            ReportKind::SalesSummary => {
                let revenue = Self::num(data, "total_revenue");
                let orders = Self::num(data, "total_orders");
                let aov = Self::num(data, "avg_order_value");
                ReportContent {
                    summary: format!(
                        "Sales analysis shows ${revenue:.2} in revenue from {orders:.0} orders \
                         with an average order value of ${aov:.2}."
                    ),
                    detailed_analysis: format!(
                        "Total revenue reached ${revenue:.2} across {orders:.0} transactions. \
                         The average order value of ${aov:.2} suggests customer purchasing \
                         behavior is within expected ranges."
                    ),
                    recommendations: vec![
                        "Focus on increasing average order value through upselling".to_string(),
                        "Analyze top-performing products for expansion opportunities".to_string(),
                        "Review underperforming categories for improvement".to_string(),
                    ],
                }
            }
            ReportKind::InventoryStatus => {
                let products = Self::num(data, "total_products");
                let value = Self::num(data, "inventory_value");
                let low_stock = Self::count(data, "low_stock_products");
                ReportContent {
                    summary: format!(
                        "Inventory analysis reveals {products:.0} products with a total value \
                         of ${value:.2}. {low_stock} items require attention."
                    ),
                    detailed_analysis: format!(
                        "Current inventory consists of {products:.0} active products valued at \
                         ${value:.2}. There are {low_stock} products below reorder levels that \
                         need immediate attention."
                    ),
                    recommendations: vec![
                        "Reorder low-stock items immediately".to_string(),
                        "Review reorder levels for optimization".to_string(),
                        "Analyze slow-moving inventory for clearance".to_string(),
                    ],
                }
            }
            ReportKind::CustomerInsights => {
                let total = Self::num(data, "total_customers");
                let new = Self::num(data, "new_customers");
                ReportContent {
                    summary: format!(
                        "Customer base consists of {total:.0} active customers with {new:.0} \
                         new acquisitions in the analyzed period."
                    ),
                    detailed_analysis: format!(
                        "The customer portfolio shows {total:.0} active customers, indicating a \
                         stable customer base. Recent acquisition of {new:.0} new customers \
                         demonstrates ongoing growth potential."
                    ),
                    recommendations: vec![
                        "Develop customer retention programs".to_string(),
                        "Create targeted campaigns for high-value segments".to_string(),
                        "Implement loyalty programs for repeat customers".to_string(),
                    ],
                }
            }
            ReportKind::ProductPerformance => ReportContent {
                summary: "Product performance analysis shows clear winners and opportunities \
                          for optimization across the product portfolio."
                    .to_string(),
                detailed_analysis: format!(
                    "Performance analysis for the period {} highlights the top performers and \
                     the products that need attention.",
                    data.get("period").and_then(Value::as_str).unwrap_or("analyzed")
                ),
                recommendations: vec![
                    "Expand inventory for top-performing products".to_string(),
                    "Review pricing strategy for underperformers".to_string(),
                    "Consider promotions on slow-moving products".to_string(),
                ],
            },
        };

        Ok(content)
    }
}

use chrono::{Duration, Utc};
use demand_forecast::data::{MemoryStore, Product, Transaction};
use demand_forecast::inventory::InventoryOptimizer;
use demand_forecast::predictor::DemandPredictor;
use demand_forecast::registry::ModelRegistry;
use demand_forecast::report::{ReportGenerator, ReportKind, TemplateReporter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Demand Forecast: Training and Prediction Example");
    println!("================================================\n");

    // Create sample transaction history
    println!("Creating sample data...");
    let store = create_sample_store();
    println!("Sample data created: {} transactions\n", store.len());

    // Train the demand model
    println!("Training model...");
    let registry = ModelRegistry::new("model_store");
    let predictor = DemandPredictor::new(store, registry);
    let report = predictor.train()?;
    println!("{report}");

    // Predict demand at a few horizons
    println!("Generating predictions...");
    for days_ahead in [1, 7, 14, 30] {
        let prediction = predictor.predict(1, days_ahead)?;
        println!(
            "  {} days ahead: {:.1} units (confidence {:.2})",
            days_ahead, prediction.predicted_quantity, prediction.confidence_score
        );
    }
    println!();

    // Score against the recent window
    let evaluation = predictor.evaluate()?;
    println!("{evaluation}");

    // Which features drive the forecast
    println!("Feature importance:");
    let mut importances = predictor.feature_importance()?;
    importances.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    for (name, value) in importances.iter().take(5) {
        println!("  {name:<15} {value:.4}");
    }
    println!();

    // Stock recommendations from the 30-day forecast
    println!("Optimizing inventory...");
    let optimizer = InventoryOptimizer::new(&predictor);
    let recommendation = optimizer.optimize(1)?;
    println!(
        "  30-day demand: {:.1}, safety stock: {:.1}, status: {:?}",
        recommendation.predicted_30_day_demand,
        recommendation.safety_stock,
        recommendation.status
    );
    for advice in &recommendation.recommendations {
        println!("  - {advice}");
    }
    println!();

    // Narrative report from aggregate data
    let reporter = TemplateReporter::new();
    let content = reporter.generate(
        ReportKind::InventoryStatus,
        &serde_json::json!({
            "total_products": 1,
            "inventory_value": recommendation.current_stock * 10.0,
            "low_stock_products": [],
        }),
    )?;
    println!("Report: {}", content.summary);

    Ok(())
}

/// One product with 180 days of weekday-seasonal sales.
fn create_sample_store() -> MemoryStore {
    let mut rng = StdRng::seed_from_u64(7);
    let mut store = MemoryStore::new();
    store.add_product(Product {
        id: 1,
        name: "Wireless Mouse".to_string(),
        stock_quantity: 120.0,
        reorder_level: 20.0,
    });

    for day in 1..=180 {
        let date = Utc::now() - Duration::days(day);
        let weekday = day % 7;
        let base = if weekday >= 5 { 8.0 } else { 3.0 };
        let quantity = base + rng.gen_range(0.0..3.0);
        store.add_transaction(Transaction::new(
            1,
            quantity,
            24.99,
            quantity * 24.99,
            date,
            Some("online".to_string()),
            Some("Main Street".to_string()),
            Some("Electronics".to_string()),
            Some("Logi".to_string()),
            29.99,
            Some("Regular".to_string()),
            Some("Hamburg".to_string()),
        ));
    }

    store
}

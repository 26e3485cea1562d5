use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, Utc};
use demand_forecast::data::{MemoryStore, Product, Transaction};
use demand_forecast::error::ForecastError;
use demand_forecast::model::ForestConfig;
use demand_forecast::predictor::{DemandPredictor, PredictorConfig};
use demand_forecast::registry::ModelRegistry;
use demand_forecast::FEATURE_NAMES;
use tempfile::TempDir;

fn sale_days_ago(product_id: u32, days_ago: i64, quantity: f64) -> Transaction {
    Transaction::new(
        product_id,
        quantity,
        10.0,
        quantity * 10.0,
        Utc::now() - Duration::days(days_ago),
        Some("online".to_string()),
        Some("Downtown".to_string()),
        Some("Electronics".to_string()),
        Some("Acme".to_string()),
        12.0,
        Some("Premium".to_string()),
        Some("Berlin".to_string()),
    )
}

/// Store with `history_days` daily sales for product 1 and a quiet
/// product 2 with no transactions at all.
fn seeded_store(history_days: i64) -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_product(Product {
        id: 1,
        name: "Widget".to_string(),
        stock_quantity: 25.0,
        reorder_level: 5.0,
    });
    store.add_product(Product {
        id: 2,
        name: "Dusty Gadget".to_string(),
        stock_quantity: 10.0,
        reorder_level: 2.0,
    });
    for day in 1..=history_days {
        store.add_transaction(sale_days_ago(1, day, (day % 7 + 1) as f64));
    }
    store
}

fn fast_config() -> PredictorConfig {
    PredictorConfig {
        forest: ForestConfig {
            n_estimators: 8,
            ..ForestConfig::default()
        },
        ..PredictorConfig::default()
    }
}

fn predictor_for(store: MemoryStore, dir: &TempDir) -> DemandPredictor<MemoryStore> {
    DemandPredictor::with_config(store, ModelRegistry::new(dir.path()), fast_config())
}

#[test]
fn test_train_with_too_few_rows_fails() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(49), &dir);

    match predictor.train() {
        Err(ForecastError::InsufficientTrainingData { count, required }) => {
            assert_eq!(count, 49);
            assert_eq!(required, 50);
        }
        other => panic!("expected InsufficientTrainingData, got {other:?}"),
    }
}

#[test]
fn test_train_on_exactly_minimum_succeeds() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(50), &dir);

    let report = predictor.train().unwrap();
    assert_eq!(report.train_count + report.test_count, 50);
    assert_eq!(report.test_count, 10);
    assert!(report.mae >= 0.0);
    assert!(predictor.is_trained());
}

#[test]
fn test_train_on_empty_store_is_insufficient_data() {
    let dir = TempDir::new().unwrap();
    let mut store = MemoryStore::new();
    store.add_product(Product {
        id: 1,
        name: "Widget".to_string(),
        stock_quantity: 0.0,
        reorder_level: 0.0,
    });
    let predictor = predictor_for(store, &dir);
    assert!(matches!(
        predictor.train(),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[test]
fn test_predict_unknown_product_fails() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);

    match predictor.predict(999, 7) {
        Err(ForecastError::ProductNotFound(id)) => assert_eq!(id, 999),
        other => panic!("expected ProductNotFound, got {other:?}"),
    }
}

#[test]
fn test_quiet_product_gets_fallback_regardless_of_model_state() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);

    // No model loaded yet; the fallback must not trigger training
    let cold = predictor.predict(2, 7).unwrap();
    assert_eq!(cold.predicted_quantity, 1.0);
    assert_eq!(cold.confidence_score, 0.3);
    assert!(!predictor.is_trained());

    // Same exact fallback with a trained model
    predictor.train().unwrap();
    let warm = predictor.predict(2, 7).unwrap();
    assert_eq!(warm.predicted_quantity, 1.0);
    assert_eq!(warm.confidence_score, 0.3);
}

#[test]
fn test_cold_start_trains_on_first_predict() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);
    assert!(!predictor.is_trained());

    let prediction = predictor.predict(1, 7).unwrap();
    assert!(predictor.is_trained());
    assert!(prediction.predicted_quantity >= 0.0);
    assert_eq!(prediction.product_name, "Widget");
    assert!(prediction.model_version.starts_with("1.0."));
}

#[test]
fn test_confidence_decays_with_horizon_and_stays_clamped() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);
    predictor.train().unwrap();

    assert_approx_eq!(predictor.predict(1, 1).unwrap().confidence_score, 0.75);
    assert_approx_eq!(predictor.predict(1, 10).unwrap().confidence_score, 0.3);
    // 0.8 - 0.05 * 20 computes to -0.2, clamped to the floor
    assert_approx_eq!(predictor.predict(1, 20).unwrap().confidence_score, 0.1);

    let mut previous = f64::MAX;
    for days in 1..=30 {
        let c = predictor.predict(1, days).unwrap().confidence_score;
        assert!(c <= previous, "confidence rose at horizon {days}");
        assert!((0.1..=0.95).contains(&c));
        previous = c;
    }
}

#[test]
fn test_predicted_quantity_is_non_negative() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);
    predictor.train().unwrap();

    for days in [1, 7, 14, 30] {
        assert!(predictor.predict(1, days).unwrap().predicted_quantity >= 0.0);
    }
}

#[test]
fn test_evaluate_requires_a_model() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);
    assert!(matches!(
        predictor.evaluate(),
        Err(ForecastError::ModelNotTrained)
    ));
}

#[test]
fn test_evaluate_scores_recent_window() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);
    predictor.train().unwrap();

    let report = predictor.evaluate().unwrap();
    assert!(report.sample_count > 0);
    assert!(report.sample_count <= 30);
    assert!(report.mae >= 0.0);
}

#[test]
fn test_evaluate_with_stale_history_has_no_data() {
    let dir = TempDir::new().unwrap();
    let mut store = MemoryStore::new();
    store.add_product(Product {
        id: 1,
        name: "Widget".to_string(),
        stock_quantity: 0.0,
        reorder_level: 0.0,
    });
    // Plenty to train on, but nothing inside the evaluation window
    for day in 100..=160 {
        store.add_transaction(sale_days_ago(1, day, (day % 5 + 1) as f64));
    }
    let predictor = predictor_for(store, &dir);
    predictor.train().unwrap();

    assert!(matches!(
        predictor.evaluate(),
        Err(ForecastError::NoEvaluationData)
    ));
}

#[test]
fn test_feature_importance_keys_match_feature_names() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);

    assert!(matches!(
        predictor.feature_importance(),
        Err(ForecastError::ModelNotTrained)
    ));

    predictor.train().unwrap();
    let importances = predictor.feature_importance().unwrap();
    assert_eq!(importances.len(), FEATURE_NAMES.len());
    for ((name, value), expected) in importances.iter().zip(FEATURE_NAMES) {
        assert_eq!(name, expected);
        assert!(*value >= 0.0);
    }
}

#[test]
fn test_model_info_reflects_training_state() {
    let dir = TempDir::new().unwrap();
    let predictor = predictor_for(seeded_store(60), &dir);

    let before = predictor.model_info();
    assert!(!before.is_trained);
    assert!(before.last_trained.is_none());
    assert_eq!(before.model_type, "RandomForest");

    predictor.train().unwrap();
    let after = predictor.model_info();
    assert!(after.is_trained);
    assert!(after.last_trained.is_some());
    assert!(after.version.starts_with("1.0."));
    assert_eq!(after.features, FEATURE_NAMES.to_vec());
}

#[test]
fn test_persisted_model_survives_restart() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(60);

    let first = predictor_for(store.clone(), &dir);
    first.train().unwrap();
    let trained_version = first.model_info().version;
    let original = first.predict(1, 7).unwrap();

    // A fresh predictor over the same registry reloads the artifact set
    let second = predictor_for(store, &dir);
    assert!(second.is_trained());
    assert_eq!(second.model_info().version, trained_version);

    let reloaded = second.predict(1, 7).unwrap();
    assert_eq!(
        original.predicted_quantity.to_bits(),
        reloaded.predicted_quantity.to_bits()
    );
}

#[test]
fn test_corrupt_artifacts_degrade_to_unloaded() {
    let dir = TempDir::new().unwrap();
    for name in ["forest.json", "scaler.json", "encoders.json", "metadata.json"] {
        std::fs::write(dir.path().join(name), b"garbage").unwrap();
    }

    // Construction must not fail; the model just starts unloaded
    let predictor = predictor_for(seeded_store(60), &dir);
    assert!(!predictor.is_trained());
}

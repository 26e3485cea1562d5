use assert_approx_eq::assert_approx_eq;
use demand_forecast::error::ForecastError;
use demand_forecast::metrics::{regression_metrics, train_test_split, TrainingReport};

#[test]
fn test_regression_metrics_known_values() {
    let actual = [3.0, -0.5, 2.0, 7.0];
    let predicted = [2.5, 0.0, 2.0, 8.0];

    let metrics = regression_metrics(&actual, &predicted).unwrap();
    assert_approx_eq!(metrics.mae, 0.5);
    assert_approx_eq!(metrics.mse, 0.375);
    assert_approx_eq!(metrics.r2, 0.9486, 1e-4);
}

#[test]
fn test_perfect_prediction_scores_one() {
    let values = [1.0, 2.0, 3.0];
    let metrics = regression_metrics(&values, &values).unwrap();
    assert_eq!(metrics.mae, 0.0);
    assert_eq!(metrics.mse, 0.0);
    assert_eq!(metrics.r2, 1.0);
}

#[test]
fn test_constant_targets_guard_r2_denominator() {
    let actual = [4.0, 4.0, 4.0];

    let exact = regression_metrics(&actual, &[4.0, 4.0, 4.0]).unwrap();
    assert_eq!(exact.r2, 1.0);

    let off = regression_metrics(&actual, &[3.0, 4.0, 5.0]).unwrap();
    assert_eq!(off.r2, 0.0);
    assert!(off.r2.is_finite());
}

#[test]
fn test_length_mismatch_rejected() {
    let result = regression_metrics(&[1.0, 2.0], &[1.0]);
    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
    assert!(regression_metrics(&[], &[]).is_err());
}

#[test]
fn test_split_sizes_and_disjointness() {
    let features: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64]).collect();
    let targets: Vec<f64> = (0..100).map(|i| i as f64).collect();

    let (train_x, train_y, test_x, test_y) =
        train_test_split(&features, &targets, 0.2, 42).unwrap();

    assert_eq!(train_x.len(), 80);
    assert_eq!(test_x.len(), 20);
    assert_eq!(train_y.len(), 80);
    assert_eq!(test_y.len(), 20);

    // Every row lands in exactly one side
    let mut all: Vec<f64> = train_y.iter().chain(test_y.iter()).copied().collect();
    all.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(all, targets);
}

#[test]
fn test_split_is_reproducible_for_a_seed() {
    let features: Vec<Vec<f64>> = (0..60).map(|i| vec![i as f64]).collect();
    let targets: Vec<f64> = (0..60).map(|i| i as f64).collect();

    let first = train_test_split(&features, &targets, 0.2, 42).unwrap();
    let second = train_test_split(&features, &targets, 0.2, 42).unwrap();
    assert_eq!(first.1, second.1);
    assert_eq!(first.3, second.3);

    // A different seed shuffles differently
    let third = train_test_split(&features, &targets, 0.2, 43).unwrap();
    assert_ne!(first.3, third.3);
}

#[test]
fn test_split_rejects_bad_ratio() {
    let features = vec![vec![1.0], vec![2.0]];
    let targets = vec![1.0, 2.0];
    assert!(train_test_split(&features, &targets, 0.0, 42).is_err());
    assert!(train_test_split(&features, &targets, 1.0, 42).is_err());
}

#[test]
fn test_training_report_display() {
    let report = TrainingReport {
        mae: 1.25,
        mse: 2.5,
        r2: 0.75,
        train_count: 80,
        test_count: 20,
    };
    let rendered = format!("{report}");
    assert!(rendered.contains("MAE:   1.2500"));
    assert!(rendered.contains("Train: 80"));
    assert!(rendered.contains("Test:  20"));
}

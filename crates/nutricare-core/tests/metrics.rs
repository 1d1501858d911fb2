use nutricare_core::metrics::{
    DerivedMetrics, adjusted_weight, bmi, ideal_weight, weight_loss_percent,
};
use nutricare_core::models::{HistoricalWeights, Sex};

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 0.01)
}

#[test]
fn bmi_matches_formula() {
    assert!(close(bmi(70.0, 175.0), 22.86));
    assert!(close(bmi(80.0, 160.0), 31.25));
    assert!(close(bmi(52.5, 168.0), 18.6));
}

#[test]
fn bmi_empty_on_non_positive_inputs() {
    assert_eq!(bmi(0.0, 175.0), None);
    assert_eq!(bmi(70.0, 0.0), None);
    assert_eq!(bmi(-70.0, 175.0), None);
    assert_eq!(bmi(70.0, -175.0), None);
}

#[test]
fn ideal_weight_varies_by_sex() {
    // 175 - 100 - (175 - 150) / 4
    assert!(close(ideal_weight(175.0, Sex::Male), 68.75));
    // 160 - 100 - (160 - 150) / 2.5
    assert!(close(ideal_weight(160.0, Sex::Female), 56.0));
}

#[test]
fn ideal_weight_invalid_heights() {
    assert_eq!(ideal_weight(0.0, Sex::Male), None);
    assert_eq!(ideal_weight(-170.0, Sex::Female), None);
    // Formula goes negative for very short heights.
    assert_eq!(ideal_weight(50.0, Sex::Male), None);
}

#[test]
fn adjusted_weight_kicks_in_above_120_percent() {
    // 100 > 70 * 1.2, so 70 + 0.4 * 30
    assert!(close(adjusted_weight(100.0, 70.0), 82.0));
    // 70 < 68.75 * 1.2 = 82.5, actual weight stands
    assert!(close(adjusted_weight(70.0, 68.75), 70.0));
    // Exactly at the threshold: not above, actual weight stands
    assert!(close(adjusted_weight(84.0, 70.0), 84.0));
}

#[test]
fn adjusted_weight_requires_positive_inputs() {
    assert_eq!(adjusted_weight(0.0, 70.0), None);
    assert_eq!(adjusted_weight(70.0, 0.0), None);
}

#[test]
fn weight_loss_reports_loss_only() {
    assert!(close(weight_loss_percent(80.0, 72.0), 10.0));
    assert!(close(weight_loss_percent(75.0, 70.0), 6.67));
    // Stable or gained: empty, never negative
    assert_eq!(weight_loss_percent(70.0, 70.0), None);
    assert_eq!(weight_loss_percent(70.0, 75.0), None);
    assert_eq!(weight_loss_percent(0.0, 70.0), None);
    assert_eq!(weight_loss_percent(70.0, 0.0), None);
}

#[test]
fn compute_is_idempotent() {
    let historical = HistoricalWeights {
        one_month: Some(72.0),
        three_month: Some(76.0),
        ..Default::default()
    };
    let first = DerivedMetrics::compute(Some(70.0), Some(175.0), Some(Sex::Male), Some(&historical));
    let second =
        DerivedMetrics::compute(Some(70.0), Some(175.0), Some(Sex::Male), Some(&historical));
    assert_eq!(first, second);
}

#[test]
fn compute_bundles_all_metrics() {
    let historical = HistoricalWeights {
        one_month: Some(72.0),
        six_month: Some(80.0),
        ..Default::default()
    };
    let metrics =
        DerivedMetrics::compute(Some(70.0), Some(175.0), Some(Sex::Male), Some(&historical));

    assert!(close(metrics.bmi, 22.86));
    assert!(close(metrics.ideal_weight, 68.75));
    assert!(close(metrics.adjusted_weight, 70.0));
    assert!(close(metrics.weight_loss.one_month, 2.78));
    assert!(close(metrics.weight_loss.six_month, 12.5));
    assert_eq!(metrics.weight_loss.two_month, None);
    assert_eq!(metrics.weight_loss.three_month, None);
}

#[test]
fn compute_with_missing_inputs_empties_dependents() {
    let metrics = DerivedMetrics::compute(Some(70.0), None, Some(Sex::Male), None);
    assert_eq!(metrics.bmi, None);
    assert_eq!(metrics.ideal_weight, None);
    assert_eq!(metrics.adjusted_weight, None);

    let metrics = DerivedMetrics::compute(Some(70.0), Some(175.0), None, None);
    assert!(close(metrics.bmi, 22.86));
    // Sex is required for the ideal-weight variant.
    assert_eq!(metrics.ideal_weight, None);
    assert_eq!(metrics.adjusted_weight, None);
}

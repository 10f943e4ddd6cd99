use approx::assert_relative_eq;
use price_forecast::metrics::{evaluate, ConfidenceInterval};
use rstest::rstest;

#[test]
fn test_evaluate_holdout() {
    let actual = [100.0, 110.0, 120.0, 130.0];
    let predicted = [102.0, 108.0, 123.0, 127.0];

    let metrics = evaluate(&predicted, &actual).unwrap();

    assert_relative_eq!(metrics.mae, 2.5);
    // ss_res = 4 + 4 + 9 + 9, ss_tot = 500
    assert_relative_eq!(metrics.r2_score, 1.0 - 26.0 / 500.0, epsilon = 1e-12);
    assert_relative_eq!(metrics.accuracy, (1.0 - 2.5 / 115.0) * 100.0, epsilon = 1e-9);

    let text = metrics.to_string();
    assert!(text.contains("MAE:       2.5000"));
}

#[rstest]
#[case(120.0, 4.0, 114.0, 126.0)]
#[case(3.0, 4.0, 0.0, 9.0)]
#[case(50.0, 0.0, 50.0, 50.0)]
fn test_interval_bounds(
    #[case] predicted: f64,
    #[case] mae: f64,
    #[case] lower: f64,
    #[case] upper: f64,
) {
    let interval = ConfidenceInterval::from_error(predicted, mae, 1.5);
    assert_relative_eq!(interval.lower, lower);
    assert_relative_eq!(interval.upper, upper);
    assert!(interval.contains(predicted));
}

#[test]
fn test_evaluate_rejects_mismatched_lengths() {
    assert!(evaluate(&[1.0, 2.0], &[1.0]).is_err());
}

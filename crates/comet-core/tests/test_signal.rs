use comet_core::analysis::signal::{detect_head_edge, moving_average, second_derivative};

#[test]
fn test_plateau_edge_is_at_rise() {
    let profile = [0.0, 0.0, 0.0, 5.0, 5.0, 5.0, 5.0, 5.0, 0.0, 0.0, 0.0];
    assert_eq!(detect_head_edge(&profile, 1), 3);
}

#[test]
fn test_flat_profile_spans_everything() {
    // A constant profile has no zero crossing, so the first interior sample
    // of the all-zero second derivative is taken.
    let profile = [7.0; 12];
    assert_eq!(detect_head_edge(&profile, 3), 1);
}

#[test]
fn test_too_short_profile_falls_back_to_length() {
    assert_eq!(detect_head_edge(&[1.0, 2.0], 1), 2);
    assert_eq!(detect_head_edge(&[], 1), 0);
}

#[test]
fn test_second_derivative_length() {
    let profile: Vec<f64> = (0..20).map(|i| (i * i) as f64).collect();
    let d = second_derivative(&profile, 1);
    assert_eq!(d.len(), 18);
    // Second difference of i^2 is constant 2.
    assert!(d.iter().all(|&v| (v - 2.0).abs() < 1e-9));
}

#[test]
fn test_moving_average_even_window() {
    // Window 2 averages each sample with its left neighbor.
    let out = moving_average(&[2.0, 4.0, 6.0], 2);
    assert_eq!(out, vec![2.0, 3.0, 5.0]);
}

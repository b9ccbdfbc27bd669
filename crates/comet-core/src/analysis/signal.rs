//! 1-D filtering of column intensity profiles and head-edge detection.

/// Centered moving average over `window` taps. Taps outside the signal are
/// dropped and the average is taken over those that remain.
///
/// For even windows the extra tap sits on the left.
pub fn moving_average(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let n = signal.len() as isize;
    let radius = (window / 2) as isize;

    (0..n)
        .map(|i| {
            let start = (i - radius).max(0);
            let end = (i - radius + window as isize).min(n);
            let taps = &signal[start as usize..end as usize];
            taps.iter().sum::<f64>() / taps.len() as f64
        })
        .collect()
}

/// Unpadded convolution with `kernel`: output `i` is
/// `sum_j kernel[j] * signal[i + j]`, length `n + 1 - kernel.len()`.
pub fn convolve_valid(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if kernel.is_empty() || signal.len() < kernel.len() {
        return Vec::new();
    }
    signal
        .windows(kernel.len())
        .map(|w| w.iter().zip(kernel).map(|(x, k)| x * k).sum())
        .collect()
}

/// Forward difference (`[-1, 1]` kernel), one element shorter than the input.
pub fn difference(signal: &[f64]) -> Vec<f64> {
    convolve_valid(signal, &[-1.0, 1.0])
}

/// Smooth, difference, smooth, difference, smooth.
pub fn second_derivative(profile: &[f64], window: usize) -> Vec<f64> {
    let y1 = moving_average(profile, window);
    let y2 = difference(&y1);
    let y3 = moving_average(&y2, window);
    let y4 = difference(&y3);
    moving_average(&y4, window)
}

/// First index `i` where the signal turns from negative to non-negative
/// (`d[i] < 0 && d[i + 1] >= 0`).
pub fn zero_crossing(d: &[f64]) -> Option<usize> {
    d.windows(2).position(|w| w[0] < 0.0 && w[1] >= 0.0)
}

/// First interior local maximum (`d[i-1] <= d[i] >= d[i+1]`) at or after
/// `start`, never before index 1.
pub fn first_local_max(d: &[f64], start: usize) -> Option<usize> {
    let from = start.max(1);
    (from..d.len().saturating_sub(1)).find(|&i| d[i - 1] <= d[i] && d[i + 1] <= d[i])
}

/// Head edge position along a column profile.
///
/// The edge is the first peak of the smoothed second derivative after it
/// crosses zero from below. Without such a peak the head spans the whole
/// profile and `profile.len()` is returned.
pub fn detect_head_edge(profile: &[f64], window: usize) -> usize {
    let d = second_derivative(profile, window);
    let start = zero_crossing(&d).unwrap_or(0);
    first_local_max(&d, start).unwrap_or(profile.len())
}

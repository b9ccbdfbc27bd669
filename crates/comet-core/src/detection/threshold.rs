use ndarray::Array2;

use crate::consts::HISTOGRAM_BINS;
use crate::plane::GrayPlane;

use super::config::ThresholdMethod;

/// Compute the threshold level for a 256-bin histogram.
///
/// Foreground is every pixel strictly above the returned level. Methods that
/// fail to converge, and empty histograms, yield level 0.
pub fn auto_threshold(histogram: &[u64; HISTOGRAM_BINS], method: ThresholdMethod) -> u8 {
    if let ThresholdMethod::Fixed(level) = method {
        return level;
    }

    let data: Vec<f64> = histogram.iter().map(|&c| c as f64).collect();
    if data.iter().sum::<f64>() == 0.0 {
        return 0;
    }

    let level = match method {
        ThresholdMethod::Triangle => triangle(&data),
        ThresholdMethod::Huang => huang(&data),
        ThresholdMethod::Percentile => percentile(&data),
        ThresholdMethod::Yen => yen(&data),
        ThresholdMethod::Mean => mean(&data),
        ThresholdMethod::Otsu => otsu(&data),
        ThresholdMethod::Li => li(&data),
        ThresholdMethod::Intermodes => intermodes(&data),
        ThresholdMethod::IsoData => iso_data(&data),
        ThresholdMethod::MaxEntropy => max_entropy(&data),
        ThresholdMethod::Moments => moments(&data),
        ThresholdMethod::Fixed(level) => level as i32,
    };
    level.clamp(0, 255) as u8
}

/// Foreground mask of a plane: pixels strictly above `level`.
pub fn threshold_mask(plane: &GrayPlane, level: u8) -> Array2<bool> {
    plane.data.mapv(|v| v > level)
}

/// Zack's triangle method, evaluated on the longer side of the peak.
fn triangle(hist: &[f64]) -> i32 {
    let n = hist.len();
    let mut data = hist.to_vec();

    let mut min = data.iter().position(|&v| v > 0.0).unwrap_or(0);
    if min > 0 {
        min -= 1;
    }
    let mut min2 = (1..n).rev().find(|&i| data[i] > 0.0).unwrap_or(0);
    if min2 < n - 1 {
        min2 += 1;
    }
    let mut max = 0;
    let mut dmax = 0.0;
    for (i, &v) in data.iter().enumerate() {
        if v > dmax {
            max = i;
            dmax = v;
        }
    }

    let inverted = (max as i64 - min as i64) < (min2 as i64 - max as i64);
    if inverted {
        data.reverse();
        min = n - 1 - min2;
        max = n - 1 - max;
    }
    if min == max {
        return min as i32;
    }

    let mut nx = data[max];
    let mut ny = min as f64 - max as f64;
    let d = (nx * nx + ny * ny).sqrt();
    nx /= d;
    ny /= d;
    let d = nx * min as f64 + ny * data[min];

    let mut split = min;
    let mut split_distance = 0.0;
    for (i, &v) in data.iter().enumerate().take(max + 1).skip(min + 1) {
        let distance = nx * i as f64 + ny * v - d;
        if distance > split_distance {
            split = i;
            split_distance = distance;
        }
    }
    let split = split as i32 - 1;

    if inverted {
        n as i32 - 1 - split
    } else {
        split
    }
}

/// Huang's fuzzy-entropy method.
fn huang(data: &[f64]) -> i32 {
    let n = data.len();
    let first = data.iter().position(|&v| v != 0.0).unwrap_or(0);
    let last = (first..n).rev().find(|&i| data[i] != 0.0).unwrap_or(n - 1);
    if first == last {
        return first as i32;
    }
    let term = 1.0 / (last - first) as f64;

    let mut mu_0 = vec![0.0; n];
    let (mut sum_pix, mut num_pix) = (0.0, 0.0);
    for ih in first..n {
        sum_pix += ih as f64 * data[ih];
        num_pix += data[ih];
        mu_0[ih] = sum_pix / num_pix;
    }

    let mut mu_1 = vec![0.0; n];
    let (mut sum_pix, mut num_pix) = (0.0, 0.0);
    for ih in (1..=last).rev() {
        sum_pix += ih as f64 * data[ih];
        num_pix += data[ih];
        mu_1[ih - 1] = if num_pix > 0.0 { sum_pix / num_pix } else { 0.0 };
    }

    let fuzzy = |count: f64, ih: usize, mu: f64| -> f64 {
        let mu_x = 1.0 / (1.0 + term * (ih as f64 - mu).abs());
        if !(1e-6..=0.999_999).contains(&mu_x) {
            return 0.0;
        }
        count * (-mu_x * mu_x.ln() - (1.0 - mu_x) * (1.0 - mu_x).ln())
    };

    let mut threshold = -1;
    let mut min_ent = f64::MAX;
    for it in 0..n {
        let mut ent = 0.0;
        for ih in 0..=it {
            ent += fuzzy(data[ih], ih, mu_0[it]);
        }
        for ih in it + 1..n {
            ent += fuzzy(data[ih], ih, mu_1[it]);
        }
        if ent < min_ent {
            min_ent = ent;
            threshold = it as i32;
        }
    }
    threshold
}

/// Level closest to 50% cumulative coverage.
fn percentile(data: &[f64]) -> i32 {
    let total: f64 = data.iter().sum();
    let mut threshold = -1;
    let mut best = 1.0;
    let mut cumulative = 0.0;
    for (i, &v) in data.iter().enumerate() {
        cumulative += v;
        let deviation = (cumulative / total - 0.5).abs();
        if deviation < best {
            best = deviation;
            threshold = i as i32;
        }
    }
    threshold
}

/// Yen's maximum correlation criterion.
fn yen(data: &[f64]) -> i32 {
    let n = data.len();
    let total: f64 = data.iter().sum();
    let norm: Vec<f64> = data.iter().map(|&v| v / total).collect();

    let mut p1 = vec![0.0; n];
    let mut p1_sq = vec![0.0; n];
    let mut p2_sq = vec![0.0; n];
    p1[0] = norm[0];
    p1_sq[0] = norm[0] * norm[0];
    for ih in 1..n {
        p1[ih] = p1[ih - 1] + norm[ih];
        p1_sq[ih] = p1_sq[ih - 1] + norm[ih] * norm[ih];
    }
    for ih in (0..n - 1).rev() {
        p2_sq[ih] = p2_sq[ih + 1] + norm[ih + 1] * norm[ih + 1];
    }

    let safe_ln = |v: f64| if v > 0.0 { v.ln() } else { 0.0 };
    let mut threshold = -1;
    let mut max_crit = f64::MIN_POSITIVE;
    for it in 0..n {
        let crit = -safe_ln(p1_sq[it] * p2_sq[it]) + 2.0 * safe_ln(p1[it] * (1.0 - p1[it]));
        if crit > max_crit {
            max_crit = crit;
            threshold = it as i32;
        }
    }
    threshold
}

/// Mean gray level, floored.
fn mean(data: &[f64]) -> i32 {
    let total: f64 = data.iter().sum();
    let sum: f64 = data.iter().enumerate().map(|(i, &v)| i as f64 * v).sum();
    (sum / total).floor() as i32
}

/// Otsu's between-class variance maximum; ties resolve to the highest level.
fn otsu(data: &[f64]) -> i32 {
    let total: f64 = data.iter().sum();
    let moment: f64 = data.iter().enumerate().map(|(i, &v)| i as f64 * v).sum();

    let mut k_star = 0;
    let mut n1 = 0.0;
    let mut sk = 0.0;
    let mut bcv_max = 0.0;
    for (k, &v) in data.iter().enumerate() {
        sk += k as f64 * v;
        n1 += v;
        let denom = n1 * (total - n1);
        let bcv = if denom != 0.0 {
            let num = (n1 / total) * moment - sk;
            num * num / denom
        } else {
            0.0
        };
        if bcv >= bcv_max {
            bcv_max = bcv;
            k_star = k as i32;
        }
    }
    k_star
}

/// Li's iterative minimum cross-entropy.
fn li(data: &[f64]) -> i32 {
    const TOLERANCE: f64 = 0.5;
    const MAX_ITERATIONS: usize = 1000;

    let total: f64 = data.iter().sum();
    let mean = data
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &v)| i as f64 * v)
        .sum::<f64>()
        / total;

    let mut new_thresh = mean;
    let mut threshold = 0;
    for _ in 0..MAX_ITERATIONS {
        let old_thresh = new_thresh;
        threshold = ((old_thresh + 0.5) as i32).clamp(0, 255);
        let split = threshold as usize + 1;

        let class_mean = |range: std::ops::Range<usize>| -> f64 {
            let (sum, count) = range.fold((0.0, 0.0), |(s, c), i| (s + i as f64 * data[i], c + data[i]));
            if count == 0.0 {
                0.0
            } else {
                sum / count
            }
        };
        let mean_back = class_mean(0..split);
        let mean_obj = class_mean(split..data.len());

        let temp = (mean_back - mean_obj) / (mean_back.ln() - mean_obj.ln());
        new_thresh = if temp < -f64::EPSILON {
            (temp - 0.5).trunc()
        } else {
            (temp + 0.5).trunc()
        };
        // NaN ends the iteration as well.
        if !((new_thresh - old_thresh).abs() > TOLERANCE) {
            break;
        }
    }
    threshold
}

fn is_bimodal(hist: &[f64]) -> bool {
    let mut modes = 0;
    for k in 1..hist.len() - 1 {
        if hist[k - 1] < hist[k] && hist[k + 1] < hist[k] {
            modes += 1;
            if modes > 2 {
                return false;
            }
        }
    }
    modes == 2
}

/// Smooth until exactly two peaks remain; the level is their midpoint.
fn intermodes(data: &[f64]) -> i32 {
    const MAX_ITERATIONS: usize = 10_000;

    let n = data.len();
    let mut hist = data.to_vec();
    let mut iterations = 0;
    while !is_bimodal(&hist) {
        let (mut current, mut next) = (0.0, hist[0]);
        for i in 0..n - 1 {
            let previous = current;
            current = next;
            next = hist[i + 1];
            hist[i] = (previous + current + next) / 3.0;
        }
        hist[n - 1] = (current + next) / 3.0;
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            return -1;
        }
    }

    let peaks: usize = (1..n - 1)
        .filter(|&i| hist[i - 1] < hist[i] && hist[i + 1] < hist[i])
        .sum();
    (peaks as f64 / 2.0).floor() as i32
}

/// Ridler-Calvard iterative intermeans.
fn iso_data(data: &[f64]) -> i32 {
    let n = data.len();
    let mut g = match (1..n).find(|&i| data[i] > 0.0) {
        Some(i) => i + 1,
        None => 0,
    };

    loop {
        let (mut low, mut total_low) = (0.0, 0.0);
        for (i, &v) in data.iter().enumerate().take(g + 1) {
            total_low += v;
            low += v * i as f64;
        }
        let (mut high, mut total_high) = (0.0, 0.0);
        for (i, &v) in data.iter().enumerate().skip(g + 1) {
            total_high += v;
            high += v * i as f64;
        }
        if total_low > 0.0 && total_high > 0.0 {
            let low = (low / total_low).floor();
            let high = (high / total_high).floor();
            if g as f64 == ((low + high) / 2.0).round() {
                break;
            }
        }
        g += 1;
        if g > n - 2 {
            return -1;
        }
    }
    g as i32
}

/// Kapur-Sahoo-Wong maximum entropy.
fn max_entropy(data: &[f64]) -> i32 {
    let n = data.len();
    let total: f64 = data.iter().sum();
    let norm: Vec<f64> = data.iter().map(|&v| v / total).collect();

    let mut p1 = vec![0.0; n];
    let mut p2 = vec![0.0; n];
    p1[0] = norm[0];
    p2[0] = 1.0 - p1[0];
    for ih in 1..n {
        p1[ih] = p1[ih - 1] + norm[ih];
        p2[ih] = 1.0 - p1[ih];
    }

    let first = (0..n).find(|&i| p1[i].abs() >= f64::EPSILON).unwrap_or(0);
    let last = (first..n)
        .rev()
        .find(|&i| p2[i].abs() >= f64::EPSILON)
        .unwrap_or(n - 1);

    let mut threshold = -1;
    let mut max_ent = 0.0;
    for it in first..=last {
        let mut ent_back = 0.0;
        for ih in 0..=it {
            if data[ih] != 0.0 {
                let p = norm[ih] / p1[it];
                ent_back -= p * p.ln();
            }
        }
        let mut ent_obj = 0.0;
        for ih in it + 1..n {
            if data[ih] != 0.0 {
                let p = norm[ih] / p2[it];
                ent_obj -= p * p.ln();
            }
        }
        let total_ent = ent_back + ent_obj;
        if max_ent < total_ent {
            max_ent = total_ent;
            threshold = it as i32;
        }
    }
    threshold
}

/// Tsai's moment-preserving threshold.
fn moments(data: &[f64]) -> i32 {
    let total: f64 = data.iter().sum();
    let hist: Vec<f64> = data.iter().map(|&v| v / total).collect();

    let m0 = 1.0;
    let (mut m1, mut m2, mut m3) = (0.0, 0.0, 0.0);
    for (i, &p) in hist.iter().enumerate() {
        let di = i as f64;
        m1 += di * p;
        m2 += di * di * p;
        m3 += di * di * di * p;
    }

    let cd = m0 * m2 - m1 * m1;
    let c0 = (-m2 * m2 + m1 * m3) / cd;
    let c1 = (m0 * -m3 + m2 * m1) / cd;
    let root = (c1 * c1 - 4.0 * c0).sqrt();
    let z0 = 0.5 * (-c1 - root);
    let z1 = 0.5 * (-c1 + root);
    let p0 = (z1 - m1) / (z1 - z0);

    let mut sum = 0.0;
    for (i, &p) in hist.iter().enumerate() {
        sum += p;
        if sum > p0 {
            return i as i32;
        }
    }
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_level_passes_through() {
        let hist = [0u64; HISTOGRAM_BINS];
        assert_eq!(auto_threshold(&hist, ThresholdMethod::Fixed(77)), 77);
    }

    #[test]
    fn test_empty_histogram_is_zero() {
        let hist = [0u64; HISTOGRAM_BINS];
        assert_eq!(auto_threshold(&hist, ThresholdMethod::Otsu), 0);
    }

    #[test]
    fn test_mask_is_strictly_above_level() {
        let plane = GrayPlane::new(ndarray::array![[10u8, 50, 51], [0, 255, 50]]);
        let mask = threshold_mask(&plane, 50);
        assert_eq!(mask, ndarray::array![[false, false, true], [false, true, false]]);
    }
}

use comet_core::detection::threshold::{auto_threshold, threshold_mask};
use comet_core::detection::ThresholdMethod;
use comet_core::plane::GrayPlane;
use ndarray::Array2;

/// Dark background peak at 40 and a smaller bright peak at 200.
fn bimodal_histogram() -> [u64; 256] {
    let mut hist = [0u64; 256];
    for (v, count) in hist.iter_mut().enumerate() {
        let v = v as f64;
        let dark = 1000.0 * (-(v - 40.0).powi(2) / (2.0 * 64.0)).exp();
        let bright = 300.0 * (-(v - 200.0).powi(2) / (2.0 * 100.0)).exp();
        *count = dark.round() as u64 + bright.round() as u64;
    }
    hist
}

#[test]
fn test_automatic_methods_separate_the_peaks() {
    let hist = bimodal_histogram();
    for method in [
        ThresholdMethod::Triangle,
        ThresholdMethod::Huang,
        ThresholdMethod::Yen,
        ThresholdMethod::Mean,
        ThresholdMethod::Otsu,
        ThresholdMethod::Li,
        ThresholdMethod::Intermodes,
        ThresholdMethod::IsoData,
        ThresholdMethod::MaxEntropy,
        ThresholdMethod::Moments,
    ] {
        let level = auto_threshold(&hist, method);
        assert!(
            level > 45 && level < 195,
            "{method} gave {level}, expected a level between the peaks"
        );
    }
}

#[test]
fn test_percentile_splits_pixel_count() {
    let hist = bimodal_histogram();
    let level = auto_threshold(&hist, ThresholdMethod::Percentile) as usize;
    let total: u64 = hist.iter().sum();
    let below: u64 = hist[..=level].iter().sum();
    // Half the pixels sit in the dark peak's lower part.
    assert!(below as f64 >= 0.4 * total as f64);
    assert!(level < 60);
}

#[test]
fn test_single_level_image() {
    let mut hist = [0u64; 256];
    hist[77] = 500;
    // Every method must produce a valid level without panicking.
    for method in [
        ThresholdMethod::Triangle,
        ThresholdMethod::Huang,
        ThresholdMethod::Percentile,
        ThresholdMethod::Yen,
        ThresholdMethod::Mean,
        ThresholdMethod::Otsu,
        ThresholdMethod::Li,
        ThresholdMethod::Intermodes,
        ThresholdMethod::IsoData,
        ThresholdMethod::MaxEntropy,
        ThresholdMethod::Moments,
    ] {
        let _ = auto_threshold(&hist, method);
    }
}

#[test]
fn test_mask_is_strictly_above_level() {
    let data = Array2::from_shape_vec((1, 4), vec![9u8, 10, 11, 200]).unwrap();
    let mask = threshold_mask(&GrayPlane::new(data), 10);
    assert_eq!(mask.iter().copied().collect::<Vec<_>>(), vec![false, false, true, true]);
}

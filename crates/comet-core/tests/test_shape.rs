mod common;

use comet_core::analysis::shape::measure_shape;
use comet_core::analysis::validity::{classify, RuleContext};
use comet_core::analysis::{AnalysisEvent, DecisionLog, ValidityConfig};
use comet_core::comet::CometStatus;
use comet_core::geometry::{Rect, Region};

use common::flat_plane;

#[test]
fn test_disk_is_nearly_circular() {
    let plane = flat_plane(100, 100, 50);
    let disk = Region::ellipse(Rect::new(30, 30, 41, 41));
    let shape = measure_shape(&disk, &plane);

    assert!(shape.circularity > 0.9, "circularity {}", shape.circularity);
    assert!(shape.circularity < 1.1, "circularity {}", shape.circularity);
    assert!(shape.convexity > 0.95);
}

#[test]
fn test_mirror_symmetric_disk_has_low_symmetry() {
    let plane = flat_plane(100, 100, 50);
    let disk = Region::ellipse(Rect::new(30, 30, 41, 41));
    let shape = measure_shape(&disk, &plane);

    assert_eq!(shape.front_y, 50);
    // Only the front row itself tips each column to "below".
    assert!(shape.symmetry < 0.05, "symmetry {}", shape.symmetry);
    assert_eq!(shape.centerline_diff, 0.0);
}

#[test]
fn test_empty_boundary_has_zero_convexity_and_is_invalid() {
    let plane = flat_plane(100, 100, 50);
    let shape = measure_shape(&Region::empty(), &plane);
    assert_eq!(shape.area_convex_hull, 0);
    assert_eq!(shape.convexity, 0.0);
    assert_eq!(shape.circularity, 0.0);

    let config = ValidityConfig::default();
    let ctx = RuleContext {
        config: &config,
        image_width: 100,
        image_height: 100,
    };
    let log = DecisionLog::new();
    assert_eq!(
        classify(&shape, &ctx, CometStatus::Valid, 0, &log),
        CometStatus::InvalidSize
    );
    assert!(matches!(
        log.events().first(),
        Some(AnalysisEvent::RuleApplied { rule: "convexity", .. })
    ));
}

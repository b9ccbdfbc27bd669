mod common;

use comet_core::analysis::events::HeadRejection;
use comet_core::analysis::head::locate_head;
use comet_core::analysis::shape::measure_shape;
use comet_core::analysis::{AnalysisEvent, DecisionLog, HeadFinding, HeadStage};

use common::{block, flat_plane};

/// 60 x 20 comet at (20, 20) of level 50 with a 10-column bright block
/// starting `offset` columns in.
fn banded_comet(offset: i32) -> (comet_core::geometry::Region, comet_core::plane::GrayPlane) {
    let mut plane = flat_plane(100, 60, 0);
    let boundary = block(20, 20, 60, 20);
    for (x, y) in boundary.pixels() {
        let col = x - 20;
        let v = if col >= offset && col < offset + 10 { 200 } else { 50 };
        plane.put(x, y, v);
    }
    (boundary, plane)
}

#[test]
fn test_brightest_region_at_front() {
    let (boundary, plane) = banded_comet(0);
    let shape = measure_shape(&boundary, &plane);
    let log = DecisionLog::new();

    let head = locate_head(0, &boundary, &shape, &plane, HeadFinding::Brightest, &log).unwrap();
    assert_eq!(head.stage, HeadStage::Brightest);
    assert_eq!(head.radius, 10);
    assert_eq!(head.region.bounds().x, 20);
    assert!(head.region.subtract(&boundary).is_empty());
    assert_eq!(
        log.events(),
        vec![AnalysisEvent::HeadFound {
            index: 0,
            stage: HeadStage::Brightest,
            radius: 10
        }]
    );
}

#[test]
fn test_displaced_bright_region_is_rejected() {
    let (boundary, plane) = banded_comet(50);
    let shape = measure_shape(&boundary, &plane);
    let log = DecisionLog::new();

    let head = locate_head(3, &boundary, &shape, &plane, HeadFinding::Brightest, &log);
    assert!(head.is_none());
    assert_eq!(
        log.events(),
        vec![AnalysisEvent::HeadRejected {
            index: 3,
            stage: HeadStage::Brightest,
            reason: HeadRejection::Displaced
        }]
    );
}

#[test]
fn test_auto_falls_back_to_profile() {
    let (boundary, plane) = banded_comet(50);
    let shape = measure_shape(&boundary, &plane);
    let log = DecisionLog::new();

    locate_head(0, &boundary, &shape, &plane, HeadFinding::Auto, &log);
    let events = log.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events[1],
        AnalysisEvent::HeadFound {
            stage: HeadStage::Profile,
            ..
        } | AnalysisEvent::HeadRejected {
            stage: HeadStage::Profile,
            ..
        }
    ));
}

#[test]
fn test_profile_head_lies_within_comet() {
    // Bright front half fading into a dim tail.
    let mut plane = flat_plane(100, 60, 0);
    let boundary = block(20, 20, 60, 20);
    for (x, y) in boundary.pixels() {
        plane.put(x, y, if x < 40 { 200 } else { 40 });
    }
    let shape = measure_shape(&boundary, &plane);

    let head = locate_head(0, &boundary, &shape, &plane, HeadFinding::Profile, &DecisionLog::new());
    if let Some(head) = head {
        assert_eq!(head.stage, HeadStage::Profile);
        assert!(head.region.subtract(&boundary).is_empty());
        assert_eq!(head.region.bounds().x, 20);
    }
}

#[test]
fn test_bright_streak_falls_back_to_profile() {
    // 60 x 20 comet of level 50 with a 3-row bright streak along its front
    // half. The rectangle is far from circular and the bright span is much
    // wider than tall.
    let mut plane = flat_plane(100, 60, 0);
    let boundary = block(20, 20, 60, 20);
    for (x, y) in boundary.pixels() {
        let bright = (29..32).contains(&y) && x < 50;
        plane.put(x, y, if bright { 200 } else { 50 });
    }
    let shape = measure_shape(&boundary, &plane);
    assert!(shape.circularity < 0.9);

    let log = DecisionLog::new();
    locate_head(0, &boundary, &shape, &plane, HeadFinding::Auto, &log);
    let events = log.events();

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        AnalysisEvent::HeadRejected {
            index: 0,
            stage: HeadStage::Brightest,
            reason: HeadRejection::Streak
        }
    );
    assert!(matches!(
        events[1],
        AnalysisEvent::HeadFound {
            stage: HeadStage::Profile,
            ..
        } | AnalysisEvent::HeadRejected {
            stage: HeadStage::Profile,
            ..
        }
    ));
}

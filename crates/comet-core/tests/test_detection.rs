mod common;

use comet_core::detection::components::{connected_components, extract_particles};
use comet_core::detection::morphology::opening;
use comet_core::detection::{segment_comets, ParticleFilter, SegmentationConfig, ThresholdMethod};
use ndarray::Array2;

use common::{draw_ellipse, flat_plane, two_comet_plane, BACKGROUND};

fn filled(mask: &mut Array2<bool>, rows: std::ops::Range<usize>, cols: std::ops::Range<usize>) {
    for r in rows {
        for c in cols.clone() {
            mask[[r, c]] = true;
        }
    }
}

#[test]
fn test_components_in_discovery_order() {
    let mut mask = Array2::from_elem((20, 20), false);
    filled(&mut mask, 10..15, 2..6);
    filled(&mut mask, 2..4, 12..18);

    let labeling = connected_components(&mask);
    assert_eq!(labeling.components.len(), 2);
    // The block starting on row 2 is found first.
    assert_eq!(labeling.components[0].area, 12);
    assert_eq!(labeling.components[0].bbox, (2, 3, 12, 17));
    assert_eq!(labeling.components[1].area, 20);
}

#[test]
fn test_particles_respect_area_and_edges() {
    let mut mask = Array2::from_elem((40, 40), false);
    filled(&mut mask, 5..15, 5..15); // 100 px
    filled(&mut mask, 20..23, 20..23); // 9 px
    filled(&mut mask, 30..40, 0..8); // touches the border

    let filter = ParticleFilter {
        min_area: 50,
        ..ParticleFilter::default()
    };
    let particles = extract_particles(&mask, &filter);
    assert_eq!(particles.len(), 1);
    assert_eq!(particles[0].area(), 100);
    assert_eq!(particles[0].bounds().x, 5);

    let keep_edges = ParticleFilter {
        min_area: 50,
        exclude_edges: false,
        ..ParticleFilter::default()
    };
    assert_eq!(extract_particles(&mask, &keep_edges).len(), 2);
}

#[test]
fn test_holes_count_toward_area() {
    let mut mask = Array2::from_elem((30, 30), false);
    filled(&mut mask, 5..25, 5..25);
    for r in 10..20 {
        for c in 10..20 {
            mask[[r, c]] = false;
        }
    }

    let filter = ParticleFilter {
        min_area: 1,
        ..ParticleFilter::default()
    };
    assert_eq!(extract_particles(&mask, &filter)[0].area(), 400);

    let no_holes = ParticleFilter {
        min_area: 1,
        include_holes: false,
        ..ParticleFilter::default()
    };
    assert_eq!(extract_particles(&mask, &no_holes)[0].area(), 300);
}

#[test]
fn test_particles_inside_filled_holes_are_skipped() {
    // A ring with a small island in its hole, plus a separate block.
    let mut mask = Array2::from_elem((40, 40), false);
    filled(&mut mask, 5..25, 5..25);
    for r in 10..20 {
        for c in 10..20 {
            mask[[r, c]] = false;
        }
    }
    filled(&mut mask, 13..16, 13..16);
    filled(&mut mask, 28..35, 28..35);

    let filter = ParticleFilter {
        min_area: 1,
        ..ParticleFilter::default()
    };
    let particles = extract_particles(&mask, &filter);
    assert_eq!(particles.len(), 2);
    assert_eq!(particles[0].area(), 400);
    assert_eq!(particles[1].bounds().x, 28);

    // Without hole filling the island is a particle of its own.
    let no_holes = ParticleFilter {
        min_area: 1,
        include_holes: false,
        ..ParticleFilter::default()
    };
    let particles = extract_particles(&mask, &no_holes);
    assert_eq!(particles.len(), 3);
    assert_eq!(particles[1].area(), 9);
}

#[test]
fn test_island_in_rejected_particle_is_still_skipped() {
    // The ring fails the area filter but still hides its island.
    let mut mask = Array2::from_elem((40, 40), false);
    filled(&mut mask, 5..25, 5..25);
    for r in 10..20 {
        for c in 10..20 {
            mask[[r, c]] = false;
        }
    }
    filled(&mut mask, 13..16, 13..16);

    let filter = ParticleFilter {
        min_area: 1,
        max_area: Some(100),
        ..ParticleFilter::default()
    };
    assert!(extract_particles(&mask, &filter).is_empty());
}

#[test]
fn test_opening_removes_specks() {
    let mut mask = Array2::from_elem((30, 30), false);
    filled(&mut mask, 5..20, 5..20);
    mask[[25, 25]] = true;
    filled(&mut mask, 2..4, 24..28);

    let opened = opening(&mask, 3);
    assert!(!opened[[25, 25]]);
    assert!(!opened[[2, 24]]);
    // A 15 x 15 square survives an opening by a 7 x 7 square intact.
    assert_eq!(opened.iter().filter(|&&v| v).count(), 225);
}

#[test]
fn test_segmentation_finds_both_comets() {
    let plane = two_comet_plane();
    let config = SegmentationConfig {
        threshold_method: ThresholdMethod::Fixed(40),
        background_correction: false,
        ..SegmentationConfig::default()
    };

    let seg = segment_comets(&plane, &config);
    assert_eq!(seg.level, 40);
    assert_eq!(seg.regions.len(), 2);
    assert!(seg.regions[0].bounds().y < seg.regions[1].bounds().y);
    for region in &seg.regions {
        assert!(region.area() >= 400);
        assert_eq!(region.bounds().height, 23);
    }
}

#[test]
fn test_segmentation_with_background_correction() {
    // A bright blob on a strong left-to-right gradient.
    let mut plane = flat_plane(120, 120, BACKGROUND);
    for y in 0..120 {
        for x in 0..120 {
            plane.put(x, y, (20 + x / 2) as u8);
        }
    }
    draw_ellipse(&mut plane, 60, 60, 15, 15, 230);

    let config = SegmentationConfig {
        threshold_method: ThresholdMethod::Otsu,
        median_radius: 2.0,
        ..SegmentationConfig::default()
    };
    let seg = segment_comets(&plane, &config);
    assert_eq!(seg.regions.len(), 1);
    let bounds = seg.regions[0].bounds();
    assert!(bounds.x > 40 && bounds.right() < 80);
}

#[test]
fn test_blank_plane_has_no_regions() {
    let plane = flat_plane(50, 50, BACKGROUND);
    let seg = segment_comets(&plane, &SegmentationConfig::default());
    assert!(seg.regions.is_empty());
}

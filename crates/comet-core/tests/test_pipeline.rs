mod common;

use approx::assert_relative_eq;
use comet_core::analysis::{analyze_plane, AnalysisEvent, DecisionLog, HeadFinding, NoOpSink};
use comet_core::comet::CometStatus;
use comet_core::error::CometError;
use comet_core::io::save_png;
use comet_core::pipeline::{run_batch, PipelineConfig};

use common::{fixed_config, flat_plane, two_comet_plane, BACKGROUND, HEAD_LEVEL, TAIL_LEVEL};

#[test]
fn test_two_comets_are_measured() {
    let plane = two_comet_plane();
    let analysis = analyze_plane(&plane, &fixed_config(40), &NoOpSink).unwrap();

    assert_eq!(analysis.threshold_level, 40);
    assert_eq!(analysis.comets.len(), 2);

    let mut ids: Vec<_> = analysis.comets.iter().filter_map(|c| c.id).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2]);

    for comet in &analysis.comets {
        assert_eq!(comet.status, CometStatus::Valid);
        assert!(comet.hull_boundary.is_some());
        assert!(comet.profiles.is_some());

        let m = comet.measurements.as_ref().unwrap();
        assert_relative_eq!(m.head_area + m.tail_area, m.comet_area);
        assert_relative_eq!(m.head_dna + m.tail_dna, m.comet_dna, max_relative = 1e-12);
        assert_relative_eq!(m.head_dna_percent + m.tail_dna_percent, 100.0, epsilon = 1e-9);
        assert!(m.head_dna_percent > m.tail_dna_percent);
        assert!(m.tail_length > 0.0);
        // Local background removed: the head reads its drawn level minus
        // the slide background.
        assert!(m.head_intensity <= (HEAD_LEVEL - BACKGROUND) as f64 + 1e-9);
        assert!(m.head_intensity > (TAIL_LEVEL - BACKGROUND) as f64);
    }

    // The input plane is untouched.
    assert_eq!(plane.get(50, 40), HEAD_LEVEL);
}

#[test]
fn test_comet_lookup_and_relabel() {
    let plane = two_comet_plane();
    let mut analysis = analyze_plane(&plane, &fixed_config(40), &NoOpSink).unwrap();

    let hit = analysis.comet_at(50, 40).and_then(|c| c.id).unwrap();
    assert!(analysis.comet_at(5, 5).is_none());

    assert_eq!(analysis.relabel(hit), Some(CometStatus::InvalidSize));
    assert_eq!(analysis.relabel(hit), Some(CometStatus::Outlier));
    assert_eq!(analysis.relabel(hit), Some(CometStatus::InvalidSize));
    assert_eq!(analysis.relabel(99), None);

    assert!(analysis.delete(hit));
    assert_eq!(analysis.comet(hit).unwrap().status, CometStatus::Deleted);
    assert_eq!(analysis.measurable().count(), 1);
}

#[test]
fn test_head_found_for_every_comet() {
    let plane = two_comet_plane();
    let log = DecisionLog::new();
    analyze_plane(&plane, &fixed_config(40), &log).unwrap();

    let found = log
        .events()
        .iter()
        .filter(|e| matches!(e, AnalysisEvent::HeadFound { .. }))
        .count();
    assert_eq!(found, 2);
}

#[test]
fn test_profile_only_mode_measures_comets() {
    let plane = two_comet_plane();
    let mut config = fixed_config(40);
    config.head_finding = HeadFinding::Profile;

    let analysis = analyze_plane(&plane, &config, &NoOpSink).unwrap();
    for comet in &analysis.comets {
        match comet.status {
            CometStatus::InvalidNoHead => {
                assert!(comet.id.is_none());
                assert!(comet.measurements.is_none());
            }
            _ => {
                let m = comet.measurements.as_ref().unwrap();
                assert_relative_eq!(m.head_area + m.tail_area, m.comet_area);
            }
        }
    }
}

#[test]
fn test_blank_image_has_nothing_to_analyze() {
    let plane = flat_plane(80, 80, BACKGROUND);
    let log = DecisionLog::new();
    assert!(analyze_plane(&plane, &fixed_config(40), &log).is_none());
    assert_eq!(log.events(), vec![AnalysisEvent::NothingToAnalyze]);
}

#[test]
fn test_batch_continues_past_unreadable_images() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("slide_a.png");
    save_png(&two_comet_plane(), &good).unwrap();
    let blank = dir.path().join("slide_b.png");
    save_png(&flat_plane(80, 80, BACKGROUND), &blank).unwrap();
    let missing = dir.path().join("missing.png");
    let report = dir.path().join("comets.csv");

    let config = PipelineConfig {
        inputs: vec![good, missing.clone(), blank],
        output: Some(report.clone()),
        overlay_dir: Some(dir.path().to_path_buf()),
        analysis: fixed_config(40),
    };
    let result = run_batch(&config).unwrap();

    assert_eq!(result.images.len(), 2);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].path, missing);
    assert!(result.images[1].analysis.is_none());
    assert_eq!(result.report_entries().len(), 1);

    let csv = std::fs::read_to_string(&report).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + 2 + 20);
    assert!(lines[1].starts_with("slide_a,"));
    assert!(dir.path().join("slide_a_out.png").exists());
    assert!(result.images[0].overlay_error.is_none());
    assert!(!dir.path().join("slide_b_out.png").exists());
}

#[test]
fn test_batch_survives_overlay_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("slide_a.png");
    let second = dir.path().join("slide_b.png");
    save_png(&two_comet_plane(), &first).unwrap();
    save_png(&two_comet_plane(), &second).unwrap();
    let report = dir.path().join("comets.csv");

    let config = PipelineConfig {
        inputs: vec![first, second],
        output: Some(report.clone()),
        overlay_dir: Some(dir.path().join("no_such_dir")),
        analysis: fixed_config(40),
    };
    let result = run_batch(&config).unwrap();

    assert_eq!(result.images.len(), 2);
    assert!(result.failures.is_empty());
    assert!(result.images.iter().all(|r| r.overlay_error.is_some()));
    assert_eq!(result.report_entries().len(), 2);

    let csv = std::fs::read_to_string(&report).unwrap();
    assert!(csv.lines().any(|l| l.starts_with("slide_b,")));
}

#[test]
fn test_empty_batch_is_an_error() {
    let result = run_batch(&PipelineConfig::default());
    assert!(matches!(result, Err(CometError::EmptyBatch)));
}

#[test]
fn test_overlay_outlines_valid_comets_in_red() {
    let plane = two_comet_plane();
    let analysis = analyze_plane(&plane, &fixed_config(40), &NoOpSink).unwrap();
    let img = comet_core::io::render_overlay(&plane, &analysis);

    let left = analysis.comets[0].bounds().x as u32;
    assert_eq!(img.get_pixel(left, 40).0, [255, 0, 0]);
    // Background far from any comet keeps its gray level.
    assert_eq!(img.get_pixel(5, 5).0, [BACKGROUND; 3]);
}

#[test]
fn test_overlay_plots_profiles_and_labels_ids() {
    let plane = two_comet_plane();
    let analysis = analyze_plane(&plane, &fixed_config(40), &NoOpSink).unwrap();
    let img = comet_core::io::render_overlay(&plane, &analysis);

    let comet = &analysis.comets[0];
    assert_eq!(comet.id, Some(1));
    let b = comet.bounds();

    let tail_plotted = (b.y..b.bottom()).any(|y| {
        (b.x..b.right()).any(|x| img.get_pixel(x as u32, y as u32).0 == [0, 0, 255])
    });
    assert!(tail_plotted);

    // The stem of the "1" glyph sits one cell in from the label start.
    let stem_x = (b.right() + 5 + 3) as u32;
    let label_y = (b.y + b.height / 2) as u32;
    assert_eq!(img.get_pixel(stem_x, label_y).0, [255, 0, 0]);
    assert_eq!(img.get_pixel(stem_x, label_y + 12).0, [255, 0, 0]);
}

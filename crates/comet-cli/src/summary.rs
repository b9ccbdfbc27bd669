use comet_core::comet::{CometStatus, Grouping};
use comet_core::pipeline::{BatchResult, PipelineConfig};
use comet_core::stats::{summarize_groupings, MeasurementField};
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            error: Style::new().red(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(config: &PipelineConfig) {
    let s = Styles::new();
    let seg = &config.analysis.segmentation;

    println!();
    println!("  {}", s.title.apply_to("Comet Analysis"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(14)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Images"),
        s.value.apply_to(config.inputs.len())
    );
    if let Some(ref output) = config.output {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Report"),
            s.path.apply_to(output.display())
        );
    }
    if let Some(ref dir) = config.overlay_dir {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Overlays"),
            s.path.apply_to(dir.display())
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Segmentation"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.method.apply_to(seg.threshold_method)
    );
    if seg.background_correction {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Background"),
            s.value.apply_to(format!(
                "median r={}, ball {:.0}%",
                seg.median_radius,
                seg.rolling_ball_fraction * 100.0
            ))
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Background"),
            s.disabled.apply_to("disabled")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Min area"),
        s.value.apply_to(format!("{} px", seg.particles.min_area))
    );
    println!();

    println!(
        "  {:<14}{}",
        s.header.apply_to("Head finding"),
        s.method.apply_to(config.analysis.head_finding)
    );
    println!();
}

pub fn print_batch_summary(result: &BatchResult) {
    let s = Styles::new();
    let comets: Vec<_> = result.comets().collect();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Analyzed"),
        s.value.apply_to(result.images.len())
    );
    for failure in &result.failures {
        println!(
            "    {:<14}{} ({})",
            s.label.apply_to("Failed"),
            s.path.apply_to(failure.path.display()),
            s.error.apply_to(&failure.error)
        );
    }
    for image in &result.images {
        if let Some(ref error) = image.overlay_error {
            println!(
                "    {:<14}{} ({})",
                s.label.apply_to("No overlay"),
                s.path.apply_to(image.path.display()),
                s.error.apply_to(error)
            );
        }
    }
    for status in [
        CometStatus::Valid,
        CometStatus::InvalidSize,
        CometStatus::Outlier,
        CometStatus::InvalidNoHead,
    ] {
        let n = comets.iter().filter(|c| c.status == status).count();
        println!(
            "    {:<14}{}",
            s.label.apply_to(status.label()),
            s.value.apply_to(n)
        );
    }

    let summaries = summarize_groupings(&comets);
    if let Some((_, normal)) = summaries.iter().find(|(g, _)| *g == Grouping::Normal) {
        if let Some(stats) = normal.field(MeasurementField::TailDnaPercent) {
            println!(
                "    {:<14}{}",
                s.label.apply_to("Tail DNA %"),
                s.value.apply_to(format!(
                    "{:.1} \u{00b1} {:.1} (median {:.1})",
                    stats.mean, stats.stddev, stats.median
                ))
            );
        }
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comet_core::detection::threshold::auto_threshold;
use comet_core::detection::ThresholdMethod;
use comet_core::io::load_plane;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let plane = load_plane(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let histogram = plane.histogram();

    let pixels = (plane.width() * plane.height()) as f64;
    let mean = histogram
        .iter()
        .enumerate()
        .map(|(v, &n)| v as f64 * n as f64)
        .sum::<f64>()
        / pixels;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", plane.width(), plane.height());
    println!("Source:      {}", plane.source);
    println!("Mean level:  {:.1}", mean);
    println!(
        "Triangle:    {}",
        auto_threshold(&histogram, ThresholdMethod::Triangle)
    );

    Ok(())
}

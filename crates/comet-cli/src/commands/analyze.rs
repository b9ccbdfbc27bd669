use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comet_core::analysis::{AnalysisConfig, DecisionLog, EventSink, HeadFinding, NoOpSink};
use comet_core::detection::ThresholdMethod;
use comet_core::pipeline::{run_batch_reported, PipelineConfig, PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

use crate::summary::{print_batch_summary, print_run_summary};

#[derive(Clone, ValueEnum)]
pub enum ThresholdArg {
    Triangle,
    Huang,
    Percentile,
    Yen,
    Mean,
    Otsu,
    Li,
    Intermodes,
    IsoData,
    MaxEntropy,
    Moments,
}

impl From<&ThresholdArg> for ThresholdMethod {
    fn from(arg: &ThresholdArg) -> Self {
        match arg {
            ThresholdArg::Triangle => Self::Triangle,
            ThresholdArg::Huang => Self::Huang,
            ThresholdArg::Percentile => Self::Percentile,
            ThresholdArg::Yen => Self::Yen,
            ThresholdArg::Mean => Self::Mean,
            ThresholdArg::Otsu => Self::Otsu,
            ThresholdArg::Li => Self::Li,
            ThresholdArg::Intermodes => Self::Intermodes,
            ThresholdArg::IsoData => Self::IsoData,
            ThresholdArg::MaxEntropy => Self::MaxEntropy,
            ThresholdArg::Moments => Self::Moments,
        }
    }
}

#[derive(Clone, ValueEnum)]
pub enum HeadFindingArg {
    Auto,
    Brightest,
    Profile,
}

impl From<&HeadFindingArg> for HeadFinding {
    fn from(arg: &HeadFindingArg) -> Self {
        match arg {
            HeadFindingArg::Auto => Self::Auto,
            HeadFindingArg::Brightest => Self::Brightest,
            HeadFindingArg::Profile => Self::Profile,
        }
    }
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input image files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Analysis config file (TOML); flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Automatic threshold method
    #[arg(long, value_enum)]
    pub threshold: Option<ThresholdArg>,

    /// Fixed threshold level (0-255), overrides --threshold
    #[arg(long)]
    pub threshold_level: Option<u8>,

    /// Head-finding mode
    #[arg(long, value_enum)]
    pub head_finding: Option<HeadFindingArg>,

    /// Skip median denoise and rolling-ball subtraction before thresholding
    #[arg(long)]
    pub no_bg_correct: bool,

    /// Minimum particle area in pixels
    #[arg(long)]
    pub min_area: Option<usize>,

    /// Directory for annotated images
    #[arg(long)]
    pub overlay_dir: Option<PathBuf>,

    /// Print every classification and head-finding decision
    #[arg(long)]
    pub explain: bool,

    /// Output CSV path
    #[arg(short, long, default_value = "comets.csv")]
    pub output: PathBuf,
}

/// Progress bar advanced once per analyzed image.
struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        if let Some(total) = total_items {
            self.bar.set_length(total as u64);
            self.bar.set_position(0);
        }
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let analysis = load_analysis_config(args)?;
    let config = PipelineConfig {
        inputs: args.files.clone(),
        output: Some(args.output.clone()),
        overlay_dir: args.overlay_dir.clone(),
        analysis,
    };

    if let Some(ref dir) = config.overlay_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    print_run_summary(&config);

    let bar = ProgressBar::new(config.inputs.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = Arc::new(BarReporter { bar: bar.clone() });

    let log = DecisionLog::new();
    let sink: &dyn EventSink = if args.explain { &log } else { &NoOpSink };

    let result = run_batch_reported(&config, reporter, sink).context("Batch analysis failed")?;
    bar.finish_with_message("Done");

    if args.explain {
        for event in log.events() {
            println!("  {:?}", event);
        }
    }

    print_batch_summary(&result);
    println!("\nReport saved to {}", args.output.display());

    Ok(())
}

fn load_analysis_config(args: &AnalyzeArgs) -> Result<AnalysisConfig> {
    let mut config: AnalysisConfig = if let Some(ref path) = args.config {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents).context("Invalid analysis config")?
    } else {
        AnalysisConfig::default()
    };

    if let Some(ref method) = args.threshold {
        config.segmentation.threshold_method = method.into();
    }
    if let Some(level) = args.threshold_level {
        config.segmentation.threshold_method = ThresholdMethod::Fixed(level);
    }
    if let Some(ref mode) = args.head_finding {
        config.head_finding = mode.into();
    }
    if args.no_bg_correct {
        config.segmentation.background_correction = false;
    }
    if let Some(min_area) = args.min_area {
        config.segmentation.particles.min_area = min_area;
    }
    Ok(config)
}

//! Command line front end: scan a document for visually suspicious regions.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::error;

use page_forensics::{
    ForensicsPipeline, PipelineConfig,
    detection::FindingOrder,
    pipeline::ReportWriter,
    raster::rasterizer_for,
};

/// Flag pages and regions of a scanned document that look digitally edited
#[derive(Parser)]
#[command(name = "page-forensics")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input document (PDF, or a single raster image)
    input: PathBuf,

    /// Output directory for annotated pages, heatmaps and reports
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rasterization resolution for PDF input
    #[arg(long)]
    dpi: Option<u32>,

    /// Decision threshold in (0, 1)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// JPEG quality for error-level analysis, 1..=100
    #[arg(short, long)]
    quality: Option<u8>,

    /// Also write a crop of every suspicious region
    #[arg(long)]
    save_patches: bool,

    /// Ordering of findings within a page report
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Analyse pages on a worker pool
    #[arg(long)]
    parallel: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    /// Contour discovery order (top to bottom, left to right)
    Discovery,
    /// Highest total score first
    Score,
}

impl From<OrderArg> for FindingOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Discovery => FindingOrder::Discovery,
            OrderArg::Score => FindingOrder::Score,
        }
    }
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(quality) = self.quality {
            config.ela_quality = quality;
        }
        if let Some(order) = self.order {
            config.finding_order = order.into();
        }
        config.save_patches |= self.save_patches;
        config.parallel |= self.parallel;

        Ok(config)
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    let pipeline = ForensicsPipeline::new(config).context("invalid configuration")?;
    let rasterizer = rasterizer_for(&cli.input)?;
    let writer = ReportWriter::new(&cli.output, pipeline.config().save_patches)
        .with_context(|| format!("cannot create output directory {}", cli.output.display()))?;

    let outcomes = pipeline
        .run(&cli.input, rasterizer.as_ref(), &writer)
        .with_context(|| format!("failed to analyse {}", cli.input.display()))?;

    for outcome in &outcomes {
        println!(
            "page {}: {} suspicious region(s) -> {}",
            outcome.report.page,
            outcome.report.findings.len(),
            outcome.artifacts.text_report.display()
        );
    }
    println!("results saved in {}", writer.output_dir().display());

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

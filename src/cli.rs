//! Command line front end
//!
//! Loads the configuration, hatches an image (or imports DXF outlines, or
//! generates a calibration structure), builds one process block and writes
//! its points as plain text.

use anyhow::{bail, Context};
use bildhatch_camtools::{
    contours_from_dxf, txt_lines, HatchSession, HatchWorker, ImageHatcher, JobOutcome,
    SpeedPowerSettings, TestStructure, TestStructureLayout,
};
use bildhatch_core::{HatchPattern, PostProcessingMode};
use bildhatch_settings::Config;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Hatch raster images into laser toolpaths
#[derive(Debug, Parser)]
#[command(name = "bildhatch", version, about)]
pub struct Cli {
    /// Image to hatch, or a .dxf file whose outlines are exported as is
    #[arg(required_unless_present = "test_structure")]
    pub input: Option<PathBuf>,

    /// Generate a calibration structure instead, e.g. "Filled Squares Vert.";
    /// the grid follows the pricing structure counts
    #[arg(long, conflicts_with = "input")]
    pub test_structure: Option<TestStructure>,

    /// Edge of a filled test square in mm
    #[arg(long, default_value_t = 10.0)]
    pub structure_size: f64,

    /// Line distance inside a filled test square in mm
    #[arg(long, default_value_t = 0.1)]
    pub structure_line_distance: f64,

    /// Configuration file (.toml or .json), platform default if omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Image resolution in pixels per millimeter
    #[arg(long)]
    pub pixel_per_mm: Option<f64>,

    /// Hatch pattern, e.g. "Spiral" or "CrossedMeander"
    #[arg(long)]
    pub pattern: Option<HatchPattern>,

    /// Drive mode, e.g. "Constant Drive" or "Over Drive"
    #[arg(long)]
    pub post_processing: Option<PostProcessingMode>,

    /// Number of times the block is executed
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Take pattern, spacing, speed, power and machine settings from the palette
    #[arg(long)]
    pub automatic: bool,

    /// Point file to write, input name with .txt if omitted
    /// (test_structure.txt for calibration structures)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the block file and index into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// File prefix used with --export-dir
    #[arg(long, default_value = "bildhatch")]
    pub prefix: String,
}

impl Cli {
    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .or_else(|| self.input.as_ref().map(|input| input.with_extension("txt")))
            .unwrap_or_else(|| PathBuf::from("test_structure.txt"))
    }

    fn is_dxf(&self) -> bool {
        self.input
            .as_deref()
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dxf"))
    }

    fn structure_layout(&self, config: &Config) -> TestStructureLayout {
        TestStructureLayout {
            square_size_mm: self.structure_size,
            line_distance_mm: self.structure_line_distance,
            ..TestStructureLayout::from_pricing(&config.pricing)
        }
    }

    /// Configuration with command line overrides applied
    fn config(&self) -> anyhow::Result<(Config, PathBuf)> {
        let path = self.config.clone().unwrap_or_else(Config::default_path);
        let mut config = Config::load_or_default(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;

        if let Some(ppmm) = self.pixel_per_mm {
            config.hatching.pixel_per_mm = ppmm;
        }
        if let Some(pattern) = self.pattern {
            config.hatching.pattern = pattern;
        }
        if let Some(mode) = self.post_processing {
            config.processing.post_processing = mode;
        }
        if let Some(iterations) = self.iterations {
            config.processing.iterations = iterations;
        }
        if self.automatic {
            config.pricing = SpeedPowerSettings::from_palette(config.hatching.white_threshold);
        }
        config.validate().context("Invalid configuration")?;

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok((config, base_dir))
    }
}

fn hatch_image(
    input: &Path,
    config: &Config,
    palette: Option<bildhatch_core::MaterialPalette>,
) -> anyhow::Result<JobOutcome> {
    let mut hatcher = ImageHatcher::from_file(input, config.hatching.clone())
        .with_context(|| format!("Failed to prepare {}", input.display()))?;
    if let Some(palette) = palette {
        hatcher = hatcher.with_palette(palette)?;
    }
    let (w, h) = hatcher.output_size_mm();
    tracing::info!(
        "Hatching {} as {} ({:.1} x {:.1} mm, {} cluster(s))",
        input.display(),
        hatcher.hatch_type(),
        w,
        h,
        hatcher.clusters().len()
    );

    let worker = HatchWorker::new();
    let handle = worker.start(hatcher)?;
    let mut logged = 0;
    Ok(handle.wait_with_progress(|percent| {
        if percent / 10 > logged / 10 {
            tracing::info!("Hatching {}%", percent);
            logged = percent;
        }
    }))
}

/// Run one job and return the path of the written point file
pub fn run(cli: &Cli) -> anyhow::Result<PathBuf> {
    let (config, base_dir) = cli.config()?;
    let palette = config
        .load_palette(&base_dir)
        .context("Failed to load palette")?;
    if cli.automatic && palette.is_none() {
        bail!("--automatic needs a palette_file in the configuration");
    }

    let mut session = HatchSession::new();
    session.set_palette(palette.clone());

    if let Some(structure) = cli.test_structure {
        let data = structure
            .generate(&cli.structure_layout(&config))
            .with_context(|| format!("Failed to generate {structure}"))?;
        session.set_hatch_data(data);
    } else if cli.is_dxf() {
        let input = cli.input.as_deref().context("No input file given")?;
        let data = contours_from_dxf(input)
            .with_context(|| format!("Failed to import {}", input.display()))?;
        session.set_hatch_data(data);
    } else {
        let input = cli.input.as_deref().context("No input file given")?;
        let hatch_palette = if cli.automatic { palette } else { None };
        let outcome = hatch_image(input, &config, hatch_palette)?;
        if outcome.is_cancelled() {
            bail!("Hatching was cancelled");
        }
        session.apply_outcome(outcome).context("Hatching failed")?;
    }

    session
        .queue_block(&config.pricing, config.processing.clone())
        .context("Failed to build process block")?;
    let block = session
        .blocks()
        .first()
        .context("No process block was queued")?;
    tracing::info!("{}", block.summary());

    let output = cli.output_path();
    std::fs::write(&output, txt_lines(&block.data))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(
        "Wrote {} point(s) to {}",
        block.data.point_count(),
        output.display()
    );

    if let Some(dir) = &cli.export_dir {
        session
            .export(dir, &cli.prefix)
            .with_context(|| format!("Failed to export to {}", dir.display()))?;
    }

    Ok(output)
}

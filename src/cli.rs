//! Command-line host
//!
//! Drives the measurement pipeline from the terminal: taps are given as
//! coordinates and the rendered view is an image file (or a synthetic
//! frame).

use crate::capture::{FrameSource, ImageFileSource, MockFrameSource, SurfaceHandle, ViewDescriptor};
use crate::config::MeasureConfig;
use crate::controller::MeasureController;
use crate::geometry::{distance, Point3};
use crate::presenter::Status;
use crate::upload::{UploadOutcome, Uploader};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "ar-measure", version, about = "Measure between two AR anchors and upload a snapshot")]
pub struct Cli {
    /// Config file (defaults to $AR_MEASURE_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the distance between two points
    Distance {
        #[arg(long, allow_hyphen_values = true)]
        from: Point3,
        #[arg(long, allow_hyphen_values = true)]
        to: Point3,
    },
    /// Place two anchors, capture the view and optionally upload it
    Measure(MeasureArgs),
}

#[derive(Debug, Args)]
pub struct MeasureArgs {
    /// First anchor, as x,y,z in meters
    #[arg(long, allow_hyphen_values = true)]
    pub from: Point3,

    /// Second anchor, as x,y,z in meters
    #[arg(long, allow_hyphen_values = true)]
    pub to: Point3,

    /// Image standing in for the rendered view
    #[arg(long, required_unless_present = "synthetic", conflicts_with = "synthetic")]
    pub image: Option<PathBuf>,

    /// Capture a solid grey frame instead of an image
    #[arg(long)]
    pub synthetic: bool,

    /// View width in pixels (overrides config)
    #[arg(long)]
    pub width: Option<u32>,

    /// View height in pixels (overrides config)
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of times to send the measurement
    #[arg(long, default_value_t = 0)]
    pub send: u32,

    /// Service base URL (overrides config)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print a JSON report instead of the status line
    #[arg(long)]
    pub json: bool,
}

/// Summary of a `measure` run
#[derive(Debug, Serialize)]
pub struct MeasureReport {
    pub from: Point3,
    pub to: Point3,
    pub distance_meters: Option<f64>,
    pub frame: Option<(u32, u32)>,
    pub uploads: u32,
    pub last_outcome: Option<UploadOutcome>,
    pub status: Status,
    pub text: String,
}

pub async fn run(cli: Cli, config: MeasureConfig) -> Result<()> {
    match cli.command {
        Command::Distance { from, to } => {
            println!("{:.3} m", distance(from, to));
            Ok(())
        }
        Command::Measure(args) => {
            let json = args.json;
            let report = measure(&config, args).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.text);
            }

            match &report.last_outcome {
                Some(outcome) if !outcome.is_success() => bail!("upload failed: {}", outcome),
                _ => Ok(()),
            }
        }
    }
}

pub async fn measure(config: &MeasureConfig, args: MeasureArgs) -> Result<MeasureReport> {
    let view = ViewDescriptor::new(
        SurfaceHandle::default(),
        args.width.unwrap_or(config.capture.width),
        args.height.unwrap_or(config.capture.height),
    );

    let frames: Arc<dyn FrameSource> = match &args.image {
        Some(path) => Arc::new(ImageFileSource::new(path)),
        None => Arc::new(MockFrameSource::solid([128, 128, 128, 255])),
    };

    let mut upload_config = config.upload.clone();
    if let Some(endpoint) = &args.endpoint {
        upload_config.base_url = endpoint.clone();
    }
    let uploader = build_uploader(&upload_config, args.send)?;

    let mut controller = MeasureController::new(view, frames, uploader);
    let handle = controller.handle();

    handle.tap(args.from)?;
    handle.tap(args.to)?;
    controller.run_until_idle().await;

    if args.send > 0 {
        if controller.session().frame().is_none() {
            bail!("{}", controller.presenter().text());
        }
        for _ in 0..args.send {
            handle.send()?;
        }
        controller.run_until_idle().await;
    }

    let session = controller.session();
    let presenter = controller.presenter();
    Ok(MeasureReport {
        from: args.from,
        to: args.to,
        distance_meters: session.measurement().map(|m| m.distance_meters),
        frame: session.frame().map(|f| (f.width(), f.height())),
        uploads: session.uploads_completed(),
        last_outcome: session.last_outcome().cloned(),
        status: presenter.status().clone(),
        text: presenter.text(),
    })
}

#[cfg(feature = "http")]
fn build_uploader(
    config: &crate::config::UploadConfig,
    _sends: u32,
) -> Result<Arc<dyn Uploader>> {
    Ok(Arc::new(crate::upload::HttpUploader::from_config(config)))
}

#[cfg(not(feature = "http"))]
fn build_uploader(
    _config: &crate::config::UploadConfig,
    sends: u32,
) -> Result<Arc<dyn Uploader>> {
    if sends > 0 {
        bail!("uploading requires the `http` feature");
    }
    Ok(Arc::new(crate::upload::MockUploader::new(
        UploadOutcome::TransportError("uploads disabled".to_string()),
    )))
}

/// Load the config named on the command line, or the default chain
pub fn load_config(cli: &Cli) -> Result<MeasureConfig> {
    MeasureConfig::load(cli.config.as_deref()).context("Failed to load configuration")
}

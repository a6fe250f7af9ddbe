use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use textmark::config::Config;
use textmark::error::AppError;
use textmark::logging::{init_subscriber, LogFormat};
use textmark::watermark::{TextStyle, WatermarkPosition, WatermarkSpec, Watermarker};

/// Textmark - stamp a semi-transparent text watermark onto an image
#[derive(Parser, Debug)]
#[command(name = "textmark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Source image (PNG, JPEG, BMP, GIF, TIFF or WEBP)
    source: PathBuf,

    /// Watermark text; an empty string re-saves the image unchanged
    #[arg(short, long, default_value = "")]
    text: String,

    /// Destination file; the extension picks the format
    /// [default: <source-stem>-watermarked beside the source]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TrueType font file name or path
    #[arg(long)]
    font: Option<String>,

    /// Font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    /// Margin from the image edge in pixels
    #[arg(long)]
    margin: Option<u32>,

    /// Opacity from 0.0 to 1.0
    #[arg(long)]
    opacity: Option<f32>,

    /// Fill color as #RGB or #RRGGBB
    #[arg(long)]
    color: Option<String>,

    /// Anchor such as bottom-right, top-left or center
    #[arg(long, value_parser = parse_position)]
    position: Option<WatermarkPosition>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn parse_position(s: &str) -> Result<WatermarkPosition, String> {
    s.parse()
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_subscriber(args.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Watermarking failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<PathBuf> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .map_err(AppError::Config)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate().map_err(AppError::Config)?;

    tracing::info!(
        config_file = ?args.config,
        font = %config.watermark.font.name,
        font_size = config.watermark.font.size,
        opacity = config.watermark.opacity,
        margin = config.watermark.margin,
        position = config.watermark.position.as_str(),
        "Configuration loaded successfully"
    );

    let style = TextStyle::from_config(&config.watermark).map_err(AppError::Config)?;
    let watermarker = Watermarker::new(
        config.watermark.font.clone(),
        config.output.clone(),
        config.loader.clone(),
    );

    let destination = args
        .output
        .clone()
        .unwrap_or_else(|| default_destination(&args.source));

    let spec = WatermarkSpec::new(args.text).with_style(style);
    let outcome = watermarker
        .run(&args.source, &spec, &destination)
        .map_err(AppError::from)?;

    tracing::info!(
        path = %outcome.path.display(),
        format = %outcome.format,
        color_model = ?outcome.color_model,
        "Watermark written"
    );

    Ok(outcome.path)
}

fn apply_overrides(config: &mut Config, args: &Args) {
    let wm = &mut config.watermark;
    if let Some(font) = &args.font {
        wm.font.name = font.clone();
    }
    if let Some(size) = args.font_size {
        wm.font.size = size;
    }
    if let Some(margin) = args.margin {
        wm.margin = margin;
    }
    if let Some(opacity) = args.opacity {
        wm.opacity = opacity;
    }
    if let Some(color) = &args.color {
        wm.color = color.clone();
    }
    if let Some(position) = args.position {
        wm.position = position;
    }
}

/// `<dir>/<stem>-watermarked`, without an extension so it is inferred from
/// the source format.
fn default_destination(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    source.with_file_name(format!("{}-watermarked", stem))
}

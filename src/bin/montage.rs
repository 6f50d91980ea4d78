use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use montage::media::asset::load_asset;
use montage::normalize::plan::NormalizePlan;
use montage::{
    JobOutcome, LocalDirPublisher, MediaKind, MediaRef, MontageConfig, MontageResult, RenderJob,
    RenderRequest,
};

#[derive(Parser, Debug)]
#[command(name = "montage", version, about = "Compose photos and clips into a slideshow MP4")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render and publish an MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Render the frame shown at one instant as a PNG.
    Preview(PreviewArgs),
    /// Print how each media file would be classified and normalized.
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Media file, in playback order. Repeatable.
    #[arg(long = "media", short = 'm', required = true)]
    media: Vec<PathBuf>,

    /// Title burned into the first entry. Pass an empty string to disable.
    #[arg(long, default_value = "My Journey")]
    title: String,

    /// Background music file.
    #[arg(long, default_value = "sound/default_music.mp3")]
    audio: PathBuf,

    /// Disable background audio.
    #[arg(long, default_value_t = false)]
    no_audio: bool,

    /// Display duration hint for still images, in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Publish directory. Defaults to the user's Downloads folder.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Include the job report in the JSON output.
    #[arg(long, default_value_t = false)]
    report: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Timeline instant in seconds.
    #[arg(long, default_value_t = 0.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Media files to inspect.
    #[arg(required = true)]
    media: Vec<PathBuf>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Probe(args) => cmd_probe(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", JobOutcome::failure(&e).to_json());
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> MontageResult<MontageConfig> {
    let cfg = match path {
        Some(p) => MontageConfig::from_json_file(p)?,
        None => MontageConfig::default(),
    };
    let cfg = cfg.with_env_overrides()?;
    cfg.validate()?;
    Ok(cfg)
}

fn request_from(args: &JobArgs) -> RenderRequest {
    RenderRequest {
        media: args.media.iter().cloned().map(MediaRef::Path).collect(),
        title: Some(args.title.clone()),
        audio: (!args.no_audio).then(|| args.audio.clone()),
        image_duration_hint: args.duration,
        ..RenderRequest::default()
    }
}

fn cmd_render(args: RenderArgs) -> MontageResult<()> {
    let job = RenderJob::new(load_config(args.job.config.as_deref())?);
    let artifact = job.run(&request_from(&args.job))?;
    let publisher = match args.out_dir {
        Some(dir) => LocalDirPublisher::new(dir),
        None => LocalDirPublisher::downloads()?,
    };
    let published = artifact.publish(&publisher)?;
    let report = args.report.then(|| artifact.report().clone());
    println!("{}", JobOutcome::success(published, report).to_json());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> MontageResult<()> {
    let job = RenderJob::new(load_config(args.job.config.as_deref())?);
    let (frame, report) = job.preview(&request_from(&args.job), args.at)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    // Canvas frames are opaque, so premultiplied bytes equal straight RGBA.
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    for w in &report.warnings {
        eprintln!("warning: {}", w.message);
    }
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

#[derive(serde::Serialize)]
struct ProbeRow {
    path: String,
    kind: Option<MediaKind>,
    width: Option<u32>,
    height: Option<u32>,
    duration_secs: Option<f64>,
    orientation: Option<montage::normalize::plan::Orientation>,
    error: Option<String>,
}

fn cmd_probe(args: ProbeArgs) -> MontageResult<()> {
    let cfg = load_config(args.config.as_deref())?;
    let rows: Vec<ProbeRow> = args
        .media
        .iter()
        .enumerate()
        .map(|(i, path)| probe_row(&cfg, i, path))
        .collect();
    let json = serde_json::to_string_pretty(&rows).context("serialize probe output")?;
    println!("{json}");
    Ok(())
}

fn probe_row(cfg: &MontageConfig, index: usize, path: &Path) -> ProbeRow {
    let mut row = ProbeRow {
        path: path.display().to_string(),
        kind: None,
        width: None,
        height: None,
        duration_secs: None,
        orientation: None,
        error: None,
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let Some(kind) = MediaKind::from_file_name(&name) else {
        row.error = Some("unsupported media type".to_string());
        return row;
    };
    row.kind = Some(kind);
    match load_asset(index, kind, path, None, &cfg.timing).and_then(|loaded| {
        let asset = loaded.asset().clone();
        let plan =
            NormalizePlan::compute(asset.width, asset.height, cfg.output.canvas, &cfg.blur)?;
        Ok((asset, plan))
    }) {
        Ok((asset, plan)) => {
            row.width = Some(asset.width);
            row.height = Some(asset.height);
            row.duration_secs = Some(asset.duration_secs);
            row.orientation = Some(plan.orientation);
        }
        Err(e) => row.error = Some(e.to_string()),
    }
    row
}

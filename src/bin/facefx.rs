use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use facefx::{
    EffectKind, FaceFxError, Frame, FrameScheduler, ReplayDetector, SessionConfig, StopSignal,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "facefx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stylize the faces of a single PNG.
    Apply(ApplyArgs),
    /// Run the frame loop over a directory of PNG frames.
    Replay(ReplayArgs),
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Recorded detections JSON (one entry per frame).
    #[arg(long)]
    detections: PathBuf,

    /// Session config JSON. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Effect to apply.
    #[arg(long, value_enum)]
    effect: Option<EffectChoice>,

    /// Worker threads for the per-face fan-out.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input PNG.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Directory of PNG frames, processed in file name order.
    #[arg(long)]
    frames: PathBuf,

    /// Output directory; frames keep their file names.
    #[arg(long)]
    out_dir: PathBuf,

    /// Stop after this many presented frames.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Restart the detections when they run out.
    #[arg(long)]
    loop_detections: bool,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EffectChoice {
    Blur,
    Pixelate,
    Mesh,
    /// Blur everything except the faces.
    #[value(name = "background-blur", alias = "bgblur")]
    BackgroundBlur,
}

impl From<EffectChoice> for EffectKind {
    fn from(c: EffectChoice) -> Self {
        match c {
            EffectChoice::Blur => EffectKind::Blur,
            EffectChoice::Pixelate => EffectKind::Pixelate,
            EffectChoice::Mesh => EffectKind::Mesh,
            EffectChoice::BackgroundBlur => EffectKind::BackgroundBlur,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Replay(args) => cmd_replay(args),
    }
}

fn load_config(args: &SessionArgs) -> anyhow::Result<SessionConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            SessionConfig::from_json_str(&s)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => SessionConfig::default(),
    };
    if let Some(effect) = args.effect {
        cfg.effect = effect.into();
    }
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn load_detector(path: &Path, looping: bool) -> anyhow::Result<ReplayDetector> {
    let f = File::open(path).with_context(|| format!("open detections '{}'", path.display()))?;
    let detector = ReplayDetector::from_json_reader(BufReader::new(f))
        .with_context(|| format!("parse detections '{}'", path.display()))?;
    Ok(detector.looping(looping))
}

fn read_png(path: &Path) -> anyhow::Result<Frame> {
    let img = image::open(path).with_context(|| format!("read png '{}'", path.display()))?;
    Ok(facefx::pixels::from_image(&img)?)
}

fn write_png(path: &Path, frame: &Frame) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        frame.data(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.session)?;
    let detector = load_detector(&args.session.detections, false)?;
    let mut scheduler = FrameScheduler::new(cfg, detector)?;

    let frame = read_png(&args.in_path)?;
    let (out, report) = scheduler.tick(&frame)?;
    if let Some(error) = report.background_error {
        return Err(error).context("background effect failed");
    }
    write_png(&args.out, &out)?;

    eprintln!(
        "wrote {} ({} faces, {} processed, {} failed)",
        args.out.display(),
        report.detections,
        report.processed,
        report.failed
    );
    Ok(())
}

fn list_frames(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("list frames '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("png"))
        {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.session)?;
    let detector = load_detector(&args.session.detections, args.loop_detections)?;
    let mut scheduler = FrameScheduler::new(cfg, detector)?;

    let mut pending = list_frames(&args.frames)?.into_iter();
    let current = RefCell::new(PathBuf::new());
    let mut source = || -> facefx::FaceFxResult<Option<Frame>> {
        let Some(path) = pending.next() else {
            return Ok(None);
        };
        let frame = read_png(&path).map_err(|e| FaceFxError::capture(format!("{e:#}")))?;
        *current.borrow_mut() = path;
        Ok(Some(frame))
    };

    let stop = StopSignal::new();
    let mut presented = 0u64;
    let stats = scheduler.run(
        &mut source,
        |frame, _report| {
            let name = current
                .borrow()
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("frame_{presented:05}.png")));
            write_png(&args.out_dir.join(name), frame).map_err(FaceFxError::from)?;
            presented += 1;
            if args.max_ticks.is_some_and(|max| presented >= max) {
                stop.stop();
            }
            Ok(())
        },
        &stop,
    )?;

    eprintln!(
        "replayed {} frames into {} ({} faces processed, {} failed, {} ticks abandoned)",
        stats.ticks,
        args.out_dir.display(),
        stats.processed,
        stats.failed,
        stats.tick_errors
    );
    Ok(())
}

//! spanlens: draws a trace timeline with the engine's box and glyph pipelines.
//!
//! Spans come from `--trace FILE` (a stream of JSON trace events) or, without
//! it, from a built-in demo trace. Without `--headless` a window is opened and
//! drawn with wgpu; with `--headless out.png` the same scene goes through the
//! software rasterizer.

mod app;
mod export;
mod scene;
mod spans;
mod trace;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use spanlens_engine::atlas::{GridAtlas, GridAtlasConfig};
use spanlens_engine::coords::ColorRgba;
use spanlens_engine::device::GpuInit;
use spanlens_engine::logging::{init_logging, LoggingConfig};
use spanlens_engine::window::{LogicalSize, Runtime, RuntimeConfig};

#[derive(Debug, Parser)]
#[command(name = "spanlens", version, about = "Trace span timeline renderer")]
struct Args {
    /// Trace file of JSON events; the demo trace is shown otherwise.
    #[arg(long, value_name = "JSON")]
    trace: Option<PathBuf>,

    /// Start of the visible window in milliseconds (with --trace).
    #[arg(long, value_name = "MS", default_value_t = 0)]
    from_ms: u64,

    /// End of the visible window in milliseconds (with --trace); defaults to
    /// the last event.
    #[arg(long, value_name = "MS")]
    to_ms: Option<u64>,

    /// Render to this PNG file instead of opening a window.
    #[arg(long, value_name = "PNG")]
    headless: Option<PathBuf>,

    /// Output or initial window width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output or initial window height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// TrueType/OpenType font for span labels; a system font is tried otherwise.
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    /// Label size in pixels per em.
    #[arg(long, default_value_t = 14.0)]
    font_size: f32,

    /// Log filter in env_logger syntax (overrides RUST_LOG).
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
];

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let mut spans = load_spans(&args)?;
    let rows = spans::assign_rows(&mut spans).context("failed to lay out spans")?;
    log::info!("{} spans on {rows} rows", spans.len());
    let atlas = load_atlas(args.font.as_deref(), args.font_size)?;

    match &args.headless {
        Some(path) => {
            let scene = scene::Scene::build(&spans, rows, atlas.as_ref(), (args.width, args.height))?;
            let fb = export::rasterize(
                &scene,
                atlas.as_ref(),
                args.width,
                args.height,
                ColorRgba::transparent(),
            )?;
            export::write_png(&fb, path)
        }
        None => {
            let config = RuntimeConfig {
                title: "spanlens".to_string(),
                initial_size: LogicalSize::new(f64::from(args.width), f64::from(args.height)),
            };
            Runtime::run(config, GpuInit::default(), app::ViewerApp::new(spans, rows, atlas))
        }
    }
}

fn load_spans(args: &Args) -> Result<Vec<spans::Span>> {
    let Some(path) = &args.trace else {
        return Ok(spans::demo_spans());
    };
    let state = trace::TraceState::from_file(path)?;
    let start = Duration::from_millis(args.from_ms);
    let end = args.to_ms.map_or(state.end_time(), Duration::from_millis);
    anyhow::ensure!(start < end, "empty time window {start:?}..{end:?}");
    Ok(state.select(start, end))
}

/// Explicit `--font` failures are errors; a missing system font only
/// disables labels.
fn load_atlas(font: Option<&Path>, px: f32) -> Result<Option<GridAtlas>> {
    let bytes = match font {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read font {}", path.display()))?,
        None => match FONT_CANDIDATES.iter().find_map(|p| std::fs::read(p).ok()) {
            Some(bytes) => bytes,
            None => {
                log::warn!("no system font found; span labels disabled (use --font)");
                return Ok(None);
            }
        },
    };

    let atlas = GridAtlas::from_font(&bytes, px, GridAtlasConfig::default())
        .context("failed to build glyph atlas")?;
    let (w, h) = atlas.cell_size();
    log::info!("glyph atlas ready: {w}x{h} px cells");
    Ok(Some(atlas))
}

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use treemap_rs::colors::assign_colors;
use treemap_rs::config::AppConfig;
use treemap_rs::demo::DemoSession;
use treemap_rs::layout::{LayoutRect, Mode, PaddingConfig, Treemap};
use treemap_rs::tree::{self, input::ValueMode};
use treemap_rs::NodeTree;

#[derive(Parser, Debug)]
#[command(
    name = "treemap",
    version,
    about = "Squarified treemap layouts for weighted hierarchies"
)]
struct Cli {
    /// Config file (defaults to ./treemap.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out a JSON hierarchy and print the rectangles
    Layout(LayoutArgs),
    /// Re-lay out random data for a number of frames
    Demo(DemoArgs),
}

#[derive(Args, Debug, Clone)]
struct LayoutOverrides {
    #[arg(long)]
    width: Option<f64>,

    #[arg(long)]
    height: Option<f64>,

    /// Uniform inset applied to every parent
    #[arg(long)]
    padding: Option<f64>,

    /// Round final edges to whole pixels
    #[arg(long, action = ArgAction::SetTrue)]
    round: bool,

    /// squarify, slice, dice or slice-dice
    #[arg(long)]
    mode: Option<Mode>,

    /// Target aspect ratio for the squarify score
    #[arg(long)]
    ratio: Option<f64>,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// JSON file: a root object with `children`, or an array of top-level nodes
    input: PathBuf,

    #[command(flatten)]
    overrides: LayoutOverrides,

    /// Leaf weight: value, size or count
    #[arg(long, default_value = "value")]
    value: ValueMode,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only print leaves
    #[arg(long, action = ArgAction::SetTrue)]
    leaves: bool,
}

#[derive(Args, Debug)]
struct DemoArgs {
    #[command(flatten)]
    overrides: LayoutOverrides,

    #[arg(long)]
    frames: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Rebuild rows from scratch on every frame
    #[arg(long, action = ArgAction::SetTrue)]
    no_sticky: bool,

    /// Wait the configured interval between frames
    #[arg(long, action = ArgAction::SetTrue)]
    realtime: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct RectOut<'a> {
    path: String,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(flatten)]
    rect: &'a LayoutRect,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("treemap_rs=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Command::Layout(args) => {
            apply_overrides(&mut config, &args.overrides);
            run_layout(&config, &args)
        }
        Command::Demo(args) => {
            apply_overrides(&mut config, &args.overrides);
            if let Some(frames) = args.frames {
                config.demo.frames = frames;
            }
            if args.seed.is_some() {
                config.demo.seed = args.seed;
            }
            if args.no_sticky {
                config.demo.sticky = false;
            }
            run_demo(&config, &args)
        }
    }
}

fn apply_overrides(config: &mut AppConfig, overrides: &LayoutOverrides) {
    let layout = &mut config.layout;
    if let Some(w) = overrides.width {
        layout.width = w;
    }
    if let Some(h) = overrides.height {
        layout.height = h;
    }
    if let Some(p) = overrides.padding {
        layout.padding = Some(PaddingConfig::Uniform(p));
    }
    if overrides.round {
        layout.round = true;
    }
    if let Some(mode) = overrides.mode {
        layout.mode = mode;
    }
    if let Some(ratio) = overrides.ratio {
        layout.ratio = ratio;
    }
}

fn run_layout(config: &AppConfig, args: &LayoutArgs) -> Result<()> {
    let mut tree = tree::load_json(&args.input, args.value)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    assign_colors(&mut tree);

    let treemap = Treemap::new(config.layout.clone()).context("invalid layout configuration")?;
    let layout = treemap.layout(&mut tree);

    let rects: Vec<&LayoutRect> = layout
        .rects
        .iter()
        .filter(|r| !args.leaves || r.is_leaf)
        .collect();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.format {
        Format::Json => {
            let rows: Vec<RectOut<'_>> = rects.iter().map(|r| rect_out(&tree, r)).collect();
            serde_json::to_writer_pretty(&mut out, &rows)?;
            writeln!(out)?;
        }
        Format::Text => {
            for rect in rects {
                let node = tree.get(rect.node);
                writeln!(
                    out,
                    "{:indent$}{} value={} at ({:.1}, {:.1}) size {:.1}x{:.1}",
                    "",
                    if node.name.is_empty() { "(root)" } else { node.name.as_str() },
                    rect.value,
                    rect.x,
                    rect.y,
                    rect.dx,
                    rect.dy,
                    indent = rect.depth as usize * 2
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn rect_out<'a>(tree: &'a NodeTree, rect: &'a LayoutRect) -> RectOut<'a> {
    let node = tree.get(rect.node);
    RectOut {
        path: tree.path(rect.node, "/"),
        name: node.name.as_str(),
        color: node.color.as_deref(),
        rect,
    }
}

fn run_demo(config: &AppConfig, args: &DemoArgs) -> Result<()> {
    let mut session = DemoSession::from_config(config.layout.clone(), config.demo.clone())
        .context("invalid layout configuration")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let interval = Duration::from_millis(config.demo.interval_ms);

    for _ in 0..config.demo.frames {
        let transitions = session.tick();
        match args.format {
            Format::Json => {
                serde_json::to_writer(&mut out, &transitions)?;
                writeln!(out)?;
            }
            Format::Text => {
                let moved = transitions.iter().filter(|t| t.is_moving()).count();
                let worst = session
                    .frame()
                    .iter()
                    .filter(|r| r.dx > 0.0 && r.dy > 0.0)
                    .map(|r| (r.dx / r.dy).max(r.dy / r.dx))
                    .fold(0.0, f64::max);
                writeln!(
                    out,
                    "frame {:>3}: {} rects, {} moved, worst aspect {:.2}",
                    session.frame_index(),
                    transitions.len(),
                    moved,
                    worst
                )?;
            }
        }
        if args.realtime {
            out.flush()?;
            std::thread::sleep(interval);
        }
    }
    out.flush()?;
    Ok(())
}

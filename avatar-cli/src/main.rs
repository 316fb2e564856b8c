//! Voronoi avatar CLI
//!
//! Renders deterministic Voronoi avatars to PNG.
//!
//! ## Single avatar
//!
//!   voronoi-avatar --seed alice -c '#264653' -c '#2a9d8f' -c '#e9c46a' -o alice.png
//!
//! ## YAML spec file
//!
//! ```yaml
//! seed: alice
//! width: 512
//! height: 512
//! colors:
//!   - "#264653"
//!   - ""          # slot 2 left blank
//!   - "#e9c46a"
//! ```
//!
//! Run with: `voronoi-avatar --spec avatar.yaml -o alice.png`. Flags given on
//! the command line override the file.
//!
//! ## Batch
//!
//!   voronoi-avatar --seeds alice,bob,carol -c red -c navy -o avatars/
//!
//! Avatars render in parallel and land in `avatars/<seed>.png`. Press Ctrl+C
//! to skip the avatars that have not started yet.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use avatar_core::{
    render_batch, render_image_with_report, AvatarError, AvatarProps, RenderConfig, RenderReport,
    COLOR_SLOTS,
};

const DEFAULT_SIZE: u32 = 256;

/// YAML spec file format
#[derive(Debug, Default, Deserialize)]
struct AvatarSpec {
    #[serde(default)]
    seed: Option<String>,
    #[serde(default)]
    colors: Vec<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

fn load_spec(path: &PathBuf) -> anyhow::Result<AvatarSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read spec file: {:?}", path))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse spec file: {:?}", path))
}

#[derive(Parser, Debug)]
#[command(name = "voronoi-avatar")]
#[command(about = "Render seeded Voronoi avatars", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Output PNG path (a directory in batch mode)
    #[arg(short, long)]
    output: PathBuf,

    /// Seed string (blank or missing falls back to "123456")
    #[arg(long)]
    seed: Option<String>,

    /// Palette color for the next slot (repeatable, up to 8; "" leaves a slot blank)
    #[arg(short, long = "color")]
    colors: Vec<String>,

    /// Output width in pixels [default: 256]
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels [default: 256]
    #[arg(long)]
    height: Option<u32>,

    /// YAML spec file with seed, colors, width and height
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Render one avatar per seed into the output directory
    #[arg(long, value_delimiter = ',')]
    seeds: Vec<String>,

    /// Print sampled points and per-cell choices
    #[arg(long)]
    dump: bool,
}

/// Merged settings: CLI flags take precedence over the spec file.
struct Resolved {
    seed: Option<String>,
    colors: Vec<String>,
    width: u32,
    height: u32,
}

fn resolve(args: &Args, spec: AvatarSpec) -> anyhow::Result<Resolved> {
    let colors = if args.colors.is_empty() { spec.colors } else { args.colors.clone() };
    if colors.len() > COLOR_SLOTS {
        anyhow::bail!("{} colors given, at most {} slots are available", colors.len(), COLOR_SLOTS);
    }
    let width = args.width.or(spec.width).unwrap_or(DEFAULT_SIZE);
    let height = args.height.or(spec.height).unwrap_or(DEFAULT_SIZE);
    if width == 0 || height == 0 {
        anyhow::bail!("width and height must be positive (got {}x{})", width, height);
    }
    Ok(Resolved {
        seed: args.seed.clone().or(spec.seed),
        colors,
        width,
        height,
    })
}

fn build_config(seed: Option<&str>, resolved: &Resolved) -> anyhow::Result<RenderConfig> {
    let props = AvatarProps::with_colors(seed, &resolved.colors)?;
    Ok(props.to_config(resolved.width as f64, resolved.height as f64)?)
}

/// File name for a seed: anything outside `[A-Za-z0-9_-]` becomes `_`.
fn file_stem(seed: &str) -> String {
    seed.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// One output path per config, failing when two seeds share a file name.
fn output_paths(configs: &[RenderConfig], output_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    let mut paths = Vec::with_capacity(configs.len());
    for config in configs {
        let stem = file_stem(config.seed());
        if let Some(previous) = owners.insert(stem.clone(), config.seed()) {
            anyhow::bail!(
                "seeds {:?} and {:?} would both be written to {}.png",
                previous, config.seed(), stem,
            );
        }
        paths.push(output_dir.join(format!("{}.png", stem)));
    }
    Ok(paths)
}

fn print_report(report: &RenderReport) {
    println!("{} points:", report.points.len());
    for (i, (point, cell)) in report.points.iter().zip(&report.cells).enumerate() {
        println!(
            "  [{:2}] ({:8.2}, {:8.2})  {:?}  fill={} stroke={}",
            i, point.x, point.y, cell.variant, cell.fill, cell.stroke,
        );
    }
}

fn render_single(config: &RenderConfig, output: &Path, dump: bool) -> anyhow::Result<()> {
    println!(
        "Rendering {}x{} avatar (seed: {:?}, {} color{})",
        config.width(), config.height(), config.seed(),
        config.colors().len(), if config.colors().len() == 1 { "" } else { "s" },
    );
    if config.colors().is_empty() {
        eprintln!("Warning: no colors defined; cells will use the background color");
    }

    let (image, report) = render_image_with_report(config)?;
    if dump {
        print_report(&report);
    }
    image.save(output)
        .with_context(|| format!("failed to write {:?}", output))?;
    println!("Output saved to: {:?}", output);
    Ok(())
}

fn render_many(
    seeds: &[String],
    resolved: &Resolved,
    output_dir: &Path,
    interrupted: &AtomicBool,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {:?}", output_dir))?;

    let configs = seeds
        .iter()
        .map(|seed| build_config(Some(seed), resolved))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let paths = output_paths(&configs, output_dir)?;

    println!(
        "Rendering {} avatars at {}x{} into {:?}",
        configs.len(), resolved.width, resolved.height, output_dir,
    );

    let pb = ProgressBar::new(configs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let results = render_batch(&configs, interrupted, |_| pb.inc(1));
    pb.finish_and_clear();

    let mut written = 0;
    let mut skipped = 0;
    for ((config, path), result) in configs.iter().zip(&paths).zip(results) {
        match result {
            Ok(image) => {
                image.save(path)
                    .with_context(|| format!("failed to write {:?}", path))?;
                written += 1;
            }
            Err(AvatarError::Cancelled) => skipped += 1,
            Err(e) => return Err(e).with_context(|| format!("seed {:?} failed", config.seed())),
        }
    }

    println!("Wrote {} avatars in {:.2?}", written, start.elapsed());
    if skipped > 0 {
        eprintln!("Interrupted: skipped {} avatars", skipped);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up SIGINT handler
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        })
        .context("failed to set Ctrl-C handler")?;
    }

    let spec = args.spec.as_ref().map(load_spec).transpose()?.unwrap_or_default();
    let resolved = resolve(&args, spec)?;

    if !args.seeds.is_empty() {
        if args.seed.is_some() {
            eprintln!("Warning: --seed is ignored when --seeds is given");
        }
        return render_many(&args.seeds, &resolved, &args.output, &interrupted);
    }

    let config = build_config(resolved.seed.as_deref(), &resolved)?;
    render_single(&config, &args.output, args.dump)
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use hull_packer_core::config::{PackingQuality, PackingStyle};
use hull_packer_core::model::{Point, SpriteBatch};
use hull_packer_core::{PackingConfig, failure_json, pack_sprites, to_json};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "hull-packer",
    about = "Pack sprite silhouettes into texture atlas pages using convex hulls",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack sprite meshes into atlas pages
    Pack(PackArgs),
    /// Write a file of random silhouettes
    Gen(GenArgs),
    /// Simple timing bench (packs generated silhouettes once, prints time + occupancy)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Sprite JSON file or directory of sprite JSON files
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.json / name_N.png)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides packing options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include globs (match on full path); when set, only matching files are loaded
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude globs (match on full path)
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Packing
    /// Padding between sprites in pixels
    #[arg(long, default_value_t = 4, help_heading = "Packing")]
    padding: u32,
    /// Max page width and height
    #[arg(long, default_value_t = 2048, help_heading = "Packing")]
    max_size: u32,
    /// Base grid step, scaled by --quality
    #[arg(long, default_value_t = 1, help_heading = "Packing")]
    block_offset: u32,
    /// Quality: high | default | fast
    #[arg(long, default_value = "default", help_heading = "Packing")]
    quality: String,
    /// Style: default | ramp | square
    #[arg(long, default_value = "default", help_heading = "Packing")]
    style: String,
    /// Accepted for compatibility; placement never rotates
    #[arg(long, default_value_t = false, help_heading = "Packing")]
    enable_rotation: bool,
    /// Starting page side length
    #[arg(long, default_value_t = 64, help_heading = "Packing")]
    initial_page_size: u32,
    /// Seed for per-sprite hull contexts
    #[arg(long, help_heading = "Packing")]
    seed: Option<u64>,

    // Execution
    /// Use the rayon pool for hull batches and search shards
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Execution")]
    parallel: bool,
    /// Number of search shards (default: one per worker)
    #[arg(long, help_heading = "Execution")]
    shards: Option<usize>,

    // Export
    /// Write one debug PNG per page (fills + hull outlines)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    debug_png: bool,
    /// Re-check every page for overlaps after packing
    #[arg(long, default_value_t = false, help_heading = "Export")]
    validate: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct GenArgs {
    /// Output sprite JSON file
    out: PathBuf,
    /// Number of silhouettes
    #[arg(long, default_value_t = 64)]
    count: usize,
    /// Smallest silhouette radius
    #[arg(long, default_value_t = 8.0)]
    min_radius: f32,
    /// Largest silhouette radius
    #[arg(long, default_value_t = 48.0)]
    max_radius: f32,
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Number of generated silhouettes
    #[arg(long, default_value_t = 200)]
    count: usize,
    /// Style: default | ramp | square
    #[arg(long, value_parser = ["default", "ramp", "square"], default_value = "default")]
    style: String,
    /// Quality: high | default | fast
    #[arg(long, value_parser = ["high", "default", "fast"], default_value = "default")]
    quality: String,
    #[arg(long, default_value_t = 2048)]
    max_size: u32,
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Gen(args) => run_gen(args),
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let base = PackingConfig {
        padding: cli.padding,
        max_texture_size: cli.max_size,
        block_offset: cli.block_offset,
        quality: parse_quality(&cli.quality)?,
        style: parse_style(&cli.style)?,
        enable_rotation: cli.enable_rotation,
        seed: cli.seed.unwrap_or(PackingConfig::default().seed),
        initial_page_size: cli.initial_page_size,
        parallel: cli.parallel,
        shard_count: cli.shards,
    };

    // Config file overrides CLI options field by field
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        y.into_packing_config(base)
    } else {
        base
    };

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate()?;

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no sprite files found under {}", cli.input.display());
    }
    let batch = load_sprites_with_progress(&paths, show_progress)?;
    info!(files = paths.len(), sprites = batch.len(), "loaded sprites");

    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    }
    let json_path = cli.out_dir.join(format!("{}.json", cli.name));

    let out = match pack_sprites(&batch, &cfg) {
        Ok(out) => out,
        Err(e) => {
            error!(error = %e, "packing failed");
            if !cli.dry_run {
                let value = failure_json(&batch, &cfg);
                fs::write(&json_path, serde_json::to_string_pretty(&value)?)
                    .with_context(|| format!("write {}", json_path.display()))?;
                info!(?json_path, "sentinel placements written");
            }
            return Err(e).context("pack sprites");
        }
    };

    if cli.validate {
        out.validate().context("overlap validation")?;
        info!(pages = out.pages.len(), "no overlaps");
    }

    let stats = out.stats();
    if !cli.dry_run {
        let value = to_json(&out, &batch, &cfg);
        fs::write(&json_path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, pages = out.pages.len(), "atlas written");

        if cli.debug_png {
            let images: Vec<image::RgbaImage> =
                hull_packer_core::raster::render_pages(&out, &batch);
            let single = images.len() == 1;
            for (i, img) in images.iter().enumerate() {
                let png = if single {
                    cli.out_dir.join(format!("{}.png", cli.name))
                } else {
                    cli.out_dir.join(format!("{}_{}.png", cli.name, i))
                };
                img.save(&png)
                    .with_context(|| format!("write {}", png.display()))?;
                info!(?png, "debug page written");
            }
        }
    } else {
        println!("{}", stats.summary());
    }

    if let Some(stats_path) = &cli.export_stats {
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!(
                "pages={} packed_area={:.0} total_area={} occupancy={:.2}%",
                stats.num_pages,
                stats.packed_area,
                stats.total_page_area,
                stats.occupancy * 100.0
            );
        }
    }
    Ok(())
}

fn run_gen(g: &GenArgs) -> anyhow::Result<()> {
    if g.min_radius <= 0.0 || g.max_radius <= g.min_radius {
        anyhow::bail!(
            "radius range must satisfy 0 < min < max (got {}..{})",
            g.min_radius,
            g.max_radius
        );
    }
    let file = SpriteFile {
        sprites: generate_silhouettes(g.count, g.min_radius, g.max_radius, g.seed),
    };
    if let Some(parent) = g.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&g.out, serde_json::to_string_pretty(&file)?)
        .with_context(|| format!("write {}", g.out.display()))?;
    info!(out = ?g.out, count = g.count, "silhouettes written");
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let entries = generate_silhouettes(b.count, 8.0, 48.0, b.seed);
    let batch = into_batch(entries);
    let cfg = PackingConfig {
        style: parse_style(&b.style)?,
        quality: parse_quality(&b.quality)?,
        max_texture_size: b.max_size,
        ..Default::default()
    };
    let start = Instant::now();
    let out = pack_sprites(&batch, &cfg)?;
    let dur = start.elapsed();
    let stats = out.stats();
    println!(
        "sprites={} pages={} occupancy={:.2}% time={}",
        stats.num_sprites,
        stats.num_pages,
        stats.occupancy * 100.0,
        bench_fmt_dur(dur)
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn parse_style(s: &str) -> anyhow::Result<PackingStyle> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown style: {}", s))
}

fn parse_quality(s: &str) -> anyhow::Result<PackingQuality> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown quality: {}", s))
}

/// On-disk sprite file: `{ "sprites": [ { key, vertices, indices, width?, height? } ] }`.
#[derive(Debug, Serialize, Deserialize)]
struct SpriteFile {
    sprites: Vec<SpriteEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SpriteEntry {
    key: String,
    vertices: Vec<Point>,
    indices: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
}

impl SpriteEntry {
    // Missing sizes fall back to the vertex bounding box.
    fn size(&self) -> (u32, u32) {
        let (mut w, mut h) = (0.0f32, 0.0f32);
        for v in &self.vertices {
            w = w.max(v.x);
            h = h.max(v.y);
        }
        (
            self.width.unwrap_or(w.ceil().max(0.0) as u32),
            self.height.unwrap_or(h.ceil().max(0.0) as u32),
        )
    }
}

fn into_batch(entries: impl IntoIterator<Item = SpriteEntry>) -> SpriteBatch {
    let mut batch = SpriteBatch::new();
    for e in entries {
        let (w, h) = e.size();
        batch.push(e.key, &e.vertices, &e.indices, w, h);
    }
    batch
}

fn generate_silhouettes(count: usize, min_r: f32, max_r: f32, seed: u64) -> Vec<SpriteEntry> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let spokes = rng.gen_range(5..14u32);
            let r = rng.gen_range(min_r..max_r);
            let mut vertices = vec![Point::new(r, r)];
            for s in 0..spokes {
                let a = s as f32 / spokes as f32 * std::f32::consts::TAU;
                let k = rng.gen_range(0.35..1.0f32);
                vertices.push(Point::new(
                    (r + a.cos() * r * k).max(0.0),
                    (r + a.sin() * r * k).max(0.0),
                ));
            }
            let indices = (0..spokes)
                .flat_map(|s| [0, 1 + s, 1 + (s + 1) % spokes])
                .collect();
            let size = (r * 2.0).ceil() as u32;
            SpriteEntry {
                key: format!("sprite_{:04}", i),
                vertices,
                indices,
                width: Some(size),
                height: Some(size),
            }
        })
        .collect()
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob {}", pat))?);
    }
    Ok(Some(b.build()?))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) {
            list.push(path.to_path_buf());
        }
    } else {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_sprite_file(p) && !should_skip(p, inc_set.as_ref(), exc_set.as_ref())
            {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_sprite_file(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn load_sprites_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<SpriteBatch> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut entries = Vec::new();
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_sprite_file(p) {
            Ok(file) => entries.extend(file.sprites),
            Err(e) => {
                warn!(?p, error = %e, "skip sprite file");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(into_batch(entries))
}

fn load_sprite_file(p: &Path) -> anyhow::Result<SpriteFile> {
    let text = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let file = serde_json::from_str(&text).with_context(|| format!("parse {}", p.display()))?;
    Ok(file)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    padding: Option<u32>,
    max_texture_size: Option<u32>,
    block_offset: Option<u32>,
    quality: Option<String>,
    style: Option<String>,
    enable_rotation: Option<bool>,
    seed: Option<u64>,
    initial_page_size: Option<u32>,
    parallel: Option<bool>,
    shard_count: Option<usize>,
}

impl YamlConfig {
    fn into_packing_config(self, mut cfg: PackingConfig) -> PackingConfig {
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.max_texture_size {
            cfg.max_texture_size = v;
        }
        if let Some(v) = self.block_offset {
            cfg.block_offset = v;
        }
        if let Some(v) = self.quality {
            cfg.quality = v.parse().unwrap_or(cfg.quality);
        }
        if let Some(v) = self.style {
            cfg.style = v.parse().unwrap_or(cfg.style);
        }
        if let Some(v) = self.enable_rotation {
            cfg.enable_rotation = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.initial_page_size {
            cfg.initial_page_size = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        if let Some(v) = self.shard_count {
            cfg.shard_count = Some(v);
        }
        cfg
    }
}

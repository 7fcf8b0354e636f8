//! terroir CLI - find sites whose growing season matches a reference

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use terroir_algorithms::phenology::{rank, search_sites, Ranking, SearchParams};
use terroir_algorithms::sites::{largest_region, sample_sites};
use terroir_algorithms::suitability::{land_suitability, SuitabilityMap, SuitabilityParams};
use terroir_algorithms::synthetic::{
    lapse_rate_temperature, synthetic_dem, CompositeSampler, DoubleLogistic, SyntheticProvider,
};
use terroir_core::io::{read_geotiff, write_geotiff};
use terroir_core::{Error, Raster, TimeSeries};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "terroir")]
#[command(author, version, about = "Phenology matching and land suitability", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with search and suitability parameters
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a raster file
    Info {
        /// Input raster file
        input: PathBuf,
    },
    /// Rank candidate series by similarity to a reference series
    Match {
        /// JSON file: {"reference": [...], "candidates": [{"id": "...", "values": [...]}]}
        input: PathBuf,
        /// Minimum similarity (0-100) for a match
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Maximum number of matches
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
        /// Write the ranking as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Land suitability index from a DEM and a mean annual temperature raster
    Suitability {
        /// DEM file (meters)
        dem: PathBuf,
        /// Mean annual temperature file (°C)
        temperature: PathBuf,
        /// Output score raster
        output: PathBuf,
    },
    /// Run suitability and matching end to end on synthetic data
    Demo {
        /// Grid size in cells
        #[arg(long, default_value = "96")]
        size: usize,
        /// Number of candidate sites
        #[arg(long, default_value = "40")]
        candidates: usize,
        /// Random seed
        #[arg(long, default_value = "7")]
        seed: u64,
        /// Season year passed to the series provider
        #[arg(long, default_value = "2023")]
        year: i32,
        /// Minimum similarity (0-100) for a match
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Maximum number of matches
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },
}

// ─── Configuration ──────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Config {
    search: SearchParams,
    suitability: SuitabilityParams,
}

impl Config {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    fn search_with(&self, threshold: Option<f64>, top_n: Option<usize>) -> SearchParams {
        SearchParams {
            threshold: threshold.unwrap_or(self.search.threshold),
            top_n: top_n.unwrap_or(self.search.top_n),
            ..self.search
        }
    }
}

#[derive(Debug, Deserialize)]
struct MatchInput {
    reference: TimeSeries,
    candidates: Vec<CandidateInput>,
}

#[derive(Debug, Deserialize)]
struct CandidateInput {
    id: String,
    values: TimeSeries,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_raster(path: &Path) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster = read_geotiff(path).with_context(|| format!("Failed to read {}", path.display()))?;
    pb.finish_and_clear();
    Ok(raster)
}

fn write_raster(raster: &Raster<f64>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Turn a library error into the CLI's message, with a hint for an empty ranking.
fn explain(err: Error) -> anyhow::Error {
    match err {
        Error::NoMatchFound { .. } => {
            anyhow::anyhow!("{err}\nhint: lower --threshold or widen the candidate pool")
        }
        other => other.into(),
    }
}

fn print_ranking<I: Display>(ranking: &Ranking<I>) {
    let reference = &ranking.reference.landmarks;
    println!(
        "Reference landmarks: {:?} ({:?})",
        reference.sorted_days(),
        reference.source
    );
    let s = &ranking.summary;
    println!(
        "Candidates: {}  rejected: {}  below threshold: {}  returned: {}\n",
        s.candidates, s.rejected, s.below_threshold, s.returned
    );

    println!(
        "{:>4}  {:<16} {:>10} {:>10}  {}",
        "rank", "id", "similarity", "distance", "landmarks (G/M/S/D)"
    );
    for (i, m) in ranking.matches.iter().enumerate() {
        let lm = &m.landmarks;
        println!(
            "{:>4}  {:<16} {:>10.2} {:>10.5}  {}/{}/{}/{}{}",
            i + 1,
            m.id.to_string(),
            m.similarity,
            m.distance,
            lm.greenup,
            lm.maturity,
            lm.senescence,
            lm.dormancy,
            if lm.is_fallback() { " (fallback)" } else { "" }
        );
    }
}

fn print_suitability(map: &SuitabilityMap) {
    let s = &map.summary;
    match s.mean {
        Some(mean) => println!("Mean suitability: {mean:.1}"),
        None => println!("Mean suitability: n/a (no valid cells)"),
    }
    println!("Valid cells: {}", s.valid_cells);
    for (grade, count) in s.grades.iter() {
        println!("  {grade} ({:<15}) {count:>8}", grade.label());
    }
    println!("Prime cells: {}", s.prime_cells);
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run_match(
    config: &Config,
    input: &Path,
    threshold: Option<f64>,
    top_n: Option<usize>,
    json: Option<&Path>,
) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let request: MatchInput =
        serde_json::from_str(&text).with_context(|| format!("Invalid match input {}", input.display()))?;
    let candidates: Vec<(String, TimeSeries)> = request
        .candidates
        .into_iter()
        .map(|c| (c.id, c.values))
        .collect();
    info!(candidates = candidates.len(), "loaded match input");

    let params = config.search_with(threshold, top_n);
    let start = Instant::now();
    let pb = spinner("Ranking candidates...");
    let ranking = rank(&request.reference, &candidates, params);
    pb.finish_and_clear();
    let ranking = ranking.map_err(explain)?;

    print_ranking(&ranking);
    if let Some(path) = json {
        write_json(&ranking, path)?;
        done("Ranking", path, start.elapsed());
    }
    Ok(())
}

fn run_suitability(config: &Config, dem: &Path, temperature: &Path, output: &Path) -> Result<()> {
    let dem = read_raster(dem)?;
    let temperature = read_raster(temperature)?;

    let start = Instant::now();
    let pb = spinner("Scoring suitability...");
    let map = land_suitability(&dem, &temperature, &config.suitability);
    pb.finish_and_clear();
    let map = map?;

    write_raster(&map.score, output)?;
    print_suitability(&map);
    done("Suitability", output, start.elapsed());
    Ok(())
}

struct DemoOptions {
    size: usize,
    candidates: usize,
    seed: u64,
    year: i32,
    threshold: Option<f64>,
    top_n: Option<usize>,
}

fn run_demo(config: &Config, opts: DemoOptions) -> Result<()> {
    if opts.size < 8 {
        bail!("--size must be at least 8");
    }
    let start = Instant::now();

    let pb = spinner("Generating terrain...");
    let dem = synthetic_dem(opts.size, opts.size, opts.seed);
    let temperature = lapse_rate_temperature(&dem, 18.0);
    pb.finish_and_clear();

    let pb = spinner("Scoring suitability...");
    let map = land_suitability(&dem, &temperature, &config.suitability);
    pb.finish_and_clear();
    let map = map?;
    print_suitability(&map);

    let prime = config.suitability.prime_threshold;
    let region = match largest_region(&map.score, prime) {
        Some(region) => region,
        None => {
            let best = map.summary.max.context("suitability map has no valid cells")?;
            let fallback = best - 5.0;
            warn!(prime, fallback, "no prime land, using the best-scoring patch instead");
            largest_region(&map.score, fallback).context("no region above fallback threshold")?
        }
    };
    let reference = region.site(opts.candidates);
    println!(
        "\nReference site: cell ({}, {}) at ({:.1}, {:.1}), region of {} cells",
        reference.row,
        reference.col,
        reference.x,
        reference.y,
        region.len()
    );

    let candidates = sample_sites(&map.score, opts.candidates, opts.seed);

    // Season timing follows elevation; vigor follows suitability.
    let elevation = dem.clone();
    let score = map.score.clone();
    let provider = SyntheticProvider::new(move |site, _year| {
        let z = elevation.get(site.row, site.col).ok()?;
        let s = score.get(site.row, site.col).ok().filter(|s| !s.is_nan())?;
        Some(DoubleLogistic {
            start: 100.0 + (z - 500.0) * 0.03,
            end: 285.0 - (z - 500.0) * 0.02,
            amplitude: 0.25 + 0.5 * s / 100.0,
            ..DoubleLogistic::default()
        })
    })
    .with_sampler(CompositeSampler::default(), opts.seed);

    let params = config.search_with(opts.threshold, opts.top_n);
    let pb = spinner("Matching phenology...");
    let ranking = search_sites(&provider, &reference, &candidates, opts.year, params);
    pb.finish_and_clear();
    let ranking = ranking.map_err(explain)?;

    println!();
    print_ranking(&ranking);
    println!("\nDemo finished in {:.2?}", start.elapsed());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { input } => {
            let raster = read_raster(&input)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {}", raster.cell_size());
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!("  Valid cells: {}", stats.valid_count);
        }
        Commands::Match {
            input,
            threshold,
            top_n,
            json,
        } => run_match(&config, &input, threshold, top_n, json.as_deref())?,
        Commands::Suitability {
            dem,
            temperature,
            output,
        } => run_suitability(&config, &dem, &temperature, &output)?,
        Commands::Demo {
            size,
            candidates,
            seed,
            year,
            threshold,
            top_n,
        } => run_demo(
            &config,
            DemoOptions {
                size,
                candidates,
                seed,
                year,
                threshold,
                top_n,
            },
        )?,
    }

    Ok(())
}

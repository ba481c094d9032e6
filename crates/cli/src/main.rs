//! lakescan CLI - water-body extraction from multi-band satellite scenes

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use lakescan_core::io::{read_geotiff, write_geotiff};
use lakescan_core::vector::{read_points, read_polygons, write_polygons};
use lakescan_core::{BandCode, Raster};
use lakescan_pipeline::crop::crop_to_polygons;
use lakescan_pipeline::indices::{compute_index, IndexKind};
use lakescan_pipeline::matching::{match_points, MatchMode, MatchResult};
use lakescan_pipeline::resample::{resample_res, ResamplingKernel};
use lakescan_pipeline::stack::{load_band_stack, StackParams};
use lakescan_pipeline::threshold::{threshold_mask, Polarity};
use lakescan_pipeline::vectorize::{vectorize_mask, Connectivity, VectorizeParams};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lakescan")]
#[command(author, version, about = "Water-body extraction from satellite scenes", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

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
    /// Resample a band file to a target ground resolution
    Resample {
        /// Input band file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Target x resolution
        #[arg(long, default_value = "60")]
        xres: f64,
        /// Target y resolution
        #[arg(long, default_value = "60")]
        yres: f64,
        /// Interpolation kernel: nearest, bilinear, cubic
        #[arg(short, long, default_value = "bilinear")]
        kernel: String,
    },
    /// Crop a band file to the polygons in a GeoJSON file
    Crop {
        /// Input band file
        input: PathBuf,
        /// GeoJSON file with the crop polygons
        region: PathBuf,
        /// Output file
        output: PathBuf,
    },
    /// Compute a normalized-difference index map for a scene directory
    Index {
        /// Directory containing the scene's band files
        scene: PathBuf,
        /// Output index raster
        output: PathBuf,
        /// Index kind: ndvi, ndwi
        #[arg(short, long, default_value = "ndwi")]
        index: String,
        /// Resample bands to this resolution before stacking
        #[arg(short, long, default_value = "60")]
        resolution: f64,
    },
    /// Run the full extraction: index, threshold, vectorize, match
    Extract {
        /// Directory containing the scene's band files
        scene: PathBuf,
        /// Output GeoJSON file for the extracted polygons
        output: PathBuf,
        /// Index kind: ndvi, ndwi
        #[arg(short, long, default_value = "ndwi")]
        index: String,
        /// Threshold separating foreground from background
        #[arg(short, long, default_value = "0.2")]
        threshold: f64,
        /// Treat values below the threshold as foreground
        #[arg(long)]
        below: bool,
        /// Resample bands to this resolution before stacking
        #[arg(short, long, default_value = "60")]
        resolution: f64,
        /// Region connectivity: 4 or 8
        #[arg(long, default_value = "4")]
        connectivity: u8,
        /// Optional GeoJSON point file to match against the polygons
        #[arg(long)]
        points: Option<PathBuf>,
        /// Matching mode: containment, nearest
        #[arg(long, default_value = "containment")]
        mode: String,
    },
    /// Match a GeoJSON point file against a GeoJSON polygon file
    Match {
        /// Polygon GeoJSON file
        polygons: PathBuf,
        /// Point GeoJSON file
        points: PathBuf,
        /// Matching mode: containment, nearest
        #[arg(short, long, default_value = "containment")]
        mode: String,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn parse_kernel(s: &str) -> Result<ResamplingKernel> {
    match s.to_lowercase().as_str() {
        "nearest" => Ok(ResamplingKernel::Nearest),
        "bilinear" => Ok(ResamplingKernel::Bilinear),
        "cubic" => Ok(ResamplingKernel::Cubic),
        _ => anyhow::bail!("Unknown kernel: {}. Use nearest, bilinear, or cubic.", s),
    }
}

fn parse_index(s: &str) -> Result<IndexKind> {
    match s.to_lowercase().as_str() {
        "ndvi" => Ok(IndexKind::Ndvi),
        "ndwi" => Ok(IndexKind::Ndwi),
        _ => anyhow::bail!("Unknown index: {}. Use ndvi or ndwi.", s),
    }
}

fn parse_mode(s: &str) -> Result<MatchMode> {
    match s.to_lowercase().as_str() {
        "containment" | "contains" => Ok(MatchMode::Containment),
        "nearest" => Ok(MatchMode::Nearest),
        _ => anyhow::bail!("Unknown match mode: {}. Use containment or nearest.", s),
    }
}

fn parse_connectivity(value: u8) -> Result<Connectivity> {
    match value {
        4 => Ok(Connectivity::Four),
        8 => Ok(Connectivity::Eight),
        _ => anyhow::bail!("Connectivity must be 4 or 8, got {}", value),
    }
}

/// Enumerate band files in a scene directory.
///
/// Keeps files with a TIFF extension whose stem names a known band code;
/// everything else (thumbnails, metadata) is skipped. Order is
/// lexicographic, so repeated runs stack bands identically.
fn discover_band_files(scene: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(scene)
        .with_context(|| format!("Cannot read scene directory {}", scene.display()))?
    {
        let path = entry?.path();
        let is_tiff = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "tif" | "tiff"))
            .unwrap_or(false);
        if !is_tiff {
            continue;
        }

        let has_code = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|stem| BandCode::from_stem(stem).is_ok())
            .unwrap_or(false);
        if has_code {
            paths.push(path);
        }
    }

    paths.sort();
    Ok(paths)
}

fn load_scene(scene: &Path, resolution: f64) -> Result<lakescan_core::BandStack> {
    let paths = discover_band_files(scene)?;
    if paths.is_empty() {
        anyhow::bail!("No band files found in {}", scene.display());
    }
    info!("Found {} band files", paths.len());

    let pb = spinner("Loading band stack...");
    let params = StackParams {
        resolution: Some((resolution, resolution)),
        kernel: ResamplingKernel::Bilinear,
    };
    let stack = load_band_stack(&paths, &params).context("Failed to load band stack")?;
    pb.finish_and_clear();

    let (rows, cols) = stack.shape();
    info!(
        "Stack: {} bands, {} x {} cells at {}m",
        stack.len(),
        cols,
        rows,
        resolution
    );
    Ok(stack)
}

fn read_band_file(path: &PathBuf) -> Result<Raster<f64>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<f64> = read_geotiff(path, None).context("Failed to read raster")?;
    pb.finish_and_clear();
    Ok(raster)
}

fn write_raster_file(raster: &Raster<f64>, path: &PathBuf) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geotiff(raster, path, None).context("Failed to write output")?;
    pb.finish_and_clear();
    Ok(())
}

fn report_matches(result: &MatchResult) {
    for m in result.matches() {
        match m.polygon {
            Some(index) => info!("{} -> polygon {}", m.id, index),
            None => warn!("{} -> unmatched", m.id),
        }
    }
    info!(
        "Matched {} of {} points",
        result.matched_count(),
        result.len()
    );
}

fn done(name: &str, path: &PathBuf, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            let raster = read_band_file(&input)?;
            let (rows, cols) = raster.shape();
            let (xres, yres) = raster.resolution();
            let bounds = raster.bounds();
            let stats = raster.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Pixel size: {} x {}", xres, yres);
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            if let Some(crs) = raster.crs() {
                println!("CRS: {}", crs);
            }
            if let Some(nodata) = raster.nodata() {
                println!("Nodata: {}", nodata);
            }
            println!(
                "Values: min {:?}, max {:?}, mean {:?} ({} valid cells)",
                stats.min, stats.max, stats.mean, stats.valid_count
            );
        }

        Commands::Resample {
            input,
            output,
            xres,
            yres,
            kernel,
        } => {
            let kernel = parse_kernel(&kernel)?;
            let raster = read_band_file(&input)?;

            let start = Instant::now();
            let resampled =
                resample_res(&raster, xres, yres, kernel).context("Resampling failed")?;
            let elapsed = start.elapsed();

            write_raster_file(&resampled, &output)?;
            done("Resampled band", &output, elapsed);
        }

        Commands::Crop {
            input,
            region,
            output,
        } => {
            let raster = read_band_file(&input)?;
            let polygons = read_polygons(&region).context("Failed to read crop region")?;

            let start = Instant::now();
            let cropped = crop_to_polygons(&raster, &polygons).context("Cropping failed")?;
            let elapsed = start.elapsed();

            info!(
                "Cropped {} x {} to {} x {}",
                raster.cols(),
                raster.rows(),
                cropped.cols(),
                cropped.rows()
            );
            write_raster_file(&cropped, &output)?;
            done("Cropped band", &output, elapsed);
        }

        Commands::Index {
            scene,
            output,
            index,
            resolution,
        } => {
            let kind = parse_index(&index)?;
            let stack = load_scene(&scene, resolution)?;

            let start = Instant::now();
            let Some(map) = compute_index(&stack, kind) else {
                anyhow::bail!(
                    "{} unavailable: scene lacks the required bands (found {:?})",
                    kind.label(),
                    stack.codes()
                );
            };
            let elapsed = start.elapsed();

            write_raster_file(map.grid(), &output)?;
            done(map.label(), &output, elapsed);
        }

        Commands::Extract {
            scene,
            output,
            index,
            threshold,
            below,
            resolution,
            connectivity,
            points,
            mode,
        } => {
            let kind = parse_index(&index)?;
            let connectivity = parse_connectivity(connectivity)?;
            let mode = parse_mode(&mode)?;
            let polarity = if below { Polarity::Below } else { Polarity::Above };

            let stack = load_scene(&scene, resolution)?;

            let start = Instant::now();
            let Some(map) = compute_index(&stack, kind) else {
                anyhow::bail!(
                    "{} unavailable: scene lacks the required bands (found {:?})",
                    kind.label(),
                    stack.codes()
                );
            };

            let mask = threshold_mask(map.grid(), threshold, polarity);
            let params = VectorizeParams {
                connectivity,
                foreground: 1,
            };
            let polygons = vectorize_mask(&mask, &params);
            let elapsed = start.elapsed();

            if polygons.is_empty() {
                warn!(
                    "No regions found ({} {} threshold {})",
                    map.label(),
                    if below { "below" } else { "above" },
                    threshold
                );
            } else {
                info!("Extracted {} polygons", polygons.len());
            }

            let crs = stack.profile()?.crs().cloned();
            write_polygons(&polygons, crs.as_ref(), &output)
                .context("Failed to write polygons")?;

            if let Some(points_path) = points {
                let labeled = read_points(&points_path).context("Failed to read points")?;
                let result = match_points(&labeled, &polygons, mode)?;
                report_matches(&result);
            }

            done("Polygons", &output, elapsed);
        }

        Commands::Match {
            polygons,
            points,
            mode,
        } => {
            let mode = parse_mode(&mode)?;
            let polys = read_polygons(&polygons).context("Failed to read polygons")?;
            let labeled = read_points(&points).context("Failed to read points")?;

            info!(
                "Matching {} points against {} polygons",
                labeled.len(),
                polys.len()
            );

            let start = Instant::now();
            let result = match_points(&labeled, &polys, mode)?;
            let elapsed = start.elapsed();

            report_matches(&result);
            println!("  Processing time: {:.2?}", elapsed);
        }
    }

    Ok(())
}

//! polyfit command-line runner

mod io;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use polyfit_core::{AzimuthConvention, FitConfig, Fitter, ProgressReporter, Record, ValidationMode};
use polyfit_d2::{polygon_defect, CanonicalRecord, Fitter2D};
use std::path::PathBuf;

use crate::io::{load_config, load_polygons, write_json, MatrixOutput, PlacedOutput};

#[derive(Parser)]
#[command(name = "polyfit")]
#[command(about = "Host/tenant polygon fit matrix")]
#[command(version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the fit matrix of two polygon collections
    Run {
        /// Host polygons (JSON)
        #[arg(long)]
        hosts: PathBuf,

        /// Tenant polygons (JSON)
        #[arg(long)]
        tenants: PathBuf,

        /// Inset applied to every host
        #[arg(short, long)]
        clearance: Option<f64>,

        /// Abort when any polygon is invalid
        #[arg(long, conflicts_with = "skip_invalid")]
        strict: bool,

        /// Leave invalid polygons out of the run
        #[arg(long)]
        skip_invalid: bool,

        /// Use the compass azimuth convention
        #[arg(long)]
        compass: bool,

        /// Disable the area/extent prefilter
        #[arg(long)]
        no_prefilter: bool,

        /// Evaluate hosts in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Worker threads for parallel evaluation
        #[arg(long)]
        threads: Option<usize>,

        /// Seed for sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Run configuration (JSON); flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file for the matrix (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output file for one sampled placement per host
        #[arg(long)]
        sample: Option<PathBuf>,

        /// Progress display
        #[arg(long, value_enum, default_value = "none")]
        progress: ProgressArg,
    },

    /// Print orientation, canonical frame and validity of each polygon
    Inspect {
        /// Polygons (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Inset used for the canonical extents
        #[arg(short, long, default_value = "0")]
        clearance: f64,

        /// Use the compass azimuth convention
        #[arg(long)]
        compass: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProgressArg {
    /// No progress output
    None,
    /// Status line on stderr
    Console,
}

impl From<ProgressArg> for ProgressReporter {
    fn from(arg: ProgressArg) -> Self {
        match arg {
            ProgressArg::None => ProgressReporter::Null,
            ProgressArg::Console => ProgressReporter::Console,
        }
    }
}

fn convention(compass: bool) -> AzimuthConvention {
    if compass {
        AzimuthConvention::Compass
    } else {
        AzimuthConvention::Cartesian
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.as_str())).init();

    match cli.command {
        Commands::Run {
            hosts,
            tenants,
            clearance,
            strict,
            skip_invalid,
            compass,
            no_prefilter,
            parallel,
            threads,
            seed,
            config,
            output,
            sample,
            progress,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => FitConfig::new(),
            };
            if let Some(clearance) = clearance {
                config.clearance = clearance;
            }
            if strict {
                config.validation = ValidationMode::Strict;
            } else if skip_invalid {
                config.validation = ValidationMode::Skip;
            }
            if compass {
                config.azimuth_convention = AzimuthConvention::Compass;
            }
            if no_prefilter {
                config.prefilter = false;
            }
            if parallel {
                config.parallel = true;
            }
            if let Some(threads) = threads {
                config.threads = threads;
            }
            if let Some(seed) = seed {
                config.seed = Some(seed);
            }

            let hosts = load_polygons(&hosts)?;
            let tenants = load_polygons(&tenants)?;
            log::info!(
                "loaded {} hosts and {} tenants (clearance {})",
                hosts.len(),
                tenants.len(),
                config.clearance
            );

            let reporter = ProgressReporter::from(progress);
            let fitter = Fitter2D::new(config);
            let mut run = fitter
                .run_with_progress(&hosts, &tenants, &reporter)
                .context("fit run failed")?;

            if let Some(path) = sample {
                let placed = run
                    .sample_fitted_geometry()
                    .context("sampling placements failed")?;
                let placed: Vec<PlacedOutput> = placed.iter().map(PlacedOutput::from).collect();
                write_json(Some(&path), &placed)?;
            }

            write_json(
                output.as_deref(),
                &MatrixOutput {
                    matrix: run.matrix(),
                    summary: run.summary(),
                    validation: run.validation(),
                },
            )?;

            let summary = run.finalize();
            eprintln!("{}", summary);
        }

        Commands::Inspect {
            input,
            clearance,
            compass,
        } => {
            let polygons = load_polygons(&input)?;
            println!(
                "{:<16} {:>12} {:>9} {:>23} {:>21}  status",
                "id", "area", "azimuth", "canonical centroid", "canonical extents"
            );
            for polygon in &polygons {
                let record = CanonicalRecord::derive(polygon, clearance, convention(compass));
                let (w, h) = record.extents();
                let centroid = record
                    .centroid()
                    .map(|c| format!("({:.3}, {:.3})", c.x, c.y))
                    .unwrap_or_else(|| "-".to_string());
                let status = polygon_defect(polygon).unwrap_or_else(|| "ok".to_string());
                println!(
                    "{:<16} {:>12.3} {:>9.3} {:>23} {:>10.3} x {:>8.3}  {}",
                    polygon.id(),
                    polygon.area(),
                    record.azimuth(),
                    centroid,
                    w,
                    h,
                    status
                );
            }
        }
    }

    Ok(())
}

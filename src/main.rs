// main.rs

// --- External Crate Imports ---
use anyhow::{anyhow, Context, Error, Result};
use clap::Parser;
use gwas_regions::{
    find_regions, find_regions_parallel, partition, read_marker_file, write_region_file,
    ClumpConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::time::Instant;

// --- Main Function ---
fn main() -> Result<(), Error> {
    let total_time_start = Instant::now();
    let cli_args = cli::CliArgs::parse();

    // Initialize logger
    let log_level = cli_args
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to Info.",
                cli_args.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();

    info!("Starting gwas_regions with args: {:?}", cli_args);

    let config = ClumpConfig::new(
        cli_args.index_p,
        cli_args.suggestive_p,
        cli_args.search_space,
    )?;

    // --- 1. Load markers ---
    info!("Loading markers from {}", cli_args.input.display());
    let store = read_marker_file(&cli_args.input)
        .with_context(|| format!("Failed to load markers from {}", cli_args.input.display()))?;
    if store.is_empty() {
        warn!(
            "No usable markers in {}. The output will contain only a header.",
            cli_args.input.display()
        );
    }

    // --- 2. Split by chromosome ---
    let partitions = partition(store.into_markers())?;
    info!("Markers span {} chromosome(s).", partitions.len());

    // --- 3. Region detection ---
    let progress = if cli_args.progress {
        let style = ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chromosomes ({percent}%) ETA: {eta}",
            )
            .map_err(|e| anyhow!("Failed to create progress bar style: {}", e))?
            .progress_chars("=> ");
        ProgressBar::new(partitions.len() as u64).with_style(style)
    } else {
        ProgressBar::hidden()
    };

    let results = match cli_args.threads {
        Some(threads) => {
            let num_threads = if threads == 0 { num_cpus::get() } else { threads };
            info!("Using {} threads, one chromosome per task.", num_threads);
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            find_regions_parallel(&partitions, &config, &progress)?
        }
        None => find_regions(&partitions, &config, &progress)?,
    };
    progress.finish_with_message("Region detection complete.");
    info!("Identified {} unique region(s).", results.len());

    // --- 4. Write Outputs ---
    write_region_file(&cli_args.output, results.regions())?;

    info!(
        "Completed. Output written to {} in {:.2?}.",
        cli_args.output.display(),
        total_time_start.elapsed()
    );
    Ok(())
}

// --- Module Implementations ---

mod cli {
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(
        author,
        version,
        about = "Collapse GWAS markers into unique associated regions.",
        long_about = None,
        propagate_version = true
    )]
    pub(crate) struct CliArgs {
        /// Tab-separated marker table: name, chromosome, position, ..., p-value
        pub(crate) input: PathBuf,

        /// Destination of the region table
        pub(crate) output: PathBuf,

        /// Index p-value threshold, e.g. 1e-5
        pub(crate) index_p: f64,

        /// Suggestive p-value threshold, e.g. 1e-4
        pub(crate) suggestive_p: f64,

        /// Search-space half-width in base pairs, e.g. 500000
        pub(crate) search_space: u64,

        /// Process chromosomes in parallel; 0 uses every logical CPU
        #[arg(short = 't', long)]
        pub(crate) threads: Option<usize>,

        #[arg(long, default_value = "Info")]
        pub(crate) log_level: String,

        /// Show a progress bar over chromosomes
        #[arg(long)]
        pub(crate) progress: bool,
    }
}

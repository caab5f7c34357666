// clump.rs

use indicatif::ProgressBar;
use log::{debug, info};
use rayon::prelude::*;

use crate::config::ClumpConfig;
use crate::error::ClumpError;
use crate::partition::ChromosomePartition;
use crate::region::build_region;
use crate::result_set::{MergeOutcome, ResultSet};
use crate::window::expand;

/// Collapses the index markers of one chromosome into regions.
///
/// Every index marker, in position order, is expanded, summarized and offered
/// to the chromosome's result set, so seeds that land in an already known
/// region only widen or recount it.
pub fn clump_chromosome(
    partition: &ChromosomePartition,
    config: &ClumpConfig,
) -> Result<ResultSet, ClumpError> {
    partition.verify_sorted()?;

    let seeds: Vec<_> = partition
        .markers_at_or_below(config.index_threshold)
        .collect();
    let mut results = ResultSet::new();
    if seeds.is_empty() {
        info!(
            "For chromosome {}, no markers found at or below the index p-value threshold {}. Skipping.",
            partition.chromosome, config.index_threshold
        );
        return Ok(results);
    }

    for seed in &seeds {
        let expansion = expand(&partition.markers, seed.position, config);
        debug!(
            "Seed {} ({}:{}): window {}-{} after {} iterations, {} candidate markers.",
            seed.name,
            partition.chromosome,
            seed.position,
            expansion.start,
            expansion.stop,
            expansion.iterations,
            expansion.markers.len()
        );

        let region = build_region(expansion.markers, config)?;
        match results.merge_or_append(region, &partition.markers, config) {
            MergeOutcome::Appended(idx) => debug!("Seed {} opened region {}.", seed.name, idx),
            MergeOutcome::Merged(idx) => debug!("Seed {} folded into region {}.", seed.name, idx),
        }
    }

    info!(
        "Chromosome {}: {} index markers collapsed into {} region(s).",
        partition.chromosome,
        seeds.len(),
        results.len()
    );
    Ok(results)
}

/// Processes chromosomes one after another in the given order.
pub fn find_regions(
    partitions: &[ChromosomePartition],
    config: &ClumpConfig,
    progress: &ProgressBar,
) -> Result<ResultSet, ClumpError> {
    let mut results = ResultSet::new();
    for partition in partitions {
        results.absorb(clump_chromosome(partition, config)?);
        progress.inc(1);
    }
    Ok(results)
}

/// Processes chromosomes concurrently on the current rayon pool.
///
/// Regions never span chromosomes, so per-chromosome results are simply
/// concatenated in input order. The output matches [`find_regions`] exactly,
/// region indices included.
pub fn find_regions_parallel(
    partitions: &[ChromosomePartition],
    config: &ClumpConfig,
    progress: &ProgressBar,
) -> Result<ResultSet, ClumpError> {
    let per_chromosome: Vec<Result<ResultSet, ClumpError>> = partitions
        .par_iter()
        .map(|partition| {
            let result = clump_chromosome(partition, config);
            progress.inc(1);
            result
        })
        .collect();

    let mut results = ResultSet::new();
    for chromosome_results in per_chromosome {
        results.absorb(chromosome_results?);
    }
    Ok(results)
}

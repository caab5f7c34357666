// region.rs

use crate::config::ClumpConfig;
use crate::error::EmptyRegionError;
use crate::markers::Marker;

/// One summarized association region.
///
/// `marker_name`, `chr`, `position` and `p_value` describe the representative
/// marker, the suggestive marker with the smallest p-value.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// 1-based, assigned when the region is appended to a result set. Zero until then.
    pub region_index: usize,
    pub marker_name: String,
    pub chr: u8,
    pub position: u64,
    pub p_value: f64,
    pub region_start: u64,
    pub region_stop: u64,
    pub num_sig_markers: usize,
    pub num_suggestive_markers: usize,
    pub num_total_markers: usize,
    /// `region_stop - region_start`, without a +1.
    pub size_of_region: u64,
}

impl Region {
    pub fn contains(&self, position: u64) -> bool {
        self.region_start <= position && position <= self.region_stop
    }

    pub fn intersects(&self, other: &Region) -> bool {
        self.region_start <= other.region_stop && other.region_start <= self.region_stop
    }

    /// Recounts markers for the current bounds. Only markers inside
    /// `[region_start, region_stop]` are considered; the representative is kept.
    pub(crate) fn recount(&mut self, markers: &[Marker], config: &ClumpConfig) {
        let counts = MarkerCounts::tally(
            markers.iter().filter(|m| self.contains(m.position)),
            config,
        );
        self.num_sig_markers = counts.significant;
        self.num_suggestive_markers = counts.suggestive;
        self.num_total_markers = counts.total;
        self.size_of_region = self.region_stop - self.region_start;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct MarkerCounts {
    significant: usize,
    suggestive: usize,
    total: usize,
}

impl MarkerCounts {
    fn tally<'a>(markers: impl Iterator<Item = &'a Marker>, config: &ClumpConfig) -> Self {
        markers.fold(MarkerCounts::default(), |mut acc, m| {
            acc.total += 1;
            if config.is_suggestive(m.p_value) {
                acc.suggestive += 1;
                if config.is_index(m.p_value) {
                    acc.significant += 1;
                }
            }
            acc
        })
    }
}

/// Builds a region from a candidate marker set (typically an expansion window).
///
/// Bounds come from the outermost suggestive markers. The representative is the
/// suggestive marker with the smallest p-value; on ties the first one in input
/// order wins. `num_total_markers` counts every candidate inside the bounds.
pub fn build_region(candidates: &[Marker], config: &ClumpConfig) -> Result<Region, EmptyRegionError> {
    let mut qualifying = candidates.iter().filter(|m| config.is_suggestive(m.p_value));
    let first = qualifying.next().ok_or(EmptyRegionError {
        candidates: candidates.len(),
    })?;

    let (representative, start, stop) = qualifying.fold(
        (first, first.position, first.position),
        |(best, start, stop), m| {
            let best = if m.p_value < best.p_value { m } else { best };
            (best, start.min(m.position), stop.max(m.position))
        },
    );

    let mut region = Region {
        region_index: 0,
        marker_name: representative.name.clone(),
        chr: representative.chromosome,
        position: representative.position,
        p_value: representative.p_value,
        region_start: start,
        region_stop: stop,
        num_sig_markers: 0,
        num_suggestive_markers: 0,
        num_total_markers: 0,
        size_of_region: 0,
    };
    region.recount(candidates, config);
    Ok(region)
}

// window.rs
//
// Convergent window expansion around an index marker. Each seek keeps sliding a
// window of `search_space` base pairs outward from the current boundary and
// moves the boundary to the outermost suggestive marker inside it, until the
// boundary stops moving.

use crate::config::ClumpConfig;
use crate::markers::Marker;

/// Where a one-directional seek settled and how many windows it evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub position: u64,
    pub iterations: usize,
}

/// Result of expanding around one seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion<'a> {
    pub start: u64,
    pub stop: u64,
    /// Windows evaluated by both seeks together.
    pub iterations: usize,
    /// Every marker with `start <= position <= stop`, whatever its p-value.
    pub markers: &'a [Marker],
}

/// Markers with `lo <= position <= hi`. `markers` must be sorted by position.
pub fn markers_between(markers: &[Marker], lo: u64, hi: u64) -> &[Marker] {
    if lo > hi {
        return &[];
    }
    let begin = markers.partition_point(|m| m.position < lo);
    let end = markers.partition_point(|m| m.position <= hi);
    &markers[begin..end]
}

/// Seeks downward from `seed` while suggestive signal keeps appearing.
pub fn seek_start(markers: &[Marker], seed: u64, config: &ClumpConfig) -> Boundary {
    let mut current = seed;
    let mut iterations = 0;
    loop {
        iterations += 1;
        let lo = current.saturating_sub(config.search_space);
        // sorted input: the first suggestive marker has the smallest position
        let next = markers_between(markers, lo, current)
            .iter()
            .find(|m| config.is_suggestive(m.p_value))
            .map(|m| m.position);
        match next {
            Some(position) if position < current => current = position,
            _ => break,
        }
    }
    Boundary {
        position: current,
        iterations,
    }
}

/// Seeks upward from `seed` while suggestive signal keeps appearing.
pub fn seek_stop(markers: &[Marker], seed: u64, config: &ClumpConfig) -> Boundary {
    let mut current = seed;
    let mut iterations = 0;
    loop {
        iterations += 1;
        let hi = current.saturating_add(config.search_space);
        let next = markers_between(markers, current, hi)
            .iter()
            .rev()
            .find(|m| config.is_suggestive(m.p_value))
            .map(|m| m.position);
        match next {
            Some(position) if position > current => current = position,
            _ => break,
        }
    }
    Boundary {
        position: current,
        iterations,
    }
}

/// Expands in both directions around `seed` and returns the converged bounds
/// together with the candidate marker set between them.
pub fn expand<'a>(markers: &'a [Marker], seed: u64, config: &ClumpConfig) -> Expansion<'a> {
    let start = seek_start(markers, seed, config);
    let stop = seek_stop(markers, seed, config);
    Expansion {
        start: start.position,
        stop: stop.position,
        iterations: start.iterations + stop.iterations,
        markers: markers_between(markers, start.position, stop.position),
    }
}

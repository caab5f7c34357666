// partition.rs

use std::collections::BTreeMap;

use crate::error::DataOrderingError;
use crate::markers::Marker;

/// All markers of one chromosome, in position order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomePartition {
    pub chromosome: u8,
    pub markers: Vec<Marker>,
}

impl ChromosomePartition {
    /// Checks that positions never decrease. Ties are allowed.
    pub fn verify_sorted(&self) -> Result<(), DataOrderingError> {
        match self
            .markers
            .windows(2)
            .find(|pair| pair[0].position > pair[1].position)
        {
            Some(pair) => Err(DataOrderingError {
                chromosome: self.chromosome,
                marker: pair[1].name.clone(),
                position: pair[1].position,
                previous_position: pair[0].position,
            }),
            None => Ok(()),
        }
    }

    /// Markers at or below `threshold`, in position order.
    pub fn markers_at_or_below(&self, threshold: f64) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.p_value <= threshold)
    }
}

/// Groups markers by chromosome, keeping file order inside each group, and
/// returns the groups in ascending chromosome order.
///
/// A group whose positions are not already non-decreasing is rejected rather
/// than re-sorted.
pub fn partition(markers: Vec<Marker>) -> Result<Vec<ChromosomePartition>, DataOrderingError> {
    let mut by_chromosome: BTreeMap<u8, Vec<Marker>> = BTreeMap::new();
    for marker in markers {
        by_chromosome
            .entry(marker.chromosome)
            .or_default()
            .push(marker);
    }

    by_chromosome
        .into_iter()
        .map(|(chromosome, markers)| {
            let partition = ChromosomePartition {
                chromosome,
                markers,
            };
            partition.verify_sorted()?;
            Ok(partition)
        })
        .collect()
}

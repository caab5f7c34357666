// result_set.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::ClumpConfig;
use crate::markers::Marker;
use crate::region::Region;

/// What [`ResultSet::merge_or_append`] did with a candidate. Both variants carry
/// the 1-based `region_index` of the affected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Appended(usize),
    Merged(usize),
}

/// Region starts of one chromosome, ordered, plus the widest region seen so far.
/// Any region reaching a position `p` must start at or after `p - max_len`,
/// which bounds every overlap lookup to a single range scan.
#[derive(Debug, Default, Clone)]
struct ChromosomeIndex {
    starts: BTreeSet<(u64, usize)>,
    max_len: u64,
}

impl ChromosomeIndex {
    fn insert(&mut self, region: &Region, slot: usize) {
        self.starts.insert((region.region_start, slot));
        self.max_len = self.max_len.max(region.region_stop - region.region_start);
    }
}

/// Regions in insertion order, with lookups by chromosome and by representative marker.
#[derive(Debug, Default, Clone)]
pub struct ResultSet {
    regions: Vec<Region>,
    by_chromosome: BTreeMap<u8, ChromosomeIndex>,
    by_representative: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions on `chromosome`, ordered by current start.
    #[cfg(test)]
    fn regions_on(&self, chromosome: u8) -> impl Iterator<Item = &Region> {
        self.by_chromosome
            .get(&chromosome)
            .into_iter()
            .flat_map(|index| index.starts.iter())
            .map(move |&(_, slot)| &self.regions[slot])
    }

    /// Finds the earliest appended region on the candidate's chromosome that the
    /// candidate overlaps and returns its position in [`ResultSet::regions`].
    ///
    /// A candidate overlaps an existing region when both share a representative
    /// marker, when their starts are less than `search_space` apart, or when
    /// their intervals intersect.
    pub fn find_overlap(&self, candidate: &Region, search_space: u64) -> Option<usize> {
        let same_representative = self
            .by_representative
            .get(&candidate.marker_name)
            .copied()
            .filter(|&slot| self.regions[slot].chr == candidate.chr);

        let index = match self.by_chromosome.get(&candidate.chr) {
            Some(index) => index,
            None => return same_representative,
        };

        let reach = search_space.saturating_sub(1);
        let lo = candidate
            .region_start
            .saturating_sub(reach.max(index.max_len));
        let hi = candidate
            .region_stop
            .max(candidate.region_start.saturating_add(reach));

        let adjacent_or_intersecting = index
            .starts
            .range((lo, 0)..=(hi, usize::MAX))
            .map(|&(_, slot)| slot)
            .filter(|&slot| {
                let existing = &self.regions[slot];
                existing.region_start.abs_diff(candidate.region_start) < search_space
                    || existing.intersects(candidate)
            })
            .min();

        match (same_representative, adjacent_or_intersecting) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Folds `candidate` into the first region it overlaps, or appends it as a
    /// new region.
    ///
    /// On a merge the existing region's bounds grow to the union of both, then
    /// its counts are recomputed from `markers` inside the new bounds.
    /// `markers` must contain every marker of the candidate's chromosome that
    /// lies inside the merged bounds; the chromosome partition always does.
    pub fn merge_or_append(
        &mut self,
        candidate: Region,
        markers: &[Marker],
        config: &ClumpConfig,
    ) -> MergeOutcome {
        match self.find_overlap(&candidate, config.search_space) {
            Some(slot) => {
                self.widen(slot, &candidate, markers, config);
                MergeOutcome::Merged(self.regions[slot].region_index)
            }
            None => MergeOutcome::Appended(self.append(candidate)),
        }
    }

    fn widen(&mut self, slot: usize, candidate: &Region, markers: &[Marker], config: &ClumpConfig) {
        let existing = &mut self.regions[slot];
        let old_start = existing.region_start;
        existing.region_start = existing.region_start.min(candidate.region_start);
        existing.region_stop = existing.region_stop.max(candidate.region_stop);
        existing.recount(markers, config);

        let chr = existing.chr;
        let index = self.by_chromosome.entry(chr).or_default();
        index.starts.remove(&(old_start, slot));
        index.insert(&self.regions[slot], slot);
    }

    /// Appends without any overlap check and returns the assigned `region_index`.
    fn append(&mut self, mut region: Region) -> usize {
        let slot = self.regions.len();
        region.region_index = slot + 1;
        self.by_chromosome
            .entry(region.chr)
            .or_default()
            .insert(&region, slot);
        self.by_representative
            .entry(region.marker_name.clone())
            .or_insert(slot);
        self.regions.push(region);
        slot + 1
    }

    /// Appends every region of `other` after the regions already held,
    /// renumbering them to continue this set's sequence. No merging happens, so
    /// `other` is expected to cover chromosomes this set does not.
    pub fn absorb(&mut self, other: ResultSet) {
        for region in other.regions {
            self.append(region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::build_region;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::*;

    fn marker(name: &str, chromosome: u8, position: u64, p_value: f64) -> Marker {
        Marker {
            name: name.to_string(),
            chromosome,
            position,
            p_value,
        }
    }

    #[fixture]
    fn config() -> ClumpConfig {
        ClumpConfig::new(1e-5, 1e-4, 1000).unwrap()
    }

    #[rstest]
    fn test_distant_regions_are_appended(config: ClumpConfig) {
        let markers = vec![marker("a", 1, 100, 1e-8), marker("b", 1, 50_000, 1e-7)];
        let mut results = ResultSet::new();
        let first = build_region(&markers[..1], &config).unwrap();
        let second = build_region(&markers[1..], &config).unwrap();

        assert_eq!(results.merge_or_append(first, &markers, &config), MergeOutcome::Appended(1));
        assert_eq!(results.merge_or_append(second, &markers, &config), MergeOutcome::Appended(2));
        assert_eq!(results.regions()[1].region_index, 2);
    }

    #[rstest]
    fn test_downstream_candidate_widens_existing(config: ClumpConfig) {
        let markers = vec![
            marker("a", 1, 100, 1e-8),
            marker("b", 1, 600, 0.5),
            marker("c", 1, 900, 1e-6),
            marker("d", 1, 1_500, 5e-5),
        ];
        let mut results = ResultSet::new();
        results.merge_or_append(build_region(&markers[..1], &config).unwrap(), &markers, &config);
        let outcome =
            results.merge_or_append(build_region(&markers[2..], &config).unwrap(), &markers, &config);

        assert_eq!(outcome, MergeOutcome::Merged(1));
        assert_eq!(results.len(), 1);
        let region = &results.regions()[0];
        assert_eq!(region.marker_name, "a");
        assert_eq!((region.region_start, region.region_stop), (100, 1_500));
        assert_eq!(region.num_sig_markers, 2);
        assert_eq!(region.num_suggestive_markers, 3);
        assert_eq!(region.num_total_markers, 4);
        assert_eq!(region.size_of_region, 1_400);
    }

    #[rstest]
    fn test_upstream_intersecting_candidate_merges(config: ClumpConfig) {
        let markers = vec![
            marker("a", 1, 10_000, 5e-5),
            marker("b", 1, 14_000, 1e-7),
            marker("c", 1, 20_000, 1e-8),
        ];
        let mut results = ResultSet::new();
        results.merge_or_append(build_region(&markers[1..], &config).unwrap(), &markers, &config);
        // representative b differs from c and the starts are 4 kb apart; only the intervals touch
        let outcome =
            results.merge_or_append(build_region(&markers[..2], &config).unwrap(), &markers, &config);

        assert_eq!(outcome, MergeOutcome::Merged(1));
        let region = &results.regions()[0];
        assert_eq!((region.region_start, region.region_stop), (10_000, 20_000));
    }

    #[rstest]
    fn test_upstream_candidate_with_close_start_merges(config: ClumpConfig) {
        let markers = vec![
            marker("a", 1, 1_000, 5e-5),
            marker("b", 1, 1_200, 1e-7),
            marker("c", 1, 1_500, 1e-8),
        ];
        let mut results = ResultSet::new();
        results.merge_or_append(build_region(&markers[2..], &config).unwrap(), &markers, &config);
        // [1000, 1200] ends before [1500, 1500]; only the 500 bp start gap links them
        let outcome =
            results.merge_or_append(build_region(&markers[..2], &config).unwrap(), &markers, &config);

        assert_eq!(outcome, MergeOutcome::Merged(1));
        assert_eq!(results.len(), 1);
        let region = &results.regions()[0];
        assert_eq!(region.marker_name, "c");
        assert_eq!((region.region_start, region.region_stop), (1_000, 1_500));
        assert_eq!(region.num_sig_markers, 2);
        assert_eq!(region.num_suggestive_markers, 3);
        assert_eq!(region.size_of_region, 500);
    }

    #[rstest]
    fn test_upstream_candidate_beyond_search_space_appends(config: ClumpConfig) {
        let markers = vec![marker("a", 1, 300, 1e-7), marker("c", 1, 1_500, 1e-8)];
        let mut results = ResultSet::new();
        results.merge_or_append(build_region(&markers[1..], &config).unwrap(), &markers, &config);
        let outcome =
            results.merge_or_append(build_region(&markers[..1], &config).unwrap(), &markers, &config);
        assert_eq!(outcome, MergeOutcome::Appended(2));
    }

    #[rstest]
    fn test_other_chromosome_never_merges(config: ClumpConfig) {
        let markers = vec![marker("a", 1, 100, 1e-8), marker("b", 2, 100, 1e-8)];
        let mut results = ResultSet::new();
        results.merge_or_append(build_region(&markers[..1], &config).unwrap(), &markers, &config);
        let outcome =
            results.merge_or_append(build_region(&markers[1..], &config).unwrap(), &markers, &config);
        assert_eq!(outcome, MergeOutcome::Appended(2));
        assert_eq!(results.regions_on(2).count(), 1);
    }

    #[rstest]
    fn test_absorb_renumbers(config: ClumpConfig) {
        let markers = vec![marker("a", 1, 100, 1e-8), marker("b", 2, 100, 1e-8)];
        let mut first = ResultSet::new();
        first.merge_or_append(build_region(&markers[..1], &config).unwrap(), &markers, &config);
        let mut second = ResultSet::new();
        second.merge_or_append(build_region(&markers[1..], &config).unwrap(), &markers, &config);

        first.absorb(second);
        let indices: Vec<usize> = first.regions().iter().map(|r| r.region_index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(first.find_overlap(&first.regions()[1].clone(), 1000), Some(1));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_merge_is_idempotent_and_bounds_only_grow(
            rows in prop::collection::btree_map(0u64..50_000, 0.0f64..2e-4, 1..40),
            picks in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 1..10),
        ) {
            let markers: Vec<Marker> = rows
                .iter()
                .enumerate()
                .map(|(i, (&position, &p_value))| marker(&format!("rs{}", i), 1, position, p_value))
                .collect();
            let config = ClumpConfig::new(1e-5, 1e-4, 2_000).unwrap();
            let mut results = ResultSet::new();

            for (a, b) in picks {
                let (i, j) = (a.index(markers.len()), b.index(markers.len()));
                let slice = &markers[i.min(j)..=i.max(j)];
                let candidate = match build_region(slice, &config) {
                    Ok(region) => region,
                    Err(_) => continue,
                };

                let before: Vec<(u64, u64)> = results
                    .regions()
                    .iter()
                    .map(|r| (r.region_start, r.region_stop))
                    .collect();
                results.merge_or_append(candidate.clone(), &markers, &config);
                for (old, new) in before.iter().zip(results.regions()) {
                    prop_assert!(new.region_start <= old.0 && new.region_stop >= old.1);
                }

                let snapshot = results.regions().to_vec();
                let outcome = results.merge_or_append(candidate, &markers, &config);
                prop_assert!(matches!(outcome, MergeOutcome::Merged(_)));
                prop_assert_eq!(results.regions(), &snapshot[..]);
            }
        }
    }
}

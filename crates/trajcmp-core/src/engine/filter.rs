use super::batch::PairwiseComparison;
use serde::Serialize;
use std::collections::HashSet;

/// Tag attached to every pair reported by [`NearDuplicateFilter`].
pub const NEAR_DUPLICATE_LABEL: &str = "target_source_value";

/// A pair of structures whose metric value fell below the threshold.
///
/// For a single structure set both indices refer to that set and `first < second`. For two
/// sets, `first` indexes the targets and `second` the compared structures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearDuplicate {
    pub label: &'static str,
    pub first: usize,
    pub second: usize,
    pub value: f64,
}

/// Selects structure pairs closer than a threshold, closest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearDuplicateFilter {
    pub threshold: f64,
}

impl NearDuplicateFilter {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Keeps pairs with a value strictly below the threshold, sorted ascending by value.
    ///
    /// With `symmetric` set, `(i, j)` and `(j, i)` name the same pair: keys are canonicalised
    /// to `(min, max)`, self-pairs are dropped and only the first occurrence is kept. Equal
    /// values keep their encounter order.
    pub fn select(
        &self,
        pairs: impl IntoIterator<Item = ((usize, usize), f64)>,
        symmetric: bool,
    ) -> Vec<NearDuplicate> {
        let mut seen = HashSet::new();
        let mut selected: Vec<NearDuplicate> = pairs
            .into_iter()
            .filter(|&(_, value)| value < self.threshold)
            .filter_map(|((i, j), value)| {
                let (first, second) = if symmetric && i > j { (j, i) } else { (i, j) };
                if symmetric && (first == second || !seen.insert((first, second))) {
                    return None;
                }
                Some(NearDuplicate {
                    label: NEAR_DUPLICATE_LABEL,
                    first,
                    second,
                    value,
                })
            })
            .collect();
        selected.sort_by(|a, b| a.value.total_cmp(&b.value));
        selected
    }

    /// Near duplicates within one structure set.
    pub fn from_pairs(&self, comparison: &PairwiseComparison) -> Vec<NearDuplicate> {
        self.select(comparison.values.iter().map(|(&k, &v)| (k, v)), true)
    }

    /// Near duplicates from a many-to-many matrix (`matrix[target][structure]`).
    ///
    /// With `same_set` the rows and columns index the same structures, so only the strict
    /// upper triangle `j > i` is scanned.
    pub fn from_matrix(&self, matrix: &[Vec<f64>], same_set: bool) -> Vec<NearDuplicate> {
        let cells = matrix.iter().enumerate().flat_map(|(i, row)| {
            let start = if same_set { i + 1 } else { 0 };
            row.iter()
                .enumerate()
                .skip(start)
                .map(move |(j, &value)| ((i, j), value))
        });
        self.select(cells, same_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::MolecularStructure;
    use crate::engine::batch::all_pairs;
    use crate::engine::metrics::Metric;
    use std::collections::BTreeMap;

    fn comparison(values: &[((usize, usize), f64)]) -> PairwiseComparison {
        PairwiseComparison {
            values: values.iter().copied().collect::<BTreeMap<_, _>>(),
            ..PairwiseComparison::default()
        }
    }

    #[test]
    fn selects_pairs_below_threshold_in_ascending_order() {
        let pairs = comparison(&[((0, 1), 0.1), ((0, 2), 0.5), ((1, 2), 0.2)]);

        let found = NearDuplicateFilter::new(0.3).from_pairs(&pairs);

        let summary: Vec<_> = found.iter().map(|d| (d.first, d.second, d.value)).collect();
        assert_eq!(summary, vec![(0, 1, 0.1), (1, 2, 0.2)]);
        assert!(found.iter().all(|d| d.label == NEAR_DUPLICATE_LABEL));
    }

    #[test]
    fn threshold_is_strict() {
        let pairs = comparison(&[((0, 1), 0.3)]);
        assert!(NearDuplicateFilter::new(0.3).from_pairs(&pairs).is_empty());
    }

    #[test]
    fn ties_keep_encounter_order() {
        let found = NearDuplicateFilter::new(1.0).select(
            vec![((3, 4), 0.2), ((0, 1), 0.2), ((1, 2), 0.1)],
            false,
        );
        let keys: Vec<_> = found.iter().map(|d| (d.first, d.second)).collect();
        assert_eq!(keys, vec![(1, 2), (3, 4), (0, 1)]);
    }

    #[test]
    fn symmetric_pairs_are_deduplicated_by_canonical_key() {
        let found = NearDuplicateFilter::new(1.0).select(
            vec![((2, 0), 0.4), ((0, 2), 0.4), ((1, 1), 0.0), ((1, 0), 0.3)],
            true,
        );
        let keys: Vec<_> = found.iter().map(|d| (d.first, d.second)).collect();
        assert_eq!(keys, vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn same_set_matrix_scans_strict_upper_triangle() {
        let matrix = vec![
            vec![0.0, 0.1, 0.9],
            vec![0.1, 0.0, 0.2],
            vec![0.9, 0.2, 0.0],
        ];
        let found = NearDuplicateFilter::new(0.5).from_matrix(&matrix, true);
        let keys: Vec<_> = found.iter().map(|d| (d.first, d.second)).collect();
        assert_eq!(keys, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn cross_set_matrix_keeps_orientation() {
        let matrix = vec![vec![0.05, 0.8], vec![0.3, 0.01]];
        let found = NearDuplicateFilter::new(0.5).from_matrix(&matrix, false);
        let keys: Vec<_> = found.iter().map(|d| (d.first, d.second)).collect();
        assert_eq!(keys, vec![(1, 1), (0, 0), (1, 0)]);
    }

    #[test]
    fn identical_conformers_are_found_from_real_comparisons() {
        let base = [[0.0, 0.0, 0.0], [1.2, 0.0, 0.0], [0.0, 1.1, 0.0], [0.4, 0.3, 0.9]];
        let mut far = base;
        far[3] = [0.4, 0.3, -2.0];
        let structures = vec![
            MolecularStructure::from_coords(vec![6, 8, 1, 1], &base).unwrap(),
            MolecularStructure::from_coords(vec![6, 8, 1, 1], &far).unwrap(),
            MolecularStructure::from_coords(vec![6, 8, 1, 1], &base).unwrap(),
        ];

        let pairs = all_pairs(&structures, true, Metric::PositionsRmsd);
        let found = NearDuplicateFilter::new(0.05).from_pairs(&pairs);

        assert_eq!(found.len(), 1);
        assert_eq!((found[0].first, found[0].second), (0, 2));
    }
}

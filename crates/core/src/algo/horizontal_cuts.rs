//! Enumeration and querying of the horizontal cuts of a valued
//! hierarchy.

use crate::algo::graph_core::labelisation_2_graph_cut;
use crate::algo::tree_fns::{reconstruct_leaf_data, sort_hierarchy_with_altitudes};
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::graph::UndirectedGraph;
use crate::structure::tree::Tree;

/// The nodes of one horizontal cut, in original tree ids.
#[derive(Debug, Clone)]
pub struct HorizontalCutNodes {
    pub nodes: Vec<usize>,
    pub altitude: f64,
}

impl HorizontalCutNodes {
    /// Label every leaf with the id of the cut node containing it.
    pub fn labelisation_leaves(&self, tree: &Tree) -> Result<Vec<usize>> {
        let mut deleted = vec![true; tree.num_nodes()];
        for &n in &self.nodes {
            deleted[n] = false;
        }
        let ids = DataArray::from_scalars((0..tree.num_nodes()).map(|i| i as f64).collect());
        let labels = reconstruct_leaf_data(tree, &ids, &deleted)?;
        Ok(labels.scalars().iter().map(|&l| l as usize).collect())
    }

    /// Per-leaf value of the smallest cut node containing it.
    pub fn reconstruct_leaf_data(
        &self,
        tree: &Tree,
        values: &DataArray,
    ) -> Result<DataArray> {
        let mut deleted = vec![true; tree.num_nodes()];
        for &n in &self.nodes {
            deleted[n] = false;
        }
        reconstruct_leaf_data(tree, values, &deleted)
    }

    /// The graph cut of the leaf graph induced by this horizontal cut.
    pub fn graph_cut(&self, tree: &Tree, leaf_graph: &UndirectedGraph) -> Result<Vec<f64>> {
        labelisation_2_graph_cut(leaf_graph, &self.labelisation_leaves(tree)?)
    }
}

/// Walk the internal nodes of a sorted hierarchy from the root down,
/// committing one record per distinct cut altitude: region count, cut
/// altitude, and the id range of the internal nodes whose children form
/// the cut.
fn enumerate_cut_levels(
    tree: &Tree,
    altitudes: &[f64],
) -> Result<(Vec<usize>, Vec<f64>, Vec<(usize, usize)>)> {
    tree.compute_children();
    let root = tree.root();
    let num_leaves = tree.num_leaves();

    // minimum child altitude per internal node
    let mut min_alt_children = vec![f64::INFINITY; tree.num_nodes()];
    for i in tree.leaves_to_root(true, false) {
        let p = tree.parent(i);
        if altitudes[i] < min_alt_children[p] {
            min_alt_children[p] = altitudes[i];
        }
    }

    // the single-region cut
    let mut num_regions_cuts = vec![1];
    let mut altitudes_cuts = vec![altitudes[root]];
    let mut range_nodes_cuts = vec![(usize::MAX, usize::MAX)];

    let mut range_start = root;
    let mut range_end = root;
    let mut num_regions = tree.num_children(root)?;
    let mut current_threshold = altitudes[range_start];

    while current_threshold != 0.0 && range_start >= num_leaves {
        while min_alt_children[range_end] >= current_threshold {
            range_end -= 1;
        }
        while altitudes[range_start - 1] >= current_threshold {
            range_start -= 1;
            num_regions += tree.num_children(range_start)? - 1;
        }
        current_threshold = altitudes[range_start - 1];
        num_regions_cuts.push(num_regions);
        altitudes_cuts.push(current_threshold);
        range_nodes_cuts.push((range_start, range_end));
    }
    Ok((num_regions_cuts, altitudes_cuts, range_nodes_cuts))
}

/// Preprocessed view of all horizontal cuts of a hierarchy.
///
/// Construction sorts the hierarchy by altitudes when needed (queries
/// then translate node ids back through the sort permutation), computes
/// the minimum child altitude of every node, and walks the internal
/// nodes once from the root down to enumerate the distinct cut levels
/// with their region counts.
#[derive(Debug)]
pub struct HorizontalCutExplorer {
    /// The sorted working tree, or `None` when the input was sorted.
    sorted: Option<(Tree, Vec<usize>)>,
    /// The input tree, kept as a copy so cuts can be relabelled.
    original: Tree,
    /// Altitudes of the working tree.
    altitudes: Vec<f64>,
    num_regions_cuts: Vec<usize>,
    altitudes_cuts: Vec<f64>,
    range_nodes_cuts: Vec<(usize, usize)>,
}

impl HorizontalCutExplorer {
    /// Preprocess a valued hierarchy.
    ///
    /// Altitudes must be 0 on the leaves and non-negative everywhere.
    pub fn new(tree: &Tree, altitudes: &[f64]) -> Result<Self> {
        if altitudes.len() != tree.num_nodes() {
            return Err(HisegError::InvalidShape(
                "altitudes do not match the number of nodes".into(),
            ));
        }
        if altitudes[..tree.num_leaves()].iter().any(|&a| a != 0.0) {
            return Err(HisegError::PreconditionFailed(
                "leaf altitudes must be zero".into(),
            ));
        }
        if altitudes.iter().any(|&a| a < 0.0) {
            return Err(HisegError::PreconditionFailed(
                "altitudes must be non-negative".into(),
            ));
        }
        let is_sorted = altitudes.windows(2).all(|w| w[0] <= w[1]);
        let (sorted, working_altitudes) = if is_sorted {
            (None, altitudes.to_vec())
        } else {
            let res = sort_hierarchy_with_altitudes(tree, altitudes)?;
            let alts: Vec<f64> = res.node_map.iter().map(|&i| altitudes[i]).collect();
            (Some((res.tree, res.node_map)), alts)
        };
        let working_tree = match &sorted {
            Some((t, _)) => t,
            None => tree,
        };
        let (num_regions_cuts, altitudes_cuts, range_nodes_cuts) =
            enumerate_cut_levels(working_tree, &working_altitudes)?;

        Ok(Self {
            sorted,
            original: tree.clone(),
            altitudes: working_altitudes,
            num_regions_cuts,
            altitudes_cuts,
            range_nodes_cuts,
        })
    }

    fn working_tree(&self) -> &Tree {
        match &self.sorted {
            Some((t, _)) => t,
            None => &self.original,
        }
    }

    /// Number of distinct cuts, the single-region one included.
    pub fn num_cuts(&self) -> usize {
        self.num_regions_cuts.len()
    }

    /// Region count of each cut, coarsest first.
    pub fn num_regions_cuts(&self) -> &[usize] {
        &self.num_regions_cuts
    }

    /// Altitude of each cut, coarsest first.
    pub fn altitude_cuts(&self) -> &[f64] {
        &self.altitudes_cuts
    }

    /// The `i`-th cut (0 is the single-region cut at the root).
    pub fn cut_from_index(&self, cut_index: usize) -> Result<HorizontalCutNodes> {
        if cut_index >= self.num_cuts() {
            return Err(HisegError::OutOfRange {
                index: cut_index,
                bound: self.num_cuts(),
            });
        }
        let tree = self.working_tree();
        tree.compute_children();
        let mut nodes = Vec::with_capacity(self.num_regions_cuts[cut_index]);
        if cut_index == 0 {
            nodes.push(tree.root());
        } else {
            let altitude = self.altitudes_cuts[cut_index];
            let (start, end) = self.range_nodes_cuts[cut_index];
            for i in start..=end {
                for &c in tree.children(i)? {
                    if self.altitudes[c] <= altitude {
                        nodes.push(c);
                    }
                }
            }
        }
        if let Some((_, node_map)) = &self.sorted {
            for n in nodes.iter_mut() {
                *n = node_map[*n];
            }
        }
        Ok(HorizontalCutNodes {
            nodes,
            altitude: self.altitudes_cuts[cut_index],
        })
    }

    /// The cut whose altitude is the greatest one `<= threshold` (the
    /// finest cut when the threshold lies below every altitude).
    pub fn cut_from_altitude(&self, threshold: f64) -> Result<HorizontalCutNodes> {
        let above = self
            .altitudes_cuts
            .iter()
            .filter(|&&a| a > threshold)
            .count();
        self.cut_from_index(above.min(self.num_cuts() - 1))
    }

    /// The smallest cut with at least `num_regions` regions (or at most,
    /// when `at_least` is false).
    pub fn cut_from_num_regions(
        &self,
        num_regions: usize,
        at_least: bool,
    ) -> Result<HorizontalCutNodes> {
        let mut cut_index = self
            .num_regions_cuts
            .partition_point(|&r| r < num_regions)
            .min(self.num_cuts() - 1);
        if self.num_regions_cuts[cut_index] > num_regions && !at_least && cut_index > 0 {
            cut_index -= 1;
        }
        self.cut_from_index(cut_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Tree, Vec<f64>) {
        let tree = Tree::new(vec![
            11, 11, 11, 12, 12, 16, 13, 13, 13, 14, 14, 17, 16, 15, 15, 18, 17, 18, 18,
        ])
        .unwrap();
        let altitudes = vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0,
            1.0, 3.0, 1.0, 2.0, 3.0,
        ];
        (tree, altitudes)
    }

    #[test]
    fn test_enumeration() {
        let (tree, altitudes) = sample();
        let explorer = HorizontalCutExplorer::new(&tree, &altitudes).unwrap();
        assert_eq!(explorer.num_cuts(), 4);
        assert_eq!(explorer.num_regions_cuts(), &[1, 3, 4, 9]);
        assert_eq!(explorer.altitude_cuts(), &[3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_cut_from_index() {
        let (tree, altitudes) = sample();
        let explorer = HorizontalCutExplorer::new(&tree, &altitudes).unwrap();

        let expected: Vec<Vec<usize>> = vec![
            vec![18],
            vec![17, 13, 14],
            vec![11, 16, 13, 14],
            vec![0, 1, 2, 3, 4, 5, 13, 9, 10],
        ];
        for (i, want) in expected.iter().enumerate() {
            let cut = explorer.cut_from_index(i).unwrap();
            let mut got = cut.nodes.clone();
            got.sort_unstable();
            let mut want = want.clone();
            want.sort_unstable();
            assert_eq!(got, want, "cut {}", i);
        }
    }

    #[test]
    fn test_cut_from_altitude() {
        let (tree, altitudes) = sample();
        let explorer = HorizontalCutExplorer::new(&tree, &altitudes).unwrap();
        assert_eq!(explorer.cut_from_altitude(10.0).unwrap().nodes.len(), 1);
        assert_eq!(explorer.cut_from_altitude(2.5).unwrap().altitude, 2.0);
        assert_eq!(explorer.cut_from_altitude(1.0).unwrap().altitude, 1.0);
        assert_eq!(explorer.cut_from_altitude(0.5).unwrap().altitude, 0.0);
    }

    #[test]
    fn test_cut_from_num_regions() {
        let (tree, altitudes) = sample();
        let explorer = HorizontalCutExplorer::new(&tree, &altitudes).unwrap();
        assert_eq!(
            explorer.cut_from_num_regions(3, true).unwrap().nodes.len(),
            3
        );
        // no cut with exactly 5 regions: at_least goes finer, otherwise
        // coarser
        assert_eq!(
            explorer.cut_from_num_regions(5, true).unwrap().nodes.len(),
            9
        );
        assert_eq!(
            explorer.cut_from_num_regions(5, false).unwrap().nodes.len(),
            4
        );
        assert_eq!(
            explorer.cut_from_num_regions(100, true).unwrap().nodes.len(),
            9
        );
    }

    #[test]
    fn test_labelisation_matches_threshold_labelisation(){
        let (tree, altitudes) = sample();
        let explorer = HorizontalCutExplorer::new(&tree, &altitudes).unwrap();
        for i in 0..explorer.num_cuts() {
            let cut = explorer.cut_from_index(i).unwrap();
            let labels = cut.labelisation_leaves(&tree).unwrap();
            let reference =
                crate::algo::tree_fns::labelisation_horizontal_cut_from_threshold(
                    &tree,
                    &altitudes,
                    cut.altitude,
                )
                .unwrap();
            assert_eq!(labels, reference, "cut {}", i);
        }
    }

    #[test]
    fn test_preconditions() {
        let tree = Tree::new(vec![4, 4, 5, 5, 6, 6, 6]).unwrap();
        let bad_leaves = [1.0, 0.0, 0.0, 0.0, 2.0, 3.0, 4.0];
        assert!(matches!(
            HorizontalCutExplorer::new(&tree, &bad_leaves),
            Err(HisegError::PreconditionFailed(_))
        ));
        let negative = [0.0, 0.0, 0.0, 0.0, 2.0, 3.0, -1.0];
        assert!(matches!(
            HorizontalCutExplorer::new(&tree, &negative),
            Err(HisegError::PreconditionFailed(_))
        ));
    }
}

//! Projection of hierarchies between segmentations of the same ground
//! set.

use crate::accumulator::Accumulator;
use crate::algo::rag::RegionAdjacencyGraph;
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::hierarchy::core::{bpt_canonical, supervertices_hierarchy};
use crate::structure::graph::UndirectedGraph;
use crate::structure::lca::LcaSparseTable;
use crate::structure::tree::Tree;

/// For each region of the fine labelling, the coarse region with the
/// largest overlap.
///
/// Labels must cover `[0, num_regions)` on each side; the counts are
/// accumulated in one pass over the ground set and ties resolve to the
/// smaller coarse label.
pub fn project_fine_to_coarse_labelisation(
    labelisation_fine: &[usize],
    labelisation_coarse: &[usize],
) -> Result<Vec<usize>> {
    if labelisation_fine.len() != labelisation_coarse.len() {
        return Err(HisegError::InvalidShape(
            "labelisations must have the same length".into(),
        ));
    }
    let num_fine = labelisation_fine.iter().max().map_or(0, |&m| m + 1);
    let num_coarse = labelisation_coarse.iter().max().map_or(0, |&m| m + 1);

    let mut intersections = vec![0usize; num_fine * num_coarse];
    for (&f, &c) in labelisation_fine.iter().zip(labelisation_coarse) {
        intersections[f * num_coarse + c] += 1;
    }
    Ok((0..num_fine)
        .map(|f| {
            let row = &intersections[f * num_coarse..(f + 1) * num_coarse];
            row.iter()
                .enumerate()
                .max_by(|(i, a), (j, b)| a.cmp(b).then(j.cmp(i)))
                .map_or(0, |(c, _)| c)
        })
        .collect())
}

/// Overlap projection between the vertex maps of two region adjacency
/// graphs.
pub fn project_fine_to_coarse_rag(
    fine_rag: &RegionAdjacencyGraph,
    coarse_rag: &RegionAdjacencyGraph,
) -> Result<Vec<usize>> {
    project_fine_to_coarse_labelisation(&fine_rag.vertex_map, &coarse_rag.vertex_map)
}

/// Saliency of a coarse hierarchy on the edges of a fine RAG.
fn project_hierarchy(
    fine_rag: &RegionAdjacencyGraph,
    coarse_supervertices: &[usize],
    coarse_tree: &Tree,
    coarse_altitudes: &[f64],
) -> Result<Vec<f64>> {
    if fine_rag.vertex_map.len() != coarse_supervertices.len() {
        return Err(HisegError::InvalidShape(
            "the two labelisations cover different ground sets".into(),
        ));
    }
    if coarse_altitudes.len() != coarse_tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "altitudes do not match the number of nodes".into(),
        ));
    }
    let fine_to_coarse =
        project_fine_to_coarse_labelisation(&fine_rag.vertex_map, coarse_supervertices)?;
    let lca = LcaSparseTable::new(coarse_tree);
    let mut out = vec![0.0; fine_rag.rag.num_edges()];
    for (ei, u, v) in fine_rag.rag.edge_iter() {
        let a = lca.lca(fine_to_coarse[u], fine_to_coarse[v])?;
        out[ei] = coarse_altitudes[a];
    }
    Ok(out)
}

/// Projects hierarchies built on coarse supervertices onto a fixed fine
/// supervertex decomposition of a graph.
///
/// The aligner is built once from the fine decomposition; each
/// `align_*` call projects one coarse hierarchy and returns a saliency
/// map on the edges of the original graph.
#[derive(Debug)]
pub struct HierarchyAligner {
    fine_rag: RegionAdjacencyGraph,
}

impl HierarchyAligner {
    /// Aligner from an explicit fine RAG.
    pub fn new(fine_rag: RegionAdjacencyGraph) -> Self {
        Self { fine_rag }
    }

    /// Aligner from a graph cut of the base graph.
    pub fn from_graph_cut(graph: &UndirectedGraph, saliency: &[f64]) -> Result<Self> {
        Ok(Self::new(RegionAdjacencyGraph::from_graph_cut(graph, saliency)?))
    }

    /// Aligner from a vertex labelling of the base graph.
    pub fn from_labelisation(
        graph: &UndirectedGraph,
        vertex_labels: &[usize],
    ) -> Result<Self> {
        Ok(Self::new(RegionAdjacencyGraph::from_labelisation(
            graph,
            vertex_labels,
        )?))
    }

    /// Aligner from the supervertices of a valued hierarchy.
    pub fn from_hierarchy(
        graph: &UndirectedGraph,
        tree: &Tree,
        altitudes: &[f64],
    ) -> Result<Self> {
        let labels =
            crate::algo::tree_fns::labelisation_hierarchy_supervertices(tree, altitudes)?;
        Self::from_labelisation(graph, &labels)
    }

    /// The fine region adjacency graph.
    pub fn fine_rag(&self) -> &RegionAdjacencyGraph {
        &self.fine_rag
    }

    /// Project a coarse valued hierarchy whose leaves are the base
    /// vertices; returns a saliency map on the base graph edges.
    pub fn align_hierarchy(&self, tree: &Tree, altitudes: &[f64]) -> Result<Vec<f64>> {
        if tree.num_leaves() != self.fine_rag.vertex_map.len() {
            return Err(HisegError::InvalidShape(
                "hierarchy leaves do not match the base vertices".into(),
            ));
        }
        let sv = supervertices_hierarchy(tree, altitudes)?;
        let sv_altitudes: Vec<f64> =
            sv.node_map.iter().map(|&i| altitudes[i]).collect();
        let coarse_on_fine = project_hierarchy(
            &self.fine_rag,
            &sv.supervertex_labelisation,
            &sv.tree,
            &sv_altitudes,
        )?;
        Ok(self.back_project(&coarse_on_fine))
    }

    /// Project a coarse hierarchy given as a saliency map on the base
    /// graph.
    pub fn align_saliency_map(
        &self,
        graph: &UndirectedGraph,
        saliency: &[f64],
    ) -> Result<Vec<f64>> {
        if graph.num_vertices() != self.fine_rag.vertex_map.len() {
            return Err(HisegError::InvalidShape(
                "saliency graph does not match the base vertices".into(),
            ));
        }
        let coarse_rag = RegionAdjacencyGraph::from_graph_cut(graph, saliency)?;
        let coarse_weights = RegionAdjacencyGraph::accumulate(
            &coarse_rag.edge_map,
            &DataArray::from_scalars(saliency.to_vec()),
            Accumulator::First,
        )?;
        let bpt = bpt_canonical(&coarse_rag.rag, coarse_weights.scalars())?;
        let coarse_on_fine = project_hierarchy(
            &self.fine_rag,
            &coarse_rag.vertex_map,
            &bpt.tree,
            &bpt.altitudes,
        )?;
        Ok(self.back_project(&coarse_on_fine))
    }

    /// Project a coarse hierarchy given by explicit coarse supervertices
    /// and the tree built on them.
    pub fn align_hierarchy_on_supervertices(
        &self,
        coarse_supervertices: &[usize],
        tree: &Tree,
        altitudes: &[f64],
    ) -> Result<Vec<f64>> {
        let coarse_on_fine =
            project_hierarchy(&self.fine_rag, coarse_supervertices, tree, altitudes)?;
        Ok(self.back_project(&coarse_on_fine))
    }

    fn back_project(&self, rag_edge_values: &[f64]) -> Vec<f64> {
        RegionAdjacencyGraph::back_project_weights(
            &self.fine_rag.edge_map,
            &DataArray::from_scalars(rag_edge_values.to_vec()),
        )
        .into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::graph_image::get_4_adjacency_graph;

    #[test]
    fn test_project_fine_to_coarse() {
        let fine = [0, 0, 1, 1, 2, 2];
        let coarse = [0, 0, 0, 1, 1, 1];
        let proj = project_fine_to_coarse_labelisation(&fine, &coarse).unwrap();
        // fine region 1 overlaps both coarse regions equally: the
        // smaller label wins
        assert_eq!(proj, vec![0, 0, 1]);
    }

    #[test]
    fn test_project_shape_mismatch() {
        assert!(matches!(
            project_fine_to_coarse_labelisation(&[0, 1], &[0]),
            Err(HisegError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_align_identity_hierarchy() {
        // 1x4 path; fine partition = singletons, coarse hierarchy = the
        // canonical BPT of the graph itself
        let g = get_4_adjacency_graph((1, 4));
        let weights = [1.0, 2.0, 3.0];
        let bpt = bpt_canonical(&g, &weights).unwrap();

        let fine_labels = vec![0, 1, 2, 3];
        let aligner = HierarchyAligner::from_labelisation(&g, &fine_labels).unwrap();
        let sm = aligner.align_hierarchy(&bpt.tree, &bpt.altitudes).unwrap();
        // singleton supervertices make the projection exact
        assert_eq!(sm, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_align_saliency_map_matching_partition() {
        let g = get_4_adjacency_graph((1, 4));
        // fine partition groups {0,1} and {2,3}
        let aligner = HierarchyAligner::from_labelisation(&g, &[0, 0, 1, 1]).unwrap();
        // coarse saliency cutting the same frontier at strength 5: the
        // projected saliency lands on the only boundary edge, inner
        // edges stay at 0
        let sm = aligner.align_saliency_map(&g, &[0.0, 5.0, 0.0]).unwrap();
        assert_eq!(sm, vec![0.0, 5.0, 0.0]);
    }
}

//! Canonical binary partition tree, minimum spanning forest, tree
//! simplification, and the hierarchies derived from them.

use crate::error::{HisegError, Result};
use crate::sorting::stable_arg_sort;
use crate::structure::graph::UndirectedGraph;
use crate::structure::lca::LcaSparseTable;
use crate::structure::tree::{Tree, TreeCategory};
use crate::structure::union_find::UnionFind;

/// A minimum spanning tree (or forest) and the map from its edge
/// indices to edge indices of the source graph.
#[derive(Debug, Clone)]
pub struct MstResult {
    pub mst: UndirectedGraph,
    pub mst_edge_map: Vec<usize>,
}

/// Result of [`bpt_canonical`].
#[derive(Debug, Clone)]
pub struct BptResult {
    pub tree: Tree,
    pub altitudes: Vec<f64>,
    pub mst: UndirectedGraph,
    pub mst_edge_map: Vec<usize>,
}

/// A simplified tree together with the map from its node indices to the
/// node indices of the original tree.
#[derive(Debug, Clone)]
pub struct SimplifiedTree {
    pub tree: Tree,
    pub node_map: Vec<usize>,
}

/// A valued hierarchy: a tree and one altitude per node.
#[derive(Debug, Clone)]
pub struct NodeWeightedTree {
    pub tree: Tree,
    pub altitudes: Vec<f64>,
}

fn check_edge_weights(graph: &UndirectedGraph, edge_weights: &[f64]) -> Result<()> {
    if edge_weights.len() != graph.num_edges() {
        return Err(HisegError::InvalidShape(format!(
            "{} edge weights for a graph with {} edges",
            edge_weights.len(),
            graph.num_edges()
        )));
    }
    Ok(())
}

/// Canonical binary partition tree of an edge-weighted graph.
///
/// Edges are scanned by non-decreasing weight (stable on ties, so the
/// result is deterministic); each edge joining two distinct components
/// creates one internal node whose altitude is the edge weight. The
/// accepted edges form a minimum spanning tree, returned together with
/// the map from MST edge indices to input edge indices.
///
/// Fails with [`HisegError::Disconnected`] when the graph does not
/// allow `n - 1` merges; use [`minimum_spanning_forest`] to tolerate
/// disconnected inputs.
pub fn bpt_canonical(graph: &UndirectedGraph, edge_weights: &[f64]) -> Result<BptResult> {
    check_edge_weights(graph, edge_weights)?;
    let n = graph.num_vertices();
    if n == 0 {
        return Err(HisegError::InvalidShape("empty graph".into()));
    }
    let sorted_edges = stable_arg_sort(edge_weights);

    let num_nodes_final = 2 * n - 1;
    let mut parents: Vec<usize> = (0..num_nodes_final).collect();
    let mut altitudes = vec![0.0; num_nodes_final];
    let mut roots: Vec<usize> = (0..n).collect();
    let mut uf = UnionFind::new(n);
    let mut mst = UndirectedGraph::with_capacity(n, n.saturating_sub(1));
    let mut mst_edge_map = Vec::with_capacity(n.saturating_sub(1));

    let mut num_nodes = n;
    for &ei in &sorted_edges {
        if num_nodes == num_nodes_final {
            break;
        }
        let (u, v) = match graph.edge(ei) {
            Some(e) => e,
            None => continue,
        };
        let c1 = uf.find(u);
        let c2 = uf.find(v);
        if c1 != c2 {
            altitudes[num_nodes] = edge_weights[ei];
            parents[roots[c1]] = num_nodes;
            parents[roots[c2]] = num_nodes;
            let new_root = uf.link(c1, c2);
            roots[new_root] = num_nodes;
            mst.add_edge(u, v)?;
            mst_edge_map.push(ei);
            num_nodes += 1;
        }
    }
    if num_nodes != num_nodes_final {
        return Err(HisegError::Disconnected);
    }

    Ok(BptResult {
        tree: Tree::with_category(parents, TreeCategory::PartitionTree)?,
        altitudes,
        mst,
        mst_edge_map,
    })
}

/// Minimum spanning forest by Kruskal's algorithm.
///
/// On a connected graph the result is a minimum spanning tree; on a
/// disconnected graph the forest of the per-component minimum spanning
/// trees is returned (no error).
pub fn minimum_spanning_forest(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
) -> Result<MstResult> {
    check_edge_weights(graph, edge_weights)?;
    let n = graph.num_vertices();
    let sorted_edges = stable_arg_sort(edge_weights);

    let max_edges = n.saturating_sub(1);
    let mut uf = UnionFind::new(n);
    let mut mst = UndirectedGraph::with_capacity(n, max_edges);
    let mut mst_edge_map = Vec::new();

    for &ei in &sorted_edges {
        if mst_edge_map.len() == max_edges {
            break;
        }
        let (u, v) = match graph.edge(ei) {
            Some(e) => e,
            None => continue,
        };
        let c1 = uf.find(u);
        let c2 = uf.find(v);
        if c1 != c2 {
            uf.link(c1, c2);
            mst.add_edge(u, v)?;
            mst_edge_map.push(ei);
        }
    }
    Ok(MstResult { mst, mst_edge_map })
}

/// Copy of a tree with the nodes satisfying `criterion` removed.
///
/// Children of a removed internal node are reparented to its nearest
/// surviving ancestor. The root is never removed. Leaves are removed
/// only when `allow_leaf_removal` is set, in which case the leaf count
/// of the result drops accordingly. `criterion` may have `num_nodes`
/// entries or `num_nodes - 1` (root omitted).
///
/// The returned `node_map` sends every node of the simplified tree to
/// the node of the original tree it comes from.
pub fn simplify_tree(
    tree: &Tree,
    criterion: &[bool],
    allow_leaf_removal: bool,
) -> Result<SimplifiedTree> {
    let n = tree.num_nodes();
    if criterion.len() != n && criterion.len() != n - 1 {
        return Err(HisegError::InvalidShape(
            "criterion does not match the number of nodes".into(),
        ));
    }
    tree.compute_children();
    let root = tree.root();
    let deleted = |i: usize| -> bool {
        i != root
            && criterion[i]
            && (allow_leaf_removal || !tree.is_leaf(i))
    };

    // resolve new parent pointers root-to-leaves so that a deleted
    // node's target is already final when its children are redirected
    let mut new_parent: Vec<usize> = tree.parents().to_vec();
    for i in tree.root_to_leaves(false, false) {
        if deleted(i) {
            let target = new_parent[i];
            for &c in tree.children(i)? {
                new_parent[c] = target;
            }
        }
    }

    let mut new_id = vec![usize::MAX; n];
    let mut node_map = Vec::new();
    for i in 0..n {
        if !deleted(i) {
            new_id[i] = node_map.len();
            node_map.push(i);
        }
    }
    let mut parents = Vec::with_capacity(node_map.len());
    for &i in &node_map {
        if i == root {
            parents.push(new_id[root]);
        } else {
            parents.push(new_id[new_parent[i]]);
        }
    }
    Ok(SimplifiedTree {
        tree: Tree::with_category(parents, tree.category())?,
        node_map,
    })
}

/// Quasi-flat-zones hierarchy of an edge-weighted graph: the canonical
/// BPT with altitude plateaus collapsed.
pub fn quasi_flat_zones_hierarchy(
    graph: &UndirectedGraph,
    edge_weights: &[f64],
) -> Result<NodeWeightedTree> {
    let bpt = bpt_canonical(graph, edge_weights)?;
    let criterion: Vec<bool> = (0..bpt.tree.num_nodes())
        .map(|i| bpt.altitudes[i] == bpt.altitudes[bpt.tree.parent(i)])
        .collect();
    let simplified = simplify_tree(&bpt.tree, &criterion, false)?;
    let altitudes = simplified
        .node_map
        .iter()
        .map(|&i| bpt.altitudes[i])
        .collect();
    Ok(NodeWeightedTree {
        tree: simplified.tree,
        altitudes,
    })
}

/// Saliency map of a valued hierarchy on a graph: each edge gets the
/// altitude of the lowest common ancestor of its endpoints.
pub fn saliency_map(
    graph: &UndirectedGraph,
    tree: &Tree,
    altitudes: &[f64],
) -> Result<Vec<f64>> {
    if altitudes.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "altitudes do not match the number of nodes".into(),
        ));
    }
    let lca = LcaSparseTable::new(tree);
    let mut out = vec![0.0; graph.num_edges()];
    for (ei, u, v) in graph.edge_iter() {
        out[ei] = altitudes[lca.lca(u, v)?];
    }
    Ok(out)
}

/// Result of [`supervertices_hierarchy`].
#[derive(Debug, Clone)]
pub struct SupervertexHierarchy {
    /// The input tree quotiented to its supervertices.
    pub tree: Tree,
    /// Supervertex label of each leaf of the original tree.
    pub supervertex_labelisation: Vec<usize>,
    /// Map from nodes of the quotient tree to original nodes (a
    /// supervertex maps to its highest altitude-zero node).
    pub node_map: Vec<usize>,
}

/// Group the leaves of a valued partition hierarchy into supervertices
/// (maximal regions of altitude zero) and rebuild the tree on top of
/// them.
pub fn supervertices_hierarchy(
    tree: &Tree,
    altitudes: &[f64],
) -> Result<SupervertexHierarchy> {
    if altitudes.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "altitudes do not match the number of nodes".into(),
        ));
    }
    let n = tree.num_nodes();
    let root = tree.root();

    // highest altitude-zero ancestor of every node, root-to-leaves
    let mut sv_root: Vec<usize> = (0..n).collect();
    for i in tree.root_to_leaves(true, false) {
        let p = tree.parent(i);
        if altitudes[p] == 0.0 {
            sv_root[i] = sv_root[p];
        }
    }

    // normalize supervertex labels in leaf-scan order
    let mut label_of_rep = vec![usize::MAX; n];
    let mut representatives = Vec::new();
    let mut supervertex_labelisation = Vec::with_capacity(tree.num_leaves());
    for leaf in tree.leaves() {
        let rep = sv_root[leaf];
        if label_of_rep[rep] == usize::MAX {
            label_of_rep[rep] = representatives.len();
            representatives.push(rep);
        }
        supervertex_labelisation.push(label_of_rep[rep]);
    }
    let k = representatives.len();

    // surviving internal nodes: altitude strictly positive
    let mut new_id = vec![usize::MAX; n];
    let mut node_map = representatives.clone();
    for i in tree.leaves_to_root(false, true) {
        if altitudes[i] > 0.0 {
            new_id[i] = node_map.len();
            node_map.push(i);
        }
    }
    for (label, &rep) in representatives.iter().enumerate() {
        new_id[rep] = label;
    }

    if node_map.len() == k {
        // the whole tree is one flat zone
        let tree = Tree::with_category(vec![0], tree.category())?;
        return Ok(SupervertexHierarchy {
            tree,
            supervertex_labelisation,
            node_map,
        });
    }

    let mut parents = vec![usize::MAX; node_map.len()];
    for (new, &orig) in node_map.iter().enumerate() {
        if orig == root {
            parents[new] = new;
        } else {
            // the parent of a supervertex root and of a surviving
            // internal node has positive altitude, hence survives
            parents[new] = new_id[tree.parent(orig)];
        }
    }
    Ok(SupervertexHierarchy {
        tree: Tree::with_category(parents, tree.category())?,
        supervertex_labelisation,
        node_map,
    })
}

//! Energy-driven optimal cuts and the scale-set machinery.
//!
//! The central tool is a concave, non-decreasing, piecewise-linear
//! energy function stored as a deque of pieces. `sum` is capped to the
//! rightmost pieces: the cap is a tunable approximation with a monotone
//! effect (a larger cap yields a finer hierarchy).

use crate::accumulator::{Accumulator, AccumulatorKernel};
use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::hierarchy::binary_partition_tree::{
    binary_partition_tree, LinkageStrategy, MergeContext, NewNeighbour,
};
use crate::hierarchy::core::{simplify_tree, NodeWeightedTree};
use crate::structure::graph::UndirectedGraph;
use crate::structure::tree::Tree;
use crate::INVALID_INDEX;
use std::collections::VecDeque;

/// Default cap on the number of pieces kept by [`PiecewiseLinearEnergy::sum`].
pub const DEFAULT_PIECE_CAP: usize = 10;

// ---------------------------------------------------------------------------
// Piecewise linear energy functions
// ---------------------------------------------------------------------------

/// One linear piece: the line of the given slope through
/// `(origin_x, origin_y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearPiece {
    pub origin_x: f64,
    pub origin_y: f64,
    pub slope: f64,
}

impl LinearPiece {
    pub fn new(origin_x: f64, origin_y: f64, slope: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            slope,
        }
    }

    fn eval(&self, x: f64) -> f64 {
        self.origin_y + self.slope * (x - self.origin_x)
    }
}

/// A concave, non-decreasing, non-negative piecewise linear function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PiecewiseLinearEnergy {
    pieces: VecDeque<LinearPiece>,
}

impl PiecewiseLinearEnergy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Function made of the single given piece.
    pub fn from_piece(piece: LinearPiece) -> Self {
        let mut pieces = VecDeque::new();
        pieces.push_back(piece);
        Self { pieces }
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn piece(&self, i: usize) -> &LinearPiece {
        &self.pieces[i]
    }

    /// Sum of two functions, restricted to the `max_pieces` rightmost
    /// pieces.
    ///
    /// The scan merges the two piece sequences from the right; when the
    /// cap stops the scan early the leftmost produced piece is extended
    /// down to abscissa 0 (domain truncation, not an approximation of
    /// the values kept).
    pub fn sum(&self, other: &PiecewiseLinearEnergy, max_pieces: usize) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut result = VecDeque::new();
        let mut i1 = self.pieces.len() as isize - 1;
        let mut i2 = other.pieces.len() as isize - 1;
        while i1 >= 0 && i2 >= 0 && result.len() < max_pieces {
            let piece1 = &self.pieces[i1 as usize];
            let piece2 = &other.pieces[i2 as usize];
            let slope = piece1.slope + piece2.slope;
            let (x, y) = if piece1.origin_x >= piece2.origin_x {
                let x = piece1.origin_x;
                let y = piece1.origin_y + piece2.eval(x);
                if piece1.origin_x == piece2.origin_x {
                    i2 -= 1;
                }
                i1 -= 1;
                (x, y)
            } else {
                let x = piece2.origin_x;
                let y = piece2.origin_y + piece1.eval(x);
                i2 -= 1;
                (x, y)
            };
            result.push_front(LinearPiece::new(x, y, slope));
        }
        if let Some(first) = result.front_mut() {
            if first.origin_x > 0.0 {
                first.origin_y -= first.slope * first.origin_x;
                first.origin_x = 0.0;
            }
        }
        Self { pieces: result }
    }

    /// Pointwise minimum with a linear piece, in place.
    ///
    /// Pieces superseded by the new line are dropped from the right and
    /// the intersection abscissa is returned (`+inf` when the new piece
    /// never goes below the function).
    ///
    /// The function must be non-empty, start at abscissa 0, and have a
    /// last slope not smaller than the new piece's; `linear_piece` must
    /// also start at 0.
    pub fn infimum(&mut self, linear_piece: LinearPiece) -> f64 {
        debug_assert!(!self.pieces.is_empty());
        let last = self
            .pieces
            .back()
            .expect("infimum requires a non-empty function");
        if linear_piece.slope == last.slope {
            let y = linear_piece.eval(last.origin_x);
            if y > last.origin_y {
                return f64::INFINITY;
            } else if y == last.origin_y {
                return last.origin_x;
            }
            self.pieces.pop_back();
        }

        let mut xi = 0.0;
        while let Some(piece) = self.pieces.back() {
            xi = (linear_piece.origin_x * linear_piece.slope
                - piece.origin_x * piece.slope
                - (linear_piece.origin_y - piece.origin_y))
                / (linear_piece.slope - piece.slope);
            if xi > piece.origin_x {
                break;
            }
            self.pieces.pop_back();
        }
        self.pieces
            .push_back(LinearPiece::new(xi, linear_piece.eval(xi), linear_piece.slope));
        xi
    }
}

// ---------------------------------------------------------------------------
// Optimal cut from an energy attribute
// ---------------------------------------------------------------------------

/// Leaf labelling of the cut minimizing the total energy.
///
/// `energy_attribute[i]` is the energy of the partial partition made of
/// the single region `i`; the energy of the partition made of the
/// children of `i` is `accumulator(energy of the children)`. A dynamic
/// program from the leaves keeps, per node, the best of the two;
/// backtracking from the root labels the selected regions.
pub fn labelisation_optimal_cut_from_energy(
    tree: &Tree,
    energy_attribute: &[f64],
    accumulator: Accumulator,
) -> Result<Vec<usize>> {
    if energy_attribute.len() != tree.num_nodes() {
        return Err(HisegError::InvalidShape(
            "energy attribute does not match the number of nodes".into(),
        ));
    }
    tree.compute_children();
    let n = tree.num_nodes();
    let mut optimal_nodes = vec![false; n];
    let mut optimal_energy = vec![0.0; n];
    let mut kernel = AccumulatorKernel::new(accumulator, 1)?;

    for i in tree.leaves() {
        optimal_nodes[i] = true;
        optimal_energy[i] = energy_attribute[i];
    }
    for i in tree.leaves_to_root(false, true) {
        kernel.reset();
        for &c in tree.children(i)? {
            kernel.accumulate(&[optimal_energy[c]]);
        }
        let children_energy = kernel.finalize()[0];
        if energy_attribute[i] <= children_energy {
            optimal_nodes[i] = true;
            optimal_energy[i] = energy_attribute[i];
        } else {
            optimal_nodes[i] = false;
            optimal_energy[i] = children_energy;
        }
    }

    let mut labels = vec![INVALID_INDEX; n];
    let mut count = 0;
    for i in tree.root_to_leaves(true, true) {
        if labels[i] == INVALID_INDEX && optimal_nodes[i] {
            labels[i] = count;
            count += 1;
        }
        if labels[i] != INVALID_INDEX {
            for &c in tree.children(i)? {
                labels[c] = labels[i];
            }
        }
    }
    labels.truncate(tree.num_leaves());
    Ok(labels)
}

// ---------------------------------------------------------------------------
// Optimal energy cut hierarchy
// ---------------------------------------------------------------------------

/// Transform a hierarchy into its optimal energy cut hierarchy.
///
/// Each node carries a data-fidelity energy `D` and a sub-additive
/// regularization energy `R`; in the result, the horizontal cut at
/// level `lambda` is the optimal cut of the input for `D + lambda * R`.
/// `approximation_pieces` caps the piecewise-linear representation (see
/// [`PiecewiseLinearEnergy::sum`]).
pub fn hierarchy_to_optimal_energy_cut_hierarchy(
    tree: &Tree,
    data_fidelity: &[f64],
    regularization: &[f64],
    approximation_pieces: usize,
) -> Result<NodeWeightedTree> {
    let n = tree.num_nodes();
    if data_fidelity.len() != n || regularization.len() != n {
        return Err(HisegError::InvalidShape(
            "energy attributes do not match the number of nodes".into(),
        ));
    }
    if approximation_pieces == 0 {
        return Err(HisegError::PreconditionFailed(
            "the piece cap must be strictly positive".into(),
        ));
    }
    tree.compute_children();

    let mut optimal_energies: Vec<PiecewiseLinearEnergy> = Vec::with_capacity(n);
    let mut apparition_scales = vec![0.0; n];

    for i in tree.leaves() {
        optimal_energies.push(PiecewiseLinearEnergy::from_piece(LinearPiece::new(
            0.0,
            data_fidelity[i],
            regularization[i],
        )));
        apparition_scales[i] = -data_fidelity[i] / regularization[i];
    }
    for i in tree.leaves_to_root(false, true) {
        let children = tree.children(i)?;
        let mut combined = optimal_energies[children[0]].clone();
        for &c in &children[1..] {
            combined = combined.sum(&optimal_energies[c], approximation_pieces);
        }
        let scale = combined.infimum(LinearPiece::new(
            0.0,
            data_fidelity[i],
            regularization[i],
        ));
        optimal_energies.push(combined);
        apparition_scales[i] = scale;
    }

    for i in tree.root_to_leaves(true, false) {
        let p = tree.parent(i);
        apparition_scales[i] = apparition_scales[i].min(apparition_scales[p]).max(0.0);
    }

    let criterion: Vec<bool> = (0..n)
        .map(|i| apparition_scales[i] == apparition_scales[tree.parent(i)])
        .collect();
    let simplified = simplify_tree(tree, &criterion, false)?;
    let altitudes = simplified
        .node_map
        .iter()
        .map(|&i| apparition_scales[i])
        .collect();
    Ok(NodeWeightedTree {
        tree: simplified.tree,
        altitudes,
    })
}

// ---------------------------------------------------------------------------
// Mumford-Shah linkage
// ---------------------------------------------------------------------------

/// Scale-set linkage for the generic binary partition tree: regions
/// track area, perimeter, value sums, and their optimal piecewise
/// energy; the distance between two regions is the apparition scale of
/// their union.
#[derive(Debug)]
pub struct MumfordShahLinkage {
    area: Vec<f64>,
    perimeter: Vec<f64>,
    /// Per-region value sums; one column per channel.
    sum: DataArray,
    sum2: DataArray,
    edge_length: Vec<f64>,
    energies: Vec<PiecewiseLinearEnergy>,
}

impl MumfordShahLinkage {
    pub fn new(
        vertex_area: &[f64],
        vertex_perimeter: &[f64],
        sum_vertex_values: &DataArray,
        sum_squared_vertex_values: &DataArray,
        edge_length: &[f64],
    ) -> Result<Self> {
        let n = vertex_area.len();
        if vertex_perimeter.len() != n
            || sum_vertex_values.num_items() != n
            || sum_squared_vertex_values.num_items() != n
            || sum_vertex_values.item_size() != sum_squared_vertex_values.item_size()
        {
            return Err(HisegError::InvalidShape(
                "inconsistent Mumford-Shah region attributes".into(),
            ));
        }
        let mut linkage = Self {
            area: vertex_area.to_vec(),
            perimeter: vertex_perimeter.to_vec(),
            sum: sum_vertex_values.clone(),
            sum2: sum_squared_vertex_values.clone(),
            edge_length: edge_length.to_vec(),
            energies: Vec::with_capacity(2 * n - 1),
        };
        for i in 0..n {
            linkage.energies.push(PiecewiseLinearEnergy::from_piece(
                LinearPiece::new(0.0, linkage.data_fidelity(i), linkage.perimeter[i]),
            ));
        }
        Ok(linkage)
    }

    /// `sum2 - sum^2 / area`, summed over channels.
    fn data_fidelity(&self, i: usize) -> f64 {
        let area = self.area[i];
        self.sum
            .row(i)
            .iter()
            .zip(self.sum2.row(i))
            .map(|(&s, &q)| q - s * s / area)
            .sum()
    }

    /// Apparition scale of the union of regions `i` and `j` through a
    /// frontier of the given length.
    fn apparition_scale(&self, i: usize, j: usize, frontier_length: f64) -> f64 {
        let mut energy = self.energies[i].sum(&self.energies[j], DEFAULT_PIECE_CAP);
        let area = self.area[i] + self.area[j];
        let fidelity: f64 = self
            .sum
            .row(i)
            .iter()
            .zip(self.sum.row(j))
            .zip(self.sum2.row(i).iter().zip(self.sum2.row(j)))
            .map(|((&s1, &s2), (&q1, &q2))| {
                let s = s1 + s2;
                (q1 + q2) - s * s / area
            })
            .sum();
        let perimeter =
            self.perimeter[i] + self.perimeter[j] - 2.0 * frontier_length;
        energy.infimum(LinearPiece::new(0.0, fidelity, perimeter))
    }

    /// Apparition-scale weights of the initial graph edges.
    pub fn initial_weights(&self, graph: &UndirectedGraph) -> Vec<f64> {
        let mut weights = vec![0.0; graph.num_edges()];
        for (ei, u, v) in graph.edge_iter() {
            weights[ei] = self.apparition_scale(u, v, self.edge_length[ei]);
        }
        weights
    }
}

impl LinkageStrategy for MumfordShahLinkage {
    fn on_merge(&mut self, ctx: &MergeContext<'_>, new_neighbours: &mut [NewNeighbour]) {
        let (r1, r2) = (ctx.merged_region1, ctx.merged_region2);
        let new_region = ctx.new_region;

        self.area.push(self.area[r1] + self.area[r2]);
        self.perimeter.push(
            self.perimeter[r1] + self.perimeter[r2]
                - 2.0 * self.edge_length[ctx.fusion_edge_index],
        );
        let sum_row: Vec<f64> = self
            .sum
            .row(r1)
            .iter()
            .zip(self.sum.row(r2))
            .map(|(a, b)| a + b)
            .collect();
        self.sum.push_row(&sum_row);
        let sum2_row: Vec<f64> = self
            .sum2
            .row(r1)
            .iter()
            .zip(self.sum2.row(r2))
            .map(|(a, b)| a + b)
            .collect();
        self.sum2.push_row(&sum2_row);

        let mut energy = self.energies[r1].sum(&self.energies[r2], DEFAULT_PIECE_CAP);
        energy.infimum(LinearPiece::new(
            0.0,
            self.data_fidelity(new_region),
            self.perimeter[new_region],
        ));
        self.energies.push(energy);

        for record in new_neighbours {
            let length = if record.num_edges() == 2 {
                self.edge_length[record.first_edge_index()]
                    + self.edge_length[record.second_edge_index()]
            } else {
                self.edge_length[record.first_edge_index()]
            };
            if self.edge_length.len() <= record.new_edge_index() {
                self.edge_length.resize(record.new_edge_index() + 1, 0.0);
            }
            self.edge_length[record.new_edge_index()] = length;
            let scale =
                self.apparition_scale(new_region, record.neighbour_vertex(), length);
            record.set_new_edge_weight(scale.max(0.0));
        }
    }
}

/// Binary partition tree by the piecewise-constant Mumford-Shah energy:
/// altitudes are the apparition scales of the merged regions.
pub fn binary_partition_tree_mumford_shah(
    graph: &UndirectedGraph,
    vertex_perimeter: &[f64],
    vertex_area: &[f64],
    vertex_values: &DataArray,
    squared_vertex_values: &DataArray,
    edge_length: &[f64],
) -> Result<NodeWeightedTree> {
    if vertex_area.len() != graph.num_vertices()
        || vertex_perimeter.len() != graph.num_vertices()
        || edge_length.len() != graph.num_edges()
    {
        return Err(HisegError::InvalidShape(
            "region attributes do not match the graph".into(),
        ));
    }
    let mut linkage = MumfordShahLinkage::new(
        vertex_area,
        vertex_perimeter,
        vertex_values,
        squared_vertex_values,
        edge_length,
    )?;
    let initial = linkage.initial_weights(graph);
    binary_partition_tree(graph, &initial, &mut linkage)
}

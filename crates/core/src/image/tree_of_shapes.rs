//! Tree of shapes of a 2-d image.
//!
//! The image is immersed into a *plain map*: the Khalimsky subdivision
//! of the pixel grid where every inter-pixel element carries the
//! interval spanned by its surrounding pixels. A front propagation over
//! the plain map (an integer-level multi-queue over the value ranks)
//! produces a vertex order in which every shape is contiguous; a
//! union-find pass over that order then builds the component tree.
//!
//! The construction is self-dual: the trees of an image and of its
//! negation are isomorphic.

use crate::error::{HisegError, Result};
use crate::hierarchy::core::{simplify_tree, NodeWeightedTree};
use crate::structure::tree::{Tree, TreeCategory};
use crate::structure::union_find::UnionFind;
use crate::INVALID_INDEX;

/// Padding applied around the image before immersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TosPadding {
    /// No padding; the caller chooses the exterior vertex freely.
    None,
    /// One-pixel border of zeros.
    Zero,
    /// One-pixel border holding the mean of the image's outer ring.
    Mean,
}

// ---------------------------------------------------------------------------
// Integer-level multi-queue
// ---------------------------------------------------------------------------

/// A multi-queue with integer levels `0..num_levels`.
///
/// All operations are O(1) except [`MultiQueue::closest_non_empty_level`],
/// which is linear in the level span.
#[derive(Debug)]
struct MultiQueue {
    levels: Vec<Vec<usize>>,
    size: usize,
}

impl MultiQueue {
    fn new(num_levels: usize) -> Self {
        Self {
            levels: vec![Vec::new(); num_levels],
            size: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn push(&mut self, level: usize, v: usize) {
        self.levels[level].push(v);
        self.size += 1;
    }

    fn pop(&mut self, level: usize) -> usize {
        self.size -= 1;
        self.levels[level].pop().expect("level checked non-empty")
    }

    /// Nearest non-empty level at or below `level`.
    fn nearest_non_empty_below(&self, level: usize) -> Option<usize> {
        (0..=level).rev().find(|&l| !self.levels[l].is_empty())
    }

    /// Nearest non-empty level strictly above `level`.
    fn nearest_non_empty_above(&self, level: usize) -> Option<usize> {
        (level + 1..self.levels.len()).find(|&l| !self.levels[l].is_empty())
    }

    /// Non-empty level whose value is closest to the value of `level`;
    /// ties go to the lower level. `level_values` maps levels to the
    /// scale they represent.
    fn closest_non_empty_level(&self, level: usize, level_values: &[f64]) -> Option<usize> {
        if !self.levels[level].is_empty() {
            return Some(level);
        }
        let below = self.nearest_non_empty_below(level);
        let above = self.nearest_non_empty_above(level);
        match (below, above) {
            (Some(b), Some(a)) => {
                let db = level_values[level] - level_values[b];
                let da = level_values[a] - level_values[level];
                Some(if db <= da { b } else { a })
            }
            (Some(b), None) => Some(b),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Plain map
// ---------------------------------------------------------------------------

/// Interval-valued Khalimsky subdivision of a scalar image.
#[derive(Debug, Clone)]
pub struct PlainMap {
    /// `(low, high)` per vertex, row-major.
    pub ranges: Vec<(f64, f64)>,
    pub height: usize,
    pub width: usize,
}

/// Immerse a 2-d image of the given shape into its plain map of shape
/// `(2h - 1, 2w - 1)`.
pub fn interpolate_plain_map(image: &[f64], shape: (usize, usize)) -> Result<PlainMap> {
    let (h, w) = shape;
    if image.len() != h * w || h == 0 || w == 0 {
        return Err(HisegError::InvalidShape(
            "image does not match the given shape".into(),
        ));
    }
    let kh = 2 * h - 1;
    let kw = 2 * w - 1;
    let pixel = |y: usize, x: usize| image[y * w + x];
    let mut ranges = Vec::with_capacity(kh * kw);
    for y in 0..kh {
        for x in 0..kw {
            let range = match (y % 2, x % 2) {
                (0, 0) => {
                    let v = pixel(y / 2, x / 2);
                    (v, v)
                }
                (0, 1) => {
                    let a = pixel(y / 2, x / 2);
                    let b = pixel(y / 2, x / 2 + 1);
                    (a.min(b), a.max(b))
                }
                (1, 0) => {
                    let a = pixel(y / 2, x / 2);
                    let b = pixel(y / 2 + 1, x / 2);
                    (a.min(b), a.max(b))
                }
                _ => {
                    let vs = [
                        pixel(y / 2, x / 2),
                        pixel(y / 2, x / 2 + 1),
                        pixel(y / 2 + 1, x / 2),
                        pixel(y / 2 + 1, x / 2 + 1),
                    ];
                    (
                        vs.iter().copied().fold(f64::INFINITY, f64::min),
                        vs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    )
                }
            };
            ranges.push(range);
        }
    }
    Ok(PlainMap {
        ranges,
        height: kh,
        width: kw,
    })
}

fn pad_image(
    image: &[f64],
    shape: (usize, usize),
    padding: TosPadding,
) -> (Vec<f64>, (usize, usize)) {
    let (h, w) = shape;
    let border_value = match padding {
        TosPadding::None => return (image.to_vec(), shape),
        TosPadding::Zero => 0.0,
        TosPadding::Mean => {
            let mut sum = 0.0;
            let mut count = 0usize;
            for y in 0..h {
                for x in 0..w {
                    if y == 0 || y == h - 1 || x == 0 || x == w - 1 {
                        sum += image[y * w + x];
                        count += 1;
                    }
                }
            }
            sum / count as f64
        }
    };
    let (ph, pw) = (h + 2, w + 2);
    let mut padded = vec![border_value; ph * pw];
    for y in 0..h {
        for x in 0..w {
            padded[(y + 1) * pw + (x + 1)] = image[y * w + x];
        }
    }
    (padded, (ph, pw))
}

// ---------------------------------------------------------------------------
// Front propagation
// ---------------------------------------------------------------------------

/// Dequeue order and per-vertex enqueued level of the plain map.
#[derive(Debug)]
pub struct SortedVertices {
    pub order: Vec<usize>,
    pub enqueued_level: Vec<f64>,
}

/// Propagate a front over the plain map starting from `exterior_vertex`.
///
/// At each step the non-empty queue level closest to the current one is
/// selected (ties to the lower level), one vertex is dequeued, and its
/// unvisited 4-neighbours are enqueued at the current level clamped into
/// their plain-map range.
pub fn sort_vertices(plain_map: &PlainMap, exterior_vertex: usize) -> Result<SortedVertices> {
    let n = plain_map.ranges.len();
    if exterior_vertex >= n {
        return Err(HisegError::OutOfRange {
            index: exterior_vertex,
            bound: n,
        });
    }
    // ranks of the distinct interval bounds
    let mut values: Vec<f64> = Vec::with_capacity(2 * n);
    for &(low, high) in &plain_map.ranges {
        values.push(low);
        values.push(high);
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    values.dedup();
    let rank = |v: f64| -> usize {
        values
            .binary_search_by(|x| x.partial_cmp(&v).unwrap())
            .expect("every bound is a known value")
    };
    let rank_ranges: Vec<(usize, usize)> = plain_map
        .ranges
        .iter()
        .map(|&(low, high)| (rank(low), rank(high)))
        .collect();

    let (kh, kw) = (plain_map.height, plain_map.width);
    let mut queue = MultiQueue::new(values.len());
    let mut enqueued = vec![false; n];
    let mut enqueued_rank = vec![0usize; n];
    let mut order = Vec::with_capacity(n);

    let start_level = rank_ranges[exterior_vertex].0;
    queue.push(start_level, exterior_vertex);
    enqueued[exterior_vertex] = true;
    enqueued_rank[exterior_vertex] = start_level;
    let mut current_level = start_level;

    while !queue.is_empty() {
        let level = queue
            .closest_non_empty_level(current_level, &values)
            .expect("queue is non-empty");
        let v = queue.pop(level);
        current_level = level;
        enqueued_rank[v] = level;
        order.push(v);

        let (y, x) = (v / kw, v % kw);
        let mut visit = |q: usize| {
            if !enqueued[q] {
                let (low, high) = rank_ranges[q];
                let lq = current_level.clamp(low, high);
                queue.push(lq, q);
                enqueued[q] = true;
            }
        };
        if y > 0 {
            visit(v - kw);
        }
        if x > 0 {
            visit(v - 1);
        }
        if x + 1 < kw {
            visit(v + 1);
        }
        if y + 1 < kh {
            visit(v + kw);
        }
    }
    if order.len() != n {
        return Err(HisegError::PreconditionFailed(
            "plain map is not connected from the exterior vertex".into(),
        ));
    }
    Ok(SortedVertices {
        order,
        enqueued_level: enqueued_rank.iter().map(|&r| values[r]).collect(),
    })
}

// ---------------------------------------------------------------------------
// Tree construction
// ---------------------------------------------------------------------------

fn tree_from_sorted_vertices(
    plain_map: &PlainMap,
    sorted: &SortedVertices,
) -> Result<NodeWeightedTree> {
    let n = plain_map.ranges.len();
    let (kh, kw) = (plain_map.height, plain_map.width);
    let level = &sorted.enqueued_level;

    // union-find max-tree pass over the reversed dequeue order
    let mut parent_v = vec![INVALID_INDEX; n];
    let mut uf = UnionFind::new(n);
    // representative dequeue-first vertex of every union-find class
    let mut repr: Vec<usize> = (0..n).collect();
    let mut processed = vec![false; n];

    for &v in sorted.order.iter().rev() {
        parent_v[v] = v;
        processed[v] = true;
        let (y, x) = (v / kw, v % kw);
        let mut link_to = |q: usize, uf: &mut UnionFind, parent_v: &mut Vec<usize>, repr: &mut Vec<usize>| {
            if !processed[q] {
                return;
            }
            let rv = uf.find(v);
            let rq = uf.find(q);
            if rv != rq {
                parent_v[repr[rq]] = v;
                let merged = uf.link(rv, rq);
                repr[merged] = v;
            }
        };
        if y > 0 {
            link_to(v - kw, &mut uf, &mut parent_v, &mut repr);
        }
        if x > 0 {
            link_to(v - 1, &mut uf, &mut parent_v, &mut repr);
        }
        if x + 1 < kw {
            link_to(v + 1, &mut uf, &mut parent_v, &mut repr);
        }
        if y + 1 < kh {
            link_to(v + kw, &mut uf, &mut parent_v, &mut repr);
        }
    }
    let root_vertex = sorted.order[0];

    // canonicalization: point every vertex to the level-representative
    // of its shape
    for &v in &sorted.order {
        let q = parent_v[v];
        if level[parent_v[q]] == level[q] {
            parent_v[v] = parent_v[q];
        }
    }

    // canonical vertices, in dequeue order
    let is_canonical =
        |v: usize| v == root_vertex || level[parent_v[v]] != level[v];
    let canonical: Vec<usize> = sorted
        .order
        .iter()
        .copied()
        .filter(|&v| is_canonical(v))
        .collect();
    let m = canonical.len();

    // every plain-map vertex becomes a leaf; canonical vertices also get
    // an internal node, numbered so that the root comes last
    let mut node_id = vec![INVALID_INDEX; n];
    for (j, &c) in canonical.iter().enumerate() {
        node_id[c] = n + m - 1 - j;
    }
    let mut parents = vec![INVALID_INDEX; n + m];
    let mut altitudes = vec![0.0; n + m];
    for v in 0..n {
        let shape = if is_canonical(v) { v } else { parent_v[v] };
        parents[v] = node_id[shape];
        altitudes[v] = level[v];
    }
    for &c in &canonical {
        let id = node_id[c];
        parents[id] = if c == root_vertex {
            id
        } else {
            node_id[parent_v[c]]
        };
        altitudes[id] = level[c];
    }

    Ok(NodeWeightedTree {
        tree: Tree::with_category(parents, TreeCategory::ComponentTree)?,
        altitudes,
    })
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Tree of shapes of a 2-d scalar image.
///
/// `exterior_vertex` designates the plain-map vertex whose shape is
/// taken as the outermost one; with padding the border belongs to one
/// shape and vertex 0 (top-left of the padded plain map) is the natural
/// choice. When `original_space` is set, the tree is projected back to
/// the original pixel grid: interpolated and padded vertices are
/// removed and the leaves are the image pixels in row-major order.
pub fn tree_of_shapes_2d(
    image: &[f64],
    shape: (usize, usize),
    padding: TosPadding,
    original_space: bool,
    exterior_vertex: usize,
) -> Result<NodeWeightedTree> {
    let (padded, padded_shape) = pad_image(image, shape, padding);
    let plain_map = interpolate_plain_map(&padded, padded_shape)?;
    let sorted = sort_vertices(&plain_map, exterior_vertex)?;
    let full = tree_from_sorted_vertices(&plain_map, &sorted)?;
    if !original_space {
        return Ok(full);
    }

    // original pixels sit on even plain-map coordinates, shifted by the
    // padding offset
    let offset = match padding {
        TosPadding::None => 0usize,
        _ => 2,
    };
    let kw = plain_map.width;
    let n = plain_map.ranges.len();
    let keep = |v: usize| -> bool {
        let (y, x) = (v / kw, v % kw);
        y >= offset
            && x >= offset
            && (y - offset) % 2 == 0
            && (x - offset) % 2 == 0
            && (y - offset) / 2 < shape.0
            && (x - offset) / 2 < shape.1
    };
    let criterion: Vec<bool> = (0..full.tree.num_nodes())
        .map(|i| i < n && !keep(i))
        .collect();
    let simplified = simplify_tree(&full.tree, &criterion, true)?;
    let altitudes = simplified
        .node_map
        .iter()
        .map(|&i| full.altitudes[i])
        .collect();
    Ok(NodeWeightedTree {
        tree: simplified.tree,
        altitudes,
    })
}

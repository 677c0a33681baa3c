//! Edge weights derived from vertex data.

use crate::array::DataArray;
use crate::error::{HisegError, Result};
use crate::structure::graph::UndirectedGraph;

/// How an edge weight is derived from the data of its two endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightFunction {
    /// Arithmetic mean of the endpoint values (scalar only).
    Mean,
    /// Minimum of the endpoint values (scalar only).
    Min,
    /// Maximum of the endpoint values (scalar only).
    Max,
    /// 0 when the endpoint rows are equal, 1 otherwise.
    L0,
    /// Sum of absolute coordinate differences.
    L1,
    /// Euclidean distance.
    L2,
    /// Squared Euclidean distance.
    L2Squared,
    /// Maximum absolute coordinate difference.
    LInfinity,
    /// Value of the source endpoint (scalar only).
    Source,
    /// Value of the target endpoint (scalar only).
    Target,
}

impl WeightFunction {
    fn scalar_only(self) -> bool {
        matches!(
            self,
            WeightFunction::Mean
                | WeightFunction::Min
                | WeightFunction::Max
                | WeightFunction::Source
                | WeightFunction::Target
        )
    }
}

/// Weight every live edge of the graph from its endpoint data.
///
/// Tombstoned edge slots get weight 0. Scalar-only functions on
/// vectorial data report [`HisegError::Unsupported`].
pub fn weight_graph(
    graph: &UndirectedGraph,
    vertex_data: &DataArray,
    weight: WeightFunction,
) -> Result<Vec<f64>> {
    if vertex_data.num_items() != graph.num_vertices() {
        return Err(HisegError::InvalidShape(
            "vertex data does not match the number of vertices".into(),
        ));
    }
    if weight.scalar_only() && !vertex_data.is_scalar() {
        return Err(HisegError::Unsupported(format!(
            "{:?} weight function is only defined for scalar data",
            weight
        )));
    }
    let mut result = vec![0.0; graph.num_edges()];
    for (ei, u, v) in graph.edge_iter() {
        let a = vertex_data.row(u);
        let b = vertex_data.row(v);
        result[ei] = match weight {
            WeightFunction::Mean => (a[0] + b[0]) / 2.0,
            WeightFunction::Min => a[0].min(b[0]),
            WeightFunction::Max => a[0].max(b[0]),
            WeightFunction::Source => a[0],
            WeightFunction::Target => b[0],
            WeightFunction::L0 => {
                if a == b {
                    0.0
                } else {
                    1.0
                }
            }
            WeightFunction::L1 => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
            WeightFunction::L2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            WeightFunction::L2Squared => {
                a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
            }
            WeightFunction::LInfinity => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
        };
    }
    Ok(result)
}

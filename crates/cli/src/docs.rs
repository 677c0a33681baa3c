//! JSON document types exchanged on the command line.

use hiseg_core::{HisegError, Result, Tree, UndirectedGraph};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An edge-weighted undirected graph.
///
/// `shape` is present for 4-adjacency grid graphs and enables the
/// contour rendering commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDoc {
    pub num_vertices: usize,
    pub edges: Vec<(usize, usize)>,
    pub edge_weights: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<(usize, usize)>,
}

impl GraphDoc {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Materialize the graph; fails when an edge is out of range or the
    /// weight count does not match.
    pub fn build(&self) -> Result<(UndirectedGraph, Vec<f64>)> {
        if self.edge_weights.len() != self.edges.len() {
            return Err(HisegError::InvalidShape(format!(
                "{} edge weights for {} edges",
                self.edge_weights.len(),
                self.edges.len()
            )));
        }
        let mut g = UndirectedGraph::with_capacity(self.num_vertices, self.edges.len());
        for &(u, v) in &self.edges {
            g.add_edge(u, v)?;
        }
        Ok((g, self.edge_weights.clone()))
    }
}

/// A valued hierarchy: parents array plus one altitude per node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyDoc {
    pub parents: Vec<usize>,
    pub num_leaves: usize,
    pub altitudes: Vec<f64>,
}

impl HierarchyDoc {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn from_hierarchy(tree: &Tree, altitudes: &[f64]) -> Self {
        Self {
            parents: tree.parents().to_vec(),
            num_leaves: tree.num_leaves(),
            altitudes: altitudes.to_vec(),
        }
    }

    /// Validate and build the tree.
    pub fn build(&self) -> Result<(Tree, Vec<f64>)> {
        let tree = Tree::new(self.parents.clone())?;
        if tree.num_leaves() != self.num_leaves {
            return Err(HisegError::MalformedTree(format!(
                "declared {} leaves, parents imply {}",
                self.num_leaves,
                tree.num_leaves()
            )));
        }
        if self.altitudes.len() != tree.num_nodes() {
            return Err(HisegError::InvalidShape(
                "altitudes do not match the number of nodes".into(),
            ));
        }
        Ok((tree, self.altitudes.clone()))
    }
}

/// Write a serializable document to a file or stdout.
pub fn write_json<T: Serialize>(doc: &T, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(doc)?;
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{}", text),
    }
    Ok(())
}

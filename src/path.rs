use tracing::debug;

use crate::error::SynthesisError;
use crate::{Coordinate, DirectedEdge, EdgeId, NodeId, RoadGraph, Weighting};

/// One link of a shortest-path-tree predecessor chain, child to parent.
/// The root entry carries no edge and marks the start of the route.
#[derive(Debug, Clone, PartialEq)]
pub struct SptEntry {
    /// Edge traversed from the parent's node into `node`; None at the root.
    pub edge: Option<EdgeId>,
    pub node: NodeId,
    pub weight: f64,
    pub parent: Option<Box<SptEntry>>,
}

impl SptEntry {
    pub fn root(node: NodeId) -> Self {
        Self {
            edge: None,
            node,
            weight: 0.0,
            parent: None,
        }
    }

    pub fn new(edge: EdgeId, node: NodeId, weight: f64, parent: SptEntry) -> Self {
        Self {
            edge: Some(edge),
            node,
            weight,
            parent: Some(Box::new(parent)),
        }
    }
}

/// A reconstructed route: the forward-ordered edge traversals between
/// `from_node` and `to_node`, with the totals already accumulated.
///
/// Invariant: consecutive edges share a node, `edges[i].adj ==
/// edges[i + 1].base`. A path with `found == false` has no edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub found: bool,
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub edges: Vec<DirectedEdge>,
    pub weight: f64,
    pub time_millis: u64,
    pub distance: f64,
}

impl Path {
    pub fn not_found(node: NodeId) -> Self {
        Self {
            found: false,
            from_node: node,
            to_node: node,
            edges: vec![],
            weight: 0.0,
            time_millis: 0,
            distance: 0.0,
        }
    }

    /// Nodes visited in traversal order. Empty for an unfound path.
    pub fn calc_nodes(&self) -> Vec<NodeId> {
        if !self.found {
            return vec![];
        }
        let mut nodes = Vec::with_capacity(self.edges.len() + 1);
        nodes.push(self.from_node);
        nodes.extend(self.edges.iter().map(|e| e.adj));
        nodes
    }

    /// Full geometry of the path: the first edge's base point, then per
    /// edge its pillars followed by its adj point. The point count is
    /// `1 + Σ (1 + pillars)`; an unfound or empty path has no points.
    pub fn calc_points<G: RoadGraph>(&self, graph: &G) -> Result<Vec<Coordinate>, SynthesisError> {
        let Some(first) = self.edges.first() else {
            return Ok(vec![]);
        };

        let coordinate = |node: NodeId| {
            graph
                .coordinate(node)
                .ok_or_else(|| SynthesisError::GraphContractViolation(format!("no coordinate for {node:?}")))
        };

        let mut points = Vec::with_capacity(1 + self.edges.iter().map(|e| e.geometry.len() + 1).sum::<usize>());
        points.push(coordinate(first.base)?);
        for edge in &self.edges {
            points.extend(edge.geometry.iter().copied());
            points.push(coordinate(edge.adj)?);
        }
        Ok(points)
    }
}

/// Unpacks a predecessor chain into a forward-ordered [`Path`].
///
/// The chain is walked back to its root, reversed, and every traversed edge
/// is resolved base→adj in travel direction. Distance is summed from the
/// edge views; time from the weighting's edge millis plus, for weightings
/// with turn costs, the turn millis at every intermediate node.
pub fn extract_path<G: RoadGraph, W: Weighting>(
    graph: &G,
    weighting: &W,
    entry: &SptEntry,
) -> Result<Path, SynthesisError> {
    let to_node = entry.node;
    let weight = entry.weight;

    // child -> parent hops, then reversed into travel order
    let mut hops: Vec<(EdgeId, NodeId, NodeId)> = vec![];
    let mut current = entry;
    while let (Some(edge), Some(parent)) = (current.edge, current.parent.as_deref()) {
        hops.push((edge, parent.node, current.node));
        current = parent;
    }
    let from_node = current.node;
    hops.reverse();

    debug!("Extracting path {from_node:?} -> {to_node:?} over {} edges", hops.len());

    let mut edges: Vec<DirectedEdge> = Vec::with_capacity(hops.len());
    let mut distance = 0.0;
    let mut time_millis = 0u64;
    for (edge_id, base, adj) in hops {
        let edge = graph
            .directed_edge(edge_id, base)
            .filter(|e| e.adj == adj)
            .ok_or(SynthesisError::PathMalformed(edge_id, base))?;

        distance += edge.distance;
        time_millis += weighting.edge_millis(&edge, false);
        if weighting.has_turn_costs() {
            if let Some(previous) = edges.last() {
                time_millis += weighting.turn_millis(previous.edge, base, edge.edge);
            }
        }
        edges.push(edge);
    }

    Ok(Path {
        found: true,
        from_node,
        to_node,
        edges,
        weight,
        time_millis,
        distance,
    })
}

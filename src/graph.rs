use crate::{Coordinate, EdgeId, EdgeKey, NodeId, RoadClass, RoadEnvironment};

/// One directed traversal of an edge, with every attribute the synthesizer
/// needs already resolved. `geometry` holds the pillar points strictly
/// between the two tower endpoints, ordered base to adj; the endpoints
/// themselves come from [`RoadGraph::coordinate`].
///
/// Attribute encoding and storage stay behind the [`RoadGraph`] façade;
/// the view is a plain value and never outlives the traversal it was
/// materialized for.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectedEdge {
    pub edge: EdgeId,
    pub key: EdgeKey,
    pub base: NodeId,
    pub adj: NodeId,
    /// Edge length in meters, never negative.
    pub distance: f64,
    pub geometry: Vec<Coordinate>,
    /// Street name; empty means unnamed.
    pub name: String,
    pub road_class: RoadClass,
    pub road_class_link: bool,
    pub road_environment: RoadEnvironment,
    pub roundabout: bool,
    /// Speed in the base→adj direction, meters per second. Zero means the
    /// direction cannot be driven.
    pub speed_forward: f64,
    /// Speed in the adj→base direction, meters per second.
    pub speed_backward: f64,
    pub access_forward: bool,
    pub access_backward: bool,
}

impl DirectedEdge {
    /// Both edges carry the same non-empty street name.
    /// Unnamed edges never match, not even each other.
    pub fn same_street(&self, other: &DirectedEdge) -> bool {
        !self.name.is_empty() && self.name == other.name
    }
}

/// Read-only road network façade.
/// Implemented by whatever owns the routing graph; the synthesizer only
/// reads from it and multiple syntheses may share one graph concurrently.
pub trait RoadGraph {
    /// Number of tower nodes in the graph.
    fn node_count(&self) -> usize;

    /// Location of a tower node.
    /// Returns None if the node doesn't belong to the graph.
    fn coordinate(&self, node: NodeId) -> Option<Coordinate>;

    /// Gets an iterator over all edges incident to the given node, each
    /// oriented away from it (`base == node`, other endpoint as `adj`).
    /// Returns an empty iterator if the node doesn't belong to the graph.
    fn edges_from(&self, node: NodeId) -> impl Iterator<Item = DirectedEdge>;

    /// Resolves an edge as a directed view with the given base node.
    /// Returns None if the edge doesn't belong to the graph or isn't
    /// incident to `base`.
    fn directed_edge(&self, edge: EdgeId, base: NodeId) -> Option<DirectedEdge>;
}

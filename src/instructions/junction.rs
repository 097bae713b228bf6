use tracing::trace;

use crate::error::SynthesisError;
use crate::geometry::{calc_orientation, turn_delta};
use crate::{Coordinate, DirectedEdge, NodeId, RoadGraph, Weighting};

/// Upper bound of the slight band; alternatives below it compete with a
/// near-straight continuation and force a keep instruction.
pub(crate) const SLIGHT_MAX: f64 = 0.8;

fn node_coordinate<G: RoadGraph>(graph: &G, node: NodeId) -> Result<Coordinate, SynthesisError> {
    graph
        .coordinate(node)
        .ok_or_else(|| SynthesisError::GraphContractViolation(format!("no coordinate for {node:?}")))
}

/// Tangent of an edge leaving its base node: the direction towards the
/// first pillar, or towards the adj node on pillar-less edges.
pub(crate) fn tangent_out<G: RoadGraph>(graph: &G, edge: &DirectedEdge) -> Result<f64, SynthesisError> {
    let from = node_coordinate(graph, edge.base)?;
    let to = match edge.geometry.first() {
        Some(&pillar) => pillar,
        None => node_coordinate(graph, edge.adj)?,
    };
    Ok(calc_orientation(from, to))
}

/// Tangent of an edge entering its adj node: the direction from the last
/// pillar, or from the base node on pillar-less edges.
pub(crate) fn tangent_in<G: RoadGraph>(graph: &G, edge: &DirectedEdge) -> Result<f64, SynthesisError> {
    let from = match edge.geometry.last() {
        Some(&pillar) => pillar,
        None => node_coordinate(graph, edge.base)?,
    };
    let to = node_coordinate(graph, edge.adj)?;
    Ok(calc_orientation(from, to))
}

/// One outgoing option at a junction, with its turn delta relative to the
/// incoming tangent (counter-clockwise positive, i.e. left).
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub edge: DirectedEdge,
    pub delta: f64,
}

/// The outgoing edges at a junction, seen from an incoming traversal.
/// The reverse of the incoming edge is excluded by edge id, which keeps
/// parallel edges between the same two nodes intact. The taken edge is a
/// member like any other.
#[derive(Debug)]
pub(crate) struct Alternatives {
    /// Traversable under the active weighting.
    pub allowed: Vec<Candidate>,
    /// All outgoing edges except the incoming reverse, traversable or not.
    pub visible: usize,
}

impl Alternatives {
    pub fn collect<G: RoadGraph, W: Weighting>(
        graph: &G,
        weighting: &W,
        via: NodeId,
        incoming: &DirectedEdge,
        in_orientation: f64,
    ) -> Result<Self, SynthesisError> {
        let mut allowed = vec![];
        let mut visible = 0;
        for outgoing in graph.edges_from(via) {
            if outgoing.edge == incoming.edge {
                continue;
            }
            visible += 1;
            if weighting.edge_weight(&outgoing, false).is_finite() {
                let delta = turn_delta(in_orientation, tangent_out(graph, &outgoing)?);
                trace!("Allowed alternative {:?} at {via:?}, delta {delta:.3}", outgoing.edge);
                allowed.push(Candidate { edge: outgoing, delta });
            }
        }
        Ok(Self { allowed, visible })
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed.len()
    }

    /// The alternative closest to straight ahead, other than the taken
    /// edge, when it lies within the slight band and therefore competes
    /// with the taken continuation.
    pub fn competing_with(&self, taken: &DirectedEdge) -> Option<&Candidate> {
        self.allowed
            .iter()
            .filter(|c| c.edge.edge != taken.edge && c.delta.abs() < SLIGHT_MAX)
            .min_by(|a, b| a.delta.abs().total_cmp(&b.delta.abs()))
    }

    /// Routable branches leaving the roundabout at this junction.
    pub fn roundabout_exits(&self) -> usize {
        self.allowed.iter().filter(|c| !c.edge.roundabout).count()
    }
}

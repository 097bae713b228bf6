use crate::{DirectedEdge, EdgeId, NodeId};

/// Cost model collaborator. The synthesizer never routes, but it must ask
/// the same questions the router asked: whether an edge can be traversed in
/// a direction at all, and how long a traversal takes.
///
/// A non-finite edge weight marks the direction as untraversable; only
/// edges with finite weight count as real alternatives at a junction.
pub trait Weighting {
    /// Cost of traversing the edge. `reverse` flips the direction relative
    /// to the view's base→adj orientation.
    fn edge_weight(&self, edge: &DirectedEdge, reverse: bool) -> f64;

    /// Traversal time in milliseconds for the given direction.
    fn edge_millis(&self, edge: &DirectedEdge, reverse: bool) -> u64;

    /// Cost of turning from `in_edge` to `out_edge` across `via`.
    fn turn_weight(&self, in_edge: EdgeId, via: NodeId, out_edge: EdgeId) -> f64;

    /// Turn time in milliseconds.
    fn turn_millis(&self, in_edge: EdgeId, via: NodeId, out_edge: EdgeId) -> u64;

    /// Whether this weighting models turn costs at all. When false the
    /// per-junction turn queries are skipped entirely.
    fn has_turn_costs(&self) -> bool {
        false
    }
}

/// Weighting driven purely by the per-direction speed attribute: cost is
/// travel time, a speed of zero closes the direction. No turn costs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeedWeighting;

impl SpeedWeighting {
    fn speed(edge: &DirectedEdge, reverse: bool) -> f64 {
        if reverse {
            edge.speed_backward
        } else {
            edge.speed_forward
        }
    }
}

impl Weighting for SpeedWeighting {
    fn edge_weight(&self, edge: &DirectedEdge, reverse: bool) -> f64 {
        let speed = Self::speed(edge, reverse);
        if speed > 0.0 {
            edge.distance / speed
        } else {
            f64::INFINITY
        }
    }

    fn edge_millis(&self, edge: &DirectedEdge, reverse: bool) -> u64 {
        let speed = Self::speed(edge, reverse);
        if speed > 0.0 {
            (edge.distance / speed * 1000.0) as u64
        } else {
            0
        }
    }

    fn turn_weight(&self, _in_edge: EdgeId, _via: NodeId, _out_edge: EdgeId) -> f64 {
        0.0
    }

    fn turn_millis(&self, _in_edge: EdgeId, _via: NodeId, _out_edge: EdgeId) -> u64 {
        0
    }
}

/// Weighting driven by the per-direction access flag: every permitted
/// traversal costs the same. Useful for profiles without speeds, e.g. foot.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessWeighting;

impl AccessWeighting {
    fn accessible(edge: &DirectedEdge, reverse: bool) -> bool {
        if reverse {
            edge.access_backward
        } else {
            edge.access_forward
        }
    }
}

impl Weighting for AccessWeighting {
    fn edge_weight(&self, edge: &DirectedEdge, reverse: bool) -> f64 {
        if Self::accessible(edge, reverse) {
            1.0
        } else {
            f64::INFINITY
        }
    }

    fn edge_millis(&self, edge: &DirectedEdge, reverse: bool) -> u64 {
        if Self::accessible(edge, reverse) { 1000 } else { 0 }
    }

    fn turn_weight(&self, _in_edge: EdgeId, _via: NodeId, _out_edge: EdgeId) -> f64 {
        0.0
    }

    fn turn_millis(&self, _in_edge: EdgeId, _via: NodeId, _out_edge: EdgeId) -> u64 {
        0
    }
}

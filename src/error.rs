use thiserror::Error;

use crate::{EdgeId, NodeId};

#[derive(Error, Debug, PartialEq)]
pub enum SynthesisError {
    /// The predecessor chain references an edge that cannot be resolved
    /// from the node it is supposed to start at.
    #[error("malformed path: edge {0:?} is not incident to node {1:?}")]
    PathMalformed(EdgeId, NodeId),
    /// The graph façade broke its contract, e.g. a node on the path has
    /// no coordinate.
    #[error("graph contract violation: {0}")]
    GraphContractViolation(String),
}

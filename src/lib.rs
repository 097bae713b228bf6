#![doc = include_str!("../README.md")]

mod details;
mod error;
mod geometry;
mod graph;
mod instructions;
mod model;
mod path;
mod translation;
mod weighting;

pub use details::{DetailKey, DetailMap, DetailValue, Intersection, PathDetail, calc_details};
pub use error::SynthesisError;
pub use geometry::{align_orientation, azimuth, calc_orientation, turn_delta};
pub use graph::{DirectedEdge, RoadGraph};
pub use instructions::{
    Instruction, InstructionKind, InstructionList, PointSpan, TurnSign, calc_instructions,
};
pub use model::{Coordinate, EdgeId, EdgeKey, NodeId, RoadClass, RoadEnvironment};
pub use path::{Path, SptEntry, extract_path};
pub use translation::{EnUs, Translation};
pub use weighting::{AccessWeighting, SpeedWeighting, Weighting};

mod builders;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::SynthesisError;
use crate::path::Path;
use crate::{RoadGraph, Weighting};

use builders::{DetailBuilder, builder_for, intersection_details};

/// Attribute a path can be partitioned by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKey {
    AverageSpeed,
    StreetName,
    EdgeId,
    EdgeKey,
    Time,
    Distance,
    Intersection,
}

/// Value of one detail run. Which variant appears is fixed per key;
/// `Null` only occurs for average speed, when a run never saw an edge
/// long enough to measure (a reverse-path ordering artifact).
#[derive(Debug, Clone, PartialEq)]
pub enum DetailValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Intersection(Intersection),
}

/// Junction layout at the base node of an edge: all incident edges in
/// bearing order, clockwise from north.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    /// Compass bearing of each incident edge, degrees in `0..360`.
    pub bearings: Vec<u16>,
    /// Whether each incident edge can be legally entered; the edge the
    /// traveller arrived by is always false.
    pub entries: Vec<bool>,
    /// Index of the edge the path takes.
    pub out: usize,
    /// Index of the edge the path arrived by; absent at the start node.
    pub r#in: Option<usize>,
}

/// A maximal contiguous run of edges sharing a detail value, in the
/// path's point index space: the run covers points `first..=last`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDetail {
    pub value: DetailValue,
    pub first: usize,
    pub last: usize,
}

pub type DetailMap = FxHashMap<DetailKey, Vec<PathDetail>>;

/// Partitions the path into per-attribute runs, one pass per requested
/// key. Run order is monotonically non-decreasing in `first`; an unfound
/// or empty path produces empty lists.
pub fn calc_details<G: RoadGraph, W: Weighting>(
    path: &Path,
    graph: &G,
    weighting: &W,
    keys: &[DetailKey],
) -> Result<DetailMap, SynthesisError> {
    let mut map = DetailMap::default();
    for &key in keys {
        let details = if !path.found || path.edges.is_empty() {
            vec![]
        } else if key == DetailKey::Intersection {
            intersection_details(path, graph, weighting)?
        } else {
            run_details(path, builder_for(key, weighting))
        };
        debug!("Calculated {} detail runs for {key:?}", details.len());
        map.insert(key, details);
    }
    Ok(map)
}

/// Walks the edges once, asking the builder per edge whether the current
/// run continues. Edge `i` spans points `p(i) ..= p(i) + 1 + pillars(i)`;
/// the final run closes at the last path point.
fn run_details(path: &Path, mut builder: Box<dyn DetailBuilder + '_>) -> Vec<PathDetail> {
    let mut details = vec![];
    let mut point = 0usize;
    let mut run_start = 0usize;
    let mut run_value = DetailValue::Null;

    for (index, edge) in path.edges.iter().enumerate() {
        let new_run = builder.is_new_run(edge);
        if index == 0 {
            run_value = builder.run_value();
        } else if new_run {
            details.push(PathDetail {
                value: std::mem::replace(&mut run_value, builder.run_value()),
                first: run_start,
                last: point,
            });
            run_start = point;
        }
        point += 1 + edge.geometry.len();
    }

    details.push(PathDetail {
        value: run_value,
        first: run_start,
        last: point,
    });
    details
}

use crate::details::{DetailKey, DetailValue, Intersection, PathDetail};
use crate::error::SynthesisError;
use crate::geometry::azimuth;
use crate::path::Path;
use crate::{DirectedEdge, RoadGraph, Weighting};

/// Run policy for one detail key. `is_new_run` inspects the edge, updates
/// the builder's notion of the current value, and says whether the edge
/// opens a new run; `run_value` snapshots the value for the run the edge
/// belongs to.
pub(super) trait DetailBuilder {
    fn is_new_run(&mut self, edge: &DirectedEdge) -> bool;
    fn run_value(&self) -> DetailValue;
}

pub(super) fn builder_for<'a>(
    key: DetailKey,
    weighting: &'a dyn Weighting,
) -> Box<dyn DetailBuilder + 'a> {
    match key {
        DetailKey::AverageSpeed => Box::new(AverageSpeed {
            weighting,
            value: None,
        }),
        DetailKey::StreetName => Box::new(StreetName { value: None }),
        DetailKey::EdgeId => Box::new(Numeric {
            value: None,
            extract: |e, _| e.edge.0 as i64,
            weighting,
            coalesce: true,
        }),
        DetailKey::EdgeKey => Box::new(Numeric {
            value: None,
            extract: |e, _| e.key.value() as i64,
            weighting,
            coalesce: true,
        }),
        // time and distance vary per edge, every edge is its own run
        DetailKey::Time => Box::new(Numeric {
            value: None,
            extract: |e, w| w.edge_millis(e, false) as i64,
            weighting,
            coalesce: false,
        }),
        DetailKey::Distance => Box::new(DistanceBuilder { value: None }),
        DetailKey::Intersection => unreachable!("intersections don't coalesce into runs"),
    }
}

/// Edges at most this long never break a run on their own; spurious
/// one-point runs would otherwise appear wherever ways are segmented at
/// crossings.
const SHORT_EDGE_MAX: f64 = 1.0;

/// Average speed in km/h, derived from the weighting so the value matches
/// what the traveller experiences, rounded to one decimal. A run that only
/// ever saw sub-meter edges keeps a `Null` value.
struct AverageSpeed<'a> {
    weighting: &'a dyn Weighting,
    value: Option<f64>,
}

impl DetailBuilder for AverageSpeed<'_> {
    fn is_new_run(&mut self, edge: &DirectedEdge) -> bool {
        if edge.distance <= SHORT_EDGE_MAX {
            return false;
        }
        let millis = self.weighting.edge_millis(edge, false);
        if millis == 0 {
            return false;
        }
        let speed = (edge.distance / millis as f64 * 3600.0 * 10.0).round() / 10.0;
        if self.value != Some(speed) {
            self.value = Some(speed);
            true
        } else {
            false
        }
    }

    fn run_value(&self) -> DetailValue {
        match self.value {
            Some(speed) => DetailValue::Float(speed),
            None => DetailValue::Null,
        }
    }
}

/// Street name runs; the empty name is a value of its own, distinct from
/// every non-empty name.
struct StreetName {
    value: Option<String>,
}

impl DetailBuilder for StreetName {
    fn is_new_run(&mut self, edge: &DirectedEdge) -> bool {
        if self.value.as_deref() != Some(edge.name.as_str()) {
            self.value = Some(edge.name.clone());
            true
        } else {
            false
        }
    }

    fn run_value(&self) -> DetailValue {
        DetailValue::Text(self.value.clone().unwrap_or_default())
    }
}

/// Integer-valued details (edge id, edge key, time).
struct Numeric<'a> {
    value: Option<i64>,
    extract: fn(&DirectedEdge, &dyn Weighting) -> i64,
    weighting: &'a dyn Weighting,
    coalesce: bool,
}

impl DetailBuilder for Numeric<'_> {
    fn is_new_run(&mut self, edge: &DirectedEdge) -> bool {
        let value = (self.extract)(edge, self.weighting);
        let new_run = !self.coalesce || self.value != Some(value);
        self.value = Some(value);
        new_run
    }

    fn run_value(&self) -> DetailValue {
        DetailValue::Int(self.value.unwrap_or_default())
    }
}

struct DistanceBuilder {
    value: Option<f64>,
}

impl DetailBuilder for DistanceBuilder {
    fn is_new_run(&mut self, edge: &DirectedEdge) -> bool {
        self.value = Some(edge.distance);
        true
    }

    fn run_value(&self) -> DetailValue {
        DetailValue::Float(self.value.unwrap_or_default())
    }
}

/// Builds one intersection value per traversed edge, describing the
/// junction at the edge's base node: every incident edge in bearing order
/// (clockwise from north), which of them may be entered, and where the
/// path comes in and goes out.
pub(super) fn intersection_details<G: RoadGraph, W: Weighting>(
    path: &Path,
    graph: &G,
    weighting: &W,
) -> Result<Vec<PathDetail>, SynthesisError> {
    let mut details = Vec::with_capacity(path.edges.len());
    let mut point = 0usize;

    for (index, edge) in path.edges.iter().enumerate() {
        let incoming = index.checked_sub(1).map(|i| &path.edges[i]);
        let node = graph.coordinate(edge.base).ok_or_else(|| {
            SynthesisError::GraphContractViolation(format!("no coordinate for {:?}", edge.base))
        })?;

        let mut slots: Vec<(u16, DirectedEdge)> = vec![];
        for outgoing in graph.edges_from(edge.base) {
            let towards = match outgoing.geometry.first() {
                Some(&pillar) => pillar,
                None => graph.coordinate(outgoing.adj).ok_or_else(|| {
                    SynthesisError::GraphContractViolation(format!(
                        "no coordinate for {:?}",
                        outgoing.adj
                    ))
                })?,
            };
            slots.push((azimuth(node, towards), outgoing));
        }
        slots.sort_by_key(|(bearing, e)| (*bearing, e.edge));

        let bearings = slots.iter().map(|(bearing, _)| *bearing).collect();
        let entries = slots
            .iter()
            .map(|(_, e)| {
                incoming.is_none_or(|inc| inc.edge != e.edge)
                    && weighting.edge_weight(e, false).is_finite()
            })
            .collect();
        let out = slots
            .iter()
            .position(|(_, e)| e.edge == edge.edge)
            .ok_or_else(|| {
                SynthesisError::GraphContractViolation(format!(
                    "edge {:?} missing from its own junction",
                    edge.edge
                ))
            })?;
        let r#in = incoming.and_then(|inc| slots.iter().position(|(_, e)| e.edge == inc.edge));

        let span = 1 + edge.geometry.len();
        details.push(PathDetail {
            value: DetailValue::Intersection(Intersection {
                bearings,
                entries,
                out,
                r#in,
            }),
            first: point,
            last: point + span,
        });
        point += span;
    }

    Ok(details)
}

use std::f64::consts::PI;

use tracing::{debug, trace};

use crate::error::SynthesisError;
use crate::geometry::{align_orientation, turn_delta};
use crate::instructions::junction::{Alternatives, tangent_in, tangent_out};
use crate::instructions::{Instruction, InstructionKind, InstructionList, PointSpan, TurnSign};
use crate::path::Path;
use crate::{DirectedEdge, RoadGraph, Weighting};

const STRAIGHT_MAX: f64 = 0.2;
const SLIGHT_MAX: f64 = crate::instructions::junction::SLIGHT_MAX;
const NORMAL_MAX: f64 = 2.3;
const SHARP_MAX: f64 = 2.9;

/// Two consecutive same-side turns only collapse into a U-turn while the
/// connecting instruction is at most this long, in meters.
const MAX_U_TURN_DISTANCE: f64 = 35.0;

/// Junction deltas below roughly one degree carry no rotation evidence.
const MIN_ROTATION_DELTA: f64 = 0.017;

/// A slight bend between two unnamed edges is only announced beyond this
/// delta; below it the road just wiggles.
const SLIGHT_QUIET_MAX: f64 = 0.4;

/// A same-street fork degrades to a plain continue when the taken edge is
/// dead straight and the branch clearly veers off.
const FORK_CONTINUE_MAX: f64 = 0.1;
const FORK_BRANCH_MIN: f64 = 0.15;

/// Angle band of a junction delta; the variants order by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Band {
    Straight,
    Slight,
    Normal,
    Sharp,
    UTurn,
}

impl Band {
    fn of(delta: f64) -> Self {
        let abs = delta.abs();
        if abs < STRAIGHT_MAX {
            Self::Straight
        } else if abs < SLIGHT_MAX {
            Self::Slight
        } else if abs < NORMAL_MAX {
            Self::Normal
        } else if abs < SHARP_MAX {
            Self::Sharp
        } else {
            Self::UTurn
        }
    }

    /// Turn sign for this band; `delta > 0` is counter-clockwise = left.
    /// The U-turn band falls back to sharp, the dedicated U-turn signs are
    /// only chosen via the same-street and merge rules.
    fn sign(self, delta: f64) -> TurnSign {
        let left = delta > 0.0;
        match self {
            Self::Straight | Self::Slight => {
                if left {
                    TurnSign::SlightLeft
                } else {
                    TurnSign::SlightRight
                }
            }
            Self::Normal => {
                if left {
                    TurnSign::Left
                } else {
                    TurnSign::Right
                }
            }
            Self::Sharp | Self::UTurn => {
                if left {
                    TurnSign::SharpLeft
                } else {
                    TurnSign::SharpRight
                }
            }
        }
    }
}

#[derive(Debug)]
enum Decision {
    Extend,
    Emit(InstructionKind),
}

/// Rotation sense of the roundabout currently being traversed.
#[derive(Debug)]
struct RoundaboutState {
    /// Tangent into the entry node; None when the path started inside.
    entry_orientation: Option<f64>,
    /// +1 clockwise, -1 counter-clockwise, 0 while undetermined.
    rotation: i8,
}

impl RoundaboutState {
    fn latch(&mut self, evidence: f64) {
        if self.rotation == 0 && evidence.abs() > MIN_ROTATION_DELTA {
            self.rotation = if evidence < 0.0 { 1 } else { -1 };
        }
    }
}

/// Name and heading recorded when a turn instruction is emitted, so a
/// quickly following same-side turn back onto the original street can be
/// merged into a single U-turn.
#[derive(Debug)]
struct PendingUTurn {
    orientation_before: f64,
    name_before: String,
}

/// Builds the instruction list for a finished path.
///
/// Walks the edges once, keeping one instruction open at a time. Every
/// junction either extends the open instruction or finalizes it and opens
/// the next; every edge contributes its distance, millis and geometry to
/// whichever instruction is open when it is consumed.
pub fn calc_instructions<G: RoadGraph, W: Weighting>(
    path: &Path,
    graph: &G,
    weighting: &W,
) -> Result<InstructionList, SynthesisError> {
    if !path.found || path.edges.is_empty() {
        return Ok(InstructionList::default());
    }

    let points = path.calc_points(graph)?;
    debug!(
        "Synthesizing instructions for {} edges, {} points",
        path.edges.len(),
        points.len()
    );

    let mut machine = Synthesizer::start(graph, weighting, &path.edges[0])?;
    for edge in &path.edges[1..] {
        machine.process(edge)?;
    }
    Ok(machine.finish(points))
}

struct Synthesizer<'a, G, W> {
    graph: &'a G,
    weighting: &'a W,
    done: Vec<Instruction>,
    current: Instruction,
    prev_edge: DirectedEdge,
    /// Tangent into the upcoming junction, i.e. out of the previous edge.
    prev_orientation: f64,
    roundabout: Option<RoundaboutState>,
    pending_uturn: Option<PendingUTurn>,
}

impl<'a, G: RoadGraph, W: Weighting> Synthesizer<'a, G, W> {
    fn start(graph: &'a G, weighting: &'a W, first: &DirectedEdge) -> Result<Self, SynthesisError> {
        let (kind, roundabout) = if first.roundabout {
            let state = RoundaboutState {
                entry_orientation: None,
                rotation: 0,
            };
            (
                InstructionKind::Roundabout {
                    exit_number: 1,
                    turn_angle: None,
                    exited: false,
                },
                Some(state),
            )
        } else if first.road_environment.is_ferry() {
            (InstructionKind::Ferry, None)
        } else {
            (InstructionKind::Continue, None)
        };

        let mut machine = Self {
            graph,
            weighting,
            done: vec![],
            current: open_instruction(kind, first.name.clone(), false, 0),
            prev_edge: first.clone(),
            prev_orientation: tangent_in(graph, first)?,
            roundabout,
            pending_uturn: None,
        };
        machine.consume(first, true);
        Ok(machine)
    }

    fn process(&mut self, edge: &DirectedEdge) -> Result<(), SynthesisError> {
        if self.roundabout.is_some() {
            self.process_in_roundabout(edge)?;
        } else if edge.roundabout {
            self.enter_roundabout(edge)?;
        } else if edge.road_environment.is_ferry() && !self.prev_edge.road_environment.is_ferry() {
            trace!("Entering ferry at {:?}", edge.base);
            self.emit(InstructionKind::Ferry, edge, false);
        } else if self.prev_edge.road_environment.is_ferry() && !edge.road_environment.is_ferry() {
            self.leave_ferry(edge)?;
        } else {
            self.process_junction(edge)?;
        }

        self.consume(edge, false);
        self.prev_edge = edge.clone();
        self.prev_orientation = tangent_in(self.graph, edge)?;
        Ok(())
    }

    /// Finalizes the open instruction and appends the zero-length finish
    /// marker at the last path point.
    fn finish(mut self, points: Vec<crate::Coordinate>) -> InstructionList {
        let last_point = self.current.span.last;
        debug_assert_eq!(last_point, points.len() - 1);
        debug_assert!(self.current.distance >= 0.0);

        let finish = open_instruction(InstructionKind::Finish, String::new(), false, last_point);
        self.done.push(self.current);
        self.done.push(finish);
        InstructionList {
            instructions: self.done,
            points,
        }
    }

    /// Adds the edge's distance, time and geometry to the open instruction.
    fn consume(&mut self, edge: &DirectedEdge, first: bool) {
        self.current.distance += edge.distance;
        self.current.time_millis += self.weighting.edge_millis(edge, false);
        if !first && self.weighting.has_turn_costs() {
            self.current.time_millis +=
                self.weighting
                    .turn_millis(self.prev_edge.edge, edge.base, edge.edge);
        }
        self.current.span.last += 1 + edge.geometry.len();
    }

    /// Finalizes the open instruction and opens the next one at the
    /// junction point.
    fn emit(&mut self, kind: InstructionKind, edge: &DirectedEdge, exits_ferry: bool) {
        let junction_point = self.current.span.last;
        debug_assert!(self.current.distance >= 0.0);
        debug_assert!(self.current.span.first <= self.current.span.last);
        trace!("Emitting {:?} at point {junction_point}", self.current.kind);

        let next = open_instruction(kind, edge.name.clone(), exits_ferry, junction_point);
        self.done.push(std::mem::replace(&mut self.current, next));
        self.pending_uturn = None;
    }

    fn enter_roundabout(&mut self, edge: &DirectedEdge) -> Result<(), SynthesisError> {
        let mut state = RoundaboutState {
            entry_orientation: Some(self.prev_orientation),
            rotation: 0,
        };
        // merging into the ring bears against the rotation sense
        let entry_delta = turn_delta(self.prev_orientation, tangent_out(self.graph, edge)?);
        state.latch(-entry_delta);

        trace!("Entering roundabout at {:?}", edge.base);
        self.emit(
            InstructionKind::Roundabout {
                exit_number: 1,
                turn_angle: None,
                exited: false,
            },
            edge,
            false,
        );
        self.roundabout = Some(state);
        Ok(())
    }

    fn process_in_roundabout(&mut self, edge: &DirectedEdge) -> Result<(), SynthesisError> {
        let out_orientation = tangent_out(self.graph, edge)?;
        let delta = turn_delta(self.prev_orientation, out_orientation);
        let Some(state) = self.roundabout.as_mut() else {
            return Ok(());
        };

        let InstructionKind::Roundabout {
            exit_number,
            turn_angle,
            exited,
        } = &mut self.current.kind
        else {
            unreachable!("roundabout state without roundabout instruction");
        };

        if edge.roundabout {
            // still circling: passed branches become candidate exits
            state.latch(delta);
            let alternatives = Alternatives::collect(
                self.graph,
                self.weighting,
                edge.base,
                &self.prev_edge,
                self.prev_orientation,
            )?;
            let passed = alternatives.roundabout_exits() as u32;
            *exit_number += passed;
            trace!("Passing {:?} inside roundabout, {passed} exits", edge.base);
            return Ok(());
        }

        // leaving: peeling off bears against the rotation sense
        state.latch(-delta);
        *exited = true;
        *turn_angle = state.entry_orientation.map(|entry| {
            let delta = entry - align_orientation(entry, out_orientation);
            if state.rotation >= 0 {
                PI + delta
            } else {
                -(PI - delta)
            }
        });
        self.current.name = edge.name.clone();
        trace!("Leaving roundabout at {:?} onto {:?}", edge.base, edge.name);
        self.roundabout = None;
        Ok(())
    }

    fn leave_ferry(&mut self, edge: &DirectedEdge) -> Result<(), SynthesisError> {
        let delta = turn_delta(self.prev_orientation, tangent_out(self.graph, edge)?);
        let band = Band::of(delta);
        // announced unconditionally, the usual suppression rules don't apply
        let kind = match band {
            Band::Straight => InstructionKind::Continue,
            Band::UTurn if edge.same_street(&self.prev_edge) => InstructionKind::Turn {
                sign: uturn_sign(delta),
            },
            band => InstructionKind::Turn {
                sign: band.sign(delta),
            },
        };
        trace!("Leaving ferry at {:?}", edge.base);
        self.emit(kind, edge, true);
        Ok(())
    }

    fn process_junction(&mut self, edge: &DirectedEdge) -> Result<(), SynthesisError> {
        let delta = turn_delta(self.prev_orientation, tangent_out(self.graph, edge)?);
        let alternatives = Alternatives::collect(
            self.graph,
            self.weighting,
            edge.base,
            &self.prev_edge,
            self.prev_orientation,
        )?;

        match self.decide(edge, delta, &alternatives) {
            Decision::Extend => {
                trace!("Extending through {:?} (delta {delta:.3})", edge.base);
            }
            Decision::Emit(kind) => {
                if let InstructionKind::Turn { sign } = kind {
                    if self.merge_uturn(edge, sign)? {
                        trace!("Merged turn at {:?} into a U-turn", edge.base);
                        return Ok(());
                    }
                }
                let pending = match kind {
                    InstructionKind::Turn { sign }
                        if !matches!(sign, TurnSign::KeepLeft | TurnSign::KeepRight) =>
                    {
                        Some(PendingUTurn {
                            orientation_before: self.prev_orientation,
                            name_before: self.prev_edge.name.clone(),
                        })
                    }
                    _ => None,
                };
                self.emit(kind, edge, false);
                self.pending_uturn = pending;
            }
        }
        Ok(())
    }

    /// The junction decision procedure for plain junctions: ferry and
    /// roundabout transitions are already handled by the caller.
    fn decide(&self, edge: &DirectedEdge, delta: f64, alternatives: &Alternatives) -> Decision {
        let band = Band::of(delta);
        let same_street = edge.same_street(&self.prev_edge);

        // a reversal of travel on the same street is always a U-turn
        if band == Band::UTurn && same_street {
            return Decision::Emit(InstructionKind::Turn {
                sign: uturn_sign(delta),
            });
        }

        // no choice: stay quiet, unless the geometry clearly turns and
        // other (if illegal) edges would leave the traveller in doubt
        if alternatives.allowed_count() <= 1 {
            if band >= Band::Normal && alternatives.visible > 1 {
                return Decision::Emit(InstructionKind::Turn {
                    sign: band.sign(delta),
                });
            }
            return Decision::Extend;
        }

        if band >= Band::Normal {
            return Decision::Emit(InstructionKind::Turn {
                sign: band.sign(delta),
            });
        }

        // near-straight over a real junction

        // motorway forks through link edges are handled by ramp guidance
        if self.prev_edge.road_class.is_major_highway()
            && edge.road_class.is_major_highway()
            && (self.prev_edge.road_class_link || edge.road_class_link)
        {
            return Decision::Extend;
        }

        if let Some(competing) = alternatives.competing_with(edge) {
            if same_street && delta.abs() < FORK_CONTINUE_MAX && competing.delta.abs() > FORK_BRANCH_MIN
            {
                // dead straight through the fork while the branch clearly
                // veers off; arguably a keep instruction, kept as continue
                return Decision::Emit(InstructionKind::Continue);
            }
            // a fork: both options are near-straight, name the side
            let sign = if delta > competing.delta {
                TurnSign::KeepLeft
            } else {
                TurnSign::KeepRight
            };
            return Decision::Emit(InstructionKind::Turn { sign });
        }

        if band == Band::Straight && same_street {
            return Decision::Extend;
        }

        if band == Band::Slight {
            if same_street {
                // the street merely bends
                return Decision::Extend;
            }
            if self.prev_edge.name == edge.name && delta.abs() <= SLIGHT_QUIET_MAX {
                // an unnamed geometry wiggle, nothing to announce
                return Decision::Extend;
            }
            return Decision::Emit(InstructionKind::Turn {
                sign: band.sign(delta),
            });
        }

        // straight onto another name: announce the rename, except that
        // fading into an unnamed edge is no rename at all
        if !edge.name.is_empty() && self.prev_edge.name != edge.name {
            return Decision::Emit(InstructionKind::Continue);
        }
        Decision::Extend
    }

    /// Collapses the open turn instruction and the turn decided at this
    /// junction into one U-turn when they form one: same side, hardly any
    /// distance in between, heading reversed, and back on the street the
    /// traveller came from.
    fn merge_uturn(&mut self, edge: &DirectedEdge, sign: TurnSign) -> Result<bool, SynthesisError> {
        if matches!(sign, TurnSign::KeepLeft | TurnSign::KeepRight) {
            return Ok(false);
        }
        let Some(pending) = &self.pending_uturn else {
            return Ok(false);
        };
        let InstructionKind::Turn { sign: open_sign } = self.current.kind else {
            return Ok(false);
        };
        if !open_sign.same_side(&sign)
            || matches!(open_sign, TurnSign::KeepLeft | TurnSign::KeepRight)
            || self.current.distance > MAX_U_TURN_DISTANCE
            || edge.name != pending.name_before
        {
            return Ok(false);
        }

        let combined = turn_delta(pending.orientation_before, tangent_out(self.graph, edge)?);
        if combined.abs() <= SHARP_MAX {
            return Ok(false);
        }

        self.current.kind = InstructionKind::Turn {
            sign: if sign.is_left() {
                TurnSign::UTurnLeft
            } else {
                TurnSign::UTurnRight
            },
        };
        self.current.name = edge.name.clone();
        self.pending_uturn = None;
        Ok(true)
    }
}

const fn uturn_sign(delta: f64) -> TurnSign {
    if delta > 0.0 {
        TurnSign::UTurnLeft
    } else {
        TurnSign::UTurnRight
    }
}

fn open_instruction(
    kind: InstructionKind,
    name: String,
    exits_ferry: bool,
    point: usize,
) -> Instruction {
    Instruction {
        kind,
        name,
        distance: 0.0,
        time_millis: 0,
        span: PointSpan {
            first: point,
            last: point,
        },
        exits_ferry,
    }
}

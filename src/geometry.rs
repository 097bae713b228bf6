//! Planar angle helpers over geographic coordinates.
//!
//! Orientations are measured counter-clockwise from east in radians, on an
//! equirectangular projection around the segment (longitude differences are
//! shrunk by the cosine of the mean latitude). That is accurate enough at
//! junction scale and keeps the math branch-free.

use std::f64::consts::PI;

use crate::Coordinate;

/// Orientation of the segment `from -> to` in `(-PI, PI]`, east = 0,
/// counter-clockwise positive.
pub fn calc_orientation(from: Coordinate, to: Coordinate) -> f64 {
    let shrink = ((from.lat + to.lat) / 2.0).to_radians().cos();
    (to.lat - from.lat).atan2(shrink * (to.lon - from.lon))
}

/// Shifts `orientation` by multiples of 2·PI so that it lies within PI of
/// `reference`. Needed before subtracting two orientations.
pub fn align_orientation(reference: f64, orientation: f64) -> f64 {
    let mut aligned = orientation;
    if aligned - reference > PI {
        aligned -= 2.0 * PI;
    } else if aligned - reference < -PI {
        aligned += 2.0 * PI;
    }
    aligned
}

/// Signed change of direction between an incoming and an outgoing tangent,
/// in `[-PI, PI]`. Positive is counter-clockwise, i.e. a left turn.
pub fn turn_delta(in_orientation: f64, out_orientation: f64) -> f64 {
    align_orientation(in_orientation, out_orientation) - in_orientation
}

/// Compass bearing of the segment `from -> to` in integer degrees,
/// clockwise from north in `0..360`.
pub fn azimuth(from: Coordinate, to: Coordinate) -> u16 {
    let degrees = 90.0 - calc_orientation(from, to).to_degrees();
    let degrees = degrees.rem_euclid(360.0);
    (degrees.round() as u16) % 360
}

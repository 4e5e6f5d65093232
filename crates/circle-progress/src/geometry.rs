//! Arc geometry.
//!
//! Angles are in degrees, measured clockwise from the positive x axis (SVG
//! y grows downwards).

use std::fmt;

use crate::number::format_number;

/// Sweeps below this many degrees (but above zero) are drawn as empty.
pub const MIN_VISIBLE_SWEEP: f64 = 0.3;

/// Largest sweep drawn; a full 360 degree arc would have coincident endpoints.
pub const MAX_SWEEP: f64 = 359.999;

/// A point in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Convert polar coordinates to cartesian ones.
#[inline]
pub fn polar_to_cartesian(radius: f64, angle: f64) -> Point {
    let radians = angle.to_radians();
    Point::new(radius * radians.cos(), radius * radians.sin())
}

/// An SVG elliptical-arc path describing a circular sector outline.
///
/// `Display` renders it as path data: `M x1 y1 A r r 0 large sweep x2 y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorPath {
    pub start: Point,
    pub end: Point,
    pub radius: f64,
    pub large_arc: bool,
    pub clockwise: bool,
}

/// Build the arc for a sector of `sweep` degrees starting at `start_angle`.
///
/// Tiny sweeps snap to zero and full sweeps stop just short of 360 degrees,
/// see [`MIN_VISIBLE_SWEEP`] and [`MAX_SWEEP`].
pub fn make_sector_path(
    cx: f64,
    cy: f64,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    clockwise: bool,
) -> SectorPath {
    let sweep = if sweep > 0.0 && sweep < MIN_VISIBLE_SWEEP {
        0.0
    } else if sweep > MAX_SWEEP {
        MAX_SWEEP
    } else {
        sweep
    };

    let end_angle = if clockwise {
        start_angle + sweep
    } else {
        start_angle - sweep
    };
    let start = polar_to_cartesian(radius, start_angle);
    let end = polar_to_cartesian(radius, end_angle);

    SectorPath {
        start: Point::new(cx + start.x, cy + start.y),
        end: Point::new(cx + end.x, cy + end.y),
        radius,
        large_arc: sweep > 180.0,
        clockwise,
    }
}

impl fmt::Display for SectorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} A {} {} 0 {} {} {} {}",
            format_number(self.start.x),
            format_number(self.start.y),
            format_number(self.radius),
            format_number(self.radius),
            u8::from(self.large_arc),
            u8::from(self.clockwise),
            format_number(self.end.x),
            format_number(self.end.y),
        )
    }
}

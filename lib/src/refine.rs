//! Breakpoint insertion, the counterpart of reduction: split the sections
//! around the sharpest bends so a sparse curve gains resolution where its
//! slope changes fastest.

use crate::reduce::deviation;
use crate::table::{chord_slope, Breakpoint, BreakpointTable, MIN_POINTS};
use crate::CurveError;

/// Grow `table` to exactly `target` breakpoints.
///
/// Each round finds the interior breakpoint whose two sections deviate the
/// most and splits both of its flanking segments at their midpoints. The
/// inserted points lie on the polyline, so the curve's shape is unchanged.
/// Returns the table as-is when it already holds `target` points or more.
pub fn refine(table: &BreakpointTable, target: usize) -> Result<BreakpointTable, CurveError> {
    if table.len() < MIN_POINTS {
        return Err(CurveError::InsufficientPoints { count: table.len() });
    }
    if target <= table.len() {
        return Ok(table.clone());
    }

    let mut points = table.points().to_vec();
    while points.len() < target {
        let bend = sharpest_bend(&points)?;
        let left = midpoint(points[bend - 1], points[bend]);
        let right = midpoint(points[bend], points[bend + 1]);
        if target - points.len() >= 2 {
            points.insert(bend + 1, right);
            points.insert(bend, left);
        } else {
            // One slot left: split only the steeper flank.
            let left_slope = chord_slope(&points, bend - 1, bend)?;
            let right_slope = chord_slope(&points, bend, bend + 1)?;
            if left_slope.abs() >= right_slope.abs() {
                points.insert(bend, left);
            } else {
                points.insert(bend + 1, right);
            }
        }
    }
    BreakpointTable::build(points)
}

fn midpoint(a: Breakpoint, b: Breakpoint) -> Breakpoint {
    Breakpoint::new(
        (a.sensor_unit + b.sensor_unit) / 2.0,
        (a.temperature + b.temperature) / 2.0,
    )
}

/// Interior breakpoint whose two sections deviate the most.
fn sharpest_bend(points: &[Breakpoint]) -> Result<usize, CurveError> {
    let mut left = chord_slope(points, 0, 1)?;
    let mut best = (1, f64::NEG_INFINITY);
    for i in 1..points.len() - 1 {
        let right = chord_slope(points, i, i + 1)?;
        let d = deviation(left, right);
        if d > best.1 {
            best = (i, d);
        }
        left = right;
    }
    Ok(best.0)
}

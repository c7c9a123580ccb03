use serde::{Deserialize, Serialize};

use crate::CurveError;

/// Fewest breakpoints that still describe a bendable curve.
pub(crate) const MIN_POINTS: usize = 3;

/// A single calibration point: a sensor reading and the temperature it
/// maps to. Compared and copied by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub sensor_unit: f64,
    pub temperature: f64,
}

impl Breakpoint {
    pub fn new(sensor_unit: f64, temperature: f64) -> Self {
        Breakpoint {
            sensor_unit,
            temperature,
        }
    }
}

/// An ordered breakpoint table with ascending sensor units.
///
/// Built once from decoded input and never mutated afterwards; reduction
/// and refinement return fresh tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct BreakpointTable {
    points: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Validate and take ownership of an ordered breakpoint sequence.
    ///
    /// Descending sensor units are a data error, not something to correct.
    /// Equal adjacent sensor units are admitted here and rejected by the
    /// algorithms, which cannot assign the zero-width section a slope.
    pub fn build(points: Vec<Breakpoint>) -> Result<Self, CurveError> {
        if points.len() < MIN_POINTS {
            return Err(CurveError::InsufficientPoints {
                count: points.len(),
            });
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].sensor_unit < pair[0].sensor_unit {
                return Err(CurveError::NonMonotonicInput {
                    index: i + 1,
                    sensor_unit: pair[1].sensor_unit,
                });
            }
        }
        Ok(BreakpointTable { points })
    }

    /// Wrap a sequence already known to be ordered, e.g. a subsequence of a
    /// validated table. Skips the minimum-size check so that two-point
    /// results stay representable.
    pub(crate) fn from_ordered(points: Vec<Breakpoint>) -> Self {
        BreakpointTable { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounds-checked accessor.
    pub fn at(&self, index: usize) -> Result<Breakpoint, CurveError> {
        self.points
            .get(index)
            .copied()
            .ok_or(CurveError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
    }

    pub fn points(&self) -> &[Breakpoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.points.iter()
    }
}

impl TryFrom<Vec<Breakpoint>> for BreakpointTable {
    type Error = CurveError;

    fn try_from(points: Vec<Breakpoint>) -> Result<Self, CurveError> {
        BreakpointTable::build(points)
    }
}

impl From<BreakpointTable> for Vec<Breakpoint> {
    fn from(table: BreakpointTable) -> Vec<Breakpoint> {
        table.points
    }
}

/// Slope of the chord between two breakpoints of an ordered sequence.
/// A zero-width chord has no slope and reports the left breakpoint.
pub(crate) fn chord_slope(
    points: &[Breakpoint],
    from: usize,
    to: usize,
) -> Result<f64, CurveError> {
    let (a, b) = (points[from], points[to]);
    let run = b.sensor_unit - a.sensor_unit;
    if run == 0.0 {
        return Err(CurveError::DegenerateSegment { index: from });
    }
    Ok((b.temperature - a.temperature) / run)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(x: f64, y: f64) -> Breakpoint {
        Breakpoint::new(x, y)
    }

    #[test]
    fn build_rejects_descending_sensor_units() {
        let err = BreakpointTable::build(vec![bp(0.0, 0.0), bp(1.0, 1.0), bp(0.5, 2.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            CurveError::NonMonotonicInput { index: 2, .. }
        ));
    }

    #[test]
    fn build_rejects_fewer_than_three_points() {
        let err = BreakpointTable::build(vec![bp(0.0, 0.0), bp(1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, CurveError::InsufficientPoints { count: 2 }));
    }

    #[test]
    fn build_admits_equal_adjacent_sensor_units() {
        let table = BreakpointTable::build(vec![bp(0.0, 0.0), bp(0.0, 1.0), bp(1.0, 2.0)]);
        assert!(table.is_ok());
    }

    #[test]
    fn at_is_bounds_checked() {
        let table =
            BreakpointTable::build(vec![bp(0.0, 0.0), bp(1.0, 1.0), bp(2.0, 4.0)]).unwrap();
        assert_eq!(table.at(2).unwrap(), bp(2.0, 4.0));
        assert!(matches!(
            table.at(3),
            Err(CurveError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn chord_slope_fails_on_zero_width() {
        let points = vec![bp(1.0, 0.0), bp(1.0, 5.0)];
        assert!(matches!(
            chord_slope(&points, 0, 1),
            Err(CurveError::DegenerateSegment { index: 0 })
        ));
        assert_eq!(chord_slope(&[bp(0.0, 0.0), bp(2.0, 6.0)], 0, 1).unwrap(), 3.0);
    }
}

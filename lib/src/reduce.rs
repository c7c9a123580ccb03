//! Breakpoint reduction.
//!
//! Merges adjacent curve sections whose slopes agree within a tolerance,
//! retrying whole passes with a gradually larger tolerance until the table
//! fits the requested size. Devices cap how many breakpoints a curve may
//! carry, so dense curves have to give up their flattest bends first.

use crate::table::{chord_slope, Breakpoint, BreakpointTable, MIN_POINTS};
use crate::CurveError;

/// Default tolerance increment between reduction passes.
pub const DEFAULT_INCREMENT: f64 = 0.0005;

/// How two adjacent sections combine into a slope deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlopePair {
    /// Both sections rise or both fall (or both are flat).
    SameSign,
    /// The sections bend against each other.
    OppositeSign,
}

impl SlopePair {
    fn classify(slope1: f64, slope2: f64) -> SlopePair {
        if slope1 * slope2 > 0.0 || (slope1 == 0.0 && slope2 == 0.0) {
            SlopePair::SameSign
        } else {
            SlopePair::OppositeSign
        }
    }
}

/// Deviation between two adjacent section slopes: the difference when they
/// agree in direction, the sum of magnitudes when they oppose.
pub(crate) fn deviation(slope1: f64, slope2: f64) -> f64 {
    match SlopePair::classify(slope1, slope2) {
        SlopePair::SameSign => (slope1 - slope2).abs(),
        SlopePair::OppositeSign => slope1.abs() + slope2.abs(),
    }
}

/// A successful reduction: the kept breakpoints, the tolerance that got
/// there and how many passes it took.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub table: BreakpointTable,
    pub tolerance: f64,
    pub passes: usize,
}

/// Reduces a breakpoint table to at most `target` points with the smallest
/// tolerance the increment granularity can find.
#[derive(Debug, Clone)]
pub struct Reducer {
    pub target: usize,
    pub increment: f64,
    pub max_passes: usize,
}

impl Reducer {
    pub fn new(target: usize) -> Self {
        Self::with_increment(target, DEFAULT_INCREMENT)
    }

    pub fn with_increment(target: usize, increment: f64) -> Self {
        Reducer {
            target,
            increment,
            max_passes: max_passes_for(increment),
        }
    }

    /// Search for the smallest tolerance that shrinks `table` to the target.
    ///
    /// Every pass sweeps the original table, never a previous candidate, so
    /// each tolerance is judged on its own. The search stops the moment a
    /// candidate fits; it fails as saturated when raising the tolerance no
    /// longer buys a smaller table.
    pub fn reduce(&self, table: &BreakpointTable) -> Result<Reduction, CurveError> {
        if table.len() < MIN_POINTS {
            return Err(CurveError::InsufficientPoints { count: table.len() });
        }
        if self.target >= table.len() {
            return Ok(Reduction {
                table: table.clone(),
                tolerance: 0.0,
                passes: 1,
            });
        }

        let mut tolerance = 0.0;
        let mut previous = usize::MAX;
        for pass in 1..=self.max_passes {
            let kept = sweep(table, tolerance)?;
            if kept.len() <= self.target {
                return Ok(Reduction {
                    table: BreakpointTable::from_ordered(kept),
                    tolerance,
                    passes: pass,
                });
            }
            if kept.len() == previous {
                return Err(CurveError::ToleranceSaturated {
                    tolerance,
                    size: kept.len(),
                    target: self.target,
                });
            }
            previous = kept.len();
            tolerance += self.increment;
        }
        Err(CurveError::MaxPassesExceeded {
            target: self.target,
            passes: self.max_passes,
        })
    }
}

/// Passes needed to walk a deviation span of 10.0 at `increment`.
/// Saturation detection normally fires long before this; it is the hard
/// stop for adversarial increments. Degenerate increments (zero, negative,
/// NaN) saturate on their second pass, so the floor of 16 is plenty.
fn max_passes_for(increment: f64) -> usize {
    const SPAN: f64 = 10.0;
    ((SPAN / increment).ceil() as usize).clamp(16, 1_000_000)
}

/// One left-to-right pass at a fixed tolerance.
///
/// Three rolling cursor positions: `start..mid` is the left section (a
/// chord once merges happen), `mid..end` the next original segment. A
/// midpoint whose two sections agree within the tolerance is dropped and
/// the chord extends over it; otherwise it is kept and the cursor slides
/// one section forward. The first and last breakpoints are always kept.
fn sweep(table: &BreakpointTable, tolerance: f64) -> Result<Vec<Breakpoint>, CurveError> {
    let points = table.points();
    let mut kept = Vec::with_capacity(points.len());
    kept.push(points[0]);

    let (mut start, mut mid, mut end) = (0, 1, 2);
    while end < points.len() {
        let slope1 = chord_slope(points, start, mid)?;
        let slope2 = chord_slope(points, mid, end)?;
        if deviation(slope1, slope2) <= tolerance {
            // Smooth enough: drop the midpoint, the chord now spans it.
            mid = end;
        } else {
            kept.push(points[mid]);
            start = mid;
            mid = end;
        }
        end += 1;
    }
    kept.push(points[mid]);
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(x: f64, y: f64) -> Breakpoint {
        Breakpoint::new(x, y)
    }

    fn table(points: &[(f64, f64)]) -> BreakpointTable {
        BreakpointTable::build(points.iter().map(|&(x, y)| bp(x, y)).collect()).unwrap()
    }

    /// 40 points of y = x^2: section slopes grow steadily, adjacent
    /// deviations are a uniform 1.0.
    fn convex() -> BreakpointTable {
        BreakpointTable::build(
            (0..40)
                .map(|i| {
                    let x = i as f64 * 0.5;
                    bp(x, x * x)
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn collinear_curve_reduces_to_endpoints_at_zero_tolerance() {
        let table = table(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let reduction = Reducer::with_increment(2, 0.01).reduce(&table).unwrap();
        assert_eq!(
            reduction.table.points(),
            &[bp(0.0, 0.0), bp(3.0, 3.0)][..]
        );
        assert_eq!(reduction.tolerance, 0.0);
        assert_eq!(reduction.passes, 1);
    }

    #[test]
    fn alternating_slopes_saturate_under_a_fine_increment() {
        let table = table(&[(0.0, 0.0), (1.0, 5.0), (2.0, 0.0), (3.0, 5.0)]);
        let err = Reducer::with_increment(2, 0.0005)
            .reduce(&table)
            .unwrap_err();
        assert!(matches!(err, CurveError::ToleranceSaturated { size: 4, .. }));
    }

    #[test]
    fn alternating_slopes_merge_once_the_tolerance_covers_them() {
        let table = table(&[(0.0, 0.0), (1.0, 5.0), (2.0, 0.0), (3.0, 5.0)]);
        let reduction = Reducer::with_increment(2, 11.0).reduce(&table).unwrap();
        assert_eq!(
            reduction.table.points(),
            &[bp(0.0, 0.0), bp(3.0, 5.0)][..]
        );
        assert_eq!(reduction.tolerance, 11.0);
        assert_eq!(reduction.passes, 2);
    }

    #[test]
    fn target_at_or_above_len_returns_the_input_unchanged() {
        let table = table(&[(0.0, 0.0), (1.0, 5.0), (2.0, 0.0)]);
        let reduction = Reducer::new(3).reduce(&table).unwrap();
        assert_eq!(reduction.table, table);
        assert_eq!(reduction.tolerance, 0.0);
        assert_eq!(reduction.passes, 1);
    }

    #[test]
    fn two_point_table_is_rejected() {
        let table = BreakpointTable::from_ordered(vec![bp(0.0, 0.0), bp(1.0, 1.0)]);
        let err = Reducer::new(2).reduce(&table).unwrap_err();
        assert!(matches!(err, CurveError::InsufficientPoints { count: 2 }));
    }

    #[test]
    fn equal_sensor_units_fail_as_degenerate() {
        let table = table(&[(0.0, 0.0), (1.0, 1.0), (1.0, 2.0), (3.0, 3.0)]);
        let err = Reducer::new(2).reduce(&table).unwrap_err();
        assert!(matches!(err, CurveError::DegenerateSegment { index: 1 }));
    }

    #[test]
    fn sweep_at_zero_keeps_everything_when_no_slopes_repeat() {
        let table = table(&[(0.0, 0.0), (1.0, 1.0), (2.0, 3.0), (3.0, 6.0)]);
        let kept = sweep(&table, 0.0).unwrap();
        assert_eq!(kept, table.points());
    }

    #[test]
    fn reduction_keeps_an_ordered_subsequence_with_both_endpoints() {
        let table = convex();
        let original = table.points().to_vec();
        let reduction = Reducer::with_increment(12, 1.5).reduce(&table).unwrap();

        assert!(reduction.table.len() <= 12);
        assert_eq!(reduction.table.points()[0], original[0]);
        assert_eq!(
            *reduction.table.points().last().unwrap(),
            *original.last().unwrap()
        );

        let mut cursor = 0;
        for kept in reduction.table.points() {
            let offset = original[cursor..]
                .iter()
                .position(|p| p == kept)
                .expect("kept breakpoint not found in original order");
            cursor += offset + 1;
        }

        for pair in reduction.table.points().windows(2) {
            assert!(pair[0].sensor_unit <= pair[1].sensor_unit);
        }
    }

    #[test]
    fn candidate_size_never_grows_as_tolerance_rises() {
        let table = convex();
        let mut last = usize::MAX;
        for step in 0..12 {
            let size = sweep(&table, step as f64 * 0.8).unwrap().len();
            assert!(size <= last, "sweep got bigger as tolerance rose");
            last = size;
        }
    }

    #[test]
    fn pass_budget_is_enforced() {
        let reducer = Reducer {
            target: 2,
            increment: 0.4,
            max_passes: 1,
        };
        let err = reducer.reduce(&convex()).unwrap_err();
        assert!(matches!(
            err,
            CurveError::MaxPassesExceeded { passes: 1, .. }
        ));
    }

    #[test]
    fn opposite_bends_add_their_magnitudes() {
        assert_eq!(deviation(2.0, 3.0), 1.0);
        assert_eq!(deviation(-2.0, -3.0), 1.0);
        assert_eq!(deviation(2.0, -3.0), 5.0);
        assert_eq!(deviation(0.0, 0.0), 0.0);
        // A single flat section lands in the opposite-sign branch, where
        // both formulas coincide.
        assert_eq!(deviation(0.0, 4.0), 4.0);
        assert_eq!(deviation(-4.0, 0.0), 4.0);
    }
}

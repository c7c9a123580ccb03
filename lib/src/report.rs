use std::io::Write;

use serde::Serialize;
use tabwriter::TabWriter;

use crate::reduce::deviation;
use crate::table::chord_slope;
use crate::{Coefficient, Curve, CurveError, DataFormat, TempUnit};

/// Identity and shape statistics for a curve, ready for rendering.
#[derive(Debug, Serialize)]
pub struct CurveSummary {
    pub sensor_model: String,
    pub serial_number: String,
    pub data_format: DataFormat,
    pub coefficient: Coefficient,
    pub unit: TempUnit,
    pub setpoint_limit: f64,
    pub breakpoints: usize,
    pub declared_breakpoints: u16,
    pub sensor_unit_min: f64,
    pub sensor_unit_max: f64,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub slope_min: f64,
    pub slope_max: f64,
    pub max_deviation: f64,
    pub max_deviation_index: usize,
}

impl CurveSummary {
    pub fn of(curve: &Curve) -> Result<CurveSummary, CurveError> {
        let points = curve.table.points();
        if points.len() < 3 {
            return Err(CurveError::InsufficientPoints {
                count: points.len(),
            });
        }

        let mut slopes = Vec::with_capacity(points.len() - 1);
        for i in 0..points.len() - 1 {
            slopes.push(chord_slope(points, i, i + 1)?);
        }

        let (mut slope_min, mut slope_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &slope in &slopes {
            slope_min = slope_min.min(slope);
            slope_max = slope_max.max(slope);
        }

        let (mut max_deviation, mut max_deviation_index) = (0.0, 1);
        for i in 1..slopes.len() {
            let d = deviation(slopes[i - 1], slopes[i]);
            if d > max_deviation {
                max_deviation = d;
                max_deviation_index = i;
            }
        }

        let (mut temperature_min, mut temperature_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for point in points {
            temperature_min = temperature_min.min(point.temperature);
            temperature_max = temperature_max.max(point.temperature);
        }

        Ok(CurveSummary {
            sensor_model: curve.header.sensor_model.clone(),
            serial_number: curve.header.serial_number.clone(),
            data_format: curve.header.data_format,
            coefficient: curve.header.coefficient,
            unit: curve.header.unit,
            setpoint_limit: curve.header.setpoint_limit,
            breakpoints: points.len(),
            declared_breakpoints: curve.header.breakpoint_count,
            sensor_unit_min: points[0].sensor_unit,
            sensor_unit_max: points[points.len() - 1].sensor_unit,
            temperature_min,
            temperature_max,
            slope_min,
            slope_max,
            max_deviation,
            max_deviation_index,
        })
    }
}

pub fn report_text(summary: &CurveSummary, w: &mut dyn Write) -> Result<(), CurveError> {
    let mut tw = TabWriter::new(w);
    write!(
        tw,
        "Sensor\t[model, serial]\t{}, {}\n\
         Format\t[data, unit, coefficient]\t{}, {}, {}\n\
         Limit\t[setpoint]\t{:.3}\n\
         Breakpoints\t[actual, declared]\t{}, {}\n\
         Sensor Units\t[min, max]\t{:.6}, {:.6}\n\
         Temperatures\t[min, max]\t{:.6}, {:.6}\n\
         Slopes\t[min, max]\t{:.6}, {:.6}\n\
         Sharpest Bend\t[deviation, index]\t{:.6}, {}\n",
        summary.sensor_model,
        summary.serial_number,
        summary.data_format,
        summary.unit,
        summary.coefficient,
        summary.setpoint_limit,
        summary.breakpoints,
        summary.declared_breakpoints,
        summary.sensor_unit_min,
        summary.sensor_unit_max,
        summary.temperature_min,
        summary.temperature_max,
        summary.slope_min,
        summary.slope_max,
        summary.max_deviation,
        summary.max_deviation_index,
    )?;
    tw.flush()?;
    Ok(())
}

pub fn report_json(summary: &CurveSummary, w: &mut dyn Write) -> Result<(), CurveError> {
    serde_json::to_writer(&mut *w, summary)?;
    w.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Breakpoint, BreakpointTable, CurveHeader};

    fn sample() -> Curve {
        let table = BreakpointTable::build(vec![
            Breakpoint::new(0.0, 0.0),
            Breakpoint::new(1.0, 2.0),
            Breakpoint::new(2.0, 2.0),
            Breakpoint::new(3.0, 0.0),
        ])
        .unwrap();
        Curve {
            header: CurveHeader {
                sensor_model: "DT-670".to_string(),
                breakpoint_count: 4,
                ..CurveHeader::default()
            },
            table,
        }
    }

    #[test]
    fn summary_measures_slopes_and_the_sharpest_bend() {
        let summary = CurveSummary::of(&sample()).unwrap();
        assert_eq!(summary.breakpoints, 4);
        assert_eq!(summary.slope_min, -2.0);
        assert_eq!(summary.slope_max, 2.0);
        // Slopes run 2, 0, -2: both bends deviate by 2, the first wins.
        assert_eq!(summary.max_deviation, 2.0);
        assert_eq!(summary.max_deviation_index, 1);
        assert_eq!(summary.sensor_unit_min, 0.0);
        assert_eq!(summary.sensor_unit_max, 3.0);
        assert_eq!(summary.temperature_min, 0.0);
        assert_eq!(summary.temperature_max, 2.0);
    }

    #[test]
    fn text_report_renders_every_row() {
        let summary = CurveSummary::of(&sample()).unwrap();
        let mut out = Vec::new();
        report_text(&summary, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("DT-670"));
        assert!(text.contains("Breakpoints"));
        assert!(text.contains("Sharpest Bend"));
    }

    #[test]
    fn json_report_is_one_line() {
        let summary = CurveSummary::of(&sample()).unwrap();
        let mut out = Vec::new();
        report_json(&summary, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert!(text.contains("\"max_deviation\":2.0"));
    }
}

use thiserror::Error;

/// Everything that can go wrong while decoding, validating or reshaping a
/// calibration curve.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("sensor units must be ascending: breakpoint {index} ({sensor_unit}) is below its predecessor")]
    NonMonotonicInput { index: usize, sensor_unit: f64 },

    #[error("curve has {count} breakpoints, at least 3 are needed")]
    InsufficientPoints { count: usize },

    #[error("zero-width section at breakpoint {index}: adjacent sensor units are equal")]
    DegenerateSegment { index: usize },

    #[error("breakpoint index {index} out of range for a table of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("tolerance saturated at {tolerance}: stuck at {size} breakpoints, target was {target}")]
    ToleranceSaturated {
        tolerance: f64,
        size: usize,
        target: usize,
    },

    #[error("target of {target} breakpoints not reached within {passes} passes")]
    MaxPassesExceeded { target: usize, passes: usize },

    #[error("malformed breakpoint on line {line}: {text:?}")]
    MalformedBreakpoint { line: usize, text: String },

    #[error("malformed header value on line {line}: {text:?}")]
    MalformedHeader { line: usize, text: String },

    #[error("unknown temperature unit {0:?}")]
    UnknownUnit(String),

    #[error("unknown data format code {0}")]
    UnknownDataFormat(u16),

    #[error("unknown temperature coefficient code {0}")]
    UnknownCoefficient(u16),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

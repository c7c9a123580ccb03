use std::fmt;
use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::table::{Breakpoint, BreakpointTable};
use crate::CurveError;

/// Measurement encoding of a curve's sensor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    VoltsPerKelvin,
    OhmsPerKelvin,
    LogOhmsPerKelvin,
}

impl DataFormat {
    pub fn code(self) -> u16 {
        match self {
            DataFormat::VoltsPerKelvin => 2,
            DataFormat::OhmsPerKelvin => 3,
            DataFormat::LogOhmsPerKelvin => 4,
        }
    }

    pub fn from_code(code: u16) -> Result<Self, CurveError> {
        match code {
            2 => Ok(DataFormat::VoltsPerKelvin),
            3 => Ok(DataFormat::OhmsPerKelvin),
            4 => Ok(DataFormat::LogOhmsPerKelvin),
            other => Err(CurveError::UnknownDataFormat(other)),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DataFormat::VoltsPerKelvin => "volts/kelvin",
            DataFormat::OhmsPerKelvin => "ohms/kelvin",
            DataFormat::LogOhmsPerKelvin => "log-ohms/kelvin",
        })
    }
}

/// Whether temperature falls or rises with increasing sensor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coefficient {
    Negative,
    Positive,
}

impl Coefficient {
    pub fn code(self) -> u16 {
        match self {
            Coefficient::Negative => 1,
            Coefficient::Positive => 2,
        }
    }

    pub fn from_code(code: u16) -> Result<Self, CurveError> {
        match code {
            1 => Ok(Coefficient::Negative),
            2 => Ok(Coefficient::Positive),
            other => Err(CurveError::UnknownCoefficient(other)),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Coefficient::Negative => "negative",
            Coefficient::Positive => "positive",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempUnit {
    Kelvin,
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    pub fn letter(self) -> char {
        match self {
            TempUnit::Kelvin => 'K',
            TempUnit::Celsius => 'C',
            TempUnit::Fahrenheit => 'F',
        }
    }

    /// Accepts a bare letter as well as the annotated forms curve files
    /// carry, e.g. `(K)` or `Kelvin`.
    pub fn parse(value: &str) -> Result<Self, CurveError> {
        let letter = value
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase());
        match letter {
            Some('K') => Ok(TempUnit::Kelvin),
            Some('C') => Ok(TempUnit::Celsius),
            Some('F') => Ok(TempUnit::Fahrenheit),
            _ => Err(CurveError::UnknownUnit(value.trim().to_string())),
        }
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The `key: value` metadata block preceding a curve's data section.
/// The algorithms never interpret these fields; they ride along so a
/// processed curve can be written back with its identity intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveHeader {
    pub sensor_model: String,
    pub serial_number: String,
    pub data_format: DataFormat,
    pub setpoint_limit: f64,
    pub coefficient: Coefficient,
    pub breakpoint_count: u16,
    pub unit: TempUnit,
}

impl Default for CurveHeader {
    fn default() -> Self {
        CurveHeader {
            sensor_model: String::new(),
            serial_number: String::new(),
            data_format: DataFormat::VoltsPerKelvin,
            setpoint_limit: 0.0,
            coefficient: Coefficient::Negative,
            breakpoint_count: 0,
            unit: TempUnit::Kelvin,
        }
    }
}

/// A calibration curve: header metadata plus its breakpoint table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub header: CurveHeader,
    pub table: BreakpointTable,
}

impl Curve {
    /// Copy of this curve around a new table, with the header's breakpoint
    /// count synced to it.
    pub fn with_table(&self, table: BreakpointTable) -> Curve {
        let mut header = self.header.clone();
        header.breakpoint_count = clamped_count(table.len());
        Curve { header, table }
    }
}

fn clamped_count(len: usize) -> u16 {
    len.min(u16::MAX as usize) as u16
}

/// Reads and writes curves in one on-disk representation.
pub trait Codec {
    fn encode<W: Write>(&self, writer: &mut W, curve: &Curve) -> Result<(), CurveError>;
    fn decode<R: BufRead>(&self, reader: &mut R) -> Result<Curve, CurveError>;
}

/// The device text layout: `#` comments, `key: value` header lines, then
/// `index x y` data lines.
pub struct TextCodec;

impl Codec for TextCodec {
    fn encode<W: Write>(&self, writer: &mut W, curve: &Curve) -> Result<(), CurveError> {
        let header = &curve.header;
        writeln!(writer, "# Calibration curve breakpoints")?;
        writeln!(writer)?;
        writeln!(writer, "Sensor Model: {}", header.sensor_model)?;
        writeln!(writer, "Serial Number: {}", header.serial_number)?;
        writeln!(writer, "Data Format: {}", header.data_format.code())?;
        writeln!(writer, "Setpoint Limit: {:.6}", header.setpoint_limit)?;
        writeln!(writer, "Temperature Coefficient: {}", header.coefficient.code())?;
        writeln!(writer, "Number of Breakpoints: {}", curve.table.len())?;
        writeln!(writer, "Temperature Unit: {}", header.unit.letter())?;
        writeln!(writer)?;
        for (i, point) in curve.table.iter().enumerate() {
            writeln!(
                writer,
                "{}\t{:.6}\t{:.6}",
                i + 1,
                point.sensor_unit,
                point.temperature
            )?;
        }
        Ok(())
    }

    fn decode<R: BufRead>(&self, reader: &mut R) -> Result<Curve, CurveError> {
        let mut header = CurveHeader::default();
        let mut declared = None;
        let mut points = Vec::new();
        let mut in_data = false;

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = number + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if !in_data {
                if let Some((key, value)) = trimmed.split_once(':') {
                    parse_header_field(&mut header, &mut declared, key, value, line_no, trimmed)?;
                    continue;
                }
            }
            points.push(parse_breakpoint(trimmed, line_no)?);
            in_data = true;
        }

        header.breakpoint_count = declared.unwrap_or_else(|| clamped_count(points.len()));
        let table = BreakpointTable::build(points)?;
        Ok(Curve { header, table })
    }
}

/// Known header keys are matched by fragment so annotated labels like
/// `SetPoint Limit` or `Temperature coefficient` all land; unknown keys
/// are ignored. Values keep only their first token, dropping annotations
/// like `(Kelvin)`.
fn parse_header_field(
    header: &mut CurveHeader,
    declared: &mut Option<u16>,
    key: &str,
    value: &str,
    line: usize,
    text: &str,
) -> Result<(), CurveError> {
    let key = key.trim().to_ascii_lowercase();
    let first = value.split_whitespace().next().unwrap_or("");
    let malformed = || CurveError::MalformedHeader {
        line,
        text: text.to_string(),
    };

    if key.contains("model") {
        header.sensor_model = first.to_string();
    } else if key.contains("serial") {
        header.serial_number = first.to_string();
    } else if key.contains("breakpoints") {
        *declared = Some(first.parse().map_err(|_| malformed())?);
    } else if key.contains("format") {
        let code = first.parse().map_err(|_| malformed())?;
        header.data_format = DataFormat::from_code(code)?;
    } else if key.contains("limit") {
        header.setpoint_limit = first.parse().map_err(|_| malformed())?;
    } else if key.contains("coefficient") {
        let code = first.parse().map_err(|_| malformed())?;
        header.coefficient = Coefficient::from_code(code)?;
    } else if key.contains("unit") {
        header.unit = TempUnit::parse(value)?;
    }
    Ok(())
}

/// Data lines carry `x y` or `seq x y`; the sequence number is ignored.
fn parse_breakpoint(text: &str, line: usize) -> Result<Breakpoint, CurveError> {
    let malformed = || CurveError::MalformedBreakpoint {
        line,
        text: text.to_string(),
    };
    let fields: Vec<&str> = text.split_whitespace().collect();
    let (x, y) = match fields.as_slice() {
        [x, y] => (x, y),
        [_, x, y] => (x, y),
        _ => return Err(malformed()),
    };
    Ok(Breakpoint::new(
        x.parse().map_err(|_| malformed())?,
        y.parse().map_err(|_| malformed())?,
    ))
}

pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<W: Write>(&self, writer: &mut W, curve: &Curve) -> Result<(), CurveError> {
        serde_json::to_writer(&mut *writer, curve)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn decode<R: BufRead>(&self, reader: &mut R) -> Result<Curve, CurveError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvBreakpoint {
    index: usize,
    sensor_unit: f64,
    temperature: f64,
}

/// Bare breakpoint records; decoding yields a curve with a default header.
pub struct CsvCodec;

impl Codec for CsvCodec {
    fn encode<W: Write>(&self, writer: &mut W, curve: &Curve) -> Result<(), CurveError> {
        let mut w = csv::Writer::from_writer(writer);
        for (i, point) in curve.table.iter().enumerate() {
            w.serialize(CsvBreakpoint {
                index: i + 1,
                sensor_unit: point.sensor_unit,
                temperature: point.temperature,
            })?;
        }
        w.flush()?;
        Ok(())
    }

    fn decode<R: BufRead>(&self, reader: &mut R) -> Result<Curve, CurveError> {
        let mut r = csv::Reader::from_reader(reader);
        let mut points = Vec::new();
        for row in r.deserialize() {
            let row: CsvBreakpoint = row?;
            points.push(Breakpoint::new(row.sensor_unit, row.temperature));
        }
        let table = BreakpointTable::build(points)?;
        Ok(Curve {
            header: CurveHeader {
                breakpoint_count: clamped_count(table.len()),
                ..CurveHeader::default()
            },
            table,
        })
    }
}

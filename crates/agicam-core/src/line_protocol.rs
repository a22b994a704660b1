use std::fmt::{self, Write as _};
use std::str::FromStr;

use agicam_parser::Statistic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::point::PointRecord;

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("field '{field}' of {measurement}/{plot} is not finite ({value})")]
    NonFiniteField {
        measurement: &'static str,
        plot: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("timestamp {timestamp} cannot be expressed in {precision}")]
    TimestampOutOfRange {
        timestamp: DateTime<Utc>,
        precision: Precision,
    },
}

/// Timestamp precision of encoded lines, matching the `precision` write parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    #[default]
    #[serde(rename = "ns")]
    Nanoseconds,
    #[serde(rename = "us")]
    Microseconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "us",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
        }
    }

    pub fn timestamp(&self, instant: DateTime<Utc>) -> Result<i64, EncodeError> {
        match self {
            Precision::Nanoseconds => {
                instant
                    .timestamp_nanos_opt()
                    .ok_or(EncodeError::TimestampOutOfRange {
                        timestamp: instant,
                        precision: *self,
                    })
            }
            Precision::Microseconds => Ok(instant.timestamp_micros()),
            Precision::Milliseconds => Ok(instant.timestamp_millis()),
            Precision::Seconds => Ok(instant.timestamp()),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ns" | "n" => Ok(Precision::Nanoseconds),
            "us" | "u" => Ok(Precision::Microseconds),
            "ms" => Ok(Precision::Milliseconds),
            "s" => Ok(Precision::Seconds),
            other => Err(format!("unknown precision '{other}'")),
        }
    }
}

/// Encodes one point as a line of InfluxDB line protocol, without a trailing newline.
pub fn encode_line(point: &PointRecord, precision: Precision) -> Result<String, EncodeError> {
    let mut line = String::with_capacity(160);

    escape_into(&mut line, point.measurement(), &[',', ' ']);
    line.push_str(",plot=");
    escape_into(&mut line, point.plot(), &[',', '=', ' ']);

    // always a string field, so the field type never varies between points
    line.push_str(" timepi=\"");
    for ch in point.fields.timepi.text().chars() {
        if ch == '"' || ch == '\\' {
            line.push('\\');
        }
        line.push(ch);
    }
    line.push('"');

    for statistic in Statistic::ALL {
        let value = point.fields.value(statistic);
        if !value.is_finite() {
            return Err(EncodeError::NonFiniteField {
                measurement: point.measurement(),
                plot: point.plot(),
                field: statistic.canonical_name(),
                value,
            });
        }
        // writing to a String cannot fail
        let _ = write!(line, ",{}={}", statistic.canonical_name(), value);
    }

    let _ = write!(line, " {}", precision.timestamp(point.emitted_at)?);
    Ok(line)
}

/// Encodes a batch, one line per point, each terminated by `\n`.
pub fn encode_lines(points: &[PointRecord], precision: Precision) -> Result<String, EncodeError> {
    let mut body = String::new();
    for point in points {
        body.push_str(&encode_line(point, precision)?);
        body.push('\n');
    }
    Ok(body)
}

fn escape_into(out: &mut String, value: &str, special: &[char]) {
    for ch in value.chars() {
        if ch == '\\' || special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}

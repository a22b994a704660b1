use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::{points_to_dataframe, write_csv, write_parquet};
use crate::line_protocol::{encode_lines, EncodeError, Precision};
use crate::point::PointRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// JSON array of `{measurement, fields, tags, timestamp}` objects.
    #[default]
    Json,
    LineProtocol,
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::LineProtocol => "line-protocol",
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }

    /// Binary formats should not be written to an interactive terminal.
    pub fn is_binary(&self) -> bool {
        matches!(self, OutputFormat::Parquet)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "line-protocol" | "line" | "lp" => Ok(OutputFormat::LineProtocol),
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to encode line protocol: {0}")]
    Encode(#[from] EncodeError),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
}

/// Writes a batch of points in `format`. `precision` only applies to line protocol.
pub fn write_points<W: Write>(
    points: &[PointRecord],
    format: OutputFormat,
    precision: Precision,
    mut writer: W,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, points)?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::LineProtocol => {
            // encode the whole batch first so a bad point leaves no partial output
            let body = encode_lines(points, precision)?;
            writer.write_all(body.as_bytes())?;
        }
        OutputFormat::Csv => {
            let mut df = points_to_dataframe(points)?;
            write_csv(&mut df, &mut writer)?;
        }
        OutputFormat::Parquet => {
            let mut df = points_to_dataframe(points)?;
            write_parquet(&mut df, &mut writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

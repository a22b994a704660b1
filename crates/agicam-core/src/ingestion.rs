use std::collections::HashSet;

use agicam_parser::{parse_reading, ReadingError};
use blake3::Hasher;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::flatten::{flatten_with_clock, FlattenError};
use crate::point::PointRecord;

#[derive(Debug)]
pub struct ReadingInput<'a> {
    pub label: &'a str,
    pub contents: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    Duplicate,
    Flattened,
    Failed,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Duplicate => "duplicate",
            ReadingStatus::Flattened => "flattened",
            ReadingStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("contents were not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Decode(#[from] ReadingError),
    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

#[derive(Debug)]
pub struct ReadingReport {
    pub label: String,
    pub hash: String,
    pub status: ReadingStatus,
    pub points: usize,
    pub error: Option<IngestError>,
}

#[derive(Debug)]
pub struct FlattenedReading {
    pub label: String,
    pub hash: String,
    pub points: Vec<PointRecord>,
}

#[derive(Debug, Default)]
pub struct IngestionBatch {
    pub flattened: Vec<FlattenedReading>,
    pub reports: Vec<ReadingReport>,
}

impl IngestionBatch {
    pub fn points(&self) -> impl Iterator<Item = &PointRecord> {
        self.flattened.iter().flat_map(|reading| reading.points.iter())
    }

    pub fn into_points(self) -> Vec<PointRecord> {
        self.flattened
            .into_iter()
            .flat_map(|reading| reading.points)
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReadingReport> {
        self.reports
            .iter()
            .filter(|report| report.status == ReadingStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Decodes and flattens each input in order.
///
/// A failing input is reported and skipped; it never contributes points.
/// Inputs whose contents hash equal to an earlier input in the batch are
/// reported as duplicates and skipped.
pub fn ingest_readings(inputs: &[ReadingInput<'_>], clock: &dyn Clock) -> IngestionBatch {
    let mut batch = IngestionBatch::default();
    let mut seen = HashSet::new();

    for input in inputs {
        let hash = compute_hash(input.contents);
        if !seen.insert(hash.clone()) {
            debug!(label = input.label, hash = %hash, "skipping duplicate reading");
            batch.reports.push(ReadingReport {
                label: input.label.to_string(),
                hash,
                status: ReadingStatus::Duplicate,
                points: 0,
                error: None,
            });
            continue;
        }

        match flatten_contents(input.contents, clock) {
            Ok(points) => {
                info!(label = input.label, hash = %hash, points = points.len(), "flattened reading");
                batch.reports.push(ReadingReport {
                    label: input.label.to_string(),
                    hash: hash.clone(),
                    status: ReadingStatus::Flattened,
                    points: points.len(),
                    error: None,
                });
                batch.flattened.push(FlattenedReading {
                    label: input.label.to_string(),
                    hash,
                    points,
                });
            }
            Err(err) => {
                warn!(label = input.label, hash = %hash, error = %err, "reading rejected");
                batch.reports.push(ReadingReport {
                    label: input.label.to_string(),
                    hash,
                    status: ReadingStatus::Failed,
                    points: 0,
                    error: Some(err),
                });
            }
        }
    }

    batch
}

fn flatten_contents(contents: &[u8], clock: &dyn Clock) -> Result<Vec<PointRecord>, IngestError> {
    let text = std::str::from_utf8(contents)?;
    let reading = parse_reading(text)?;
    Ok(flatten_with_clock(&reading, clock)?)
}

pub fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}

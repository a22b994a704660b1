use agicam_parser::schema::{expected_points, CHANNELS, REPLICATES};
use agicam_parser::Reading;
use thiserror::Error;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::point::PointRecord;

#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("reading is missing field '{path}'")]
    MissingField { path: String },
}

/// Converts a reading into one point per (replicate, channel), replicate-major.
///
/// Every replicate and channel of the schema must be present; the first gap
/// aborts the call and no points are returned.
pub fn flatten(reading: &Reading) -> Result<Vec<PointRecord>, FlattenError> {
    flatten_with_clock(reading, &SystemClock)
}

/// Like [`flatten`], with the emission time of each point taken from `clock`.
/// The clock is read once per point.
pub fn flatten_with_clock(
    reading: &Reading,
    clock: &dyn Clock,
) -> Result<Vec<PointRecord>, FlattenError> {
    let mut points = Vec::with_capacity(expected_points());

    for replicate in REPLICATES {
        let channels = reading
            .replicate(replicate)
            .ok_or_else(|| FlattenError::MissingField {
                path: replicate.to_string(),
            })?;

        for channel in CHANNELS {
            let bundle = channels
                .get(&channel)
                .ok_or_else(|| FlattenError::MissingField {
                    path: format!("{replicate}.{channel}"),
                })?;
            points.push(PointRecord::from_bundle(
                replicate,
                channel,
                bundle,
                clock.now(),
            ));
        }
    }

    debug!(points = points.len(), "flattened reading");
    Ok(points)
}

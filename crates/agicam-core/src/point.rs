use agicam_parser::{CaptureTime, Channel, Replicate, Statistic, StatisticsBundle};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single tagged, timestamped observation in the time-series point model.
///
/// Serializes to the batch shape accepted by InfluxDB writers:
/// `{ measurement, fields, tags, timestamp }`, where `timestamp` is the
/// emission time rather than the capture time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointRecord {
    pub measurement: Channel,
    pub fields: PointFields,
    pub tags: PointTags,
    #[serde(rename = "timestamp")]
    pub emitted_at: DateTime<Utc>,
}

/// Statistics of one bundle; `timepi` carries the camera timestamp unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFields {
    pub timepi: CaptureTime,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub max: f64,
    pub p95: f64,
    pub p90: f64,
    pub p85: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointTags {
    pub plot: Replicate,
}

impl PointRecord {
    pub fn from_bundle(
        replicate: Replicate,
        channel: Channel,
        bundle: &StatisticsBundle,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            measurement: channel,
            fields: PointFields::from(bundle),
            tags: PointTags { plot: replicate },
            emitted_at,
        }
    }

    pub fn measurement(&self) -> &'static str {
        self.measurement.as_str()
    }

    pub fn plot(&self) -> &'static str {
        self.tags.plot.plot_label()
    }

    /// True when both points carry the same data, whenever they were emitted.
    pub fn same_observation(&self, other: &PointRecord) -> bool {
        self.measurement == other.measurement
            && self.tags == other.tags
            && self.fields == other.fields
    }
}

impl PointFields {
    pub fn value(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Mean => self.mean,
            Statistic::Median => self.median,
            Statistic::Std => self.std,
            Statistic::Max => self.max,
            Statistic::P95 => self.p95,
            Statistic::P90 => self.p90,
            Statistic::P85 => self.p85,
        }
    }
}

impl From<&StatisticsBundle> for PointFields {
    fn from(bundle: &StatisticsBundle) -> Self {
        Self {
            timepi: bundle.timestamp.clone(),
            mean: bundle.mean,
            median: bundle.median,
            std: bundle.std,
            max: bundle.max,
            p95: bundle.p95,
            p90: bundle.p90,
            p85: bundle.p85,
        }
    }
}

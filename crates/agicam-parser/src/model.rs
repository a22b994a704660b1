use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the five parallel plot replicates photographed per capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Replicate {
    #[serde(rename = "rep1")]
    Rep1,
    #[serde(rename = "rep2")]
    Rep2,
    #[serde(rename = "rep3")]
    Rep3,
    #[serde(rename = "rep4")]
    Rep4,
    #[serde(rename = "rep5")]
    Rep5,
}

impl Replicate {
    pub const ALL: [Replicate; 5] = [
        Replicate::Rep1,
        Replicate::Rep2,
        Replicate::Rep3,
        Replicate::Rep4,
        Replicate::Rep5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Replicate::Rep1 => "rep1",
            Replicate::Rep2 => "rep2",
            Replicate::Rep3 => "rep3",
            Replicate::Rep4 => "rep4",
            Replicate::Rep5 => "rep5",
        }
    }

    /// 1-based position in capture order.
    pub fn index(&self) -> usize {
        match self {
            Replicate::Rep1 => 1,
            Replicate::Rep2 => 2,
            Replicate::Rep3 => 3,
            Replicate::Rep4 => 4,
            Replicate::Rep5 => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Label written to the `plot` tag of every point derived from this replicate.
    pub fn plot_label(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Replicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Replicate {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|replicate| replicate.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown replicate '{trimmed}'"))
    }
}

/// Vegetation-index channel recorded for each replicate. The wire names carry a
/// `_1` suffix (`vr1_1` .. `vr4_1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "vr1_1")]
    Vr1,
    #[serde(rename = "vr2_1")]
    Vr2,
    #[serde(rename = "vr3_1")]
    Vr3,
    #[serde(rename = "vr4_1")]
    Vr4,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Vr1, Channel::Vr2, Channel::Vr3, Channel::Vr4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Vr1 => "vr1_1",
            Channel::Vr2 => "vr2_1",
            Channel::Vr3 => "vr3_1",
            Channel::Vr4 => "vr4_1",
        }
    }

    /// 1-based position within a replicate.
    pub fn index(&self) -> usize {
        match self {
            Channel::Vr1 => 1,
            Channel::Vr2 => 2,
            Channel::Vr3 => 3,
            Channel::Vr4 => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Channel {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|channel| channel.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown channel '{trimmed}'"))
    }
}

/// Numeric statistics carried by every bundle, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Mean,
    Median,
    Std,
    Max,
    P95,
    P90,
    P85,
}

impl Statistic {
    pub const ALL: [Statistic; 7] = [
        Statistic::Mean,
        Statistic::Median,
        Statistic::Std,
        Statistic::Max,
        Statistic::P95,
        Statistic::P90,
        Statistic::P85,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Std => "std",
            Statistic::Max => "max",
            Statistic::P95 => "p95",
            Statistic::P90 => "p90",
            Statistic::P85 => "p85",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Timestamp written by the camera, carried downstream exactly as received.
///
/// The value is not required to be a string or to follow any format. When it
/// is a recognised date-time (or an integer epoch in seconds) the parsed
/// instant is kept alongside for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct CaptureTime {
    raw: Value,
    instant: Option<NaiveDateTime>,
}

impl CaptureTime {
    /// Format used by the Raspberry Pi capture script, e.g. `16-02-2022_10-30-00`.
    pub const CAMERA_FORMAT: &'static str = "%d-%m-%Y_%H-%M-%S";

    pub fn new(raw: impl Into<Value>) -> Self {
        let raw = raw.into();
        let instant = match &raw {
            Value::String(text) => parse_instant(text),
            Value::Number(number) => number
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.naive_utc()),
            _ => None,
        };
        Self { raw, instant }
    }

    pub fn from_naive(instant: NaiveDateTime) -> Self {
        Self {
            raw: Value::String(instant.format(Self::CAMERA_FORMAT).to_string()),
            instant: Some(instant),
        }
    }

    /// The value as it appeared in the reading.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The raw text when the camera wrote a string.
    pub fn as_str(&self) -> Option<&str> {
        self.raw.as_str()
    }

    /// String contents, or the JSON text of any other value.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.raw {
            Value::String(text) => Cow::Borrowed(text),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn instant(&self) -> Option<NaiveDateTime> {
        self.instant
    }
}

fn parse_instant(value: &str) -> Option<NaiveDateTime> {
    static FORMATS: &[&str] = &[
        CaptureTime::CAMERA_FORMAT,
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    let trimmed = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

impl fmt::Display for CaptureTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<Value> for CaptureTime {
    fn from(value: Value) -> Self {
        CaptureTime::new(value)
    }
}

impl From<&str> for CaptureTime {
    fn from(value: &str) -> Self {
        CaptureTime::new(value)
    }
}

impl From<CaptureTime> for Value {
    fn from(value: CaptureTime) -> Self {
        value.raw
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    pub timestamp: CaptureTime,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub max: f64,
    pub p95: f64,
    pub p90: f64,
    pub p85: f64,
}

impl StatisticsBundle {
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

    pub(crate) fn set(&mut self, statistic: Statistic, value: f64) {
        let slot = match statistic {
            Statistic::Mean => &mut self.mean,
            Statistic::Median => &mut self.median,
            Statistic::Std => &mut self.std,
            Statistic::Max => &mut self.max,
            Statistic::P95 => &mut self.p95,
            Statistic::P90 => &mut self.p90,
            Statistic::P85 => &mut self.p85,
        };
        *slot = value;
    }

    pub(crate) fn empty(timestamp: CaptureTime) -> Self {
        Self {
            timestamp,
            mean: 0.0,
            median: 0.0,
            std: 0.0,
            max: 0.0,
            p95: 0.0,
            p90: 0.0,
            p85: 0.0,
        }
    }
}

pub type ChannelReadings = BTreeMap<Channel, StatisticsBundle>;

/// One capture cycle: statistics per replicate and channel.
///
/// A reading can be incomplete. Completeness is checked when the reading is
/// flattened, not when it is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Reading {
    replicates: BTreeMap<Replicate, ChannelReadings>,
}

impl Reading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        replicate: Replicate,
        channel: Channel,
        bundle: StatisticsBundle,
    ) -> Option<StatisticsBundle> {
        self.replicates
            .entry(replicate)
            .or_default()
            .insert(channel, bundle)
    }

    /// Registers a replicate with no channels yet.
    pub fn insert_replicate(&mut self, replicate: Replicate) {
        self.replicates.entry(replicate).or_default();
    }

    pub fn get(&self, replicate: Replicate, channel: Channel) -> Option<&StatisticsBundle> {
        self.replicates
            .get(&replicate)
            .and_then(|channels| channels.get(&channel))
    }

    pub fn replicate(&self, replicate: Replicate) -> Option<&ChannelReadings> {
        self.replicates.get(&replicate)
    }

    pub fn remove_replicate(&mut self, replicate: Replicate) -> Option<ChannelReadings> {
        self.replicates.remove(&replicate)
    }

    pub fn remove(&mut self, replicate: Replicate, channel: Channel) -> Option<StatisticsBundle> {
        self.replicates
            .get_mut(&replicate)
            .and_then(|channels| channels.remove(&channel))
    }

    /// Number of bundles held across all replicates.
    pub fn len(&self) -> usize {
        self.replicates.values().map(BTreeMap::len).sum()
    }

    /// True when no bundle is held, even if replicates were registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paths of schema entries absent from this reading, in flatten order.
    /// A missing replicate is reported once, not once per channel.
    pub fn missing_paths(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for replicate in Replicate::ALL {
            match self.replicates.get(&replicate) {
                None => missing.push(replicate.to_string()),
                Some(channels) => {
                    for channel in Channel::ALL {
                        if !channels.contains_key(&channel) {
                            missing.push(format!("{replicate}.{channel}"));
                        }
                    }
                }
            }
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_paths().is_empty()
    }
}

use crate::model::{Channel, Replicate, Statistic};

pub const REPLICATES: [Replicate; 5] = Replicate::ALL;

pub const CHANNELS: [Channel; 4] = Channel::ALL;

pub const STATISTICS: [Statistic; 7] = Statistic::ALL;

/// Keys of a statistics bundle on the wire.
pub const STATISTIC_FIELDS: [&str; 8] = [
    "timestamp",
    "mean",
    "median",
    "std",
    "max",
    "p95",
    "p90",
    "p85",
];

pub const TIMESTAMP_FIELD: &str = "timestamp";

pub const fn expected_points() -> usize {
    REPLICATES.len() * CHANNELS.len()
}

/// Position of a (replicate, channel) pair in flatten order.
pub fn point_index(replicate: Replicate, channel: Channel) -> usize {
    CHANNELS.len() * (replicate.index() - 1) + (channel.index() - 1)
}

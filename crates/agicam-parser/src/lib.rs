pub mod decode;
pub mod errors;
pub mod model;
pub mod schema;

pub use decode::parse_reading;
pub use errors::ReadingError;
pub use model::{
    CaptureTime, Channel, ChannelReadings, Reading, Replicate, Statistic, StatisticsBundle,
};

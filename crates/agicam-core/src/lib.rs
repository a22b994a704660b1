pub mod clock;
pub mod config;
pub mod flatten;
pub mod frame;
pub mod ingestion;
pub mod line_protocol;
pub mod output;
pub mod point;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, ConfigError, OutputConfig};
pub use flatten::{flatten, flatten_with_clock, FlattenError};
pub use line_protocol::{encode_line, encode_lines, EncodeError, Precision};
pub use output::{write_points, OutputError, OutputFormat};
pub use point::{PointFields, PointRecord, PointTags};

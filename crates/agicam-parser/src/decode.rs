use serde_json::{Map, Value};

use crate::errors::ReadingError;
use crate::model::{CaptureTime, Reading, StatisticsBundle};
use crate::schema::{CHANNELS, REPLICATES, STATISTICS, TIMESTAMP_FIELD};

const ROOT_PATH: &str = "reading";

/// Decodes the JSON document written by the camera (`ndvi.json`).
pub fn parse_reading(content: &str) -> Result<Reading, ReadingError> {
    let value: Value = serde_json::from_str(content)?;
    Reading::from_value(&value)
}

impl Reading {
    /// Builds a reading from an already-parsed JSON value.
    ///
    /// Keys outside the replicate/channel schema are ignored. Absent replicates
    /// or channels leave the reading incomplete; a bundle that is present must
    /// carry every statistic.
    pub fn from_value(value: &Value) -> Result<Self, ReadingError> {
        let root = expect_object(value, ROOT_PATH)?;
        let mut reading = Reading::new();

        for replicate in REPLICATES {
            let Some(replicate_value) = root.get(replicate.as_str()) else {
                continue;
            };
            let channels = expect_object(replicate_value, replicate.as_str())?;
            reading.insert_replicate(replicate);

            for channel in CHANNELS {
                let Some(bundle_value) = channels.get(channel.as_str()) else {
                    continue;
                };
                let path = format!("{replicate}.{channel}");
                let bundle = decode_bundle(bundle_value, &path)?;
                reading.insert(replicate, channel, bundle);
            }
        }

        Ok(reading)
    }
}

fn decode_bundle(value: &Value, path: &str) -> Result<StatisticsBundle, ReadingError> {
    let fields = expect_object(value, path)?;

    // Only presence is checked; the value is passed through untouched.
    let timestamp = match fields.get(TIMESTAMP_FIELD) {
        Some(raw) => CaptureTime::new(raw.clone()),
        None => return Err(ReadingError::missing(format!("{path}.{TIMESTAMP_FIELD}"))),
    };

    let mut bundle = StatisticsBundle::empty(timestamp);
    for statistic in STATISTICS {
        let name = statistic.canonical_name();
        let field_path = format!("{path}.{name}");
        let value = match fields.get(name) {
            None => return Err(ReadingError::missing(field_path)),
            Some(Value::Number(number)) => number.as_f64().ok_or_else(|| {
                ReadingError::invalid(&field_path, format!("{number} is not representable as f64"))
            })?,
            Some(other) => {
                return Err(ReadingError::invalid(
                    field_path,
                    format!("expected number, found {}", json_kind(other)),
                ))
            }
        };
        bundle.set(statistic, value);
    }

    Ok(bundle)
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ReadingError> {
    value.as_object().ok_or_else(|| {
        ReadingError::invalid(path, format!("expected object, found {}", json_kind(value)))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

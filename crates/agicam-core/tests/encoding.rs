use agicam_core::frame::{points_to_dataframe, POINT_COLUMNS};
use agicam_core::{
    encode_line, encode_lines, flatten_with_clock, write_points, EncodeError, FixedClock,
    OutputFormat, PointFields, PointRecord, PointTags, Precision,
};
use agicam_parser::{CaptureTime, Channel, Reading, Replicate, StatisticsBundle};
use chrono::{TimeZone, Utc};

fn sample_point() -> PointRecord {
    PointRecord {
        measurement: Channel::Vr3,
        fields: PointFields {
            timepi: CaptureTime::new("16-02-2022_10-30-00"),
            mean: 1.0,
            median: 1.1,
            std: 0.2,
            max: 2.0,
            p95: 1.9,
            p90: 1.8,
            p85: 1.7,
        },
        tags: PointTags {
            plot: Replicate::Rep2,
        },
        emitted_at: Utc.with_ymd_and_hms(2022, 2, 16, 10, 31, 5).unwrap(),
    }
}

fn complete_reading() -> Reading {
    let mut reading = Reading::new();
    for replicate in Replicate::ALL {
        for channel in Channel::ALL {
            let seed = replicate.index() as f64 + channel.index() as f64 / 10.0;
            reading.insert(
                replicate,
                channel,
                StatisticsBundle {
                    timestamp: CaptureTime::new("16-02-2022_10-30-00"),
                    mean: seed,
                    median: seed,
                    std: 0.01,
                    max: seed + 0.5,
                    p95: seed + 0.4,
                    p90: seed + 0.3,
                    p85: seed + 0.2,
                },
            );
        }
    }
    reading
}

#[test]
fn encodes_point_as_line_protocol() {
    let line = encode_line(&sample_point(), Precision::Nanoseconds).unwrap();
    assert_eq!(
        line,
        "vr3_1,plot=rep2 timepi=\"16-02-2022_10-30-00\",mean=1,median=1.1,std=0.2,max=2,\
         p95=1.9,p90=1.8,p85=1.7 1645007465000000000"
    );
}

#[test]
fn precision_controls_timestamp_units() {
    let point = sample_point();
    let tail = |precision| {
        encode_line(&point, precision)
            .unwrap()
            .rsplit(' ')
            .next()
            .unwrap()
            .to_string()
    };

    assert_eq!(tail(Precision::Microseconds), "1645007465000000");
    assert_eq!(tail(Precision::Milliseconds), "1645007465000");
    assert_eq!(tail(Precision::Seconds), "1645007465");
}

#[test]
fn string_field_quotes_are_escaped() {
    let mut point = sample_point();
    point.fields.timepi = CaptureTime::new("2022-02-16T10:30:00Z");

    let line = encode_line(&point, Precision::Seconds).unwrap();
    assert!(line.contains("timepi=\"2022-02-16T10:30:00Z\""));
}

#[test]
fn non_finite_statistic_is_rejected() {
    let mut point = sample_point();
    point.fields.p95 = f64::NAN;

    let err = encode_line(&point, Precision::Nanoseconds).unwrap_err();
    match err {
        EncodeError::NonFiniteField {
            measurement,
            plot,
            field,
            ..
        } => {
            assert_eq!(measurement, "vr3_1");
            assert_eq!(plot, "rep2");
            assert_eq!(field, "p95");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn batch_has_one_line_per_point() {
    let clock = FixedClock(Utc.with_ymd_and_hms(2022, 2, 16, 10, 31, 5).unwrap());
    let points = flatten_with_clock(&complete_reading(), &clock).unwrap();

    let body = encode_lines(&points, Precision::Seconds).unwrap();
    let lines: Vec<&str> = body.lines().collect();

    assert_eq!(lines.len(), 20);
    assert!(body.ends_with('\n'));
    assert!(lines[0].starts_with("vr1_1,plot=rep1 "));
    assert!(lines[19].starts_with("vr4_1,plot=rep5 "));
}

#[test]
fn dataframe_has_one_row_per_point_in_order() {
    let clock = FixedClock(Utc.with_ymd_and_hms(2022, 2, 16, 10, 31, 5).unwrap());
    let points = flatten_with_clock(&complete_reading(), &clock).unwrap();

    let df = points_to_dataframe(&points).unwrap();
    assert_eq!(df.height(), 20);
    assert_eq!(df.get_column_names(), POINT_COLUMNS);

    let plot = df.column("plot").unwrap();
    assert_eq!(plot.str().unwrap().get(0), Some("rep1"));
    assert_eq!(plot.str().unwrap().get(19), Some("rep5"));

    let mean = df.column("mean").unwrap();
    assert_eq!(mean.f64().unwrap().get(5), Some(points[5].fields.mean));
}

#[test]
fn json_output_is_an_array_of_points() {
    let points = vec![sample_point()];
    let mut buffer = Vec::new();

    write_points(&points, OutputFormat::Json, Precision::Nanoseconds, &mut buffer).unwrap();

    let decoded: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    assert_eq!(decoded, serde_json::to_value(&points).unwrap());
    assert_eq!(decoded[0]["fields"]["timepi"], "16-02-2022_10-30-00");
}

#[test]
fn numeric_timepi_is_a_string_field_in_lines_and_a_number_in_json() {
    let mut point = sample_point();
    point.fields.timepi = CaptureTime::new(1645007400);

    let line = encode_line(&point, Precision::Seconds).unwrap();
    assert!(line.contains(" timepi=\"1645007400\","), "unexpected line: {line}");

    let value = serde_json::to_value(&point).unwrap();
    assert_eq!(value["fields"]["timepi"], 1645007400);
}

#[test]
fn csv_output_has_header_and_rows() {
    let points = vec![sample_point(), sample_point()];
    let mut buffer = Vec::new();

    write_points(&points, OutputFormat::Csv, Precision::Nanoseconds, &mut buffer).unwrap();

    let text = String::from_utf8(buffer).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(POINT_COLUMNS.join(",").as_str()));
    assert_eq!(lines.count(), 2);
}

#[test]
fn line_protocol_output_writes_nothing_when_a_later_point_fails() {
    let mut bad = sample_point();
    bad.fields.max = f64::INFINITY;
    let points = vec![sample_point(), bad];
    let mut buffer = Vec::new();

    let err = write_points(&points, OutputFormat::LineProtocol, Precision::Seconds, &mut buffer)
        .unwrap_err();

    assert!(err.to_string().contains("max"), "unexpected error: {err}");
    assert!(buffer.is_empty());
}

#[test]
fn parquet_output_starts_with_magic() {
    let points = vec![sample_point()];
    let mut buffer = Vec::new();

    write_points(&points, OutputFormat::Parquet, Precision::Nanoseconds, &mut buffer).unwrap();

    assert!(buffer.starts_with(b"PAR1"));
    assert!(buffer.ends_with(b"PAR1"));
}

#[test]
fn output_format_names_parse() {
    assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
    assert_eq!("line-protocol".parse::<OutputFormat>(), Ok(OutputFormat::LineProtocol));
    assert_eq!("lp".parse::<OutputFormat>(), Ok(OutputFormat::LineProtocol));
    assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
    assert_eq!("parquet".parse::<OutputFormat>(), Ok(OutputFormat::Parquet));
    assert!("xml".parse::<OutputFormat>().is_err());
    assert!(OutputFormat::Parquet.is_binary());
}

use std::io::Write;

use agicam_parser::Statistic;
use polars::io::parquet::write::ParquetCompression;
use polars::prelude::*;

use crate::point::PointRecord;

pub const POINT_COLUMNS: [&str; 11] = [
    "measurement",
    "plot",
    "timepi",
    "mean",
    "median",
    "std",
    "max",
    "p95",
    "p90",
    "p85",
    "emitted_at",
];

/// Lays points out as one row each, in the order given.
pub fn points_to_dataframe(points: &[PointRecord]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(POINT_COLUMNS.len());

    columns.push(
        Series::new(
            "measurement".into(),
            points.iter().map(|p| p.measurement()).collect::<Vec<_>>(),
        )
        .into(),
    );
    columns.push(
        Series::new(
            "plot".into(),
            points.iter().map(|p| p.plot()).collect::<Vec<_>>(),
        )
        .into(),
    );
    columns.push(
        Series::new(
            "timepi".into(),
            points
                .iter()
                .map(|p| p.fields.timepi.text().into_owned())
                .collect::<Vec<_>>(),
        )
        .into(),
    );

    for statistic in Statistic::ALL {
        let values: Vec<f64> = points.iter().map(|p| p.fields.value(statistic)).collect();
        columns.push(Series::new(statistic.canonical_name().into(), values).into());
    }

    let emitted = Series::new(
        "emitted_at".into(),
        points
            .iter()
            .map(|p| p.emitted_at.timestamp_micros())
            .collect::<Vec<_>>(),
    )
    .cast(&DataType::Datetime(
        TimeUnit::Microseconds,
        Some(polars::prelude::TimeZone::UTC),
    ))?;
    columns.push(emitted.into());

    DataFrame::new(columns)
}

pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> PolarsResult<()> {
    CsvWriter::new(writer).include_header(true).finish(df)
}

pub fn write_parquet<W: Write>(df: &mut DataFrame, writer: W) -> PolarsResult<()> {
    ParquetWriter::new(writer)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(df)?;
    Ok(())
}

use agicam_core::ingestion::IngestionBatch;
use agicam_parser::schema::{point_index, CHANNELS, REPLICATES, STATISTIC_FIELDS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

const HASH_PREFIX: usize = 12;

pub fn validation_table(batch: &IngestionBatch) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["input", "hash", "status", "points", "detail"]);

    for report in &batch.reports {
        let short_hash = report.hash.get(..HASH_PREFIX).unwrap_or(&report.hash);
        let detail = report
            .error
            .as_ref()
            .map(|err| err.to_string())
            .unwrap_or_default();
        table.add_row(vec![
            report.label.clone(),
            short_hash.to_string(),
            report.status.as_str().to_string(),
            report.points.to_string(),
            detail,
        ]);
    }

    table
}

/// One row per emitted point, in flatten order.
pub fn schema_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["index", "measurement", "plot"]);

    for replicate in REPLICATES {
        for channel in CHANNELS {
            table.add_row(vec![
                point_index(replicate, channel).to_string(),
                channel.to_string(),
                replicate.plot_label().to_string(),
            ]);
        }
    }

    table
}

/// Bundle keys and the point field each one becomes.
pub fn field_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["reading key", "point field"]);

    for key in STATISTIC_FIELDS {
        let field = if key == "timestamp" { "timepi" } else { key };
        table.add_row(vec![key, field]);
    }

    table
}

#[cfg(test)]
mod tests {
    use agicam_core::ingestion::{ingest_readings, ReadingInput};
    use agicam_core::SystemClock;

    use super::*;

    #[test]
    fn schema_table_lists_every_point() {
        let rendered = schema_table().to_string();
        assert!(rendered.contains("vr4_1"));
        assert!(rendered.contains("rep5"));
        assert!(rendered.contains("19"));
    }

    #[test]
    fn field_table_maps_timestamp_to_timepi() {
        let rendered = field_table().to_string();
        assert!(rendered.contains("timestamp"));
        assert!(rendered.contains("timepi"));
        assert!(rendered.contains("p85"));
    }

    #[test]
    fn validation_table_shows_failures() {
        let inputs = [ReadingInput {
            label: "broken.json",
            contents: b"{\"rep1\": 5}",
        }];
        let batch = ingest_readings(&inputs, &SystemClock);

        let rendered = validation_table(&batch).to_string();
        assert!(rendered.contains("broken.json"));
        assert!(rendered.contains("failed"));
        assert!(rendered.contains("expected object"));
    }
}

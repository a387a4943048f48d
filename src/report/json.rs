use serde::Serialize;

use crate::error::ReportError;
use crate::model::{Space, Threshold};
use crate::stats::RoiStatsRow;
use crate::stats::aggregate::SpaceTables;

/// Machine-readable sidecar next to the HTML report, carrying the same rows
/// the rendered tables show.
#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub subject: &'a str,
    pub subject_dir: String,
    pub roi_templates: String,
    /// Every file a complete run writes, with actual extensions (the
    /// statistics tables are SVG documents).
    pub artifacts: Vec<String>,
    pub tables: Vec<JsonTable<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonTable<'a> {
    pub space: &'static str,
    pub statistic: &'static str,
    pub threshold: &'static str,
    pub rows: &'a [RoiStatsRow],
}

impl<'a> JsonSummary<'a> {
    pub fn new(
        subject: &'a str,
        subject_dir: String,
        roi_templates: String,
        artifacts: Vec<String>,
        native: &'a SpaceTables,
        mni: &'a SpaceTables,
    ) -> Self {
        let mut tables = Vec::with_capacity(6);
        for (space, section) in [(Space::Native, native), (Space::Mni, mni)] {
            for threshold in Threshold::ALL {
                tables.push(JsonTable {
                    space: space.label(),
                    statistic: "zstat",
                    threshold: threshold.csv_label(),
                    rows: section.zstat(threshold).rows(),
                });
            }
            tables.push(JsonTable {
                space: space.label(),
                statistic: "tfce",
                threshold: "p<0.05",
                rows: section.tfce.rows(),
            });
        }
        JsonSummary {
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            subject,
            subject_dir,
            roi_templates,
            artifacts,
            tables,
        }
    }
}

pub fn render_summary_json(summary: &JsonSummary<'_>) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

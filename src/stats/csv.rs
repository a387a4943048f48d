use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::model::Task;
use crate::stats::RoiStatsRow;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stats file is empty")]
    Empty,
    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),
}

const COL_SPACE: &str = "Space";
const COL_THRESHOLD: &str = "Threshold";
const COL_STAT_TYPE: &str = "Stat Type";
const COL_ROI: &str = "ROI";
const COL_WB_VOXELS: &str = "Voxels in Whole Brain (counts)";
const COL_ROI_VOXELS: &str = "Voxels in ROI (counts)";
const COL_ACT_WB: &str = "Activated Voxels across Whole Brain (counts)";
const COL_ACT_WB_PCT: &str = "Activated Voxels across Whole Brain (%)";
const COL_ACT_ROI: &str = "Activated Voxels within ROI (counts)";
const COL_ACT_ROI_PCT: &str = "Activated Voxels within ROI (%)";
const COL_ROI_WB_PCT: &str = "Activated ROI/WB (%)";
const COL_RATIO: &str = "%Activated ROI/%Activated WB (ratio)";

struct ColumnIndex {
    space: usize,
    threshold: usize,
    stat_type: usize,
    roi: usize,
    wb_voxels: usize,
    roi_voxels: usize,
    act_wb: usize,
    act_wb_pct: usize,
    act_roi: usize,
    act_roi_pct: usize,
    roi_wb_pct: usize,
    ratio: usize,
}

impl ColumnIndex {
    fn resolve(header: &[String]) -> Result<Self, CsvError> {
        let find = |name: &'static str| -> Result<usize, CsvError> {
            header
                .iter()
                .position(|c| c == name)
                .ok_or(CsvError::MissingColumn(name))
        };
        Ok(ColumnIndex {
            space: find(COL_SPACE)?,
            threshold: find(COL_THRESHOLD)?,
            stat_type: find(COL_STAT_TYPE)?,
            roi: find(COL_ROI)?,
            wb_voxels: find(COL_WB_VOXELS)?,
            roi_voxels: find(COL_ROI_VOXELS)?,
            act_wb: find(COL_ACT_WB)?,
            act_wb_pct: find(COL_ACT_WB_PCT)?,
            act_roi: find(COL_ACT_ROI)?,
            act_roi_pct: find(COL_ACT_ROI_PCT)?,
            roi_wb_pct: find(COL_ROI_WB_PCT)?,
            ratio: find(COL_RATIO)?,
        })
    }
}

/// Loads one per-task ROI statistics CSV. Rows that fail to parse are
/// skipped with a warning; a missing column or unreadable file is an error
/// the caller downgrades to "task contributes no rows".
pub fn load_roi_stats(path: &Path, task: Task) -> Result<Vec<RoiStatsRow>, CsvError> {
    let file = File::open(path)?;
    parse_roi_stats(BufReader::new(file), task)
}

pub fn parse_roi_stats<R: BufRead>(mut reader: R, task: Task) -> Result<Vec<RoiStatsRow>, CsvError> {
    let mut buf = String::new();
    if reader.read_line(&mut buf)? == 0 {
        return Err(CsvError::Empty);
    }
    let header: Vec<String> = buf
        .trim_end()
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();
    let cols = ColumnIndex::resolve(&header)?;

    let mut rows = Vec::new();
    let mut line_no = 1usize;
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim_end();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match parse_row(&fields, &cols, task) {
            Some(row) => rows.push(row),
            None => warn!(
                task = task.label(),
                line = line_no,
                "malformed stats row; skipping"
            ),
        }
    }
    Ok(rows)
}

fn parse_row(fields: &[&str], cols: &ColumnIndex, task: Task) -> Option<RoiStatsRow> {
    let text = |idx: usize| fields.get(idx).map(|s| s.to_string());
    // Counts may be written as floats by the upstream tooling.
    let count = |idx: usize| -> Option<u64> {
        fields
            .get(idx)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    };
    let num = |idx: usize| -> Option<f64> {
        fields
            .get(idx)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    Some(RoiStatsRow {
        task,
        roi: text(cols.roi)?,
        space: text(cols.space)?,
        threshold: text(cols.threshold)?,
        stat_type: text(cols.stat_type)?,
        wb_voxels: count(cols.wb_voxels)?,
        roi_voxels: count(cols.roi_voxels)?,
        activated_wb: count(cols.act_wb)?,
        activated_wb_pct: num(cols.act_wb_pct)?,
        activated_roi: count(cols.act_roi)?,
        activated_roi_pct: num(cols.act_roi_pct)?,
        activated_roi_wb_pct: num(cols.roi_wb_pct)?,
        activated_ratio: num(cols.ratio)?,
    })
}

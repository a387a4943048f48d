pub mod aggregate;
pub mod csv;

use serde::Serialize;

use crate::model::Task;

/// One row of a per-task ROI statistics CSV, as produced by the upstream
/// post-stats step. Immutable once read; all percentages are carried through
/// from the CSV without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiStatsRow {
    pub task: Task,
    pub roi: String,
    pub space: String,
    pub threshold: String,
    pub stat_type: String,
    pub wb_voxels: u64,
    pub roi_voxels: u64,
    pub activated_wb: u64,
    pub activated_wb_pct: f64,
    pub activated_roi: u64,
    pub activated_roi_pct: f64,
    /// `Activated ROI/WB (%)` column.
    pub activated_roi_wb_pct: f64,
    /// `%Activated ROI/%Activated WB (ratio)` column.
    pub activated_ratio: f64,
}

impl RoiStatsRow {
    /// ROI size as a percentage of the whole brain, derived at aggregation
    /// time. Defined as 0 when the whole-brain count is 0.
    pub fn roi_voxel_pct(&self) -> f64 {
        if self.wb_voxels == 0 {
            0.0
        } else {
            100.0 * self.roi_voxels as f64 / self.wb_voxels as f64
        }
    }
}

/// Result of a filter pass. `Empty` is an explicit state, not an error: the
/// table renderer turns it into a placeholder panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowSet {
    Rows(Vec<RoiStatsRow>),
    Empty,
}

impl RowSet {
    pub fn from_rows(rows: Vec<RoiStatsRow>) -> Self {
        if rows.is_empty() {
            RowSet::Empty
        } else {
            RowSet::Rows(rows)
        }
    }

    pub fn rows(&self) -> &[RoiStatsRow] {
        match self {
            RowSet::Rows(rows) => rows,
            RowSet::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RowSet::Empty)
    }
}

use tracing::{error, info, warn};

use crate::layout::SubjectLayout;
use crate::model::{Space, StatKind, Task, Threshold, canonical_slots};
use crate::stats::csv::load_roi_stats;
use crate::stats::{RoiStatsRow, RowSet};

/// The row sets backing one space's tables: one GLM set per threshold and
/// one permutation (TFCE) set, which is threshold-independent.
#[derive(Debug, Clone)]
pub struct SpaceTables {
    pub zstat_31: RowSet,
    pub zstat_235: RowSet,
    pub tfce: RowSet,
}

impl SpaceTables {
    pub fn zstat(&self, threshold: Threshold) -> &RowSet {
        match threshold {
            Threshold::Z31 => &self.zstat_31,
            Threshold::Z235 => &self.zstat_235,
        }
    }
}

/// Loads every task's CSV once and produces the filtered, canonically
/// ordered row sets for one space. A missing or unreadable per-task CSV is
/// recoverable: the task simply contributes no rows.
pub fn aggregate_space(layout: &SubjectLayout, space: Space) -> SpaceTables {
    let mut all = Vec::new();
    for task in Task::ALL {
        let csv_file = &layout.record(task, space).csv_file;
        if !csv_file.exists() {
            warn!(path = %csv_file.display(), "stats CSV missing; task contributes no rows");
            continue;
        }
        match load_roi_stats(csv_file, task) {
            Ok(rows) => {
                info!(
                    path = %csv_file.display(),
                    rows = rows.len(),
                    "loaded stats CSV"
                );
                all.extend(rows);
            }
            Err(err) => {
                error!(path = %csv_file.display(), error = %err, "failed to read stats CSV");
            }
        }
    }

    SpaceTables {
        zstat_31: filter_rows(&all, space, TableSelector::Zstat(Threshold::Z31)),
        zstat_235: filter_rows(&all, space, TableSelector::Zstat(Threshold::Z235)),
        tfce: filter_rows(&all, space, TableSelector::Tfce),
    }
}

/// Selects one table's rows: GLM z-stat rows at a cluster threshold, or the
/// permutation-corrected rows at the fixed p<0.05 threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSelector {
    Zstat(Threshold),
    Tfce,
}

impl TableSelector {
    fn threshold_label(self) -> &'static str {
        match self {
            TableSelector::Zstat(t) => t.csv_label(),
            TableSelector::Tfce => "p<0.05",
        }
    }

    fn stat_label(self) -> &'static str {
        match self {
            TableSelector::Zstat(_) => StatKind::Zstat.csv_label(),
            TableSelector::Tfce => StatKind::Tfce.csv_label(),
        }
    }
}

/// Filters by (space, threshold, stat-type) and reorders survivors to the
/// canonical 12-slot sequence by joining on (task, ROI label). Rows whose
/// label matches no canonical slot are dropped with a warning, never
/// relabeled. Idempotent: re-filtering an output yields the same rows.
pub fn filter_rows(rows: &[RoiStatsRow], space: Space, selector: TableSelector) -> RowSet {
    let matching: Vec<&RoiStatsRow> = rows
        .iter()
        .filter(|r| {
            r.space == space.label()
                && r.threshold == selector.threshold_label()
                && r.stat_type == selector.stat_label()
        })
        .collect();

    let mut claimed = vec![false; matching.len()];
    let mut ordered = Vec::with_capacity(matching.len());
    for (task, label) in canonical_slots() {
        if let Some(idx) = matching
            .iter()
            .position(|r| r.task == task && r.roi == label)
        {
            claimed[idx] = true;
            ordered.push(matching[idx].clone());
        }
    }
    for (idx, row) in matching.iter().enumerate() {
        if !claimed[idx] {
            warn!(
                task = row.task.label(),
                roi = %row.roi,
                "ROI label matches no canonical slot; dropping row"
            );
        }
    }
    RowSet::from_rows(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(task: Task, roi: &str, threshold: &str, stat: &str) -> RoiStatsRow {
        RoiStatsRow {
            task,
            roi: roi.to_string(),
            space: "Native".to_string(),
            threshold: threshold.to_string(),
            stat_type: stat.to_string(),
            wb_voxels: 50000,
            roi_voxels: 1200,
            activated_wb: 300,
            activated_wb_pct: 0.6,
            activated_roi: 80,
            activated_roi_pct: 6.7,
            activated_roi_wb_pct: 0.16,
            activated_ratio: 11.1,
        }
    }

    #[test]
    fn test_filter_selects_by_space_threshold_and_kind() {
        let rows = vec![
            row(Task::Motor1, "Whole-brain SMA + PMC", "Z=3.1", "Z-stat"),
            row(Task::Motor1, "Whole-brain SMA + PMC", "Z=2.35", "Z-stat"),
            row(Task::Motor1, "Whole-brain SMA + PMC", "p<0.05", "TFCE"),
        ];
        let z31 = filter_rows(&rows, Space::Native, TableSelector::Zstat(Threshold::Z31));
        assert_eq!(z31.rows().len(), 1);
        assert_eq!(z31.rows()[0].threshold, "Z=3.1");
        let tfce = filter_rows(&rows, Space::Native, TableSelector::Tfce);
        assert_eq!(tfce.rows().len(), 1);
        assert_eq!(tfce.rows()[0].stat_type, "TFCE");
        let mni = filter_rows(&rows, Space::Mni, TableSelector::Zstat(Threshold::Z31));
        assert!(mni.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let rows = vec![
            row(Task::Motor2, "Left SMA + PMC", "Z=3.1", "Z-stat"),
            row(Task::Motor1, "Whole-brain SMA + PMC", "Z=3.1", "Z-stat"),
        ];
        let once = filter_rows(&rows, Space::Native, TableSelector::Zstat(Threshold::Z31));
        let twice = filter_rows(once.rows(), Space::Native, TableSelector::Zstat(Threshold::Z31));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonical_order_from_shuffled_input() {
        let rows = vec![
            row(Task::Language, "Right Heschl", "Z=3.1", "Z-stat"),
            row(Task::Motor2, "Left SMA + PMC", "Z=3.1", "Z-stat"),
            row(Task::Language, "Whole-brain STG", "Z=3.1", "Z-stat"),
            row(Task::Motor1, "Whole-brain SMA + PMC", "Z=3.1", "Z-stat"),
        ];
        let set = filter_rows(&rows, Space::Native, TableSelector::Zstat(Threshold::Z31));
        let order: Vec<(Task, &str)> = set
            .rows()
            .iter()
            .map(|r| (r.task, r.roi.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Task::Motor1, "Whole-brain SMA + PMC"),
                (Task::Motor2, "Left SMA + PMC"),
                (Task::Language, "Whole-brain STG"),
                (Task::Language, "Right Heschl"),
            ]
        );
    }

    #[test]
    fn test_unknown_roi_label_is_dropped_not_relabeled() {
        let rows = vec![
            row(Task::Motor1, "Cerebellum", "Z=3.1", "Z-stat"),
            row(Task::Motor1, "Left SMA + PMC", "Z=3.1", "Z-stat"),
        ];
        let set = filter_rows(&rows, Space::Native, TableSelector::Zstat(Threshold::Z31));
        assert_eq!(set.rows().len(), 1);
        assert_eq!(set.rows()[0].roi, "Left SMA + PMC");
    }

    #[test]
    fn test_empty_result_is_marker_not_error() {
        let set = filter_rows(&[], Space::Native, TableSelector::Zstat(Threshold::Z31));
        assert!(set.is_empty());
    }
}

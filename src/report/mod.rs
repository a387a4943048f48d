pub mod html;
pub mod json;
pub mod pdf;

use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::ReportError;
use crate::layout::SubjectLayout;
use crate::model::{Space, Task, Threshold};
use crate::stats::aggregate::TableSelector;

/// The four viewer documents generated per task, Native space only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    Z31,
    Z235,
    UnthreshZ31,
    UnthreshZ235,
}

impl ViewerKind {
    pub const ALL: [ViewerKind; 4] = [
        ViewerKind::Z31,
        ViewerKind::Z235,
        ViewerKind::UnthreshZ31,
        ViewerKind::UnthreshZ235,
    ];

    pub fn token(self) -> &'static str {
        match self {
            ViewerKind::Z31 => Threshold::Z31.viewer_token(),
            ViewerKind::Z235 => Threshold::Z235.viewer_token(),
            ViewerKind::UnthreshZ31 => "unthresh_z31",
            ViewerKind::UnthreshZ235 => "unthresh_z235",
        }
    }

    /// Which thresholded map backs this viewer; `None` means the raw z-map.
    pub fn threshold(self) -> Option<Threshold> {
        match self {
            ViewerKind::Z31 => Some(Threshold::Z31),
            ViewerKind::Z235 => Some(Threshold::Z235),
            ViewerKind::UnthreshZ31 | ViewerKind::UnthreshZ235 => None,
        }
    }

    pub fn display_threshold(self) -> f32 {
        self.threshold().map(Threshold::value).unwrap_or(0.0)
    }

    pub fn title(self, task: Task) -> String {
        match self {
            ViewerKind::Z31 => format!("{} Z=3.1", task.label()),
            ViewerKind::Z235 => format!("{} Z=2.35", task.label()),
            ViewerKind::UnthreshZ31 | ViewerKind::UnthreshZ235 => {
                format!("{} Unthresholded", task.label())
            }
        }
    }
}

/// Output file locations for one subject's report artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    subject: String,
    post_stats: PathBuf,
    viewer_dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(layout: &SubjectLayout) -> Self {
        ArtifactPaths {
            subject: layout.subject.clone(),
            post_stats: layout.post_stats_dir.clone(),
            viewer_dir: layout.viewer_dir.clone(),
        }
    }

    pub fn zmap_plot(&self, space: Space, threshold: Threshold) -> PathBuf {
        self.post_stats.join(format!(
            "sub-{}_roi_zmap_plot_{}_{}.png",
            self.subject,
            space.label(),
            threshold.file_token()
        ))
    }

    pub fn stats_table(&self, space: Space, selector: TableSelector) -> PathBuf {
        let suffix = match selector {
            TableSelector::Zstat(t) => format!("zstat_{}", t.file_token()),
            TableSelector::Tfce => "tfce_p005".to_string(),
        };
        self.post_stats.join(format!(
            "sub-{}_roi_stats_table_{}_{}.svg",
            self.subject,
            space.label(),
            suffix
        ))
    }

    pub fn html_report(&self) -> PathBuf {
        self.post_stats
            .join(format!("sub-{}_task_pipeline_report.html", self.subject))
    }

    pub fn pdf_report(&self) -> PathBuf {
        self.post_stats
            .join(format!("sub-{}_task_pipeline_report.pdf", self.subject))
    }

    pub fn json_summary(&self) -> PathBuf {
        self.post_stats
            .join(format!("sub-{}_roi_stats_summary.json", self.subject))
    }

    pub fn viewer_file(&self, task: Task, kind: ViewerKind) -> PathBuf {
        self.viewer_dir.join(viewer_name(task, kind))
    }

    /// Viewer path relative to the HTML report, for iframe/link embedding.
    pub fn viewer_rel(&self, task: Task, kind: ViewerKind) -> String {
        format!("viewers/{}", viewer_name(task, kind))
    }

    /// The cached composite set: four mosaics, four GLM tables, two
    /// permutation tables. Viewers are deliberately absent; they always
    /// regenerate.
    pub fn cacheable(&self) -> Vec<PathBuf> {
        let mut files = Vec::with_capacity(10);
        for space in Space::ALL {
            for threshold in Threshold::ALL {
                files.push(self.zmap_plot(space, threshold));
                files.push(self.stats_table(space, TableSelector::Zstat(threshold)));
            }
            files.push(self.stats_table(space, TableSelector::Tfce));
        }
        files
    }

    pub fn all_cached(&self) -> bool {
        self.cacheable().iter().all(|p| p.exists())
    }

    /// Names of every file a complete run writes, viewer paths relative to
    /// the report. Listed in the JSON summary so downstream consumers see
    /// the actual extensions (tables are SVG documents, not PNG rasters).
    pub fn expected_files(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .cacheable()
            .iter()
            .map(|p| basename(p))
            .collect();
        names.push(basename(&self.html_report()));
        names.push(basename(&self.pdf_report()));
        names.push(basename(&self.json_summary()));
        for task in Task::ALL {
            for kind in ViewerKind::ALL {
                names.push(self.viewer_rel(task, kind));
            }
        }
        names
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Caption lines for the mosaic's six slice rows, top to bottom: per task
/// the unthresholded row above the thresholded one, matching the render
/// order of the composite image.
pub fn mosaic_row_captions(subject: &str, threshold: Threshold) -> Vec<String> {
    let mut captions = Vec::with_capacity(Task::ALL.len() * 2);
    for task in Task::ALL {
        captions.push(format!("sub-{subject} {} (unthresholded)", task.label()));
        captions.push(format!(
            "sub-{subject} {} (thresholded, {})",
            task.label(),
            threshold.csv_label()
        ));
    }
    captions
}

fn viewer_name(task: Task, kind: ViewerKind) -> String {
    format!("native_{}_{}_viewer.html", task.snake_token(), kind.token())
}

/// Re-encodes an artifact file as a `data:` URI for inline embedding.
pub fn file_data_uri(path: &Path) -> Result<String, ReportError> {
    let bytes = std::fs::read(path).map_err(|source| ReportError::io(path, source))?;
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    };
    Ok(format!("data:{mime};base64,{}", BASE64.encode(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> ArtifactPaths {
        let layout = SubjectLayout::new("042", Path::new("/data"), Path::new("/rois"));
        ArtifactPaths::new(&layout)
    }

    #[test]
    fn test_artifact_naming_convention() {
        let p = paths();
        assert!(
            p.zmap_plot(Space::Native, Threshold::Z31)
                .ends_with("sub-042_roi_zmap_plot_Native_3.1.png")
        );
        assert!(
            p.zmap_plot(Space::Mni, Threshold::Z235)
                .ends_with("sub-042_roi_zmap_plot_MNI_2.35.png")
        );
        assert!(
            p.stats_table(Space::Native, TableSelector::Zstat(Threshold::Z235))
                .ends_with("sub-042_roi_stats_table_Native_zstat_2.35.svg")
        );
        assert!(
            p.stats_table(Space::Mni, TableSelector::Tfce)
                .ends_with("sub-042_roi_stats_table_MNI_tfce_p005.svg")
        );
        assert!(
            p.html_report()
                .ends_with("sub-042_task_pipeline_report.html")
        );
        assert!(
            p.pdf_report()
                .ends_with("sub-042_task_pipeline_report.pdf")
        );
    }

    #[test]
    fn test_viewer_naming_convention() {
        let p = paths();
        assert_eq!(
            p.viewer_rel(Task::Motor1, ViewerKind::Z31),
            "viewers/native_motor_1_z31_viewer.html"
        );
        assert_eq!(
            p.viewer_rel(Task::Language, ViewerKind::UnthreshZ235),
            "viewers/native_language_unthresh_z235_viewer.html"
        );
        assert!(
            p.viewer_file(Task::Motor2, ViewerKind::Z235)
                .ends_with("post_stats/viewers/native_motor_2_z235_viewer.html")
        );
    }

    #[test]
    fn test_cacheable_set_excludes_viewers_and_reports() {
        let p = paths();
        let files = p.cacheable();
        assert_eq!(files.len(), 10);
        assert!(!p.all_cached());
        for f in &files {
            let name = f.file_name().unwrap().to_string_lossy().into_owned();
            assert!(!name.contains("viewer"));
            assert!(!name.contains("report"));
        }
    }

    #[test]
    fn test_mosaic_captions_follow_row_order() {
        let captions = mosaic_row_captions("042", Threshold::Z31);
        assert_eq!(captions.len(), 6);
        assert_eq!(captions[0], "sub-042 Motor 1 (unthresholded)");
        assert_eq!(captions[1], "sub-042 Motor 1 (thresholded, Z=3.1)");
        assert_eq!(captions[4], "sub-042 Language (unthresholded)");
        let lenient = mosaic_row_captions("042", Threshold::Z235);
        assert_eq!(lenient[3], "sub-042 Motor 2 (thresholded, Z=2.35)");
    }

    #[test]
    fn test_expected_files_cover_every_artifact() {
        let p = paths();
        let files = p.expected_files();
        assert_eq!(files.len(), 25);
        assert!(
            files
                .iter()
                .any(|f| f == "sub-042_roi_stats_table_Native_zstat_3.1.svg")
        );
        assert!(files.iter().any(|f| f == "sub-042_task_pipeline_report.pdf"));
        assert!(
            files
                .iter()
                .any(|f| f == "viewers/native_motor_1_z31_viewer.html")
        );
    }

    #[test]
    fn test_viewer_kind_thresholds() {
        assert_eq!(ViewerKind::Z31.display_threshold(), 3.1);
        assert_eq!(ViewerKind::UnthreshZ31.display_threshold(), 0.0);
        assert_eq!(ViewerKind::Z235.title(Task::Motor2), "Motor 2 Z=2.35");
        assert_eq!(
            ViewerKind::UnthreshZ235.title(Task::Language),
            "Language Unthresholded"
        );
    }
}

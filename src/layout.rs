use std::path::{Path, PathBuf};

use crate::model::{Space, Task, Threshold};

/// Everything the pipeline needs to know about one (task, space) pair:
/// statistical maps, ROI masks keyed by canonical label, the per-task CSV
/// and the axial display coordinates. Paths are computed, never probed.
#[derive(Debug, Clone)]
pub struct TaskRoiRecord {
    pub z_map: PathBuf,
    pub thresh_z_map_235: PathBuf,
    pub thresh_z_map_31: PathBuf,
    /// Canonical ROI label -> mask image, in table order.
    pub roi_masks: Vec<(String, PathBuf)>,
    pub csv_file: PathBuf,
    pub cut_coords: [f32; 10],
}

impl TaskRoiRecord {
    pub fn thresh_map(&self, threshold: Threshold) -> &Path {
        match threshold {
            Threshold::Z31 => &self.thresh_z_map_31,
            Threshold::Z235 => &self.thresh_z_map_235,
        }
    }
}

/// Resolves the fixed per-subject directory layout. Construction performs no
/// I/O; a malformed subject id simply yields paths that fail downstream
/// existence checks.
#[derive(Debug, Clone)]
pub struct SubjectLayout {
    pub subject: String,
    /// `derivatives/sub-<id>/ses-01`
    pub subject_dir: PathBuf,
    pub post_stats_dir: PathBuf,
    pub viewer_dir: PathBuf,
    pub t1_native: PathBuf,
    pub t1_mni: PathBuf,
    /// Group-template ROI directory, recorded for provenance.
    pub roi_templates: PathBuf,
    records: Vec<((Task, Space), TaskRoiRecord)>,
}

fn linspace(start: f32, end: f32, out: &mut [f32; 10]) {
    let step = (end - start) / 9.0;
    for (i, v) in out.iter_mut().enumerate() {
        *v = start + step * i as f32;
    }
}

impl SubjectLayout {
    pub fn new(subject: &str, archive_dir: &Path, roi_dir: &Path) -> Self {
        let subject_dir = archive_dir.join(format!("derivatives/sub-{subject}/ses-01"));
        let subj_roi = subject_dir.join("ROI");
        let post_stats_dir = subject_dir.join("post_stats");
        let viewer_dir = post_stats_dir.join("viewers");

        let t1_native =
            subject_dir.join(format!("anat/sub-{subject}_ses-01_run-01_desc-brain_T1w.nii.gz"));
        let t1_mni = subject_dir.join(format!(
            "anat/sub-{subject}_ses-01_run-01_space-MNI152NLin6Asym_desc-preproc_T1w.nii.gz"
        ));

        let mut native_motor = [0.0f32; 10];
        let mut native_lang = [0.0f32; 10];
        let mut mni_motor = [0.0f32; 10];
        let mut mni_lang = [0.0f32; 10];
        linspace(15.0, 50.0, &mut native_motor);
        linspace(-25.0, 15.0, &mut native_lang);
        linspace(20.0, 75.0, &mut mni_motor);
        linspace(-15.0, 40.0, &mut mni_lang);

        let mut records = Vec::with_capacity(Task::ALL.len() * Space::ALL.len());
        for task in Task::ALL {
            let feat_dir = subject_dir.join(format!(
                "fsl_stats/sub-{subject}_task-{}_contrasts.feat",
                task.file_token()
            ));
            let csv_file = post_stats_dir.join(format!(
                "sub-{subject}_task-{}_roi_stats.csv",
                task.file_token()
            ));
            for space in Space::ALL {
                let (z_map, thresh_235, thresh_31) = match space {
                    Space::Native => (
                        feat_dir.join("stats/zstat1_native.nii.gz"),
                        feat_dir.join("stats/thresh_zstat1_235_native.nii.gz"),
                        feat_dir.join("stats/thresh_zstat1_native.nii.gz"),
                    ),
                    // The Z=3.1 map sits one level above stats/ in MNI space;
                    // that is where the upstream FEAT step leaves it.
                    Space::Mni => (
                        feat_dir.join("stats/remasked_zstat1.nii.gz"),
                        feat_dir.join("stats/thresh_zstat1_235.nii.gz"),
                        feat_dir.join("thresh_zstat1.nii.gz"),
                    ),
                };

                let roi_masks = roi_mask_paths(task, space, &subj_roi);
                let cut_coords = match (task, space) {
                    (Task::Motor1 | Task::Motor2, Space::Native) => native_motor,
                    (Task::Language, Space::Native) => native_lang,
                    (Task::Motor1 | Task::Motor2, Space::Mni) => mni_motor,
                    (Task::Language, Space::Mni) => mni_lang,
                };

                records.push((
                    (task, space),
                    TaskRoiRecord {
                        z_map: z_map.clone(),
                        thresh_z_map_235: thresh_235.clone(),
                        thresh_z_map_31: thresh_31.clone(),
                        roi_masks,
                        csv_file: csv_file.clone(),
                        cut_coords,
                    },
                ));
            }
        }

        SubjectLayout {
            subject: subject.to_string(),
            subject_dir,
            post_stats_dir,
            viewer_dir,
            t1_native,
            t1_mni,
            roi_templates: roi_dir.to_path_buf(),
            records,
        }
    }

    /// Total over the enum pair; every (task, space) has exactly one record.
    pub fn record(&self, task: Task, space: Space) -> &TaskRoiRecord {
        self.records
            .iter()
            .find(|((t, s), _)| *t == task && *s == space)
            .map(|(_, r)| r)
            .expect("layout covers every (task, space) pair")
    }

    pub fn background(&self, space: Space) -> &Path {
        match space {
            Space::Native => &self.t1_native,
            Space::Mni => &self.t1_mni,
        }
    }
}

fn roi_mask_paths(task: Task, space: Space, subj_roi: &Path) -> Vec<(String, PathBuf)> {
    let suffix = match space {
        Space::Native => "_t1w_native",
        Space::Mni => "",
    };
    let stem_for = |label: &str| -> String {
        let base = if label.contains("STG") {
            "STG_sub"
        } else if label.contains("Heschl") {
            "Heschl_sub"
        } else {
            "SMA_PMC_sub"
        };
        let side = if label.starts_with("Left") {
            "_left"
        } else if label.starts_with("Right") {
            "_right"
        } else {
            ""
        };
        format!("{base}{suffix}{side}.nii.gz")
    };
    task.roi_labels()
        .iter()
        .map(|label| (label.to_string(), subj_roi.join(stem_for(label))))
        .collect()
}

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array3;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;

pub const SUBJECT: &str = "042";

const TASK_TOKENS: [&str; 3] = ["motor_run-01", "motor_run-02", "lang"];
const ROI_STEMS: [&str; 3] = ["SMA_PMC_sub", "STG_sub", "Heschl_sub"];

const CSV_HEADER: &str = "Task,ROI,Space,Threshold,Stat Type,\
Voxels in Whole Brain (counts),Voxels in ROI (counts),\
Activated Voxels across Whole Brain (counts),Activated Voxels across Whole Brain (%),\
Activated Voxels within ROI (counts),Activated Voxels within ROI (%),\
Activated ROI/WB (%),%Activated ROI/%Activated WB (ratio)";

fn roi_labels(token: &str) -> Vec<String> {
    let bases: &[&str] = if token == "lang" {
        &["STG", "Heschl"]
    } else {
        &["SMA + PMC"]
    };
    let mut labels = Vec::new();
    for base in bases {
        labels.push(format!("Whole-brain {base}"));
        labels.push(format!("Left {base}"));
        labels.push(format!("Right {base}"));
    }
    labels
}

/// Writes a small axial volume with a known world-z affine (4 mm spacing,
/// slice 0 at z=0), filled with a constant value.
pub fn write_volume(path: &Path, value: f32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let data = Array3::<f32>::from_elem((8, 8, 16), value);
    let header = NiftiHeader {
        pixdim: [0.0, 2.0, 2.0, 4.0, 0.0, 0.0, 0.0, 0.0],
        sform_code: 1,
        srow_x: [2.0, 0.0, 0.0, 0.0],
        srow_y: [0.0, 2.0, 0.0, 0.0],
        srow_z: [0.0, 0.0, 4.0, 0.0],
        ..NiftiHeader::default()
    };
    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(&data)
        .unwrap();
}

fn stats_rows(token: &str) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for space in ["Native", "MNI"] {
        for (threshold, stat) in [("Z=3.1", "Z-stat"), ("Z=2.35", "Z-stat"), ("p<0.05", "TFCE")] {
            for label in roi_labels(token) {
                out.push_str(&format!(
                    "{token},{label},{space},{threshold},{stat},50000,1200,300,0.6,80,6.67,0.16,11.1\n"
                ));
            }
        }
    }
    out
}

/// Lays out one synthetic subject under `archive`: anatomy, statistical maps,
/// ROI masks, and (optionally) the per-task statistics CSVs.
pub fn seed_subject(archive: &Path, with_csvs: bool) -> PathBuf {
    let subject_dir = archive.join(format!("derivatives/sub-{SUBJECT}/ses-01"));
    let anat = subject_dir.join("anat");
    write_volume(
        &anat.join(format!("sub-{SUBJECT}_ses-01_run-01_desc-brain_T1w.nii.gz")),
        100.0,
    );
    write_volume(
        &anat.join(format!(
            "sub-{SUBJECT}_ses-01_run-01_space-MNI152NLin6Asym_desc-preproc_T1w.nii.gz"
        )),
        100.0,
    );

    for stem in ROI_STEMS {
        for suffix in ["", "_t1w_native"] {
            for side in ["", "_left", "_right"] {
                write_volume(
                    &subject_dir.join(format!("ROI/{stem}{suffix}{side}.nii.gz")),
                    1.0,
                );
            }
        }
    }

    for token in TASK_TOKENS {
        let feat = subject_dir.join(format!("fsl_stats/sub-{SUBJECT}_task-{token}_contrasts.feat"));
        write_volume(&feat.join("stats/zstat1_native.nii.gz"), 5.0);
        write_volume(&feat.join("stats/thresh_zstat1_native.nii.gz"), 5.0);
        write_volume(&feat.join("stats/thresh_zstat1_235_native.nii.gz"), 5.0);
        write_volume(&feat.join("stats/remasked_zstat1.nii.gz"), 5.0);
        write_volume(&feat.join("stats/thresh_zstat1_235.nii.gz"), 5.0);
        write_volume(&feat.join("thresh_zstat1.nii.gz"), 5.0);

        if with_csvs {
            let csv = subject_dir.join(format!("post_stats/sub-{SUBJECT}_task-{token}_roi_stats.csv"));
            fs::create_dir_all(csv.parent().unwrap()).unwrap();
            fs::write(csv, stats_rows(token)).unwrap();
        }
    }

    subject_dir
}

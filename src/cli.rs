use std::path::PathBuf;

use clap::Parser;

use crate::config::RunConfig;

#[derive(Debug, Parser)]
#[command(
    name = "fmri-task-report",
    version,
    about = "Generates per-subject task-fMRI reports from post-stats outputs"
)]
pub struct Cli {
    /// Subject identifiers, without the `sub-` prefix.
    #[arg(required = true)]
    pub subjects: Vec<String>,

    /// Processed-archive root containing `derivatives/`.
    #[arg(long, env = "ARCHIVEDIR")]
    pub archive_dir: PathBuf,

    /// Group-template ROI directory.
    #[arg(long, env = "ROI")]
    pub roi_dir: PathBuf,

    /// Re-render composite images and tables even when all exist.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            archive_dir: self.archive_dir.clone(),
            roi_dir: self.roi_dir.clone(),
            force: self.force,
        }
    }
}

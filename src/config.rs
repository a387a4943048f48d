use std::path::PathBuf;

/// Resolved run settings shared by every subject in one invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root of the processed archive; subjects live under `derivatives/`.
    pub archive_dir: PathBuf,
    /// Group-template ROI directory, recorded in the JSON summary.
    pub roi_dir: PathBuf,
    /// Regenerate composite images and tables even when all are present.
    pub force: bool,
}

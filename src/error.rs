use std::path::PathBuf;

/// Errors raised while loading, merging or saving the dashboard data.
///
/// Load and save failures carry the raw reason text, which the web layer shows
/// to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The primary file (or a present but corrupt annotations file) could not be read.
    #[error("cannot read {}: {reason}", path.display())]
    FileRead { path: PathBuf, reason: String },

    /// No annotations file on disk yet. Never leaves the storage layer.
    #[error("annotations file {} does not exist", .0.display())]
    AnnotationsMissing(PathBuf),

    #[error("cannot write {}: {reason}", path.display())]
    FileWrite { path: PathBuf, reason: String },

    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("a save is already in progress")]
    SaveInProgress,

    #[error("invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub(crate) fn read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DashboardError::FileRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DashboardError::FileWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

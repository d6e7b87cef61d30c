use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] ci_fs::Error),

    #[error(transparent)]
    Merge(#[from] ci_merge::Error),

    #[error("Packaged source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("composer.json not found at {path}")]
    ManifestMissing { path: PathBuf },

    #[error("Invalid composer.json at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("Template not found: {path}")]
    TemplateMissing { path: PathBuf },
}

impl Error {
    pub fn manifest_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ManifestParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures surfaced by the loader, aggregator, chart builder and dashboard writer.
#[derive(Debug, Error)]
pub enum RoamingError {
    #[error("input `{}` does not resolve to a readable file", path.display())]
    NotFound { path: PathBuf },
    #[error("data format error: {0}")]
    DataFormat(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("serializing dashboard document: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RoamingError>;

impl RoamingError {
    pub fn data_format(msg: impl Into<String>) -> Self {
        RoamingError::DataFormat(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RoamingError::NotFound { .. })
    }

    pub fn is_data_format(&self) -> bool {
        matches!(self, RoamingError::DataFormat(_))
    }

    /// Short stable label used by the dashboard failure view.
    pub fn kind(&self) -> &'static str {
        match self {
            RoamingError::NotFound { .. } => "not_found",
            RoamingError::DataFormat(_) => "data_format",
            RoamingError::Config(_) => "config",
            RoamingError::Io(_) => "io",
            RoamingError::Serialize(_) => "serialize",
        }
    }
}

impl From<csv::Error> for RoamingError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io_err) => RoamingError::Io(io_err),
                other => RoamingError::DataFormat(format!("{:?}", other)),
            }
        } else {
            RoamingError::DataFormat(err.to_string())
        }
    }
}

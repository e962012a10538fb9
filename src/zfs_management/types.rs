// zfs_management/types.rs
// Public types for ZFS management operations

use super::ffi::{ZFS_TYPE_FILESYSTEM, ZFS_TYPE_SNAPSHOT};
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T, E = ZfsError> = std::result::Result<T, E>;

/// Failure categories reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotReady,
    NotFound,
    InvalidArgument,
    Unsupported,
    PreconditionFailed,
    IoError,
    ExternalToolFailed,
    InitFailed,
}

#[derive(Debug, Error)]
pub enum ZfsError {
    #[error("ZFS library is not initialized. Are the ZFS packages and modules correctly installed?")]
    NotReady,

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid value '{value}' for property '{property}' on '{dataset}'")]
    InvalidProperty {
        dataset: String,
        property: String,
        value: String,
    },

    #[error("{0} is not supported by the ZFS backend")]
    Unsupported(String),

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// libzfs call failed
    #[error("Failed to {operation} '{target}': {reason}")]
    Library {
        operation: &'static str,
        target: String,
        reason: String,
    },

    #[error("Unable to {operation} {target}: `{command}` exited with status {status}: {stderr}")]
    ExternalToolFailed {
        operation: &'static str,
        target: String,
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to initialize ZFS library: {0}")]
    InitFailed(String),

    #[error("Failed to parse settings {}: {source}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ZfsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZfsError::NotReady => ErrorKind::NotReady,
            ZfsError::NotFound { .. } => ErrorKind::NotFound,
            ZfsError::InvalidArgument(_)
            | ZfsError::InvalidProperty { .. }
            | ZfsError::Settings { .. } => ErrorKind::InvalidArgument,
            ZfsError::Unsupported(_) => ErrorKind::Unsupported,
            ZfsError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            ZfsError::Io { .. } | ZfsError::Library { .. } => ErrorKind::IoError,
            ZfsError::ExternalToolFailed { .. } => ErrorKind::ExternalToolFailed,
            ZfsError::InitFailed(_) => ErrorKind::InitFailed,
        }
    }

    pub(crate) fn dataset_not_found(name: &str) -> Self {
        ZfsError::NotFound {
            kind: "dataset",
            name: name.to_string(),
        }
    }
}

/// Kind of dataset a name is opened as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Filesystem,
    Snapshot,
}

impl DatasetKind {
    /// zfs_type_t bit for zfs_open()
    pub fn zfs_type(self) -> std::ffi::c_int {
        match self {
            DatasetKind::Filesystem => ZFS_TYPE_FILESYSTEM,
            DatasetKind::Snapshot => ZFS_TYPE_SNAPSHOT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Filesystem => "filesystem",
            DatasetKind::Snapshot => "snapshot",
        }
    }
}

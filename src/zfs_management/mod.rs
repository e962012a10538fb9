// zfs_management/mod.rs
// ZFS backend for Lustre targets: LDD properties and provisioning

mod backend;
pub mod bridge;
mod datasets;
mod ffi;
pub mod helpers;
mod manager;
pub mod params;
pub mod pools;
mod types;
pub mod vdev;


// Re-export main interface
pub use manager::ZfsManager;

pub use backend::{DatasetHandle, LibzfsBackend, LibzfsDataset, ZfsBackend};
pub use types::{DatasetKind, ErrorKind, Result, ZfsError};
pub use vdev::{create_vdev_if_needed, VdevToken};

//! Lustre disk descriptor storage on ZFS.
//!
//! A Lustre target formatted on ZFS keeps its server configuration (the
//! "LDD") as `lustre:*` user properties on the target dataset. This crate
//! writes that record, reads it back, and provisions the pool and dataset
//! that host it.
//!
//! Everything goes through a [`ZfsManager`], which owns the libzfs handle
//! between [`ZfsManager::init`] and [`ZfsManager::fini`].

pub mod models;
pub mod safety;
pub mod settings;
pub mod utils;
pub mod zfs_management;

pub use models::{LddFlags, LustreDiskData, MkfsFlags, MkfsOptions, MountType};
pub use safety::HostIdCheck;
pub use settings::{load_settings, Settings};
pub use utils::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use zfs_management::{
    create_vdev_if_needed, DatasetHandle, DatasetKind, ErrorKind, LibzfsBackend, Result,
    ZfsBackend, ZfsError, ZfsManager,
};

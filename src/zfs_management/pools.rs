// zfs_management/pools.rs
// Pool and dataset provisioning: prepare, create, tune

use super::backend::ZfsBackend;
use super::helpers::{is_valid_filesystem_name, pool_from_dataset};
use super::manager::ZfsManager;
use super::types::{DatasetKind, Result, ZfsError};
use super::vdev::create_vdev_if_needed;
use crate::models::{LddFlags, MkfsFlags, MkfsOptions};
use log::info;

/// `zpool create` arguments; the pool itself never gets mounted
pub fn zpool_create_args(pool: &str, vdevs: &[String]) -> Vec<String> {
    let mut args: Vec<String> = ["create", "-f", "-O", "canmount=off", pool]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend(vdevs.iter().cloned());
    args
}

/// `zfs create` arguments for a target dataset:
/// - canmount=off is set to prevent zfs automounting
/// - xattr=sa is set to use system attribute based xattrs
pub fn zfs_create_args(ds: &str, mkfs_opts: &str) -> Vec<String> {
    let mut args: Vec<String> = ["create", "-o", "canmount=off", "-o", "xattr=sa"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !mkfs_opts.trim().is_empty() {
        args.push("-o".to_string());
        args.extend(mkfs_opts.split_whitespace().map(str::to_string));
    }

    args.push(ds.to_string());
    args
}

impl<B: ZfsBackend> ZfsManager<B> {
    /// Validate the target name before anything is created
    pub fn prepare(&self, mop: &MkfsOptions) -> Result<()> {
        self.backend()?;

        if !is_valid_filesystem_name(&mop.device) {
            return Err(ZfsError::InvalidArgument(format!(
                "Invalid filesystem name {}",
                mop.device
            )));
        }

        if pool_from_dataset(&mop.device).is_none() {
            return Err(ZfsError::InvalidArgument(format!(
                "Missing pool in filesystem name {}",
                mop.device
            )));
        }

        Ok(())
    }

    /// Create the pool (when vdevs are given) and the target dataset.
    ///
    /// Pool creation is skipped when the pool exists. Dataset creation is
    /// not: an existing dataset fails unless FORCE_FORMAT destroys it first.
    pub fn provision(&self, mop: &MkfsOptions) -> Result<()> {
        let backend = self.backend()?;
        let ds = &mop.device;

        // no automatic index with zfs backend
        if mop.ldd.flags.contains(LddFlags::NEED_INDEX) {
            return Err(ZfsError::Unsupported(
                "automatic index assignment; the target index must be specified with --index"
                    .to_string(),
            ));
        }

        self.check_hostid(mop)?;

        let pool = pool_from_dataset(ds).ok_or_else(|| {
            ZfsError::InvalidArgument(format!("Missing pool in filesystem name {}", ds))
        })?;

        if mop.flags.contains(MkfsFlags::FORCE_FORMAT) {
            if let Some(zhp) = backend.open_dataset(ds, DatasetKind::Filesystem)? {
                info!("Destroying previous dataset {}", ds);
                backend.destroy_dataset(zhp)?;
            }
        }

        let pool_exists = backend.pool_exists(pool)?;
        if !mop.pool_vdevs.is_empty() && !pool_exists {
            for vdev in &mop.pool_vdevs {
                create_vdev_if_needed(vdev, mop.device_kb)?;
            }

            let args = zpool_create_args(pool, &mop.pool_vdevs);
            self.run_tool("create pool", pool, &self.settings().tools.zpool, &args)?;
            info!("Created pool {}", pool);
        }

        let args = zfs_create_args(ds, &mop.mkfs_opts);
        self.run_tool("create filesystem", ds, &self.settings().tools.zfs, &args)?;
        info!("Created filesystem {}", ds);

        Ok(())
    }

    /// Nothing to tune on ZFS once the library is up
    pub fn tune(&self, _ds: &str) -> Result<()> {
        self.backend().map(|_| ())
    }

    /// Quota enabling is an ldiskfs operation
    pub fn enable_quota(&self, _mop: &MkfsOptions) -> Result<()> {
        Err(ZfsError::Unsupported("enabling quota".to_string()))
    }
}

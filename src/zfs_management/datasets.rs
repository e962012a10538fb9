// zfs_management/datasets.rs
// Dataset operations: write, read, probe and label the LDD properties

use super::backend::{DatasetHandle, ZfsBackend};
use super::bridge::{self, LDD_SVNAME_PROP};
use super::manager::ZfsManager;
use super::params;
use super::types::{DatasetKind, Result, ZfsError};
use crate::models::{LustreDiskData, MkfsOptions, MountType};
use log::{debug, info};

impl<B: ZfsBackend> ZfsManager<B> {
    /// Write the server config as properties associated with the dataset.
    ///
    /// Fixed fields are written in bridge order, then the parameters. A
    /// failure stops the write; properties already set stay set.
    pub fn write_ldd(&self, mop: &MkfsOptions) -> Result<()> {
        let backend = self.backend()?;
        let ds = &mop.device;

        let zhp = backend
            .open_dataset(ds, DatasetKind::Filesystem)?
            .ok_or_else(|| ZfsError::dataset_not_found(ds))?;

        self.check_hostid(mop)?;

        info!("Writing {} properties", ds);

        for bridge in bridge::entries() {
            bridge.write_to(backend, &zhp, &mop.ldd)?;
        }

        params::set_prop_params(backend, &zhp, &mop.ldd.params)
    }

    /// Read the server config from the dataset properties.
    ///
    /// Missing properties are not an error and leave the field at its
    /// default. Snapshots are accepted when no filesystem matches.
    pub fn read_ldd(&self, ds: &str) -> Result<LustreDiskData> {
        let backend = self.backend()?;

        let zhp = match backend.open_dataset(ds, DatasetKind::Filesystem)? {
            Some(zhp) => zhp,
            None => backend
                .open_dataset(ds, DatasetKind::Snapshot)?
                .ok_or_else(|| ZfsError::dataset_not_found(ds))?,
        };

        debug!("Reading {} properties of {}", zhp.kind().as_str(), ds);

        let mut ldd = LustreDiskData::default();
        for bridge in bridge::entries() {
            if !bridge.read_from(backend, &zhp, &mut ldd)? {
                debug!("{}: {} not set", ds, bridge.name);
            }
        }

        params::get_prop_params(backend, &zhp, &mut ldd.params)?;

        ldd.mount_type = MountType::Zfs;
        Ok(ldd)
    }

    /// Whether `ds` carries a formatted Lustre target
    pub fn is_lustre(&self, ds: &str) -> bool {
        if !self.is_ready() {
            return false;
        }

        match self.read_ldd(ds) {
            Ok(ldd) => ldd.is_formatted(),
            Err(e) => {
                debug!("{} is not a Lustre target: {}", ds, e);
                false
            }
        }
    }

    /// Store a new server name on an existing target
    pub fn label(&self, ds: &str, svname: &str) -> Result<()> {
        let backend = self.backend()?;

        let zhp = backend
            .open_dataset(ds, DatasetKind::Filesystem)?
            .ok_or_else(|| ZfsError::dataset_not_found(ds))?;

        let bridge = bridge::lookup(LDD_SVNAME_PROP)
            .ok_or_else(|| ZfsError::InvalidArgument(format!("unknown property {}", LDD_SVNAME_PROP)))?;

        let ldd = LustreDiskData {
            svname: svname.to_string(),
            ..Default::default()
        };
        bridge.write_to(backend, &zhp, &ldd)
    }
}

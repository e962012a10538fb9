// models.rs
// Lustre disk descriptor and mkfs request types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Server flags stored in `lustre:flags`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LddFlags: u32 {
        const SV_TYPE_MDT = 0x0001;
        const SV_TYPE_OST = 0x0002;
        const SV_TYPE_MGS = 0x0004;
        /// Index must be assigned by the MGS on first mount
        const NEED_INDEX = 0x0010;
        const VIRGIN = 0x0020;
        const UPDATE = 0x0040;
        const REWRITE_LDD = 0x0080;
        const WRITECONF = 0x0100;
        const UPGRADE14 = 0x0200;
        const PARAM = 0x0400;
        const NO_PRIMNODE = 0x1000;
        const IR_CAPABLE = 0x2000;
        const ERROR = 0x4000;
        const PARAM2 = 0x8000;
        const NO_LOCAL_LOGS = 0x10000;
    }
}

bitflags! {
    /// Request flags for mkfs-style operations
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MkfsFlags: u32 {
        /// Destroy an existing target dataset before creating it again
        const FORCE_FORMAT = 0x0002;
        /// Allow failover configuration on hosts without a host id
        const NO_HOSTID_CHECK = 0x0020;
    }
}

/// Backing filesystem a target was formatted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    #[default]
    Ext3,
    Ldiskfs,
    Smfs,
    Reiserfs,
    Ldiskfs2,
    Zfs,
}

/// Persistent server configuration of a Lustre target.
///
/// On ZFS every fixed field lives in its own `lustre:<name>` user property
/// and every `key=value` pair of `params` in a `lustre:<key>` property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LustreDiskData {
    pub config_ver: u32,
    pub flags: LddFlags,
    pub svindex: u32,
    /// Set when the record is read back; never written
    pub mount_type: MountType,
    pub fsname: String,
    pub svname: String,
    pub uuid: String,
    pub userdata: String,
    pub mount_opts: String,
    /// Whitespace separated `key=value` parameters
    pub params: String,
}

impl LustreDiskData {
    /// A record counts as formatted once it has a version and a server name
    pub fn is_formatted(&self) -> bool {
        self.config_ver > 0 && !self.svname.is_empty()
    }
}

/// Everything a format request carries into the ZFS backend
#[derive(Debug, Clone, Default)]
pub struct MkfsOptions {
    pub ldd: LustreDiskData,
    /// Target dataset, `pool/dataset`
    pub device: String,
    /// `zpool create` vdev specification, empty to use an existing pool
    pub pool_vdevs: Vec<String>,
    /// Size in KiB for file vdevs that have to be created, 0 when unknown
    pub device_kb: u64,
    /// Extra `zfs create` options
    pub mkfs_opts: String,
    pub flags: MkfsFlags,
}

impl MkfsOptions {
    pub fn new(device: impl Into<String>, ldd: LustreDiskData) -> Self {
        MkfsOptions {
            ldd,
            device: device.into(),
            ..Default::default()
        }
    }
}

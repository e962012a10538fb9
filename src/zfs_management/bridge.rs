// zfs_management/bridge.rs
// Mapping between LDD fields and their lustre:* user properties

use super::backend::{DatasetHandle, ZfsBackend};
use super::types::{Result, ZfsError};
use crate::models::{LddFlags, LustreDiskData};
use log::debug;

/// Persistent mount data is stored in these user properties
pub const LDD_PREFIX: &str = "lustre:";
pub const LDD_VERSION_PROP: &str = "lustre:version";
pub const LDD_FLAGS_PROP: &str = "lustre:flags";
pub const LDD_INDEX_PROP: &str = "lustre:index";
pub const LDD_FSNAME_PROP: &str = "lustre:fsname";
pub const LDD_SVNAME_PROP: &str = "lustre:svname";
pub const LDD_UUID_PROP: &str = "lustre:uuid";
pub const LDD_USERDATA_PROP: &str = "lustre:userdata";
pub const LDD_MOUNTOPTS_PROP: &str = "lustre:mountopts";

/// How a property reaches its LDD field
#[derive(Clone, Copy)]
pub enum FieldAccessor {
    Int {
        get: fn(&LustreDiskData) -> u32,
        set: fn(&mut LustreDiskData, u32),
    },
    Str {
        get: fn(&LustreDiskData) -> &str,
        set: fn(&mut LustreDiskData, String),
    },
}

/// One LDD field with a property of its own, as opposed to the
/// `key=value` pairs globbed into `params`
#[derive(Clone, Copy)]
pub struct PropBridge {
    /// Name shown by `zfs get`
    pub name: &'static str,
    pub field: FieldAccessor,
}

static LDD_PROP_BRIDGE: [PropBridge; 8] = [
    PropBridge {
        name: LDD_VERSION_PROP,
        field: FieldAccessor::Int {
            get: |ldd| ldd.config_ver,
            set: |ldd, v| ldd.config_ver = v,
        },
    },
    PropBridge {
        name: LDD_FLAGS_PROP,
        field: FieldAccessor::Int {
            get: |ldd| ldd.flags.bits(),
            set: |ldd, v| ldd.flags = LddFlags::from_bits_retain(v),
        },
    },
    PropBridge {
        name: LDD_INDEX_PROP,
        field: FieldAccessor::Int {
            get: |ldd| ldd.svindex,
            set: |ldd, v| ldd.svindex = v,
        },
    },
    PropBridge {
        name: LDD_FSNAME_PROP,
        field: FieldAccessor::Str {
            get: |ldd| ldd.fsname.as_str(),
            set: |ldd, v| ldd.fsname = v,
        },
    },
    PropBridge {
        name: LDD_SVNAME_PROP,
        field: FieldAccessor::Str {
            get: |ldd| ldd.svname.as_str(),
            set: |ldd, v| ldd.svname = v,
        },
    },
    PropBridge {
        name: LDD_UUID_PROP,
        field: FieldAccessor::Str {
            get: |ldd| ldd.uuid.as_str(),
            set: |ldd, v| ldd.uuid = v,
        },
    },
    PropBridge {
        name: LDD_USERDATA_PROP,
        field: FieldAccessor::Str {
            get: |ldd| ldd.userdata.as_str(),
            set: |ldd, v| ldd.userdata = v,
        },
    },
    PropBridge {
        name: LDD_MOUNTOPTS_PROP,
        field: FieldAccessor::Str {
            get: |ldd| ldd.mount_opts.as_str(),
            set: |ldd, v| ldd.mount_opts = v,
        },
    },
];

/// Bridge entries in the order they are written
pub fn entries() -> &'static [PropBridge] {
    &LDD_PROP_BRIDGE
}

pub fn lookup(name: &str) -> Option<&'static PropBridge> {
    LDD_PROP_BRIDGE.iter().find(|bridge| bridge.name == name)
}

/// Properties owned by a fixed field never belong to `params`
pub fn is_reserved(name: &str) -> bool {
    lookup(name).is_some()
}

impl PropBridge {
    /// Text stored for this field, `None` for an empty string field
    pub fn encode(&self, ldd: &LustreDiskData) -> Option<String> {
        match self.field {
            FieldAccessor::Int { get, .. } => Some(get(ldd).to_string()),
            FieldAccessor::Str { get, .. } => {
                let value = get(ldd);
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
        }
    }

    /// Store a property value into its field
    pub fn decode(&self, ldd: &mut LustreDiskData, dataset: &str, value: &str) -> Result<()> {
        match self.field {
            FieldAccessor::Int { set, .. } => {
                let parsed = value.trim().parse::<u32>().map_err(|_| ZfsError::InvalidProperty {
                    dataset: dataset.to_string(),
                    property: self.name.to_string(),
                    value: value.to_string(),
                })?;
                set(ldd, parsed);
            }
            FieldAccessor::Str { set, .. } => set(ldd, value.to_string()),
        }
        Ok(())
    }

    /// Write the field to the dataset. Empty strings are not written.
    pub fn write_to<B: ZfsBackend>(
        &self,
        backend: &B,
        dataset: &B::Dataset,
        ldd: &LustreDiskData,
    ) -> Result<()> {
        match self.encode(ldd) {
            Some(value) => {
                debug!("  {}={}", self.name, value);
                backend.set_user_property(dataset, self.name, &value)
            }
            None => Ok(()),
        }
    }

    /// Read the field from the dataset. A missing property leaves the
    /// field untouched and reports `false`.
    pub fn read_from<B: ZfsBackend>(
        &self,
        backend: &B,
        dataset: &B::Dataset,
        ldd: &mut LustreDiskData,
    ) -> Result<bool> {
        match backend.user_property(dataset, self.name)? {
            Some(value) => {
                self.decode(ldd, dataset.name(), &value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

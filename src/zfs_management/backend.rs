// zfs_management/backend.rs
// Storage capability used by the manager, and its libzfs implementation

use super::ffi::*;
use super::helpers::errno_to_string;
use super::types::{DatasetKind, Result, ZfsError};
use std::collections::BTreeMap;
use std::ffi::{c_char, CStr, CString};
use std::ptr;

/// An open dataset. Released when dropped.
pub trait DatasetHandle {
    fn name(&self) -> &str;
    fn kind(&self) -> DatasetKind;
}

/// Dataset and pool access the manager needs from ZFS
pub trait ZfsBackend {
    type Dataset: DatasetHandle;

    /// Open `name` as `kind`, `None` when it does not resolve
    fn open_dataset(&self, name: &str, kind: DatasetKind) -> Result<Option<Self::Dataset>>;

    /// All user properties of the dataset, sorted by name
    fn user_properties(&self, dataset: &Self::Dataset) -> Result<BTreeMap<String, String>>;

    fn user_property(&self, dataset: &Self::Dataset, property: &str) -> Result<Option<String>> {
        Ok(self.user_properties(dataset)?.remove(property))
    }

    fn set_user_property(&self, dataset: &Self::Dataset, property: &str, value: &str)
        -> Result<()>;

    fn destroy_dataset(&self, dataset: Self::Dataset) -> Result<()>;

    fn pool_exists(&self, pool: &str) -> Result<bool>;
}

/// Backend talking to the system libzfs
pub struct LibzfsBackend {
    libzfs: LibzfsGuard,
}

pub struct LibzfsDataset {
    name: String,
    kind: DatasetKind,
    handle: ZfsHandleGuard,
}

impl DatasetHandle for LibzfsDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> DatasetKind {
        self.kind
    }
}

impl LibzfsBackend {
    /// Open a libzfs handle. Fails when the zfs module is not loaded.
    pub fn open() -> Result<Self> {
        let hdl = unsafe { libzfs_sys::libzfs_init() };
        if hdl.is_null() {
            return Err(ZfsError::InitFailed(
                "libzfs_init() returned no handle".to_string(),
            ));
        }
        let libzfs = LibzfsGuard(hdl);

        // Missing datasets are expected during probing
        unsafe { libzfs_print_on_error(libzfs.0, 0) };

        Ok(LibzfsBackend { libzfs })
    }

    /// Description of the last failed library call on this handle
    fn last_error(&self) -> String {
        let (desc, errno) = unsafe {
            let err_ptr = libzfs_sys::libzfs_error_description(self.libzfs.0);
            let desc = if err_ptr.is_null() {
                String::new()
            } else {
                CStr::from_ptr(err_ptr).to_string_lossy().into_owned()
            };
            (desc, libzfs_errno(self.libzfs.0))
        };

        describe_error(&desc, errno)
    }
}

/// Prefer the library's description, fall back to the errno table
pub(crate) fn describe_error(desc: &str, errno: i32) -> String {
    if desc.trim().is_empty() {
        format!("{} (errno {})", errno_to_string(errno), errno)
    } else {
        desc.to_string()
    }
}

fn c_string(value: &str, what: &str) -> Result<CString> {
    CString::new(value)
        .map_err(|_| ZfsError::InvalidArgument(format!("Invalid {} '{}': contains null byte", what, value)))
}

impl ZfsBackend for LibzfsBackend {
    type Dataset = LibzfsDataset;

    fn open_dataset(&self, name: &str, kind: DatasetKind) -> Result<Option<LibzfsDataset>> {
        let c_name = c_string(name, "dataset name")?;

        let zhp = unsafe { zfs_open(self.libzfs.0, c_name.as_ptr(), kind.zfs_type()) };
        if zhp.is_null() {
            return Ok(None);
        }

        Ok(Some(LibzfsDataset {
            name: name.to_string(),
            kind,
            handle: ZfsHandleGuard(zhp),
        }))
    }

    fn user_properties(&self, dataset: &LibzfsDataset) -> Result<BTreeMap<String, String>> {
        let mut properties = BTreeMap::new();

        let props = unsafe { zfs_get_user_props(dataset.handle.0) };
        if props.is_null() {
            return Ok(properties);
        }

        let mut nvp: *mut nvpair_t = ptr::null_mut();
        loop {
            nvp = unsafe { nvlist_next_nvpair(props, nvp) };
            if nvp.is_null() {
                break;
            }

            let name = unsafe { CStr::from_ptr(nvpair_name(nvp)) }
                .to_string_lossy()
                .into_owned();

            let mut propval: *mut nvpair_sys::nvlist_t = ptr::null_mut();
            let ret = unsafe { nvpair_value_nvlist(nvp, &mut propval) };
            if ret != 0 || propval.is_null() {
                return Err(ZfsError::Library {
                    operation: "read property",
                    target: format!("{} {}", dataset.name, name),
                    reason: errno_to_string(ret).to_string(),
                });
            }

            let mut value: *const c_char = ptr::null();
            let ret = unsafe {
                nvlist_lookup_string(propval, ZPROP_VALUE.as_ptr().cast::<c_char>(), &mut value)
            };
            if ret != 0 || value.is_null() {
                return Err(ZfsError::Library {
                    operation: "read property",
                    target: format!("{} {}", dataset.name, name),
                    reason: errno_to_string(ret).to_string(),
                });
            }

            let value = unsafe { CStr::from_ptr(value) }.to_string_lossy().into_owned();
            properties.insert(name, value);
        }

        Ok(properties)
    }

    fn set_user_property(&self, dataset: &LibzfsDataset, property: &str, value: &str) -> Result<()> {
        let c_prop = c_string(property, "property name")?;
        let c_value = c_string(value, "property value")?;

        let ret = unsafe { zfs_prop_set(dataset.handle.0, c_prop.as_ptr(), c_value.as_ptr()) };
        if ret != 0 {
            return Err(ZfsError::Library {
                operation: "set property",
                target: format!("{} {}={}", dataset.name, property, value),
                reason: self.last_error(),
            });
        }

        Ok(())
    }

    fn destroy_dataset(&self, dataset: LibzfsDataset) -> Result<()> {
        let ret = unsafe { zfs_destroy(dataset.handle.0, 0) };
        if ret != 0 {
            return Err(ZfsError::Library {
                operation: "destroy dataset",
                target: dataset.name.clone(),
                reason: self.last_error(),
            });
        }

        // the handle is closed when `dataset` drops
        Ok(())
    }

    fn pool_exists(&self, pool: &str) -> Result<bool> {
        let c_pool = c_string(pool, "pool name")?;

        let php = unsafe { zpool_open_canfail(self.libzfs.0, c_pool.as_ptr()) };
        if php.is_null() {
            return Ok(false);
        }
        let _guard = PoolGuard(php);

        Ok(true)
    }
}

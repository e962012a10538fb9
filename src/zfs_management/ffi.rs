// zfs_management/ffi.rs
// FFI declarations and RAII guards for ZFS operations

use nvpair_sys::nvlist_t;
use std::ffi::{c_char, c_int};

// ============================================================================
// FFI Declarations for dataset handles and user properties
// ============================================================================
// These functions are NOT exposed by libzfs-sys but ARE exported by system libzfs.so
// Verified via: nm -D /lib/x86_64-linux-gnu/libzfs.so | grep -E "zfs_open|zfs_prop_set|zfs_destroy"

/// Opaque handle to a ZFS dataset (libzfs)
#[repr(C)]
pub struct zfs_handle_t {
    _private: [u8; 0],
}

/// Opaque handle to a ZFS pool (libzfs)
#[repr(C)]
pub struct zpool_handle_t {
    _private: [u8; 0],
}

/// Opaque name/value pair inside an nvlist
#[repr(C)]
pub struct nvpair_t {
    _private: [u8; 0],
}

/// zfs_type_t bits, reference: /usr/include/libzfs/sys/fs/zfs.h
pub const ZFS_TYPE_FILESYSTEM: c_int = 1 << 0;
pub const ZFS_TYPE_SNAPSHOT: c_int = 1 << 1;

/// Key of the value entry in a user property nvlist
pub const ZPROP_VALUE: &[u8] = b"value\0";

#[link(name = "zfs")]
extern "C" {
    /// Open a dataset of one of the given types, NULL when it does not resolve
    /// ```c
    /// zfs_handle_t *zfs_open(libzfs_handle_t *, const char *, int);
    /// ```
    pub fn zfs_open(
        hdl: *mut libzfs_sys::libzfs_handle_t,
        path: *const c_char,
        types: c_int,
    ) -> *mut zfs_handle_t;

    /// Close a dataset handle
    pub fn zfs_close(zhp: *mut zfs_handle_t);

    /// Set a (user) property, refreshes the handle's cached properties
    /// ```c
    /// int zfs_prop_set(zfs_handle_t *, const char *propname, const char *propval);
    /// ```
    pub fn zfs_prop_set(
        zhp: *mut zfs_handle_t,
        propname: *const c_char,
        propval: *const c_char,
    ) -> c_int;

    /// Destroy the dataset behind an open handle, `defer` only applies to snapshots
    /// ```c
    /// int zfs_destroy(zfs_handle_t *, boolean_t);
    /// ```
    pub fn zfs_destroy(zhp: *mut zfs_handle_t, defer: c_int) -> c_int;

    /// User properties of the dataset as `name -> { "value": string, "source": string }`
    /// The nvlist is owned by the handle.
    pub fn zfs_get_user_props(zhp: *mut zfs_handle_t) -> *mut nvlist_t;

    /// Open a pool by name, returning NULL on failure (no error printed)
    pub fn zpool_open_canfail(
        hdl: *mut libzfs_sys::libzfs_handle_t,
        name: *const c_char,
    ) -> *mut zpool_handle_t;

    /// Close a pool handle
    pub fn zpool_close(zhp: *mut zpool_handle_t);

    /// errno of the last failed library call on this handle
    pub fn libzfs_errno(hdl: *mut libzfs_sys::libzfs_handle_t) -> c_int;

    /// Toggle printing of library errors to stderr
    pub fn libzfs_print_on_error(hdl: *mut libzfs_sys::libzfs_handle_t, printerr: c_int);
}

#[link(name = "nvpair")]
extern "C" {
    pub fn nvlist_next_nvpair(nvl: *mut nvlist_t, nvp: *mut nvpair_t) -> *mut nvpair_t;

    pub fn nvpair_name(nvp: *mut nvpair_t) -> *const c_char;

    pub fn nvpair_value_nvlist(nvp: *mut nvpair_t, val: *mut *mut nvlist_t) -> c_int;

    pub fn nvlist_lookup_string(
        nvl: *mut nvlist_t,
        name: *const c_char,
        val: *mut *const c_char,
    ) -> c_int;
}

// ============================================================================
// RAII Guards for resource cleanup
// ============================================================================

/// RAII guard for libzfs handle - calls libzfs_fini() on drop
pub struct LibzfsGuard(pub *mut libzfs_sys::libzfs_handle_t);

impl Drop for LibzfsGuard {
    fn drop(&mut self) {
        unsafe { libzfs_sys::libzfs_fini(self.0) }
    }
}

/// RAII guard for zfs dataset handle - calls zfs_close() on drop
pub struct ZfsHandleGuard(pub *mut zfs_handle_t);

impl Drop for ZfsHandleGuard {
    fn drop(&mut self) {
        unsafe { zfs_close(self.0) }
    }
}

/// RAII guard for zpool handle - calls zpool_close() on drop
pub struct PoolGuard(pub *mut zpool_handle_t);

impl Drop for PoolGuard {
    fn drop(&mut self) {
        unsafe { zpool_close(self.0) }
    }
}

// zfs_management/helpers.rs
// Helper functions for ZFS management

/// Longest dataset name ZFS accepts (ZFS_MAX_DATASET_NAME_LEN - 1)
pub const MAX_DATASET_NAME_LEN: usize = 255;

/// Longest user property name ZFS accepts
pub const MAX_PROPERTY_NAME_LEN: usize = 256;

/// Convert errno to descriptive string
pub fn errno_to_string(errno: i32) -> &'static str {
    match errno {
        libc::ENOENT => "dataset or property not found",
        libc::EEXIST => "dataset already exists",
        libc::EBUSY => "dataset is busy",
        libc::EINVAL => "invalid argument",
        libc::EPERM => "permission denied",
        libc::ENOSPC => "no space left on device",
        libc::EDQUOT => "quota exceeded",
        libc::ENOMEM => "out of memory",
        libc::ERANGE => "value out of range",
        _ => "unknown error",
    }
}

/// Pool component of a dataset path, `None` when there is no `/`
pub fn pool_from_dataset(path: &str) -> Option<&str> {
    path.split_once('/').map(|(pool, _)| pool)
}

/// Validate a user property name (`module:property`)
pub fn is_valid_user_property_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_PROPERTY_NAME_LEN || !name.contains(':') {
        return false;
    }
    name.chars().all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | ':' | '-' | '.')
    })
}

/// Validate a filesystem dataset name: `pool[/child...]`
pub fn is_valid_filesystem_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_DATASET_NAME_LEN {
        return false;
    }
    if name.contains('@') || name.contains('#') {
        return false;
    }

    let pool_ok = name.starts_with(|c: char| c.is_ascii_alphabetic());

    pool_ok
        && name.split('/').all(|component| {
            !component.is_empty()
                && component
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | ' '))
        })
}

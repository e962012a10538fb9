// zfs_management/vdev.rs
// Vdev specification tokens and file vdev creation

use super::types::{Result, ZfsError};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Topology keywords accepted by `zpool create`.
/// Matched as prefixes so `raidz2`, `draid1:4d` or `logs` count as well.
pub const RESERVED_VDEV_KEYWORDS: &[&str] = &[
    "disk", "file", "mirror", "raidz", "draid", "spare", "log", "cache", "special", "dedup",
];

/// One token of a `zpool create` vdev specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdevToken<'a> {
    Keyword(&'a str),
    /// Device or file path, may have to be created
    AbsolutePath(&'a Path),
    /// Resolved by `zpool create` itself (e.g. under /dev)
    RelativePath(&'a str),
}

impl<'a> VdevToken<'a> {
    pub fn classify(token: &'a str) -> Self {
        if RESERVED_VDEV_KEYWORDS.iter().any(|kw| token.starts_with(kw)) {
            VdevToken::Keyword(token)
        } else if token.starts_with('/') {
            VdevToken::AbsolutePath(Path::new(token))
        } else {
            VdevToken::RelativePath(token)
        }
    }
}

/// Make sure a vdev token can be handed to `zpool create`.
///
/// A missing absolute path is created as a file of `device_kb` KiB; with no
/// size given the vdev cannot be synthesized.
pub fn create_vdev_if_needed(vdev: &str, device_kb: u64) -> Result<()> {
    let path = match VdevToken::classify(vdev) {
        VdevToken::AbsolutePath(path) => path,
        VdevToken::Keyword(_) | VdevToken::RelativePath(_) => return Ok(()),
    };

    match fs::metadata(path) {
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ZfsError::Io {
                context: format!("Unable to access required vdev {}", vdev),
                source,
            })
        }
    }

    if device_kb == 0 {
        return Err(ZfsError::InvalidArgument(format!(
            "Unable to create vdev {} due to missing --device-size=#N(KB) parameter",
            vdev
        )));
    }

    info!("Creating file vdev {} ({} KB)", vdev, device_kb);
    file_create(path, device_kb).map_err(|source| ZfsError::Io {
        context: format!("Unable to create vdev {}", vdev),
        source,
    })
}

fn file_create(path: &Path, size_kb: u64) -> io::Result<()> {
    let size = size_kb
        .checked_mul(1024)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "vdev size overflows"))?;

    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.set_len(size)?;
    debug!("{} sized to {} bytes", path.display(), size);
    Ok(())
}

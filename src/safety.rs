//! Host Identity Safety Module
//!
//! ZFS only protects a pool against being imported on two hosts at once
//! when the host has a non-zero host id. Targets configured with failover
//! nodes live on shared storage, so writing such a configuration is
//! refused until a host id is set or the caller explicitly overrides.
//!
//! Host id sources, in order:
//! - spl_hostid: module parameter of the SPL kernel module
//! - /etc/hostid: 4 byte binary file, used when the module reports 0

use log::{debug, warn};
use std::fs;
use std::io;
use std::path::Path;

use crate::settings::HostIdSettings;
use crate::zfs_management::{Result, ZfsError};

/// Parameter marking a target as failover capable
pub const PARAM_FAILNODE: &str = "failover.node=";

/// Outcome of a successful host id check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostIdCheck {
    /// No failover nodes configured, nothing to protect
    NotRequired,
    /// Pool import protection is active with this host id
    Protected(u64),
    /// No host id is set but the check was overridden
    Unprotected,
}

/// Verify that a failover-capable configuration has import protection
pub fn check_hostid(
    params: &str,
    allow_missing: bool,
    paths: &HostIdSettings,
) -> Result<HostIdCheck> {
    if !params.contains(PARAM_FAILNODE) {
        return Ok(HostIdCheck::NotRequired);
    }

    let mut hostid = read_spl_hostid(&paths.spl_hostid_path)?;
    if hostid != 0 {
        debug!("spl_hostid is {:#x}", hostid);
        return Ok(HostIdCheck::Protected(hostid));
    }

    hostid = read_hostid_file(&paths.hostid_path);
    if hostid != 0 {
        debug!("{} holds host id {:#x}", paths.hostid_path.display(), hostid);
        return Ok(HostIdCheck::Protected(hostid));
    }

    if allow_missing {
        warn!("spl_hostid not set. ZFS has no zpool import protection");
        Ok(HostIdCheck::Unprotected)
    } else {
        Err(ZfsError::PreconditionFailed(
            "spl_hostid not set; failover targets require a host id for zpool import protection"
                .to_string(),
        ))
    }
}

fn read_spl_hostid(path: &Path) -> Result<u64> {
    let content = fs::read_to_string(path).map_err(|source| ZfsError::Io {
        context: format!("Failed to open spl_hostid {}", path.display()),
        source,
    })?;

    parse_c_ulong(content.trim()).ok_or_else(|| ZfsError::Io {
        context: format!("Failed to read spl_hostid {}", path.display()),
        source: io::Error::new(
            io::ErrorKind::InvalidData,
            format!("'{}' is not a number", content.trim()),
        ),
    })
}

/// A missing or short file reads as 0
fn read_hostid_file(path: &Path) -> u64 {
    match fs::read(path) {
        Ok(bytes) if bytes.len() >= 4 => {
            u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64
        }
        Ok(bytes) => {
            warn!("Failed to read {}: {} bytes", path.display(), bytes.len());
            0
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            0
        }
    }
}

/// Parse an integer the way `%li` does: decimal, `0x` hex or `0` octal
pub fn parse_c_ulong(text: &str) -> Option<u64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<u64>().ok()?
    };

    Some(if negative { value.wrapping_neg() } else { value })
}

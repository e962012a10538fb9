//! # Integration Tests: host id guard
//!
//! Failover targets must not be written on hosts without zpool import
//! protection. Host id sources are redirected to temporary files.

mod common;

use common::{add_dataset, add_pool, manager_with, new_state, properties};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};
use zfs_ldd::safety::check_hostid;
use zfs_ldd::settings::HostIdSettings;
use zfs_ldd::{
    DatasetKind, ErrorKind, HostIdCheck, LddFlags, LustreDiskData, MkfsFlags, MkfsOptions, Settings,
};

const FAILOVER_PARAMS: &str = "failover.node=10.0.0.2@tcp mgsnode=10.0.0.1@tcp";

/// Temporary host id sources; `hostid` of `None` leaves /etc/hostid absent
fn hostid_files(spl: &str, hostid: Option<u32>) -> (TempDir, HostIdSettings) {
    let dir = tempdir().unwrap();
    let paths = HostIdSettings {
        spl_hostid_path: dir.path().join("spl_hostid"),
        hostid_path: dir.path().join("hostid"),
    };
    fs::write(&paths.spl_hostid_path, spl).unwrap();
    if let Some(id) = hostid {
        fs::write(&paths.hostid_path, id.to_ne_bytes()).unwrap();
    }
    (dir, paths)
}

fn failover_ldd() -> LustreDiskData {
    LustreDiskData {
        config_ver: 1,
        flags: LddFlags::SV_TYPE_MDT | LddFlags::SV_TYPE_MGS,
        fsname: "testfs".to_string(),
        svname: "testfs:MDT0000".to_string(),
        params: FAILOVER_PARAMS.to_string(),
        ..Default::default()
    }
}

// -------------------------------------------------------------------------
// Guard decisions
// -------------------------------------------------------------------------

#[test]
fn kernel_hostid_wins_without_reading_fallback() {
    let dir = tempdir().unwrap();
    let spl = dir.path().join("spl_hostid");
    fs::write(&spl, "0x1234abcd\n").unwrap();
    // a directory in place of the fallback file would fail to read
    let paths = HostIdSettings {
        spl_hostid_path: spl,
        hostid_path: dir.path().to_path_buf(),
    };

    let check = check_hostid(FAILOVER_PARAMS, false, &paths).unwrap();
    assert_eq!(check, HostIdCheck::Protected(0x1234abcd));
}

#[test]
fn fallback_hostid_file_is_consulted() {
    let (_dir, paths) = hostid_files("0\n", Some(0x00c0ffee));
    let check = check_hostid(FAILOVER_PARAMS, false, &paths).unwrap();
    assert_eq!(check, HostIdCheck::Protected(0x00c0ffee));
}

#[test]
fn missing_hostid_is_refused() {
    let (_dir, paths) = hostid_files("0\n", None);
    let err = check_hostid(FAILOVER_PARAMS, false, &paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert!(err.to_string().contains("spl_hostid not set"));
}

#[test]
fn zero_hostid_file_is_refused() {
    let (_dir, paths) = hostid_files("0\n", Some(0));
    let err = check_hostid(FAILOVER_PARAMS, false, &paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
}

#[test]
fn override_allows_missing_hostid() {
    let (_dir, paths) = hostid_files("0\n", None);
    let check = check_hostid(FAILOVER_PARAMS, true, &paths).unwrap();
    assert_eq!(check, HostIdCheck::Unprotected);
}

#[test]
fn unreadable_kernel_hostid_is_io_error() {
    let dir = tempdir().unwrap();
    let paths = HostIdSettings {
        spl_hostid_path: dir.path().join("missing"),
        hostid_path: dir.path().join("hostid"),
    };
    let err = check_hostid(FAILOVER_PARAMS, true, &paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoError);
}

#[test]
fn garbage_kernel_hostid_is_io_error() {
    let (_dir, paths) = hostid_files("not-a-number\n", Some(0x1234));
    let err = check_hostid(FAILOVER_PARAMS, true, &paths).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoError);
}

#[test]
fn non_failover_targets_skip_the_check() {
    let paths = HostIdSettings {
        spl_hostid_path: Path::new("/nonexistent/spl_hostid").to_path_buf(),
        hostid_path: Path::new("/nonexistent/hostid").to_path_buf(),
    };
    let check = check_hostid("mgsnode=10.0.0.1@tcp", false, &paths).unwrap();
    assert_eq!(check, HostIdCheck::NotRequired);
}

// -------------------------------------------------------------------------
// Guard in the write and provision paths
// -------------------------------------------------------------------------

fn settings_for(paths: HostIdSettings) -> Settings {
    Settings {
        hostid: paths,
        ..Default::default()
    }
}

#[test]
fn refused_write_sets_no_properties() {
    let (_dir, paths) = hostid_files("0\n", None);
    let state = new_state();
    add_dataset(&state, "lustre/mdt0", DatasetKind::Filesystem, &[]);
    let zfs = manager_with(&state, settings_for(paths));

    let err = zfs
        .write_ldd(&MkfsOptions::new("lustre/mdt0", failover_ldd()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert!(properties(&state, "lustre/mdt0").is_empty());
    assert!(state.lock().unwrap().set_calls.is_empty());
}

#[test]
fn overridden_write_stores_failover_node() {
    let (_dir, paths) = hostid_files("0\n", None);
    let state = new_state();
    add_dataset(&state, "lustre/mdt0", DatasetKind::Filesystem, &[]);
    let zfs = manager_with(&state, settings_for(paths));

    let mut mop = MkfsOptions::new("lustre/mdt0", failover_ldd());
    mop.flags = MkfsFlags::NO_HOSTID_CHECK;
    zfs.write_ldd(&mop).unwrap();

    let props = properties(&state, "lustre/mdt0");
    assert_eq!(
        props.get("lustre:failover.node").map(String::as_str),
        Some("10.0.0.2@tcp")
    );
}

#[test]
fn refused_provision_runs_no_commands() {
    let (_dir, paths) = hostid_files("0\n", None);
    let state = new_state();
    add_pool(&state, "lustre");
    let zfs = manager_with(&state, settings_for(paths));

    let err = zfs
        .provision(&MkfsOptions::new("lustre/mdt0", failover_ldd()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert!(state.lock().unwrap().commands.is_empty());
}

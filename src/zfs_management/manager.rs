// zfs_management/manager.rs
// ZfsManager struct definition, library init and teardown

use super::backend::{LibzfsBackend, ZfsBackend};
use super::types::{Result, ZfsError};
use crate::models::{MkfsFlags, MkfsOptions};
use crate::safety::{self, HostIdCheck};
use crate::settings::Settings;
use crate::utils::{render_command, CommandOutput, CommandRunner, SystemCommandRunner};
use log::{debug, info};

/// Main ZFS management interface
///
/// Owns the library handle from `init` until `fini`. Once torn down every
/// operation fails with `ZfsError::NotReady`.
pub struct ZfsManager<B: ZfsBackend = LibzfsBackend> {
    backend: Option<B>,
    runner: Box<dyn CommandRunner>,
    settings: Settings,
}

impl ZfsManager<LibzfsBackend> {
    /// Initialize the system libzfs, loading the zfs module if needed
    pub fn init(settings: Settings) -> Result<Self> {
        Self::init_with(settings, Box::new(SystemCommandRunner), LibzfsBackend::open)
    }
}

impl<B: ZfsBackend> ZfsManager<B> {
    /// Initialize with a custom backend opener and command runner.
    ///
    /// When the first open fails the zfs module is loaded with
    /// `modprobe -q zfs` and the open is retried exactly once.
    pub fn init_with<F>(settings: Settings, runner: Box<dyn CommandRunner>, mut open: F) -> Result<Self>
    where
        F: FnMut() -> Result<B>,
    {
        let backend = match open() {
            Ok(backend) => backend,
            Err(e) => {
                debug!("{}; trying to load the zfs module", e);

                let args = vec!["-q".to_string(), "zfs".to_string()];
                let command = render_command(&settings.tools.modprobe, &args);
                let output = runner.run(&settings.tools.modprobe, &args).map_err(|e| {
                    ZfsError::InitFailed(format!("unable to run `{}`: {}", command, e))
                })?;
                if !output.success() {
                    return Err(ZfsError::InitFailed(format!(
                        "`{}` exited with status {}",
                        command, output.status
                    )));
                }

                open().map_err(|e| match e {
                    ZfsError::InitFailed(_) => e,
                    other => ZfsError::InitFailed(other.to_string()),
                })?
            }
        };

        info!("ZFS library initialized");
        Ok(ZfsManager {
            backend: Some(backend),
            runner,
            settings,
        })
    }

    /// Release the library handle. Safe to call more than once.
    pub fn fini(&mut self) {
        if self.backend.take().is_some() {
            debug!("ZFS library released");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn backend(&self) -> Result<&B> {
        self.backend.as_ref().ok_or(ZfsError::NotReady)
    }

    /// Refuse failover configurations on hosts without import protection
    pub fn check_hostid(&self, mop: &MkfsOptions) -> Result<HostIdCheck> {
        safety::check_hostid(
            &mop.ldd.params,
            mop.flags.contains(MkfsFlags::NO_HOSTID_CHECK),
            &self.settings.hostid,
        )
    }

    /// Run an external tool, mapping a non-zero exit to `ExternalToolFailed`
    pub(crate) fn run_tool(
        &self,
        operation: &'static str,
        target: &str,
        program: &str,
        args: &[String],
    ) -> Result<CommandOutput> {
        let command = render_command(program, args);
        debug!("mkfs_cmd = {}", command);

        let output = self.runner.run(program, args).map_err(|source| ZfsError::Io {
            context: format!("Unable to run `{}`", command),
            source,
        })?;

        if output.success() {
            Ok(output)
        } else {
            Err(ZfsError::ExternalToolFailed {
                operation,
                target: target.to_string(),
                command,
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

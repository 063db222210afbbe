use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::device_policy::{AdminComponent, DevicePolicy, ForegroundTask};
use crate::notice::{Notice, Notifier};

/// A precondition that refused a kiosk entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    NotDeviceAdmin,
    NotDeviceOwner,
    KioskNotPermitted,
}

impl DenialReason {
    pub fn describe(self) -> &'static str {
        match self {
            DenialReason::NotDeviceAdmin => "the admin receiver is not an active device admin",
            DenialReason::NotDeviceOwner => "the package is not the device owner",
            DenialReason::KioskNotPermitted => "the package is not permitted to run lock-task",
        }
    }
}

/// Outcome of an `enter_kiosk` attempt.
///
/// `Denied` carries every precondition that failed, in check order. Only
/// the final check gates the transition, so `Locked` can be reached even
/// when earlier checks failed and emitted notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockOutcome {
    Locked,
    Denied(Vec<DenialReason>),
}

/// Everything a lock transition needs, passed explicitly.
///
/// The foreground task is non-optional: resolving it belongs to the
/// caller, and a failed resolution is an error at that boundary rather
/// than a fault inside the controller.
pub struct TaskCtx<'a> {
    pub policy: &'a mut dyn DevicePolicy,
    pub task: &'a mut dyn ForegroundTask,
    pub notifier: &'a mut dyn Notifier,
}

/// Guarded UNLOCKED -> LOCKED -> UNLOCKED transitions for one package.
///
/// The controller holds no lock state of its own. The OS is the sole
/// source of truth, and every call re-checks it from scratch.
pub struct KioskController {
    package: String,
    admin: AdminComponent,
}

impl KioskController {
    pub fn new(package: String, admin: AdminComponent) -> Self {
        Self { package, admin }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Attempt the UNLOCKED -> LOCKED transition.
    ///
    /// The three precondition checks run in order, each failure emitting
    /// its notice and falling through to the next check. When the package
    /// holds the device-owner role it is registered as the sole permitted
    /// lock-task package before the final check, so a freshly provisioned
    /// device locks on the first call.
    pub fn enter_kiosk(&self, ctx: &mut TaskCtx<'_>) -> Result<LockOutcome> {
        let mut denied = Vec::new();

        if !ctx
            .policy
            .is_admin_active(&self.admin)
            .context("Device-admin query failed")?
        {
            ctx.notifier.notify(Notice::NotDeviceAdmin)?;
            denied.push(DenialReason::NotDeviceAdmin);
        }

        if ctx
            .policy
            .is_device_owner(&self.package)
            .context("Device-owner query failed")?
        {
            ctx.policy
                .set_lock_task_packages(&self.admin, std::slice::from_ref(&self.package))
                .context("Failed to register the lock-task package")?;
            debug!("Registered {} as the sole lock-task package", self.package);
        } else {
            ctx.notifier.notify(Notice::NotDeviceOwner)?;
            denied.push(DenialReason::NotDeviceOwner);
        }

        if ctx
            .policy
            .is_lock_task_permitted(&self.package)
            .context("Lock-task permission query failed")?
        {
            ctx.task
                .start_lock_task()
                .context("Failed to start the lock task")?;
            info!("Lock task started for {}", self.package);
            Ok(LockOutcome::Locked)
        } else {
            ctx.notifier.notify(Notice::KioskNotPermitted)?;
            denied.push(DenialReason::KioskNotPermitted);
            Ok(LockOutcome::Denied(denied))
        }
    }

    /// LOCKED -> UNLOCKED. Unconditional: no precondition is consulted.
    pub fn exit_kiosk(&self, ctx: &mut TaskCtx<'_>) -> Result<()> {
        ctx.task
            .stop_lock_task()
            .context("Failed to stop the lock task")?;
        info!("Lock task stopped for {}", self.package);
        Ok(())
    }
}

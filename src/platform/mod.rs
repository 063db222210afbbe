//! Platform-specific device-policy backends.

pub mod android;
pub mod mock;

use anyhow::Result;

use crate::device_policy::{DevicePolicy, ForegroundTask};

/// Build the live device-policy backend for this platform.
///
/// Kiosk lock-task is an Android facility; other platforms get a clear
/// error instead of an emulation.
pub fn device_policy() -> Result<Box<dyn DevicePolicy>> {
    #[cfg(target_os = "android")]
    {
        Ok(Box::new(android::ShellDevicePolicy::new()))
    }

    #[cfg(not(target_os = "android"))]
    {
        anyhow::bail!("No device-policy backend for this platform (kiosk lock-task is Android-only)")
    }
}

/// Resolve the current foreground task of `package`.
///
/// Failing to resolve is a hard error: there is no task to pin or unpin,
/// and silently continuing would misreport the lock state.
pub fn foreground_task(package: &str) -> Result<Box<dyn ForegroundTask>> {
    #[cfg(target_os = "android")]
    {
        Ok(Box::new(android::AmForegroundTask::resolve(package)?))
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = package;
        anyhow::bail!("No foreground-task backend for this platform (kiosk lock-task is Android-only)")
    }
}

/// Check if running with sufficient privileges to drive lock-task state
pub fn ensure_admin_privileges() -> Result<()> {
    #[cfg(unix)]
    {
        let euid = unsafe { libc::geteuid() };

        #[cfg(target_os = "android")]
        let permitted = {
            // 2000 is the Android shell user, which may drive `am` and `dumpsys`.
            const ANDROID_SHELL_UID: libc::uid_t = 2000;
            euid == 0 || euid == ANDROID_SHELL_UID
        };
        #[cfg(not(target_os = "android"))]
        let permitted = euid == 0;

        if !permitted {
            anyhow::bail!(
                "This program must be run as root or from a privileged shell. Current EUID: {}",
                euid
            );
        }

        Ok(())
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("Unsupported operating system for lock-task management")
    }
}

//! Android shell backend.
//!
//! Observes the device-policy service by parsing `dumpsys device_policy`
//! and drives task pinning through `am task lock`. Both are
//! shell-reachable surfaces of OS-owned services; nothing here
//! reimplements policy state.

use anyhow::{Context, Result};
use std::process::Command;
use tracing::warn;

use crate::device_policy::{AdminComponent, DevicePolicy, ForegroundTask};

/// Device-policy queries answered from `dumpsys device_policy`.
///
/// The dump is re-read on every query; the service is the sole source of
/// truth and answers must never be cached across calls.
pub struct ShellDevicePolicy;

impl ShellDevicePolicy {
    pub fn new() -> Self {
        Self
    }

    fn dump() -> Result<String> {
        let output = Command::new("dumpsys")
            .arg("device_policy")
            .output()
            .context("Failed to run dumpsys device_policy")?;

        if !output.status.success() {
            anyhow::bail!("dumpsys device_policy exited with {}", output.status);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for ShellDevicePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl DevicePolicy for ShellDevicePolicy {
    fn is_admin_active(&self, admin: &AdminComponent) -> Result<bool> {
        Ok(admin_is_active(&Self::dump()?, admin))
    }

    fn is_device_owner(&self, package: &str) -> Result<bool> {
        Ok(device_owner_package(&Self::dump()?).as_deref() == Some(package))
    }

    fn set_lock_task_packages(
        &mut self,
        admin: &AdminComponent,
        packages: &[String],
    ) -> Result<()> {
        // The allow-list mutation is device-owner app API surface with no
        // shell-reachable equivalent. Leave policy state untouched; the
        // permitted query that follows reads what the OS actually holds.
        warn!(
            "Cannot register lock-task packages {:?} for {} from a shell context",
            packages, admin
        );
        Ok(())
    }

    fn is_lock_task_permitted(&self, package: &str) -> Result<bool> {
        Ok(lock_task_packages(&Self::dump()?).iter().any(|p| p == package))
    }
}

/// Whether the admin component appears among the enabled device admins.
///
/// Admin entries are printed either as a flattened-component heading
/// (`com.example.kiosk/.AdminReceiver:`) or inside a
/// `ComponentInfo{...}` marker, depending on the OS release.
fn admin_is_active(dump: &str, admin: &AdminComponent) -> bool {
    let full = admin.flatten();
    let short = admin.flatten_short();
    let component_info = format!("ComponentInfo{{{}}}", full);

    dump.lines().any(|line| {
        let line = line.trim();
        line.strip_suffix(':')
            .is_some_and(|heading| heading == full || heading == short)
            || line.contains(&component_info)
    })
}

/// Extract the device-owner package from the dump.
///
/// The owner is printed as a `Device Owner:` heading followed by an
/// indented block containing a `package=` line; the block ends at the
/// first blank line.
fn device_owner_package(dump: &str) -> Option<String> {
    let mut in_owner_block = false;
    for line in dump.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("Device Owner:") {
            in_owner_block = true;
            continue;
        }
        if in_owner_block {
            if trimmed.is_empty() {
                return None;
            }
            if let Some(package) = trimmed.strip_prefix("package=") {
                return Some(package.trim().to_string());
            }
        }
    }
    None
}

/// Extract the lock-task allow-list from the dump.
///
/// Printed per user as `mLockTaskPackages[0]: [com.a, com.b]`; only the
/// first (primary-user) entry is consulted.
fn lock_task_packages(dump: &str) -> Vec<String> {
    for line in dump.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("mLockTaskPackages") {
            if let Some((_, list)) = rest.split_once(':') {
                return list
                    .trim()
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .split(',')
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect();
            }
        }
    }
    Vec::new()
}

/// Foreground task handle resolved from `am stack list`.
pub struct AmForegroundTask {
    task_id: i32,
}

impl AmForegroundTask {
    /// Resolve the current foreground task of `package`.
    ///
    /// Errors when the package has no task in the stack list; a lock
    /// transition without a task to pin has nothing to act on.
    pub fn resolve(package: &str) -> Result<Self> {
        let output = Command::new("am")
            .args(["stack", "list"])
            .output()
            .context("Failed to run am stack list")?;

        if !output.status.success() {
            anyhow::bail!("am stack list exited with {}", output.status);
        }

        let listing = String::from_utf8_lossy(&output.stdout).into_owned();
        let task_id = find_task_id(&listing, package)
            .with_context(|| format!("No foreground task found for {}", package))?;

        Ok(Self { task_id })
    }

    fn run_am(args: &[&str]) -> Result<()> {
        let output = Command::new("am")
            .args(args)
            .output()
            .with_context(|| format!("Failed to run am {}", args.join(" ")))?;

        if !output.status.success() {
            anyhow::bail!(
                "am {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(())
    }
}

impl ForegroundTask for AmForegroundTask {
    fn start_lock_task(&mut self) -> Result<()> {
        Self::run_am(&["task", "lock", &self.task_id.to_string()])
    }

    fn stop_lock_task(&mut self) -> Result<()> {
        Self::run_am(&["task", "lock", "stop"])
    }
}

/// Pull the `taskId=` of the first stack entry mentioning `package`.
fn find_task_id(listing: &str, package: &str) -> Option<i32> {
    for line in listing.lines() {
        if !line.contains(package) {
            continue;
        }
        if let Some(rest) = line.split("taskId=").nth(1) {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(id) = digits.parse() {
                return Some(id);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = "\
Current Device Policy Manager state:
  Enabled Device Admins (User 0, provisioningState: 3):
    com.example.kiosk/.AdminReceiver:
      uid=10043
      testOnlyAdmin=false
      policies:
        force-lock

  mLockTaskPackages[0]: [com.example.kiosk]
  mLockTaskFeatures[0]: 16
  Device Owner:
    admin=ComponentInfo{com.example.kiosk/com.example.kiosk.AdminReceiver}
    name=
    package=com.example.kiosk
    isOrganizationOwnedDevice=true

  Profile Owner (User 10):
";

    fn admin() -> AdminComponent {
        AdminComponent::parse("com.example.kiosk/.AdminReceiver").unwrap()
    }

    #[test]
    fn finds_active_admin_by_short_heading() {
        assert!(admin_is_active(DUMP, &admin()));
    }

    #[test]
    fn misses_inactive_admin() {
        let other = AdminComponent::parse("com.other.app/.Receiver").unwrap();
        assert!(!admin_is_active(DUMP, &other));
    }

    #[test]
    fn extracts_device_owner_package() {
        assert_eq!(
            device_owner_package(DUMP).as_deref(),
            Some("com.example.kiosk")
        );
    }

    #[test]
    fn no_device_owner_in_unprovisioned_dump() {
        let dump = "Current Device Policy Manager state:\n  mLockTaskPackages[0]: []\n";
        assert_eq!(device_owner_package(dump), None);
    }

    #[test]
    fn extracts_lock_task_packages() {
        assert_eq!(
            lock_task_packages(DUMP),
            vec!["com.example.kiosk".to_string()]
        );
    }

    #[test]
    fn empty_lock_task_list_parses_to_nothing() {
        let dump = "  mLockTaskPackages[0]: []\n";
        assert!(lock_task_packages(dump).is_empty());
    }

    #[test]
    fn multiple_lock_task_packages_split_on_commas() {
        let dump = "  mLockTaskPackages[0]: [com.a, com.b]\n";
        assert_eq!(
            lock_task_packages(dump),
            vec!["com.a".to_string(), "com.b".to_string()]
        );
    }

    #[test]
    fn resolves_task_id_from_stack_listing() {
        let listing = "\
Stack id=0 bounds=[0,0][1080,1920] displayId=0 userId=0
  taskId=204: com.android.settings/.Settings bounds=[0,0][1080,1920] userId=0 visible=false
  taskId=187: com.example.kiosk/.MainActivity bounds=[0,0][1080,1920] userId=0 visible=true
";
        assert_eq!(find_task_id(listing, "com.example.kiosk"), Some(187));
    }

    #[test]
    fn missing_package_has_no_task_id() {
        let listing = "  taskId=204: com.android.settings/.Settings visible=true\n";
        assert_eq!(find_task_id(listing, "com.example.kiosk"), None);
    }
}

//! Mock device-policy backend for unit tests and dry runs.
//!
//! The live backend shells out to OS services that only exist on a
//! provisioned device. The mock replaces them with in-memory policy
//! state and records every operation so callers can assert exactly what
//! was invoked, in what order.

use anyhow::Result;
use std::sync::Mutex;

use crate::device_policy::{AdminComponent, DevicePolicy, ForegroundTask};
use crate::notice::{Notice, Notifier};

/// One recorded device-policy operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyCall {
    IsAdminActive,
    IsDeviceOwner,
    SetLockTaskPackages(Vec<String>),
    IsLockTaskPermitted,
}

/// In-memory device-policy state.
///
/// Seed the public fields to shape the precondition answers; the
/// registration mutation behaves like the OS and replaces
/// `lock_task_packages`, so a seeded device owner becomes lock-task
/// permitted through the normal chain.
#[derive(Debug, Default)]
pub struct MockDevicePolicy {
    /// Flattened components of active device administrators.
    pub active_admins: Vec<String>,
    /// Package currently holding the device-owner role, if any.
    pub device_owner: Option<String>,
    /// Packages permitted to run lock-task.
    pub lock_task_packages: Vec<String>,
    /// When set, the registration mutation fails.
    pub fail_set_packages: bool,
    /// Record of every operation, in call order.
    pub calls: Mutex<Vec<PolicyCall>>,
}

impl MockDevicePolicy {
    /// Every operation performed so far, in call order.
    pub fn calls(&self) -> Vec<PolicyCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PolicyCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DevicePolicy for MockDevicePolicy {
    fn is_admin_active(&self, admin: &AdminComponent) -> Result<bool> {
        self.record(PolicyCall::IsAdminActive);
        Ok(self.active_admins.iter().any(|a| a == &admin.flatten()))
    }

    fn is_device_owner(&self, package: &str) -> Result<bool> {
        self.record(PolicyCall::IsDeviceOwner);
        Ok(self.device_owner.as_deref() == Some(package))
    }

    fn set_lock_task_packages(
        &mut self,
        _admin: &AdminComponent,
        packages: &[String],
    ) -> Result<()> {
        self.record(PolicyCall::SetLockTaskPackages(packages.to_vec()));
        if self.fail_set_packages {
            anyhow::bail!("mock failure");
        }
        self.lock_task_packages = packages.to_vec();
        Ok(())
    }

    fn is_lock_task_permitted(&self, package: &str) -> Result<bool> {
        self.record(PolicyCall::IsLockTaskPermitted);
        Ok(self.lock_task_packages.iter().any(|p| p == package))
    }
}

/// Foreground task that counts pin transitions instead of touching the OS.
#[derive(Debug, Default)]
pub struct MockForegroundTask {
    pub lock_starts: u32,
    pub lock_stops: u32,
    /// When set, every transition fails.
    pub should_fail: bool,
}

impl ForegroundTask for MockForegroundTask {
    fn start_lock_task(&mut self) -> Result<()> {
        if self.should_fail {
            anyhow::bail!("mock failure");
        }
        self.lock_starts += 1;
        Ok(())
    }

    fn stop_lock_task(&mut self) -> Result<()> {
        if self.should_fail {
            anyhow::bail!("mock failure");
        }
        self.lock_stops += 1;
        Ok(())
    }
}

/// Notifier that collects notices for later assertion or display.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notice: Notice) -> Result<()> {
        self.notices.push(notice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_replaces_the_permitted_list() {
        let admin = AdminComponent::parse("com.example.kiosk/.AdminReceiver").unwrap();
        let mut policy = MockDevicePolicy {
            lock_task_packages: vec!["com.old.kiosk".to_string()],
            ..Default::default()
        };

        policy
            .set_lock_task_packages(&admin, &["com.example.kiosk".to_string()])
            .unwrap();

        assert!(policy.is_lock_task_permitted("com.example.kiosk").unwrap());
        assert!(!policy.is_lock_task_permitted("com.old.kiosk").unwrap());
    }
}

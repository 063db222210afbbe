use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flattened component identity of a registered device administrator,
/// e.g. `com.example.kiosk/com.example.kiosk.AdminReceiver`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdminComponent {
    pub package: String,
    pub receiver: String,
}

impl AdminComponent {
    /// Parse a flattened `package/receiver` string.
    ///
    /// A receiver beginning with `.` is expanded against the package,
    /// matching the OS convention for abbreviated component names.
    pub fn parse(flat: &str) -> Result<Self> {
        let (package, receiver) = flat.split_once('/').ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid admin component '{}': expected package/receiver",
                flat
            )
        })?;

        if package.is_empty() || receiver.is_empty() || receiver == "." {
            anyhow::bail!(
                "Invalid admin component '{}': package and receiver must be non-empty",
                flat
            );
        }

        let receiver = if receiver.starts_with('.') {
            format!("{}{}", package, receiver)
        } else {
            receiver.to_string()
        };

        Ok(Self {
            package: package.to_string(),
            receiver,
        })
    }

    /// Full `package/receiver` form.
    pub fn flatten(&self) -> String {
        format!("{}/{}", self.package, self.receiver)
    }

    /// Abbreviated form with the receiver relative to the package
    /// (`com.example.kiosk/.AdminReceiver`), as some OS dumps print it.
    pub fn flatten_short(&self) -> String {
        match self.receiver.strip_prefix(&self.package) {
            Some(rest) if rest.starts_with('.') => format!("{}/{}", self.package, rest),
            _ => self.flatten(),
        }
    }
}

impl fmt::Display for AdminComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.flatten())
    }
}

/// The OS device-policy service, reduced to the operations kiosk
/// management needs.
///
/// The service itself is OS-owned and is the sole source of truth for
/// lock state and policy configuration; implementations only observe and
/// forward, they never cache answers across calls.
pub trait DevicePolicy {
    /// Whether the given component is an active device administrator.
    fn is_admin_active(&self, admin: &AdminComponent) -> Result<bool>;

    /// Whether the given package holds the device-owner role.
    fn is_device_owner(&self, package: &str) -> Result<bool>;

    /// Replace the set of packages permitted to run in lock-task mode.
    ///
    /// Only meaningful when `admin` belongs to the device owner.
    fn set_lock_task_packages(
        &mut self,
        admin: &AdminComponent,
        packages: &[String],
    ) -> Result<()>;

    /// Whether the given package is currently permitted to run lock-task.
    fn is_lock_task_permitted(&self, package: &str) -> Result<bool>;
}

/// A resolved foreground task whose pin state can be toggled.
///
/// Obtaining one of these is the caller's responsibility; a task handle
/// in hand is always valid to act on.
pub trait ForegroundTask {
    /// Pin the task (enter lock-task mode).
    fn start_lock_task(&mut self) -> Result<()>;

    /// Unpin the task (leave lock-task mode).
    fn stop_lock_task(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_component() {
        let admin = AdminComponent::parse("com.example.kiosk/com.example.kiosk.AdminReceiver")
            .unwrap();
        assert_eq!(admin.package, "com.example.kiosk");
        assert_eq!(admin.receiver, "com.example.kiosk.AdminReceiver");
        assert_eq!(
            admin.flatten(),
            "com.example.kiosk/com.example.kiosk.AdminReceiver"
        );
    }

    #[test]
    fn parse_expands_abbreviated_receiver() {
        let admin = AdminComponent::parse("com.example.kiosk/.AdminReceiver").unwrap();
        assert_eq!(admin.receiver, "com.example.kiosk.AdminReceiver");
        assert_eq!(admin.flatten_short(), "com.example.kiosk/.AdminReceiver");
    }

    #[test]
    fn flatten_short_keeps_foreign_receiver_full() {
        let admin = AdminComponent::parse("com.example.kiosk/org.other.Receiver").unwrap();
        assert_eq!(admin.flatten_short(), "com.example.kiosk/org.other.Receiver");
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(AdminComponent::parse("com.example.kiosk.AdminReceiver").is_err());
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert!(AdminComponent::parse("/receiver").is_err());
        assert!(AdminComponent::parse("com.example.kiosk/").is_err());
        assert!(AdminComponent::parse("com.example.kiosk/.").is_err());
    }
}

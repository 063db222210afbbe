use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Transient user-facing notices emitted when a kiosk precondition fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NotDeviceAdmin,
    NotDeviceOwner,
    KioskNotPermitted,
}

/// Notice text, overridable from the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NoticeText {
    pub not_device_admin: String,
    pub not_device_owner: String,
    pub kiosk_not_permitted: String,
}

impl Default for NoticeText {
    fn default() -> Self {
        Self {
            not_device_admin: "This app is not a device admin".to_string(),
            not_device_owner: "This app is not the device owner".to_string(),
            kiosk_not_permitted: "Kiosk mode is not permitted".to_string(),
        }
    }
}

impl NoticeText {
    /// The message configured for a notice.
    pub fn message(&self, notice: Notice) -> &str {
        match notice {
            Notice::NotDeviceAdmin => &self.not_device_admin,
            Notice::NotDeviceOwner => &self.not_device_owner,
            Notice::KioskNotPermitted => &self.kiosk_not_permitted,
        }
    }
}

/// Sink for transient notices (the toast analogue).
pub trait Notifier {
    fn notify(&mut self, notice: Notice) -> Result<()>;
}

/// Notifier that surfaces notices through the OS notification facility.
///
/// Every notice is also logged, so a headless invocation keeps a trace of
/// which preconditions failed.
pub struct SystemNotifier {
    text: NoticeText,
}

impl SystemNotifier {
    pub fn new(text: NoticeText) -> Self {
        Self { text }
    }
}

impl Notifier for SystemNotifier {
    fn notify(&mut self, notice: Notice) -> Result<()> {
        let message = self.text.message(notice);
        tracing::warn!("{}", message);
        send_system_notification("Kiosk", message)?;
        Ok(())
    }
}

/// Send a system notification (platform-specific)
fn send_system_notification(title: &str, message: &str) -> Result<()> {
    #[cfg(target_os = "android")]
    {
        use std::process::Command;
        Command::new("cmd")
            .args(["notification", "post", "-t", title, "kiosk-lock", message])
            .output()?;
    }

    #[cfg(target_os = "linux")]
    {
        // Use notify-send on Linux
        use std::process::Command;
        Command::new("notify-send")
            .arg(title)
            .arg(message)
            .arg("--urgency=critical")
            .arg("--icon=dialog-warning")
            .output()?;
    }

    #[cfg(target_os = "macos")]
    {
        // Use osascript to display notification on macOS
        use std::process::Command;
        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            message, title
        );
        Command::new("osascript").arg("-e").arg(&script).output()?;
    }

    #[cfg(not(any(target_os = "android", target_os = "linux", target_os = "macos")))]
    {
        tracing::warn!("Notice: {} - {}", title, message);
    }

    Ok(())
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::device_policy::AdminComponent;
use crate::notice::NoticeText;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub device: DeviceConfig,

    #[serde(default)]
    pub notices: NoticeText,
}

/// Identity of the managed kiosk application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Package whose foreground task gets pinned.
    pub package: String,

    /// Flattened admin receiver component. A receiver beginning with `.`
    /// is expanded against the package.
    pub admin_receiver: String,
}

impl Config {
    pub fn admin_component(&self) -> Result<AdminComponent> {
        AdminComponent::parse(&self.device.admin_receiver)
    }
}

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let package = config.device.package.trim();
    if package.is_empty() {
        anyhow::bail!("Configuration must name the kiosk package");
    }
    if package.contains(char::is_whitespace) {
        anyhow::bail!("Invalid package name '{}'", package);
    }

    config
        .admin_component()
        .context("Invalid admin_receiver in configuration")?;

    Ok(())
}

/// Resolve the config file path: the given path if it exists, otherwise
/// the per-user config directory.
pub fn resolve_config_path(cli_path: &Path) -> Result<PathBuf> {
    if cli_path.exists() {
        return Ok(cli_path.to_path_buf());
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "kiosk-lock") {
        let fallback = dirs.config_dir().join("kiosk-lock.yaml");
        if fallback.exists() {
            return Ok(fallback);
        }
    }

    anyhow::bail!(
        "Config file not found: {} (also checked the user config directory)",
        cli_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_a_minimal_config() {
        let file = write_config(
            "device:\n  package: com.example.kiosk\n  admin_receiver: com.example.kiosk/.AdminReceiver\n",
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.device.package, "com.example.kiosk");
        assert_eq!(
            config.admin_component().unwrap().receiver,
            "com.example.kiosk.AdminReceiver"
        );
        // Notices fall back to the shipped strings
        assert_eq!(
            config.notices.not_device_admin,
            "This app is not a device admin"
        );
    }

    #[test]
    fn notice_overrides_replace_the_defaults() {
        let file = write_config(
            "device:\n  package: com.example.kiosk\n  admin_receiver: com.example.kiosk/.AdminReceiver\nnotices:\n  not_device_owner: Provision this device first\n",
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.notices.not_device_owner, "Provision this device first");
        assert_eq!(
            config.notices.kiosk_not_permitted,
            "Kiosk mode is not permitted"
        );
    }

    #[test]
    fn rejects_an_empty_package() {
        let file = write_config(
            "device:\n  package: \"\"\n  admin_receiver: com.example.kiosk/.AdminReceiver\n",
        );
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn rejects_a_malformed_admin_receiver() {
        let file = write_config(
            "device:\n  package: com.example.kiosk\n  admin_receiver: AdminReceiver\n",
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("admin_receiver"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/kiosk-lock.yaml")).is_err());
    }
}

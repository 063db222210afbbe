/// Initialize logging
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

/// Require an elevated caller or exit with a hint
pub fn require_privileges() {
    if let Err(e) = crate::platform::ensure_admin_privileges() {
        eprintln!("Insufficient privileges: {:#}", e);

        #[cfg(unix)]
        eprintln!(
            "Please run with sudo: sudo {}",
            std::env::args().next().unwrap_or_else(|| "kiosk-lock".to_string())
        );

        std::process::exit(1);
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_maps_both_values() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kiosk Lock-Task Controller
///
/// Manages device-owner kiosk (lock-task) mode for a single application
/// package: guarded entry, unconditional exit, and a read-only report of
/// the policy preconditions.
#[derive(Parser, Debug)]
#[command(name = "kiosk-lock")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "kiosk-lock.yaml", global = true)]
    pub config: PathBuf,

    /// Show what would be done without touching the OS task state
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enter kiosk mode (pin the configured package's foreground task)
    Lock,
    /// Exit kiosk mode (unpin the current foreground task)
    Unlock,
    /// Show the device-policy preconditions for kiosk entry
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Dispatch a bridge operation by name, as the UI layer does
    Invoke {
        /// Operation name (lock or unlock)
        op: String,
    },
}

use anyhow::Result;
use clap::Parser;

mod bridge;
mod cli;
mod commands;
mod config;
mod controller;
mod device_policy;
mod notice;
mod platform;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::Args::parse();
    commands::utils::init_logging(args.verbose);

    match &args.command {
        cli::Commands::Lock => commands::run_lock(&args),
        cli::Commands::Unlock => commands::run_unlock(&args),
        cli::Commands::Status { json } => commands::run_status(&args, *json),
        cli::Commands::Invoke { op } => commands::run_invoke(&args, op),
    }
}

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bridge::{BridgeOp, KioskBridge};
use crate::cli::Args;
use crate::config::{self, Config};
use crate::controller::{KioskController, LockOutcome, TaskCtx};
use crate::device_policy::DevicePolicy;
use crate::notice::SystemNotifier;
use crate::platform;
use crate::platform::mock::{MockDevicePolicy, MockForegroundTask, RecordingNotifier};

use super::utils::{require_privileges, yes_no};

/// Read-only snapshot of the three kiosk preconditions.
#[derive(Debug, Serialize)]
pub struct Preconditions {
    pub package: String,
    pub admin_receiver: String,
    pub admin_active: bool,
    pub device_owner: bool,
    pub lock_task_permitted: bool,
    pub checked_at: DateTime<Utc>,
}

impl Preconditions {
    pub fn all_met(&self) -> bool {
        self.admin_active && self.device_owner && self.lock_task_permitted
    }
}

fn load(args: &Args) -> Result<Config> {
    let path = config::resolve_config_path(&args.config)?;
    config::load_config(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn controller_for(config: &Config) -> Result<KioskController> {
    Ok(KioskController::new(
        config.device.package.clone(),
        config.admin_component()?,
    ))
}

fn query_preconditions(policy: &dyn DevicePolicy, config: &Config) -> Result<Preconditions> {
    let admin = config.admin_component()?;
    let package = &config.device.package;

    Ok(Preconditions {
        package: package.clone(),
        admin_receiver: admin.flatten(),
        admin_active: policy.is_admin_active(&admin)?,
        device_owner: policy.is_device_owner(package)?,
        lock_task_permitted: policy.is_lock_task_permitted(package)?,
        checked_at: Utc::now(),
    })
}

/// Seed a mock policy from a live snapshot, so a dry run can walk the
/// full precondition chain without mutating anything.
fn mock_from_snapshot(config: &Config, pre: &Preconditions) -> Result<MockDevicePolicy> {
    let mut mock = MockDevicePolicy::default();
    if pre.admin_active {
        mock.active_admins.push(config.admin_component()?.flatten());
    }
    if pre.device_owner {
        mock.device_owner = Some(config.device.package.clone());
    }
    if pre.lock_task_permitted {
        mock.lock_task_packages.push(config.device.package.clone());
    }
    Ok(mock)
}

/// Enter kiosk mode
pub fn run_lock(args: &Args) -> Result<()> {
    let config = load(args)?;
    let controller = controller_for(&config)?;

    if args.dry_run {
        return dry_run_lock(&config, &controller);
    }

    require_privileges();

    let mut policy = platform::device_policy()?;
    let mut task = platform::foreground_task(&config.device.package)?;
    let mut notifier = SystemNotifier::new(config.notices.clone());

    let outcome = controller.enter_kiosk(&mut TaskCtx {
        policy: policy.as_mut(),
        task: task.as_mut(),
        notifier: &mut notifier,
    })?;

    match outcome {
        LockOutcome::Locked => {
            println!("✓ Kiosk mode entered for {}", config.device.package);
        }
        LockOutcome::Denied(reasons) => {
            println!("✗ Kiosk entry denied:");
            for reason in reasons {
                println!("  - {}", reason.describe());
            }
        }
    }

    Ok(())
}

fn dry_run_lock(config: &Config, controller: &KioskController) -> Result<()> {
    println!("DRY RUN MODE - No changes will be made");
    println!();

    let policy = platform::device_policy()?;
    let pre = query_preconditions(policy.as_ref(), config)?;

    let mut mock = mock_from_snapshot(config, &pre)?;
    let mut task = MockForegroundTask::default();
    let mut notifier = RecordingNotifier::default();

    let outcome = controller.enter_kiosk(&mut TaskCtx {
        policy: &mut mock,
        task: &mut task,
        notifier: &mut notifier,
    })?;

    for notice in &notifier.notices {
        println!("[DRY RUN] Notice: {}", config.notices.message(*notice));
    }
    match outcome {
        LockOutcome::Locked => {
            println!(
                "[DRY RUN] Would pin the foreground task of {}",
                config.device.package
            );
        }
        LockOutcome::Denied(_) => {
            println!("[DRY RUN] Entry would be denied; the task would stay unpinned");
        }
    }

    Ok(())
}

/// Exit kiosk mode
pub fn run_unlock(args: &Args) -> Result<()> {
    let config = load(args)?;
    let controller = controller_for(&config)?;

    if args.dry_run {
        println!("DRY RUN MODE - No changes will be made");
        println!("[DRY RUN] Would unpin the current foreground task");
        return Ok(());
    }

    require_privileges();

    let mut policy = platform::device_policy()?;
    let mut task = platform::foreground_task(&config.device.package)?;
    let mut notifier = SystemNotifier::new(config.notices.clone());

    controller.exit_kiosk(&mut TaskCtx {
        policy: policy.as_mut(),
        task: task.as_mut(),
        notifier: &mut notifier,
    })?;

    println!("✓ Kiosk mode exited");
    Ok(())
}

/// Show the device-policy preconditions for kiosk entry
pub fn run_status(args: &Args, json: bool) -> Result<()> {
    let config = load(args)?;
    let policy = platform::device_policy()?;
    let pre = query_preconditions(policy.as_ref(), &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pre)?);
        return Ok(());
    }

    println!("Kiosk Lock Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Package:        {}", pre.package);
    println!("Admin receiver: {}", pre.admin_receiver);
    println!();
    println!("Device admin active: {}", yes_no(pre.admin_active));
    println!("Device owner:        {}", yes_no(pre.device_owner));
    println!("Lock-task permitted: {}", yes_no(pre.lock_task_permitted));
    println!();

    if pre.all_met() {
        println!("✓ Kiosk entry would succeed");
    } else if pre.device_owner {
        println!("✓ Kiosk entry would succeed (lock-task granted on entry)");
    } else {
        println!("✗ Kiosk entry would be denied");
    }

    println!();
    println!(
        "Checked at: {}",
        pre.checked_at.format("%Y-%m-%d %H:%M:%S %Z")
    );

    Ok(())
}

/// Dispatch a bridge operation by name
pub fn run_invoke(args: &Args, op_name: &str) -> Result<()> {
    let op = BridgeOp::from_name(op_name)?;
    let config = load(args)?;
    let bridge = KioskBridge::new(controller_for(&config)?);

    if args.dry_run {
        println!("DRY RUN MODE - No changes will be made");
        println!("[DRY RUN] Would dispatch '{}'", op);
        return Ok(());
    }

    require_privileges();

    let mut policy = platform::device_policy()?;
    let mut task = platform::foreground_task(&config.device.package)?;
    let mut notifier = SystemNotifier::new(config.notices.clone());

    bridge.dispatch(
        op,
        &mut TaskCtx {
            policy: policy.as_mut(),
            task: task.as_mut(),
            notifier: &mut notifier,
        },
    )
}

use anyhow::Result;
use std::fmt;
use tracing::info;

use crate::controller::{KioskController, LockOutcome, TaskCtx};

/// Operations the UI layer may invoke by name across the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOp {
    Lock,
    Unlock,
}

impl BridgeOp {
    pub const ALL: [BridgeOp; 2] = [BridgeOp::Lock, BridgeOp::Unlock];

    pub fn name(self) -> &'static str {
        match self {
            BridgeOp::Lock => "lock",
            BridgeOp::Unlock => "unlock",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown bridge operation '{}' (expected one of: lock, unlock)",
                    name
                )
            })
    }
}

impl fmt::Display for BridgeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named-operation dispatcher between the UI layer and the controller.
///
/// Operations are zero-argument and fire-and-forget: a denied lock is
/// surfaced to the user through notices, never returned to the caller.
/// Transport failures still propagate.
pub struct KioskBridge {
    controller: KioskController,
}

impl KioskBridge {
    pub fn new(controller: KioskController) -> Self {
        Self { controller }
    }

    pub fn dispatch(&self, op: BridgeOp, ctx: &mut TaskCtx<'_>) -> Result<()> {
        info!("Bridge dispatch: {}", op);
        match op {
            BridgeOp::Lock => {
                match self.controller.enter_kiosk(ctx)? {
                    LockOutcome::Locked => {
                        info!("Kiosk entered for {}", self.controller.package());
                    }
                    LockOutcome::Denied(reasons) => {
                        info!("Kiosk entry denied: {:?}", reasons);
                    }
                }
                Ok(())
            }
            BridgeOp::Unlock => self.controller.exit_kiosk(ctx),
        }
    }
}

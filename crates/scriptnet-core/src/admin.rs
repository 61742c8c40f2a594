//! Operator actions: enable, disable, reload, status.
//!
//! The host's command parser maps `/scriptnet <action>` onto
//! [`AdminAction`] and calls [`AdminCommands::execute`]; the returned
//! [`AdminReply`] tells it what to show the operator.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::capability::{CapabilityGateway, CapabilityState};

/// Minimum host permission level for every admin action.
pub const REQUIRED_PERMISSION_LEVEL: u8 = 2;

/// One of the four operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Enable,
    Disable,
    Reload,
    Status,
}

impl AdminAction {
    pub const ALL: [AdminAction; 4] = [
        AdminAction::Enable,
        AdminAction::Disable,
        AdminAction::Reload,
        AdminAction::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Enable => "enable",
            AdminAction::Disable => "disable",
            AdminAction::Reload => "reload",
            AdminAction::Status => "status",
        }
    }
}

impl FromStr for AdminAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enable" => Ok(AdminAction::Enable),
            "disable" => Ok(AdminAction::Disable),
            "reload" => Ok(AdminAction::Reload),
            "status" => Ok(AdminAction::Status),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Triggers the embedding runtime's own script reload.
pub trait ScriptReloader: Send + Sync {
    fn request_reload(&self);
}

/// Outcome of an admin action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminReply {
    pub success: bool,
    pub message: String,
    /// Whether the host should echo the reply to other operators.
    pub broadcast_to_ops: bool,
}

impl AdminReply {
    fn ok(message: impl Into<String>, broadcast_to_ops: bool) -> Self {
        Self {
            success: true,
            message: message.into(),
            broadcast_to_ops,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            broadcast_to_ops: false,
        }
    }
}

/// Executes admin actions against a capability gateway.
pub struct AdminCommands {
    gateway: Arc<CapabilityGateway>,
    reloader: Arc<dyn ScriptReloader>,
}

impl AdminCommands {
    pub fn new(gateway: Arc<CapabilityGateway>, reloader: Arc<dyn ScriptReloader>) -> Self {
        Self { gateway, reloader }
    }

    /// Run `action` on behalf of a caller with `permission_level`.
    pub fn execute(&self, action: AdminAction, permission_level: u8) -> AdminReply {
        if permission_level < REQUIRED_PERMISSION_LEVEL {
            warn!(action = action.as_str(), permission_level, "admin action denied");
            return AdminReply::fail("You do not have permission to use this command.");
        }

        info!(action = action.as_str(), "admin action");
        match action {
            AdminAction::Enable => {
                if !self.gateway.enable() {
                    return AdminReply::fail("ScriptNet registry is already enabled!");
                }
                AdminReply::ok("ScriptNet registry enabled successfully!", true)
            }
            AdminAction::Disable => {
                if !self.gateway.is_enabled() {
                    return AdminReply::fail("ScriptNet registry is already disabled!");
                }
                self.gateway.disable();
                AdminReply::ok("ScriptNet registry disabled!", true)
            }
            AdminAction::Reload => {
                if !self.gateway.is_enabled() {
                    return AdminReply::fail(
                        "ScriptNet registry is disabled! Enable it first with /scriptnet enable",
                    );
                }
                self.reloader.request_reload();
                AdminReply::ok("ScriptNet bindings reload requested!", true)
            }
            AdminAction::Status => AdminReply::ok(status_line(self.gateway.state()), false),
        }
    }
}

/// Status reply text; color and wording come from the same state read.
fn status_line(state: CapabilityState) -> String {
    let color = match state {
        CapabilityState::Enabled => "&a",
        CapabilityState::Disabled => "&c",
    };
    format!("{color}[ScriptNet] Registry is currently {state}")
}

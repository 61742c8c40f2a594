//! `scriptnet bridge` -- console host around a live chat bridge.
//!
//! Connects the bridge from config, applies the host-ready policy
//! (singleplayer unless `--dedicated`), prints every inbound message as
//! script JSON, and accepts operator input on stdin until Ctrl+C:
//!
//! ```text
//! /scriptnet enable|disable|reload|status
//! send <channel-key> <text>
//! ```

use std::sync::Arc;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{info, warn};

use scriptnet_bindings::{BindingSurface, GatedBridge};
use scriptnet_channels::ChatBridge;
use scriptnet_core::admin::{AdminAction, AdminCommands, ScriptReloader};
use scriptnet_core::broadcast::{FORMAT_PREFIX, translate_color_codes};
use scriptnet_core::{BroadcastGateway, CapabilityGateway, RuntimeMode, SessionRegistry};

use super::load_config;

/// Console operators act with full host permissions.
const CONSOLE_PERMISSION_LEVEL: u8 = 4;

/// Name of the single session the console hosts.
const CONSOLE_SESSION: &str = "console";

/// Arguments for the `scriptnet bridge` subcommand.
#[derive(Args)]
pub struct BridgeArgs {
    /// Treat the host as a dedicated multiplayer server (auto-enables).
    #[arg(long)]
    pub dedicated: bool,

    /// Activity shown on the bot ("Playing ...").
    #[arg(long)]
    pub activity: Option<String>,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// The console as the host's only live session.
struct ConsoleSessions;

impl SessionRegistry for ConsoleSessions {
    fn online_names(&self) -> Vec<String> {
        vec![CONSOLE_SESSION.to_string()]
    }

    fn send(&self, name: &str, text: &str) -> bool {
        if name != CONSOLE_SESSION {
            return false;
        }
        println!("[broadcast] {}", strip_formatting(text));
        true
    }
}

/// The console has no script runtime; reloads are only logged.
struct ConsoleReloader;

impl ScriptReloader for ConsoleReloader {
    fn request_reload(&self) {
        info!("script reload requested");
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ConsoleInput {
    Admin(AdminAction),
    Send { channel_key: String, text: String },
    Empty,
    Unknown(String),
}

fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }
    if let Some(rest) = line.strip_prefix("/scriptnet") {
        return match rest.trim().parse() {
            Ok(action) => ConsoleInput::Admin(action),
            Err(e) => ConsoleInput::Unknown(e),
        };
    }
    if let Some(rest) = line.strip_prefix("send ")
        && let Some((key, text)) = rest.trim_start().split_once(' ')
    {
        return ConsoleInput::Send {
            channel_key: key.to_string(),
            text: text.to_string(),
        };
    }
    ConsoleInput::Unknown(format!("unrecognized input: {line}"))
}

/// Drop formatting directives, `&` or native, for plain terminal output.
fn strip_formatting(text: &str) -> String {
    let translated = translate_color_codes(text);
    let mut out = String::with_capacity(translated.len());
    let mut chars = translated.chars();
    while let Some(c) = chars.next() {
        if c == FORMAT_PREFIX {
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

pub async fn run(args: BridgeArgs) -> anyhow::Result<()> {
    let loaded = load_config(args.config.as_deref())?;
    let runtime = Handle::current();

    let gateway = Arc::new(CapabilityGateway::new(
        BroadcastGateway::new(Arc::new(ConsoleSessions)),
        &loaded.config.gateway,
        runtime.clone(),
    ));
    let admin = AdminCommands::new(gateway.clone(), Arc::new(ConsoleReloader));
    let surface = BindingSurface::from_config(&gateway, &loaded.config.fetch, runtime.clone())?;

    let chat = ChatBridge::connect(loaded.config.bridge.clone(), runtime).await?;
    info!(channels = chat.config().channels.len(), "chat bridge connected");
    chat.on_message(|event| {
        println!("{}", serde_json::to_string(&event.to_script_value())?);
        Ok(())
    });
    let bridge = surface.bridge(chat);

    let mode = if args.dedicated {
        RuntimeMode::DedicatedMultiplayer
    } else {
        RuntimeMode::Singleplayer
    };
    let outcome = gateway.on_host_ready(mode);
    info!(?outcome, "host ready policy applied");

    if let Some(activity) = &args.activity
        && let Err(e) = bridge.set_activity(activity)
    {
        warn!(error = %e, "activity not set");
    }

    println!("type /scriptnet <enable|disable|reload|status>, send <key> <text>, or Ctrl+C to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => handle_input(parse_line(&line), &admin, &bridge),
                None => {
                    // stdin closed; keep serving until interrupted.
                    tokio::signal::ctrl_c().await?;
                    break;
                }
            },
        }
    }

    info!("received shutdown signal");
    gateway.on_host_stopping();
    bridge.shutdown();
    info!("bridge console stopped");
    Ok(())
}

fn handle_input(input: ConsoleInput, admin: &AdminCommands, bridge: &GatedBridge) {
    match input {
        ConsoleInput::Empty => {}
        ConsoleInput::Admin(action) => {
            let reply = admin.execute(action, CONSOLE_PERMISSION_LEVEL);
            println!("{}", strip_formatting(&reply.message));
        }
        ConsoleInput::Send { channel_key, text } => match bridge.send_message(&channel_key, &text) {
            Ok(true) => println!("dispatched to {channel_key}"),
            Ok(false) => println!("not dispatched to {channel_key} (see log)"),
            Err(e) => println!("{e}"),
        },
        ConsoleInput::Unknown(reason) => println!("{reason}"),
    }
}

#[cfg(test)]
mod tests {
    use scriptnet_types::config::CapabilityConfig;

    use super::*;

    #[test]
    fn parses_admin_actions() {
        assert_eq!(parse_line("/scriptnet enable"), ConsoleInput::Admin(AdminAction::Enable));
        assert_eq!(parse_line("  /scriptnet STATUS "), ConsoleInput::Admin(AdminAction::Status));
        assert!(matches!(parse_line("/scriptnet explode"), ConsoleInput::Unknown(_)));
    }

    #[test]
    fn parses_send_lines() {
        assert_eq!(
            parse_line("send chat hello there"),
            ConsoleInput::Send {
                channel_key: "chat".into(),
                text: "hello there".into(),
            }
        );
        assert!(matches!(parse_line("send chat"), ConsoleInput::Unknown(_)));
        assert_eq!(parse_line("   "), ConsoleInput::Empty);
    }

    #[test]
    fn formatting_codes_are_stripped() {
        assert_eq!(strip_formatting("\u{00A7}a[ScriptNet] \u{00A7}lon"), "[ScriptNet] on");
        assert_eq!(strip_formatting("&c[ScriptNet] &Loff"), "[ScriptNet] off");
        assert_eq!(strip_formatting("fish & chips &z"), "fish & chips &z");
    }

    #[tokio::test]
    async fn status_reply_prints_without_color_codes() {
        let gateway = Arc::new(CapabilityGateway::new(
            BroadcastGateway::new(Arc::new(ConsoleSessions)),
            &CapabilityConfig::default(),
            Handle::current(),
        ));
        let admin = AdminCommands::new(gateway.clone(), Arc::new(ConsoleReloader));

        let reply = admin.execute(AdminAction::Status, CONSOLE_PERMISSION_LEVEL);
        assert_eq!(
            strip_formatting(&reply.message),
            "[ScriptNet] Registry is currently disabled"
        );

        gateway.enable();
        let reply = admin.execute(AdminAction::Status, CONSOLE_PERMISSION_LEVEL);
        assert_eq!(
            strip_formatting(&reply.message),
            "[ScriptNet] Registry is currently enabled"
        );
    }

    #[test]
    fn console_session_receives_only_its_name() {
        let sessions = ConsoleSessions;
        assert_eq!(sessions.online_names(), vec!["console"]);
        assert!(sessions.send("console", "hi"));
        assert!(!sessions.send("Steve", "hi"));
    }
}

//! `scriptnet fetch` -- one request through the gated fetch binding.
//!
//! The command stands up a capability gateway, enables it explicitly as an
//! operator would, and performs the request through the binding surface.
//!
//! ```text
//! scriptnet fetch https://example.test/status
//! scriptnet fetch https://example.test/hook -X POST -H 'X-Key: 1' --body '{"a":1}'
//! ```

use std::sync::Arc;

use clap::Args;
use tokio::runtime::Handle;

use scriptnet_bindings::BindingSurface;
use scriptnet_core::broadcast::InMemorySessions;
use scriptnet_core::{BroadcastGateway, CapabilityGateway};
use scriptnet_fetch::FetchOptions;

use super::load_config;

/// Arguments for the `scriptnet fetch` subcommand.
#[derive(Args)]
pub struct FetchArgs {
    /// URL to request.
    pub url: String,

    /// HTTP method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request header as `Name: value` (repeatable).
    #[arg(short = 'H', long)]
    pub header: Vec<String>,

    /// Request body.
    #[arg(long)]
    pub body: Option<String>,

    /// Print response headers.
    #[arg(short, long)]
    pub include: bool,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

pub async fn run(args: FetchArgs) -> anyhow::Result<()> {
    let loaded = load_config(args.config.as_deref())?;
    let options = build_options(&args)?;

    let gateway = CapabilityGateway::new(
        BroadcastGateway::new(Arc::new(InMemorySessions::new())),
        &loaded.config.gateway,
        Handle::current(),
    );
    gateway.enable();
    let surface = BindingSurface::from_config(&gateway, &loaded.config.fetch, Handle::current())?;

    let result = surface.fetch(&args.url, &options).await?;
    println!("{} {}", result.status_code, result.status_text);
    if args.include {
        let mut headers: Vec<_> = result.headers.iter().collect();
        headers.sort();
        for (name, value) in headers {
            println!("{name}: {value}");
        }
        println!();
    }
    println!("{}", result.body_text);
    Ok(())
}

fn build_options(args: &FetchArgs) -> anyhow::Result<FetchOptions> {
    let mut options = FetchOptions::new().method(args.method.as_str());
    for raw in &args.header {
        let Some((name, value)) = raw.split_once(':') else {
            anyhow::bail!("header must look like 'Name: value', got {raw:?}");
        };
        options = options.header(name.trim(), value.trim());
    }
    if let Some(body) = &args.body {
        options = options.body(body.as_str());
    }
    Ok(options)
}

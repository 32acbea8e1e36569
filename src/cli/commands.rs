//! CLI command implementations
//!
//! Both commands follow the same boot sequence:
//! 1. Configuration load
//! 2. Logging install
//! 3. Runtime start
//! 4. Gateway construction over a fresh in-memory store

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::runtime::Runtime;

use crate::config::ShopConfig;
use crate::core::{CoreError, Gateway, Operation};
use crate::mutation::{NewOrder, NewProduct, NewUser};
use crate::observability::init_tracing;
use crate::realtime::{Subscription, Topic};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_lines, write_error, write_event, write_json, write_response};

/// Counts for one `run` session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub events: usize,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Run { config, events } => serve(&config, events),
        Command::Demo { config } => demo(&config),
    }
}

fn boot(config_path: &Path) -> CliResult<(ShopConfig, Runtime)> {
    let config = ShopConfig::load(config_path)?;
    init_tracing(config.log_format);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    tracing::info!(
        reference_policy = ?config.reference_policy,
        subscriber_capacity = config.subscriber_capacity,
        publish_timeout_ms = config.publish_timeout_ms,
        "BOOT_COMPLETE"
    );

    Ok((config, runtime))
}

fn subscribe_all(gateway: &Gateway) -> CliResult<Vec<Subscription>> {
    Topic::all()
        .map(|topic| gateway.notifier().subscribe(topic))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::Runtime(e.to_string()))
}

fn flush_events<W: Write>(subscriptions: &mut [Subscription], out: &mut W) -> CliResult<usize> {
    let mut written = 0;
    for subscription in subscriptions.iter_mut() {
        for event in subscription.drain() {
            write_event(out, event.to_wire_format())?;
            written += 1;
        }
    }
    Ok(written)
}

/// Execute operations from stdin until EOF
pub fn serve(config_path: &Path, events: bool) -> CliResult<()> {
    let (config, runtime) = boot(config_path)?;
    let gateway = Gateway::in_memory(&config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = serve_lines(&runtime, &gateway, stdin.lock(), &mut stdout.lock(), events)?;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        events = summary.events,
        "SESSION_ENDED"
    );

    Ok(())
}

/// Serving loop over any line source and sink.
///
/// A line that fails to decode or execute produces an error response and
/// the loop continues. Only I/O failures end the session early.
pub fn serve_lines<R: BufRead, W: Write>(
    runtime: &Runtime,
    gateway: &Gateway,
    input: R,
    out: &mut W,
    events: bool,
) -> CliResult<SessionSummary> {
    let mut subscriptions = if events {
        subscribe_all(gateway)?
    } else {
        Vec::new()
    };
    let mut summary = SessionSummary::default();

    for line in read_lines(input) {
        let line = line?;

        let result = match serde_json::from_str::<Operation>(&line) {
            Ok(operation) => runtime.block_on(gateway.execute(operation)),
            Err(e) => Err(CoreError::from(e)),
        };

        match result {
            Ok(data) => {
                summary.succeeded += 1;
                write_response(out, data)?;
            }
            Err(e) => {
                summary.failed += 1;
                write_error(out, e.code(), &e.to_string())?;
            }
        }

        summary.events += flush_events(&mut subscriptions, out)?;
    }

    Ok(summary)
}

/// Scripted walkthrough: create, list, resolve, delete, resolve again
pub fn demo(config_path: &Path) -> CliResult<()> {
    let (config, runtime) = boot(config_path)?;
    let gateway = Gateway::in_memory(&config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(run_demo(&gateway, &mut out))
}

fn step<W: Write, T: Serialize>(out: &mut W, name: &str, data: &T) -> CliResult<()> {
    write_json(out, &json!({"step": name, "data": serde_json::to_value(data)?}))
}

/// Demo body, separated from stdout so it can be driven in tests
pub async fn run_demo<W: Write>(gateway: &Gateway, out: &mut W) -> CliResult<()> {
    let mut subscriptions = subscribe_all(gateway)?;
    let mutations = gateway.mutations();

    let product = mutations
        .create_product(NewProduct::new("KeyBoard", 99).with_category("Electronics"))
        .await?;
    step(out, "create_product", &product)?;

    let active = gateway.executor().list_products(true).await?;
    step(out, "list_active_products", &active)?;

    let user = mutations
        .create_user(NewUser::new("user_1", "user_1@example.com"))
        .await?;
    step(out, "create_user", &user)?;

    let order = mutations
        .create_order(NewOrder::new(user.id.clone(), [product.id.clone()], product.price))
        .await?;
    step(out, "create_order", &order)?;

    let resolved: Value = gateway
        .execute(Operation::GetOrder {
            id: order.id.clone(),
        })
        .await?;
    step(out, "get_order", &resolved)?;

    let removed = mutations.delete_user(&user.id).await?;
    step(out, "delete_user", &removed)?;

    let dangling: Value = gateway
        .execute(Operation::GetOrder {
            id: order.id.clone(),
        })
        .await?;
    step(out, "get_order_after_user_delete", &dangling)?;

    flush_events(&mut subscriptions, out)?;
    Ok(())
}

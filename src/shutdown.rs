// src/shutdown.rs
// Interrupt handling for orderly server shutdown

use futures_util::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::time::Duration;

use crate::logger;

/// Once a graceful stop has begun, how long until the process is forced out.
const FORCE_EXIT_AFTER: Duration = Duration::from_secs(10);

/// Wait for SIGINT or SIGTERM.
///
/// The first signal returns control to the caller for a graceful stop. A
/// watchdog keeps listening afterwards: a second signal, or a drain that
/// outlasts [`FORCE_EXIT_AFTER`], exits the process outright so a stuck
/// request can never hold shutdown hostage.
pub async fn wait_for_interrupt() {
    let mut signals = match Signals::new([SIGINT, SIGTERM]) {
        Ok(signals) => signals,
        Err(err) => {
            logger::get_logger().error(&format!("Failed to install signal handlers: {}", err));
            // Without signal delivery there is nothing to wait for; park this
            // future so the serve task keeps the process alive.
            std::future::pending::<()>().await;
            unreachable!();
        }
    };

    signals.next().await;

    tokio::spawn(async move {
        tokio::select! {
            _ = signals.next() => {}
            _ = tokio::time::sleep(FORCE_EXIT_AFTER) => {}
        }
        logger::get_logger().force_shutdown_message();
        std::process::exit(0);
    });
}

//! Basic Action
//!
//! This example wraps a flaky async call in an action tracker and shows how
//! the status signals move.
//!
//! Key concepts:
//! - `is_loading` is set the moment the call starts
//! - Failures come back as `None` and stay in `error`
//! - A later success does not clear `error`
//!
//! Run with: RUST_LOG=liveaction=debug cargo run --example basic_action

use liveaction::{ActionTrackerBuilder, Host};
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    println!("=== Basic Action Example ===\n");

    let host = Host::new("checkout");
    host.activate();

    let tracker = ActionTrackerBuilder::new()
        .action(|amount: u32| async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if amount > 100 {
                Err(format!("amount {amount} exceeds limit"))
            } else {
                Ok(format!("charged {amount}"))
            }
        })
        .host(&host)
        .on_success(|receipt: &String| println!("  on_success: {receipt}"))
        .on_error(|reason: &String| println!("  on_error: {reason}"))
        .build()
        .unwrap();

    println!("Before any call: {:?}", tracker.state());

    let pending = tracker.action(250);
    println!("While pending:   loading={}", tracker.is_loading());
    println!("Result:          {:?}", pending.await);
    println!("After failure:   {:?}", tracker.state());

    let result = tracker.action(40).await;
    println!("Result:          {result:?}");
    println!("After success:   {:?}", tracker.state());

    println!("\nPhase path: {:?}", tracker.history().get_path());

    println!("\n=== Example Complete ===");
}

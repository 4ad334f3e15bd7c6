//! Query Lifecycle
//!
//! This example mounts a query in a host, lets it fetch on activation, then
//! tears the host down while a slow refetch is still in flight.
//!
//! Key concepts:
//! - Queries fetch once when their host activates
//! - Changing args while live triggers one refetch
//! - Completions after teardown write nothing
//! - Snapshots export the observable state as JSON
//!
//! Run with: RUST_LOG=liveaction=debug cargo run --example query_lifecycle

use liveaction::{Host, QueryControllerBuilder, QuerySnapshot};
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

    println!("=== Query Lifecycle Example ===\n");

    let host = Host::new("weather-widget");
    let query = QueryControllerBuilder::new()
        .action(|(city, delay_ms): (String, u64)| async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok::<_, String>(format!("{city}: 21°C"))
        })
        .args(("Lisbon".to_string(), 20))
        .mount(&host)
        .unwrap();

    let mut status = query.subscribe_status();

    println!("Step 1: activate host");
    host.activate();
    status.wait_for(|s| !s.is_loading).await.unwrap();
    println!("  data: {:?}\n", query.data());

    println!("Step 2: change args while live");
    query.set_args(("Porto".to_string(), 20));
    status.wait_for(|s| !s.is_loading).await.unwrap();
    println!("  data: {:?}\n", query.data());

    println!("Step 3: slow refetch, then tear down the host");
    let slow = query.refetch(Some(("Faro".to_string(), 200)));
    host.deactivate();
    if let Some(handle) = slow {
        let _ = handle.await;
    }
    println!("  data after teardown: {:?}", query.data());
    println!("  still loading (frozen): {}\n", query.is_loading());

    let snapshot = query.snapshot();
    match snapshot.to_json_pretty() {
        Ok(json) => println!("Snapshot:\n{json}"),
        Err(e) => println!("Snapshot failed: {e}"),
    }
    if let Ok(bytes) = snapshot.to_binary() {
        let decoded: Result<QuerySnapshot<String, String>, _> = QuerySnapshot::from_binary(&bytes);
        println!("\nBinary snapshot: {} bytes, decodes: {}", bytes.len(), decoded.is_ok());
    }

    println!("\n=== Example Complete ===");
}

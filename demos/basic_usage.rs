// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage of the configuration store.
//!
//! This demo shows:
//! - Layering defaults under environment variables with the builder
//! - Typed reads (string, int, bool, float, duration)
//! - Fallbacks for keys no source defines
//! - Reading a whole subtree as a map
//!
//! To run it:
//! ```bash
//! export DEMO_APP_NAME="MyApplication"
//! export DEMO_DATABASE_PORT="5432"
//! export DEMO_ENABLE_DEBUG="true"
//! export DEMO_API_TIMEOUT="30s"
//!
//! cargo run --example basic_usage
//! ```

#[cfg(feature = "env")]
use std::time::Duration;
#[cfg(feature = "env")]
use tierconf::prelude::*;

#[cfg(feature = "env")]
fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== tierconf: Basic Usage ===\n");

    let mut defaults = ConfigTree::new();
    defaults.insert("app.name".to_string(), ConfigValue::from("DefaultApp"));
    defaults.insert("database.host".to_string(), ConfigValue::from("localhost"));
    defaults.insert("database.port".to_string(), ConfigValue::from(5432));
    defaults.insert("api.timeout".to_string(), ConfigValue::from("10s"));

    // Environment variables under DEMO_ override the defaults
    let store = ConfigStoreBuilder::new()
        .with_defaults(defaults)
        .from_env("DEMO_")
        .build()?;

    println!("Sources in application order: {:?}\n", store.source_names());

    println!("--- Strings ---");
    println!("  app.name        = {}", store.get("app.name").as_string());

    println!("\n--- Integers ---");
    let port = store.get("database.port");
    match port.raw() {
        Some(ConfigValue::Int(n)) => println!("  database.port   = {}", n),
        Some(other) => println!(
            "  database.port   = {} (not an integer, read as {})",
            other.type_name(),
            port.as_int_or(5432)
        ),
        None => println!("  database.port   = <not set>"),
    }

    println!("\n--- Booleans ---");
    let debug = store.get("enable.debug");
    println!(
        "  enable.debug    = {}{}",
        debug.as_bool_or(false),
        if debug.is_set() { "" } else { " (default)" }
    );

    println!("\n--- Floats ---");
    println!("  sample.rate     = {}", store.get("sample.rate").as_float_or(0.25));

    println!("\n--- Durations ---");
    let timeout = store.get("api.timeout").as_duration_or(Duration::from_secs(5));
    println!("  api.timeout     = {:?}", timeout);

    println!("\n--- Subtrees ---");
    for (name, value) in store.get("database").as_map() {
        println!("  database.{:<8}= {}", name, value.as_string());
    }

    println!("\n--- Overrides ---");
    store.set("app.name", "Overridden").wait();
    println!("  app.name        = {}", store.get("app.name").as_string());
    store.load_all()?;
    println!("  after reload    = {}", store.get("app.name").as_string());

    Ok(())
}

#[cfg(not(feature = "env"))]
fn main() {
    eprintln!("Error: This demo requires the 'env' feature.");
    eprintln!("Run with: cargo run --example basic_usage --features env");
    std::process::exit(1);
}

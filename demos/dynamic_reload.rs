// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic configuration reloading.
//!
//! This demo shows:
//! - Loading configuration from a YAML file
//! - Watching the file so edits are applied as soon as they land
//! - A periodic auto-reload as a safety net for missed file events
//! - Change listeners that receive every changed key
//!
//! The demo edits its own scratch file, so it needs no second terminal.
//!
//! To run it:
//! ```bash
//! cargo run --example dynamic_reload --features yaml,watch
//! ```

#[cfg(all(feature = "watch", feature = "yaml"))]
use std::{fs, thread, time::Duration};
#[cfg(all(feature = "watch", feature = "yaml"))]
use tempfile::NamedTempFile;
#[cfg(all(feature = "watch", feature = "yaml"))]
use tierconf::prelude::*;

#[cfg(all(feature = "watch", feature = "yaml"))]
const INITIAL: &str = r#"
app:
  name: MyApp
  port: 8080
  environment: development
database:
  host: localhost
  port: 5432
  max_connections: 10
features:
  logging: true
  metrics: false
"#;

#[cfg(all(feature = "watch", feature = "yaml"))]
const UPDATED: &str = r#"
app:
  name: UpdatedApp
  port: 9000
  environment: staging
database:
  host: db.internal
  port: 5432
  max_connections: 25
features:
  logging: true
  metrics: true
"#;

#[cfg(all(feature = "watch", feature = "yaml"))]
fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== tierconf: Dynamic Reload ===\n");

    let file = NamedTempFile::with_suffix(".yaml")?;
    fs::write(file.path(), INITIAL)?;

    let store = ConfigStoreBuilder::new()
        .from_file(file.path())
        .watch_file(file.path())
        .with_auto_reload(Duration::from_secs(5))
        .with_on_change(|key, value| match value {
            Some(value) => println!("  changed: {:<28} -> {:?}", key, value),
            None => println!("  removed: {}", key),
        })
        .build()?;

    println!("=== Initial Configuration Values ===");
    print_config_values(&store);
    println!("\nAuto-reload: {:?}", store.auto_reload_state());

    println!("\n=== Editing {:?} ===", file.path());
    fs::write(file.path(), UPDATED)?;

    // The watcher debounces file events before reloading
    thread::sleep(Duration::from_secs(2));

    println!("\n=== Updated Configuration Values ===");
    print_config_values(&store);

    println!("\n=== Manual Trigger ===");
    fs::write(file.path(), INITIAL)?;
    store.trigger_reload()?;
    thread::sleep(Duration::from_millis(500));
    print_config_values(&store);

    store.stop_auto_reload();
    println!("\nAuto-reload: {:?}", store.auto_reload_state());
    println!("Demo complete.");

    Ok(())
}

/// Prints the values this demo edits.
#[cfg(all(feature = "watch", feature = "yaml"))]
fn print_config_values(store: &ConfigStore) {
    let keys = [
        "app.name",
        "app.port",
        "app.environment",
        "database.host",
        "database.port",
        "database.max_connections",
        "features.logging",
        "features.metrics",
    ];

    for key in keys {
        let view = store.get(key);
        if view.is_set() {
            println!("  {:<30} = {}", key, view.as_string());
        } else {
            println!("  {:<30} = <not set>", key);
        }
    }
}

#[cfg(not(all(feature = "watch", feature = "yaml")))]
fn main() {
    eprintln!("Error: This demo requires the 'watch' and 'yaml' features.");
    eprintln!("Run with: cargo run --example dynamic_reload --features yaml,watch");
    std::process::exit(1);
}

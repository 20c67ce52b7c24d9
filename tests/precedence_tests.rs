// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration source precedence.

mod common;

#[allow(unused_imports)]
use common::{tree, EnvGuard, MockConfigSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tierconf::prelude::*;

#[test]
fn test_higher_priority_wins_regardless_of_registration_order() {
    for flipped in [false, true] {
        let a = MockConfigSource::new("a", 10).with_value("x", "from_a");
        let b = MockConfigSource::new("b", 20).with_value("x", "from_b");

        let store = ConfigStore::new();
        if flipped {
            store.add_source(b.boxed());
            store.add_source(a.boxed());
        } else {
            store.add_source(a.boxed());
            store.add_source(b.boxed());
        }
        store.load_all().unwrap();

        assert_eq!(store.get("x").as_string(), "from_b");
        assert_eq!(store.source_names(), vec!["a", "b"]);
    }
}

#[test]
fn test_nested_merge_preserves_siblings() {
    let low = MockConfigSource::new("low", 10).with_value("a", ConfigValue::tree([("x", 1)]));
    let high = MockConfigSource::new("high", 20).with_value("a", ConfigValue::tree([("y", 2)]));

    let store = ConfigStoreBuilder::new()
        .with_source(high.boxed())
        .with_source(low.boxed())
        .build()
        .unwrap();

    assert_eq!(
        store.get("a").raw(),
        Some(&ConfigValue::tree([("x", 1), ("y", 2)]))
    );
}

#[test]
fn test_tree_and_scalar_replace_each_other_wholesale() {
    let scalar = MockConfigSource::new("scalar", 10).with_value("a", 5);
    let nested = MockConfigSource::new("nested", 20).with_value("a", ConfigValue::tree([("b", 1)]));
    let store = ConfigStoreBuilder::new()
        .with_source(scalar.boxed())
        .with_source(nested.boxed())
        .build()
        .unwrap();
    assert_eq!(store.get("a").raw(), Some(&ConfigValue::tree([("b", 1)])));

    let nested = MockConfigSource::new("nested", 10).with_value("a", ConfigValue::tree([("b", 1)]));
    let scalar = MockConfigSource::new("scalar", 20).with_value("a", 5);
    let store = ConfigStoreBuilder::new()
        .with_source(nested.boxed())
        .with_source(scalar.boxed())
        .build()
        .unwrap();
    assert_eq!(store.get("a").as_int(), 5);
    assert!(!store.has("a.b"));
}

#[test]
#[cfg(all(feature = "env", feature = "dotenv", feature = "yaml"))]
fn test_builder_bands_order_every_source_kind() {
    let dotenv = common::create_temp_file(".env", "LAYER=dotenv\nDOTENV_ONLY=yes\n");
    let yaml = common::create_temp_file(".yaml", "layer: file\nfile_only: 1\n");

    let mut guard = EnvGuard::new();
    guard.set("TIERCONF_PREC_LAYER", "env");
    guard.set("TIERCONF_PREC_ENVONLY", "true");

    let store = ConfigStoreBuilder::new()
        .from_map(tree(&[("layer", "map")]), "explicit")
        .from_file(yaml.path())
        .from_dotenv(dotenv.path())
        .from_env("TIERCONF_PREC_")
        .with_defaults(tree(&[("layer", "default"), ("default_only", "d")]))
        .build()
        .unwrap();

    assert_eq!(
        store.source_names(),
        vec![
            "defaults".to_string(),
            "env:TIERCONF_PREC_".to_string(),
            format!("dotenv:{}", dotenv.path().display()),
            format!("yaml:{}", yaml.path().display()),
            "explicit".to_string(),
        ]
    );
    assert_eq!(store.get("layer").as_string(), "map");
    assert_eq!(store.get("default_only").as_string(), "d");
    assert!(store.get("envonly").as_bool());
    assert_eq!(store.get("dotenv.only").as_string(), "yes");
    assert_eq!(store.get("file_only").as_int(), 1);
}

#[test]
#[cfg(all(feature = "env", feature = "dotenv"))]
fn test_env_overrides_defaults_but_not_dotenv() {
    let dotenv = common::create_temp_file(".env", "SERVER_PORT=7000\n");

    let mut guard = EnvGuard::new();
    guard.set("TIERCONF_PREC2_SERVER_PORT", "9090");
    guard.set("TIERCONF_PREC2_SERVER_HOST", "example.org");

    let store = ConfigStoreBuilder::new()
        .with_defaults(tree(&[("server.port", 80), ("server.workers", 4)]))
        .from_env("TIERCONF_PREC2_")
        .from_dotenv(dotenv.path())
        .build()
        .unwrap();

    assert_eq!(store.get("server.port").as_int(), 7000);
    assert_eq!(store.get("server.host").as_string(), "example.org");
    assert_eq!(store.get("server.workers").as_int(), 4);
}

#[test]
#[cfg(feature = "env")]
fn test_env_prefix_produces_typed_nested_tree() {
    let mut guard = EnvGuard::new();
    guard.set("TIERCONF_APP_SERVER_PORT", "9090");

    let store = ConfigStoreBuilder::new()
        .from_env("TIERCONF_APP_")
        .build()
        .unwrap();

    assert_eq!(
        store.get("server").raw(),
        Some(&ConfigValue::tree([("port", 9090)]))
    );
    assert_eq!(store.get("server.port").raw(), Some(&ConfigValue::Int(9090)));
}

#[test]
#[cfg(feature = "dotenv")]
fn test_dotenv_type_inference_and_quotes() {
    let dotenv = common::create_temp_file(".env", "DEBUG=true\nNAME=\"John Doe\"\nRETRIES=3\n");
    let store = ConfigStoreBuilder::new()
        .from_dotenv(dotenv.path())
        .build()
        .unwrap();

    assert_eq!(store.get("debug").raw(), Some(&ConfigValue::Bool(true)));
    assert_eq!(store.get("name").raw(), Some(&ConfigValue::from("John Doe")));
    assert_eq!(store.get("retries").raw(), Some(&ConfigValue::Int(3)));
}

#[test]
fn test_duration_defaults_and_conversions() {
    let store = ConfigStoreBuilder::new()
        .with_defaults(tree(&[("numeric", ConfigValue::from(250)), ("text", ConfigValue::from("2h"))]))
        .build()
        .unwrap();

    let five = Duration::from_secs(5);
    assert_eq!(store.get("unset").as_duration_or(five), five);
    assert_eq!(store.get("numeric").as_duration_or(five), Duration::from_millis(250));
    assert_eq!(store.get("text").as_duration_or(five), Duration::from_secs(7200));
}

#[test]
fn test_readers_never_observe_partial_merge() {
    // Two sources that always agree; a reader must never see one without the other.
    let low = MockConfigSource::new("low", 10).with_value("a", 0);
    let high = MockConfigSource::new("high", 20).with_value("b", 0);
    let store = ConfigStoreBuilder::new()
        .with_source(low.boxed())
        .with_source(high.boxed())
        .build()
        .unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                let snapshot = store.all_settings();
                let a = snapshot.get("a").cloned();
                let b = snapshot.get("b").cloned();
                assert_eq!(a, b, "observed a partially merged tree");
            }
        })
    };

    for i in 1..=200 {
        low.set_value("a", i);
        high.set_value("b", i);
        store.load_all().unwrap();
    }
    done.store(true, Ordering::SeqCst);

    reader.join().unwrap();
    assert_eq!(store.get("a").as_int(), 200);
}

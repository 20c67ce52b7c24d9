// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the configuration store.

mod common;

use common::{tree, EnvGuard, MockConfigSource};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tierconf::prelude::*;

fn recording_listener() -> (ChangeListener, Arc<Mutex<BTreeMap<String, Option<ConfigValue>>>>) {
    let seen = Arc::new(Mutex::new(BTreeMap::new()));
    let sink = Arc::clone(&seen);
    let listener: ChangeListener = Arc::new(move |key: &ConfigKey, value: Option<&ConfigValue>| {
        sink.lock()
            .unwrap()
            .insert(key.as_str().to_string(), value.cloned());
    });
    (listener, seen)
}

#[test]
#[cfg(feature = "yaml")]
fn test_yaml_file_end_to_end() {
    let yaml = common::create_temp_file(
        ".yaml",
        r#"
server:
  host: localhost
  port: 8080
  timeout: 30s
features:
  - auth
  - metrics
replicas:
  - host: a.internal
    weight: 1
  - host: b.internal
    weight: 3
debug: false
"#,
    );

    let store = ConfigStoreBuilder::new().from_file(yaml.path()).build().unwrap();

    assert_eq!(store.get("server.host").as_string(), "localhost");
    assert_eq!(store.get("server.port").as_int(), 8080);
    assert_eq!(store.get("server.timeout").as_duration().as_secs(), 30);
    assert!(!store.get("debug").as_bool_or(true));

    let features: Vec<String> = store.get("features").as_list().iter().map(|v| v.as_string()).collect();
    assert_eq!(features, vec!["auth", "metrics"]);

    let replicas = store.get("replicas").as_list();
    assert_eq!(replicas.len(), 2);
    assert_eq!(replicas[1].key().as_str(), "replicas[1]");
    assert_eq!(store.get("replicas[1].host").as_string(), "b.internal");
    assert_eq!(store.get("replicas[1].weight").as_int(), 3);
    assert!(!store.has("replicas[2].host"));
}

#[test]
fn test_struct_decode() {
    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        tls: bool,
    }

    let store = ConfigStoreBuilder::new()
        .with_defaults(tree(&[
            ("server.host", ConfigValue::from("0.0.0.0")),
            ("server.port", ConfigValue::from(8443)),
            ("server.tls", ConfigValue::from(true)),
        ]))
        .build()
        .unwrap();

    let server: Server = store.get("server").as_struct().unwrap();
    assert_eq!(
        server,
        Server {
            host: "0.0.0.0".to_string(),
            port: 8443,
            tls: true,
        }
    );

    assert!(matches!(
        store.get("missing").as_struct::<Server>(),
        Err(ConfigError::ConfigKeyNotFound { .. })
    ));
    assert!(matches!(
        store.get("server.port").as_struct::<Server>(),
        Err(ConfigError::TypeConversionError { .. })
    ));
}

#[test]
fn test_unset_keys_fall_back_to_defaults() {
    let store = ConfigStore::new();
    let view = store.get("nowhere");

    assert!(!view.is_set());
    assert_eq!(view.as_string_or("fallback"), "fallback");
    assert_eq!(view.as_int_or(7), 7);
    assert_eq!(view.as_float_or(1.5), 1.5);
    assert!(view.as_bool_or(true));
    assert!(view.as_list().is_empty());
    assert!(view.as_map().is_empty());
}

#[test]
fn test_load_all_reports_and_notifies_changes() {
    let source = MockConfigSource::new("mock", 10)
        .with_value("server.port", 8080)
        .with_value("stale", "x");
    let store = ConfigStoreBuilder::new().with_source(source.boxed()).build().unwrap();

    let (listener, seen) = recording_listener();
    store.on_change(listener);

    source.set_value("server.port", 9090);
    source.remove_value("stale");
    let report = store.load_all().unwrap();

    assert_eq!(report.changes.len(), 2);
    assert_eq!(report.changes.get("server.port"), Some(Some(&ConfigValue::Int(9090))));
    assert!(report.changes.is_removed("stale"));
    assert_eq!(report.notification.dispatched(), 2);
    assert_eq!(report.notification.wait(), 2);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.get("server.port"), Some(&Some(ConfigValue::Int(9090))));
    assert_eq!(seen.get("stale"), Some(&None));
}

#[test]
fn test_second_load_all_is_a_no_op() {
    let source = MockConfigSource::new("mock", 10).with_value("a", 1);
    let store = ConfigStoreBuilder::new().with_source(source.boxed()).build().unwrap();

    let first = store.load_all().unwrap();
    assert!(first.changes.is_empty());
    let second = store.load_all().unwrap();
    assert!(second.changes.is_empty());
    assert_eq!(second.notification.dispatched(), 0);
}

#[test]
fn test_add_source_tolerates_failure_but_load_all_does_not() {
    let healthy = MockConfigSource::new("healthy", 10).with_value("a", 1);
    let broken = MockConfigSource::new("broken", 20).with_value("b", 2);
    broken.set_failing(true);

    let store = ConfigStoreBuilder::new()
        .with_source(healthy.boxed())
        .with_source(broken.boxed())
        .build()
        .unwrap();
    assert_eq!(store.get("a").as_int(), 1);
    assert!(!store.has("b"));
    assert_eq!(store.source_names(), vec!["healthy", "broken"]);

    healthy.set_value("a", 100);
    let err = store.load_all().unwrap_err();
    assert!(matches!(err, ConfigError::SourceError { ref source_name, .. } if source_name == "broken"));
    assert_eq!(store.get("a").as_int(), 1);

    broken.set_failing(false);
    store.load_all().unwrap();
    assert_eq!(store.get("a").as_int(), 100);
    assert_eq!(store.get("b").as_int(), 2);
}

#[test]
fn test_set_overrides_until_next_reload() {
    let source = MockConfigSource::new("mock", 10).with_value("mode", "file");
    let store = ConfigStoreBuilder::new().with_source(source.boxed()).build().unwrap();

    let (listener, seen) = recording_listener();
    store.on_change(listener);

    assert_eq!(store.set("mode", "manual").wait(), 1);
    assert_eq!(store.get("mode").as_string(), "manual");
    assert_eq!(seen.lock().unwrap().get("mode"), Some(&Some(ConfigValue::from("manual"))));

    let report = store.load_all().unwrap();
    report.notification.wait();
    assert_eq!(store.get("mode").as_string(), "file");
}

#[test]
fn test_require_env() {
    let mut guard = EnvGuard::new();
    guard.set("TIERCONF_IT_PRESENT", "1");

    let store = ConfigStoreBuilder::new()
        .require_env(["TIERCONF_IT_PRESENT"])
        .build()
        .unwrap();
    assert_eq!(store.required_env(), vec!["TIERCONF_IT_PRESENT"]);

    let err = ConfigStoreBuilder::new()
        .require_env(["TIERCONF_IT_PRESENT", "TIERCONF_IT_MISSING_B", "TIERCONF_IT_MISSING_A"])
        .build()
        .unwrap_err();
    match err {
        ConfigError::MissingEnvVars { names } => {
            assert_eq!(names, vec!["TIERCONF_IT_MISSING_A", "TIERCONF_IT_MISSING_B"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_store_behind_trait_object() {
    fn port(service: &dyn ConfigurationService) -> i64 {
        service.get(&ConfigKey::from("server.port")).as_int_or(80)
    }

    let store = ConfigStoreBuilder::new()
        .with_defaults(tree(&[("server.port", 8080)]))
        .build()
        .unwrap();

    assert_eq!(port(&*store), 8080);
    assert!(store.has("server.port"));
    assert_eq!(store.get_str("server.port").as_int(), 8080);
}

#[test]
fn test_all_settings_is_a_deep_copy() {
    let store = ConfigStoreBuilder::new()
        .with_defaults(tree(&[("a.b", 1)]))
        .build()
        .unwrap();

    let mut copy = store.all_settings();
    copy.insert("a".to_string(), ConfigValue::from("clobbered"));

    assert_eq!(store.get("a.b").as_int(), 1);
    assert_eq!(store.get("").raw(), Some(&ConfigValue::Tree(store.all_settings())));
}

//! Full integration tests exercising rebuilds, frozen options and diagnostics together.

use apm_agent_config::diagnostics::{DEFAULT_ORIGIN, REDACTED};
use apm_agent_config::prelude::*;
use parking_lot::RwLock;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

/// Environment stand-in whose contents can change between rebuilds.
#[derive(Clone, Default)]
struct LiveSource(Arc<RwLock<RawValues>>);

impl LiveSource {
    fn set(&self, key: &str, value: &str) {
        self.0.write().insert(key, value);
    }
}

impl ConfigSource for LiveSource {
    fn load(&self) -> Result<RawValues> {
        Ok(self.0.read().clone())
    }

    fn name(&self) -> String {
        "live".to_string()
    }
}

fn live_manager(source: &LiveSource) -> ConfigManager {
    ConfigManager::builder()
        .with_source(RawConfigSourceId::EnvVars, source.clone())
        .build()
        .unwrap()
}

#[cfg(feature = "ini")]
#[test]
fn test_frozen_options_survive_file_rewrite() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("elastic-apm.ini");
    fs::write(
        &path,
        "elastic_apm.enabled = true\n\
         elastic_apm.server_url = http://first:8200\n\
         elastic_apm.log_level = info\n",
    )
    .unwrap();

    let manager = ConfigManager::builder()
        .with_directive_file(&path)
        .with_env_vars(Vec::<(String, String)>::new())
        .build()
        .unwrap();
    assert!(manager.ensure_has_latest_config());
    let first = manager.get();

    // Frozen options only: nothing observable changes.
    fs::write(
        &path,
        "elastic_apm.enabled = false\n\
         elastic_apm.server_url = http://second:8200\n\
         elastic_apm.log_level = info\n",
    )
    .unwrap();
    assert!(!manager.ensure_has_latest_config());
    assert!(Arc::ptr_eq(&first, &manager.get()));

    // A dynamic change publishes, frozen values stay.
    fs::write(
        &path,
        "elastic_apm.enabled = false\n\
         elastic_apm.server_url = http://second:8200\n\
         elastic_apm.log_level = trace\n",
    )
    .unwrap();
    assert!(manager.ensure_has_latest_config());
    let second = manager.get();
    assert_eq!(second.generation(), first.generation() + 1);
    assert_eq!(second.log_level(), Some(LogLevel::Trace));
    assert!(second.enabled());
    assert_eq!(second.server_url(), Some("http://first:8200"));

    // The reader's old snapshot is untouched.
    assert_eq!(first.log_level(), Some(LogLevel::Info));
}

#[test]
fn test_unchanged_rebuild_keeps_snapshot() {
    let source = LiveSource::default();
    source.set("ELASTIC_APM_SERVICE_NAME", "checkout");
    let manager = live_manager(&source);

    assert!(manager.ensure_has_latest_config());
    let first = manager.get();
    for _ in 0..3 {
        assert!(!manager.ensure_has_latest_config());
    }
    let current = manager.get();
    assert!(Arc::ptr_eq(&first, &current));
    assert_eq!(current.fingerprint(), first.fingerprint());
    assert_eq!(current.generation(), 1);
}

#[test]
fn test_fingerprint_tracks_raw_text() {
    let source = LiveSource::default();
    source.set("ELASTIC_APM_TRANSACTION_MAX_SPANS", "10");
    let manager = live_manager(&source);
    manager.ensure_has_latest_config();
    let before = manager.get().fingerprint().to_string();

    // Same parsed value, different text.
    source.set("ELASTIC_APM_TRANSACTION_MAX_SPANS", "010");
    assert!(manager.ensure_has_latest_config());
    assert_ne!(manager.get().fingerprint(), before);
    assert_eq!(manager.get().transaction_max_spans(), 10);
}

#[test]
fn test_invalid_value_falls_back_to_default() {
    let source = LiveSource::default();
    source.set("ELASTIC_APM_TRANSACTION_SAMPLE_RATE", "1.5");
    source.set("ELASTIC_APM_STACK_TRACE_LIMIT", "ten");
    let manager = live_manager(&source);
    manager.ensure_has_latest_config();

    let config = manager.get();
    assert_eq!(config.transaction_sample_rate(), 1.0);
    assert_eq!(config.stack_trace_limit(), 50);
    assert!(matches!(
        config.option(OptionId::TransactionSampleRate).status,
        OptionStatus::Invalid { .. }
    ));

    let report = manager.diagnostics();
    let rate = report.option("transaction_sample_rate").unwrap();
    assert_eq!(rate.source, DEFAULT_ORIGIN);
    assert_eq!(rate.raw_value.as_deref(), Some("1.5"));
    assert_eq!(rate.rejected_source, Some(RawConfigSourceId::EnvVars));

    let text = report.to_string();
    assert!(text.contains("Rejected values (defaults used instead):"));
    assert!(text.contains("stack_trace_limit from Environment variables:"));
}

#[test]
fn test_secrets_are_redacted_everywhere() {
    let source = LiveSource::default();
    source.set("ELASTIC_APM_SECRET_TOKEN", "t0ken-value");
    source.set("ELASTIC_APM_API_KEY", "key-value");
    let manager = live_manager(&source);
    manager.ensure_has_latest_config();

    // The typed accessor is for the agent itself and is not redacted.
    assert_eq!(manager.get().secret_token(), Some("t0ken-value"));

    assert_eq!(
        manager.option_value_by_name("SECRET_TOKEN").as_deref(),
        Some(REDACTED)
    );
    assert_eq!(manager.option_value_by_name("api_key").as_deref(), Some(REDACTED));
    assert_eq!(manager.option_value_by_name("no_such_option"), None);

    let text = manager.diagnostics().to_string();
    assert!(!text.contains("t0ken-value"));
    assert!(!text.contains("key-value"));
    assert!(text.contains(REDACTED));
}

#[test]
fn test_per_source_tables() {
    let source = LiveSource::default();
    source.set("ELASTIC_APM_LOG_LEVEL", "warning");
    let manager = live_manager(&source);
    manager.ensure_has_latest_config();

    // Changed after the build: shows as current, not as used.
    source.set("ELASTIC_APM_LOG_LEVEL", "error");

    let report = manager.diagnostics();
    let env = report.source(RawConfigSourceId::EnvVars).unwrap();
    assert_eq!(env.description, "Environment variables");
    let row = env
        .rows
        .iter()
        .find(|row| row.name == "ELASTIC_APM_LOG_LEVEL")
        .unwrap();
    assert_eq!(row.used_raw.as_deref(), Some("warning"));
    assert_eq!(row.current.as_deref(), Some("error"));

    let file = report.source(RawConfigSourceId::DirectiveFile).unwrap();
    assert!(file.rows.iter().any(|row| row.name == "elastic_apm.log_level"));
    assert!(file.rows.iter().all(|row| row.current.is_none()));

    assert_eq!(
        manager.read_current_raw(OptionId::LogLevel, RawConfigSourceId::EnvVars),
        Some("error".to_string())
    );
}

#[test]
fn test_logging_only_mode() {
    let source = LiveSource::default();
    source.set("ELASTIC_APM_LOG_LEVEL", "debug");
    source.set("ELASTIC_APM_SERVICE_NAME", "checkout");
    let manager = ConfigManager::builder()
        .with_source(RawConfigSourceId::EnvVars, source.clone())
        .logging_only()
        .build()
        .unwrap();
    assert_eq!(manager.mode(), ManagerMode::LoggingOnly);

    manager.ensure_has_latest_config();
    let config = manager.get();
    assert_eq!(config.log_level(), Some(LogLevel::Debug));
    assert_eq!(config.service_name(), None);
}

#[test]
fn test_readers_keep_their_snapshot_across_publishes() {
    let source = LiveSource::default();
    source.set("ELASTIC_APM_TRANSACTION_MAX_SPANS", "0");
    let manager = live_manager(&source);
    manager.ensure_has_latest_config();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = manager.get();
                    let spans = snapshot.transaction_max_spans();
                    let generation = snapshot.generation();
                    thread::yield_now();
                    // The held snapshot never changes underneath the reader.
                    assert_eq!(snapshot.transaction_max_spans(), spans);
                    assert_eq!(snapshot.generation(), generation);
                }
            })
        })
        .collect();

    for spans in 1..=50 {
        source.set("ELASTIC_APM_TRANSACTION_MAX_SPANS", &spans.to_string());
        assert!(manager.ensure_has_latest_config());
    }

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(manager.get().transaction_max_spans(), 50);
    assert_eq!(manager.get().generation(), 51);
}

fn rebuild_concurrently(manager: &ConfigManager, threads: usize) -> usize {
    (0..threads)
        .map(|_| {
            let manager = manager.clone();
            thread::spawn(move || manager.ensure_has_latest_config())
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| usize::from(handle.join().unwrap()))
        .sum()
}

#[test]
fn test_concurrent_rebuilds_publish_once() {
    let source = LiveSource::default();
    let manager = live_manager(&source);
    manager.ensure_has_latest_config();

    source.set("ELASTIC_APM_TRANSACTION_MAX_SPANS", "7");
    assert_eq!(rebuild_concurrently(&manager, 8), 1);
    assert_eq!(manager.get().generation(), 2);
    assert_eq!(manager.get().transaction_max_spans(), 7);

    // Frozen options only: no thread publishes.
    source.set("ELASTIC_APM_ENVIRONMENT", "staging");
    source.set("ELASTIC_APM_ENABLED", "false");
    assert_eq!(rebuild_concurrently(&manager, 8), 0);
    assert_eq!(manager.get().generation(), 2);
    assert!(manager.get().enabled());
}

//! Integration tests for the lambda logger
//!
//! These tests verify:
//! - Level precedence across every configuration source
//! - Sampling behaviour
//! - Attribute merge order and persistent attribute lifecycle
//! - Serialization of cyclic objects, big integers and error chains
//! - Handler wrapping: state restore, error propagation, cancellation
//! - Child loggers and cold start tracking

use rust_lambda_logger::attributes;
use rust_lambda_logger::core::{ColdStart, InjectLambdaContextOptions, SharedObject};
use rust_lambda_logger::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn env(vars: &[(&str, &str)]) -> EnvironmentVariablesService {
    EnvironmentVariablesService::from_vars(vars.iter().copied())
}

fn build(builder: LoggerBuilder, vars: &[(&str, &str)]) -> (Logger, MemoryAppender) {
    let memory = MemoryAppender::new();
    let logger = builder
        .environment_variables(env(vars))
        .cold_start(Arc::new(ColdStart::new()))
        .appender(memory.clone())
        .build();
    (logger, memory)
}

struct FixedConfig(&'static [(&'static str, &'static str)]);

impl ConfigService for FixedConfig {
    fn get(&self, name: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn test_level_precedence_across_sources() {
    let config = FixedConfig(&[("LOG_LEVEL", "WARN")]);

    let (logger, _) = build(
        Logger::builder().log_level("ERROR").config_service(FixedConfig(&[("LOG_LEVEL", "WARN")])),
        &[("LOG_LEVEL", "DEBUG")],
    );
    assert_eq!(logger.level(), LogLevel::Error);

    let (logger, _) = build(Logger::builder().config_service(config), &[("LOG_LEVEL", "DEBUG")]);
    assert_eq!(logger.level(), LogLevel::Warn);

    let (logger, _) = build(Logger::builder(), &[("LOG_LEVEL", "DEBUG")]);
    assert_eq!(logger.level(), LogLevel::Debug);

    let (logger, _) = build(Logger::builder().log_level("LOUD"), &[("LOG_LEVEL", "QUIET")]);
    assert_eq!(logger.level(), LogLevel::Info);
}

#[test]
fn test_platform_level_overrides_everything() {
    let (logger, memory) = build(
        Logger::builder().log_level("ERROR"),
        &[("AWS_LAMBDA_LOG_LEVEL", "DEBUG"), ("LOG_LEVEL", "WARN")],
    );

    assert_eq!(logger.level(), LogLevel::Debug);
    let warning = &memory.records()[0];
    assert_eq!(warning["level"], "WARN");
    assert_eq!(
        warning["message"],
        "Current log level (ERROR) does not match AWS Lambda Advanced Logging Controls minimum \
         log level (DEBUG). This can lead to data loss, consider adjusting them."
    );
}

#[test]
fn test_platform_fatal_maps_to_critical() {
    let (logger, _) = build(Logger::builder(), &[("AWS_LAMBDA_LOG_LEVEL", "FATAL")]);
    assert_eq!(logger.level(), LogLevel::Critical);
}

#[test]
fn test_invalid_explicit_level_fails() {
    let (logger, _) = build(Logger::builder(), &[]);
    let err = logger.set_log_level("VERBOSE").unwrap_err();
    assert!(matches!(err, LoggerError::InvalidLevel { ref level } if level == "VERBOSE"));
}

#[test]
fn test_level_name_round_trip() {
    let (logger, _) = build(Logger::builder(), &[]);
    for level in LogLevel::ALL {
        logger.set_log_level(level.to_str()).unwrap();
        assert_eq!(logger.level_name(), level.to_str());
    }
}

#[test]
fn test_sample_rate_precedence() {
    let (logger, _) = build(
        Logger::builder()
            .sample_rate_value(0.0)
            .config_service(FixedConfig(&[("POWERTOOLS_LOGGER_SAMPLE_RATE", "1")])),
        &[("POWERTOOLS_LOGGER_SAMPLE_RATE", "1")],
    );
    assert_eq!(logger.sample_rate_value(), 0.0);
    assert_eq!(logger.level(), LogLevel::Info);

    let (logger, memory) = build(
        Logger::builder().config_service(FixedConfig(&[("POWERTOOLS_LOGGER_SAMPLE_RATE", "1")])),
        &[("POWERTOOLS_LOGGER_SAMPLE_RATE", "0")],
    );
    assert_eq!(logger.sample_rate_value(), 1.0);
    assert_eq!(logger.level(), LogLevel::Debug);
    assert_eq!(memory.entries()[0].0, LogLevel::Debug);
}

#[test]
fn test_out_of_range_sample_rate_never_forces_debug() {
    for _ in 0..50 {
        let (logger, memory) = build(Logger::builder().sample_rate_value(1.5), &[]);
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(memory.is_empty());
    }
}

#[test]
fn test_sampling_reported_on_every_record() {
    let (logger, memory) = build(Logger::builder().sample_rate_value(0.25), &[]);
    logger.set_log_level("INFO").unwrap();
    logger.info("with rate");

    let record = memory.records().pop().unwrap();
    assert_eq!(record["sampling_rate"], 0.25);
}

#[test]
fn test_merge_precedence() {
    let (logger, memory) = build(Logger::builder(), &[]);
    logger.append_keys(attributes! { "a" => 1, "b" => 1 });

    logger.info_with(
        attributes! { "message" => "merged", "b" => 2 },
        vec![attributes! { "c" => 3 }.into(), "str".into()],
    );

    let record = &memory.records()[0];
    assert_eq!(record["message"], "merged");
    assert_eq!(record["a"], 1);
    assert_eq!(record["b"], 2);
    assert_eq!(record["c"], 3);
    assert_eq!(record["extra"], "str");
}

#[test]
fn test_nested_merge_is_deep() {
    let (logger, memory) = build(Logger::builder(), &[]);
    logger.append_keys(attributes! {
        "request" => attributes! { "id" => "r-1", "tags" => vec!["a", "b"] },
    });

    logger.info_with(
        "nested",
        vec![attributes! { "request" => attributes! { "tags" => vec!["z"] } }.into()],
    );

    let record = &memory.records()[0];
    assert_eq!(record["request"]["id"], "r-1");
    assert_eq!(record["request"]["tags"], serde_json::json!(["z"]));
}

#[test]
fn test_cyclic_attribute_is_omitted() {
    let (logger, memory) = build(Logger::builder(), &[]);
    let node = SharedObject::new(attributes! { "name" => "loop" });
    node.insert("self", node.clone());

    logger.info_with("cycle", vec![attributes! { "node" => node }.into()]);

    let record = &memory.records()[0];
    assert_eq!(record["node"]["name"], "loop");
    assert!(record["node"].get("self").is_none());
}

#[test]
fn test_big_integer_serializes_as_decimal_string() {
    let (logger, memory) = build(Logger::builder(), &[]);
    logger.info_with("big", vec![attributes! { "n" => 1i128 << 80 }.into()]);

    assert_eq!(memory.records()[0]["n"], "1208925819614629174706176");
}

#[test]
fn test_error_cause_chain_depth_three() {
    let (logger, memory) = build(Logger::builder(), &[]);
    let err = ErrorValue::new("RequestError", "request failed").with_cause(
        ErrorValue::new("ConnectionError", "connection reset")
            .with_cause(ErrorValue::new("SocketError", "broken pipe")),
    );

    logger.error_with("failed", vec![err.into()]);

    let error = &memory.records()[0]["error"];
    let levels = [error, &error["cause"], &error["cause"]["cause"]];
    let names: Vec<&str> = levels.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["RequestError", "ConnectionError", "SocketError"]);
    for level in levels {
        assert!(level["message"].is_string());
        assert!(level["location"].as_str().unwrap().contains("integration_tests.rs"));
    }
}

#[test]
fn test_std_error_conversion() {
    #[derive(Debug, thiserror::Error)]
    #[error("could not load order")]
    struct LoadError(#[source] std::io::Error);

    let (logger, memory) = build(Logger::builder(), &[]);
    let err = LoadError(std::io::Error::new(std::io::ErrorKind::NotFound, "missing row"));
    logger.error_with("load failed", vec![ErrorValue::from_error(&err).into()]);

    let error = &memory.records()[0]["error"];
    assert_eq!(error["name"], "LoadError");
    assert_eq!(error["cause"]["message"], "missing row");
}

#[test]
fn test_caller_held_object_cannot_change_logger_state() {
    let (logger, memory) = build(Logger::builder(), &[]);
    let held = SharedObject::new(attributes! { "x" => 1 });

    logger.append_keys(attributes! { "o" => held.clone() });
    held.insert("x", 2);
    logger.info("logged");

    assert_eq!(memory.records()[0]["o"]["x"], 1);
}

#[test]
fn test_remove_missing_key_is_noop() {
    let (logger, _) = build(Logger::builder(), &[]);
    let node = SharedObject::new(attributes! { "name" => "loop" });
    node.insert("self", node.clone());
    logger.append_keys(attributes! { "a" => 1, "node" => node });
    let before = logger.persistent_log_attributes();

    logger.remove_persistent_log_attributes(["does_not_exist"]);
    assert_eq!(logger.persistent_log_attributes(), before);
}

#[test]
fn test_clear_state_between_invocations() {
    let (logger, memory) = build(Logger::builder(), &[]);
    logger.append_keys(attributes! { "static" => "kept" });
    let options = InjectLambdaContextOptions::default().clear_state();

    for request in ["req-1", "req-2"] {
        logger.with_lambda_context(&(), &LambdaContext::new(request, "fn"), options, || {
            logger.append_keys(attributes! { request => true });
            logger.info("handling");
        });
    }

    let records = memory.records();
    assert_eq!(records[0]["static"], "kept");
    assert_eq!(records[0]["req-1"], true);
    assert!(records[1].get("req-1").is_none());
    assert_eq!(records[1]["req-2"], true);
    assert_eq!(records[0]["cold_start"], true);
    assert_eq!(records[1]["cold_start"], false);
}

#[tokio::test]
async fn test_handler_error_propagates_unchanged() {
    let (logger, _) = build(Logger::builder(), &[]);
    let inner = logger.clone();
    let handler = logger.inject_lambda_context(
        move |_event: (), _context: LambdaContext| {
            let inner = inner.clone();
            async move {
                inner.append_keys(attributes! { "during" => true });
                Err::<(), _>(LoggerError::invalid_level("LOUD"))
            }
        },
        InjectLambdaContextOptions::default().clear_state(),
    );

    logger.append_keys(attributes! { "before" => 1 });
    let result = handler.call((), LambdaContext::new("req", "fn")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, LoggerError::InvalidLevel { ref level } if level == "LOUD"));
    let attrs = logger.persistent_log_attributes();
    assert!(!attrs.contains_key("during"));
    assert_eq!(attrs["before"], AttributeValue::Int(1));
}

#[tokio::test]
async fn test_cancelled_invocation_restores_state() {
    let (logger, _) = build(Logger::builder(), &[]);
    let inner = logger.clone();
    let handler = logger.inject_lambda_context(
        move |_event: (), _context: LambdaContext| {
            let inner = inner.clone();
            async move {
                inner.append_keys(attributes! { "in_flight" => true });
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        },
        InjectLambdaContextOptions::default().clear_state(),
    );

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        handler.call((), LambdaContext::new("req", "fn")),
    )
    .await;

    assert!(outcome.is_err());
    assert!(logger.persistent_log_attributes().is_empty());
}

#[test]
fn test_wrapped_handler_with_tokio_test() {
    let (logger, memory) = build(Logger::builder(), &[]);
    let handler = logger.inject_lambda_context(
        |event: serde_json::Value, context: LambdaContext| async move {
            format!("{}:{}", context.function_name, event["id"])
        },
        InjectLambdaContextOptions::default().log_event(true),
    );

    let output = tokio_test::block_on(
        handler.call(serde_json::json!({ "id": 5 }), LambdaContext::new("req", "orders")),
    );

    assert_eq!(output, "orders:5");
    assert_eq!(memory.records()[0]["event"]["id"], 5);
}

#[test]
fn test_child_logger_isolation() {
    let (parent, memory) = build(Logger::builder().service_name("parent"), &[]);
    parent.append_keys(attributes! { "shared" => "yes" });
    parent.add_context(&LambdaContext::new("req-1", "fn"));

    let child = parent.create_child(LoggerOptions {
        log_level: Some("ERROR".to_string()),
        ..Default::default()
    });
    child.append_keys(attributes! { "child" => true });
    parent.remove_keys(["shared"]);

    child.info("suppressed by child level");
    child.error("child");
    parent.info("parent");

    let records = memory.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["service"], "parent");
    assert_eq!(records[0]["shared"], "yes");
    assert_eq!(records[0]["function_request_id"], "req-1");
    assert!(records[1].get("child").is_none());
    assert!(records[1].get("shared").is_none());
}

#[test]
fn test_cold_start_shared_across_clones_and_children() {
    let (logger, memory) = build(Logger::builder(), &[]);
    let clone = logger.clone();
    let child = logger.create_child(LoggerOptions::default());
    let context = LambdaContext::new("req", "fn");

    child.add_context(&context);
    clone.add_context(&context);
    child.info("child");
    logger.info("original");

    let records = memory.records();
    assert_eq!(records[0]["cold_start"], true);
    assert_eq!(records[1]["cold_start"], false);
}

#[test]
fn test_dev_mode_pretty_prints() {
    let (logger, memory) = build(Logger::builder(), &[("POWERTOOLS_DEV", "yes")]);
    logger.info("pretty");

    let line = memory.lines().pop().unwrap();
    assert!(line.lines().count() > 1);
    assert!(line.contains("\n    \"message\": \"pretty\""));
}

#[test]
fn test_error_levels_route_by_level() {
    let (logger, memory) = build(Logger::builder(), &[]);
    logger.warn("w");
    logger.critical("c");

    let levels: Vec<LogLevel> = memory.entries().into_iter().map(|(l, _)| l).collect();
    assert_eq!(levels, vec![LogLevel::Warn, LogLevel::Critical]);
    assert!(levels[1].is_error());
}

#[test]
fn test_thread_safety() {
    let (logger, memory) = build(Logger::builder(), &[]);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for j in 0..50 {
                    logger.info_with("concurrent", vec![attributes! { "t" => i, "n" => j }.into()]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(memory.len(), 400);
    assert_eq!(logger.metrics().emitted_count(), 400);
}

//! Handler wrapping example
//!
//! Demonstrates invocation context injection, event logging, state
//! clearing between invocations and child loggers.
//!
//! Run with: cargo run --example lambda_handler

use rust_lambda_logger::attributes;
use rust_lambda_logger::prelude::*;
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Rust Lambda Logger - Handler Example ===\n");

    let logger = Logger::builder().service_name("inventory").build();
    let audit = logger.create_child(LoggerOptions {
        service_name: Some("inventory-audit".to_string()),
        ..Default::default()
    });

    let inner = logger.clone();
    let handler = logger.inject_lambda_context(
        move |event: Value, context: LambdaContext| {
            let logger = inner.clone();
            async move {
                logger.append_keys(attributes! { "sku" => event["sku"].as_str().unwrap_or("unknown") });
                logger.info(format!("Reserving stock for {}", context.aws_request_id));

                if event["quantity"].as_i64().unwrap_or(0) <= 0 {
                    return Err(LoggerError::other("quantity must be positive"));
                }
                Ok(json!({ "reserved": event["quantity"] }))
            }
        },
        InjectLambdaContextOptions::default().clear_state().log_event(true),
    );

    println!("1. First invocation (cold start):");
    let context = LambdaContext::new("req-1", "reserve-stock").with_memory_limit_in_mb(128);
    let output = handler.call(json!({ "sku": "A-1", "quantity": 2 }), context).await?;
    println!("   handler returned {}", output);

    println!("\n2. Second invocation, handler error passes through:");
    let context = LambdaContext::new("req-2", "reserve-stock");
    if let Err(e) = handler.call(json!({ "sku": "B-7", "quantity": 0 }), context).await {
        logger.error_with("Reservation rejected", vec![e.to_string().into()]);
    }

    println!("\n3. Child logger keeps its own attributes:");
    audit.info("Audit trail written");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}

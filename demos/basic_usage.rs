//! Basic logger usage example
//!
//! Demonstrates levels, persistent attributes, extra inputs and errors.
//!
//! Run with: cargo run --example basic_usage

use rust_lambda_logger::attributes;
use rust_lambda_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Lambda Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .service_name("orders")
        .log_level("DEBUG")
        .persistent_log_attributes(attributes! { "team" => "checkout" })
        .build();

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");

    println!("\n2. Raising the threshold to WARN:");
    logger.set_log_level("WARN")?;
    logger.info("Info message (hidden)");
    logger.warn("Warning message (visible)");
    logger.set_log_level("INFO")?;

    println!("\n3. Persistent attributes and extra inputs:");
    logger.append_keys(attributes! { "tenant" => "acme" });
    logger.info_with(
        "Order placed",
        vec![attributes! { "order_id" => 42, "total" => 19.99 }.into(), "priority".into()],
    );
    logger.remove_keys(["tenant"]);

    println!("\n4. Structured message:");
    logger.info(attributes! { "message" => "Payment captured", "amount" => 1999 });

    println!("\n5. Errors with causes:");
    let err = ErrorValue::new("PaymentError", "card declined")
        .with_cause(ErrorValue::new("GatewayError", "issuer unavailable"));
    logger.error_with("Payment failed", vec![err.into()]);

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}

//! Runs the compiled function binary the way the host does: JSON on STDIN,
//! JSON on STDOUT.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Result};

fn run_function(payload: &str) -> Result<serde_json::Value> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cart_transformer"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(payload.as_bytes())?;
    let output = child.wait_with_output()?;
    if !output.status.success() {
        bail!(
            "function failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn test_function_prices_samples() -> Result<()> {
    let output = run_function(
        r#"{
            "cart": {
                "lines": [
                    {
                        "id": "gid://shopify/CartLine/1",
                        "quantity": 1,
                        "attribute": { "key": "_free_sample", "value": "true" },
                        "merchandise": {
                            "__typename": "ProductVariant",
                            "id": "gid://shopify/ProductVariant/1",
                            "product": { "id": "gid://shopify/Product/1", "title": "Mini" }
                        },
                        "cost": { "amountPerQuantity": { "amount": "9.99", "currencyCode": "USD" } }
                    }
                ]
            }
        }"#,
    )?;
    assert_eq!(
        output["operations"][0]["lineUpdate"]["price"]["adjustment"]["fixedPricePerUnit"]["amount"],
        "0.00"
    );
    Ok(())
}

#[test]
fn test_function_empty_cart() -> Result<()> {
    let output = run_function(r#"{ "cart": { "lines": [] } }"#)?;
    assert_eq!(output, serde_json::json!({ "operations": [] }));
    Ok(())
}

#[test]
fn test_function_rejects_malformed_input() {
    assert!(run_function("not json").is_err());
}

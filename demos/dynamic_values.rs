//! Working with Value for runtime flexibility.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use serde_dt::{dt, dump_text_string, load_text_str, to_value, PathKey, TextOptions, Value};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
    roles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Build config dynamically with dt! macro
    let mut config = dt!({
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging", "metrics"],
        "debug": true
    });

    println!(
        "Config as DT text:\n{}\n",
        dump_text_string(&config, &TextOptions::pretty())
    );

    if let Some(host) = config.get("host").and_then(Value::as_str) {
        println!("Accessing field 'host': {}", host);
    }
    if let Some(port) = config.get("port").and_then(Value::as_i64) {
        println!("Accessing field 'port': {}", port);
    }
    let second: [PathKey<'_>; 2] = ["features".into(), 1.into()];
    if let Some(feature) = config.get_path(&second).and_then(Value::as_str) {
        println!("Second feature: {}\n", feature);
    }

    // Edit in place
    config.map_put("port", Value::from(9090))?;
    config.map_remove("debug");
    if let Some(features) = config.get_mut("features") {
        features.array_push(Value::from("tracing"))?;
    }
    println!("Edited: {}\n", config);

    // Text read back compares equal regardless of key order
    let reread = load_text_str(&config.to_string())?;
    assert_eq!(reread, config);

    let user = User {
        id: 123,
        name: "Alice".to_string(),
        roles: vec!["admin".to_string(), "developer".to_string()],
    };

    let user_value = to_value(&user)?;
    println!(
        "User as Value:\n{}\n",
        dump_text_string(&user_value, &TextOptions::pretty())
    );

    println!("Type checks:");
    println!("  is_map:    {}", user_value.is_map());
    println!("  is_array:  {}", user_value.is_array());
    println!("  is_string: {}", user_value.is_string());

    Ok(())
}

//! Basic DT text serialization and deserialization.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_dt::{from_str, to_string, TextOptions};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
        },
    ];

    // Relaxed form: no commas, quotes only where needed
    let text = to_string(&users, &TextOptions::new())?;
    println!("DT text:\n{}\n", text);

    // Same tree, readable by any JSON parser
    let json = to_string(&users, &TextOptions::json().with_pretty(true))?;
    println!("JSON mode:\n{}\n", json);

    let users_back: Vec<User> = from_str(&text)?;
    assert_eq!(users, users_back);
    let users_back: Vec<User> = from_str(&json)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    Ok(())
}

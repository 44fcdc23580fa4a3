//! Moving a tree between the text and binary codecs.
//!
//! Run with: cargo run --example binary_roundtrip

use serde_dt::{dump_binary, dump_text, load_binary, load_text, TextOptions};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let text = br#"
        // inventory snapshot
        {
            warehouse: north-2
            updated: "2024-05-01 12:00"
            bins: [
                { sku: WIDGET-001 count: 40 weight: 1.25 }
                { sku: GADGET-002 count: 0 weight: 0.5 discontinued: true }
            ]
        }
    "#;

    let tree = load_text(text)?;
    let bytes = dump_binary(&tree);
    let json = dump_text(&tree, &TextOptions::json());
    println!("text input:  {} bytes", text.len());
    println!("binary form: {} bytes", bytes.len());
    println!("JSON form:   {} bytes\n", json.len());

    let back = load_binary(&bytes)?;
    assert_eq!(back, tree);
    println!("✓ Binary round-trip successful");

    // Corrupt documents are rejected, never half-read
    match load_binary(&bytes[..bytes.len() - 1]) {
        Ok(_) => println!("unexpected: truncated document decoded"),
        Err(e) => println!("truncated document: {}", e),
    }

    Ok(())
}

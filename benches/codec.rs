use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_dt::{
    dump_binary, dump_text, from_str, load_binary, load_text, to_string, to_value, HashTable,
    TextKey, TextOptions, Value,
};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

fn products(size: u32) -> Vec<Product> {
    (0..size)
        .map(|i| Product {
            sku: format!("SKU{}", i),
            name: format!("Product {}", i),
            price: 9.99 + f64::from(i),
            quantity: i,
        })
        .collect()
}

fn benchmark_serde_simple(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };
    let text = "{ id:123 name:Alice email:alice@example.com active:true }";

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user), &TextOptions::new()))
    });
    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(text)))
    });
}

fn benchmark_text(c: &mut Criterion) {
    let mut load = c.benchmark_group("load_text");
    for size in [10, 100, 1000].iter() {
        let value = to_value(&products(*size)).unwrap_or_default();
        let text = dump_text(&value, &TextOptions::new());
        load.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| load_text(black_box(text)))
        });
    }
    load.finish();

    let mut dump = c.benchmark_group("dump_text");
    for size in [10, 100, 1000].iter() {
        let value = to_value(&products(*size)).unwrap_or_default();
        dump.bench_with_input(BenchmarkId::new("relaxed", size), &value, |b, value| {
            b.iter(|| dump_text(black_box(value), &TextOptions::new()))
        });
        dump.bench_with_input(BenchmarkId::new("json", size), &value, |b, value| {
            b.iter(|| dump_text(black_box(value), &TextOptions::json()))
        });
    }
    dump.finish();
}

fn benchmark_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary");
    for size in [10, 100, 1000].iter() {
        let value = to_value(&products(*size)).unwrap_or_default();
        let bytes = dump_binary(&value);
        group.bench_with_input(BenchmarkId::new("encode", size), &value, |b, value| {
            b.iter(|| dump_binary(black_box(value)))
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &bytes, |b, bytes| {
            b.iter(|| load_binary(black_box(bytes)))
        });
    }
    group.finish();
}

fn benchmark_table(c: &mut Criterion) {
    let keys: Vec<String> = (0..1000).map(|i| format!("key-{}", i)).collect();

    c.bench_function("table_insert_1000", |b| {
        b.iter(|| {
            let mut table: HashTable<TextKey, Value> = HashTable::new();
            for (i, key) in keys.iter().enumerate() {
                let _ = table.insert(key.into(), Value::from(i as i64));
            }
            table
        })
    });

    let mut table: HashTable<TextKey, Value> = HashTable::new();
    for (i, key) in keys.iter().enumerate() {
        let _ = table.insert(key.into(), Value::from(i as i64));
    }
    c.bench_function("table_lookup_1000", |b| {
        b.iter(|| keys.iter().filter(|key| table.contains_key(black_box(key))).count())
    });
}

criterion_group!(
    benches,
    benchmark_serde_simple,
    benchmark_text,
    benchmark_binary,
    benchmark_table
);
criterion_main!(benches);

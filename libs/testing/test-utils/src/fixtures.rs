//! Song catalog fixture shared by domain and app tests.

use serde_json::{Map, Value};

/// The newline-delimited catalog the seeding tool loads by default.
pub const CATALOG_NDJSON: &str = include_str!("../../../../tests/songs.json");

/// Level used by the "average difficulty for one level" scenarios.
pub const LEVEL: i64 = 13;

/// Search term that matches exactly two catalog songs, one by artist and one
/// by title.
pub const SEARCH_MESSAGE: &str = "finger";

/// The catalog as JSON objects, in file order.
pub fn catalog() -> Vec<Map<String, Value>> {
    CATALOG_NDJSON
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("catalog fixture line is a JSON object"))
        .collect()
}

/// Mean difficulty of the catalog, optionally restricted to one level.
pub fn average_difficulty(level: Option<i64>) -> Option<f64> {
    let difficulties: Vec<f64> = catalog()
        .iter()
        .filter(|song| level.is_none() || song.get("level").and_then(Value::as_i64) == level)
        .filter_map(|song| song.get("difficulty").and_then(Value::as_f64))
        .collect();

    if difficulties.is_empty() {
        None
    } else {
        Some(difficulties.iter().sum::<f64>() / difficulties.len() as f64)
    }
}

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

/// Fields of a freshly created record file, in the order they are written.
pub const RECORD_FIELDS: [&str; 7] = [
    "timestamp",
    "category",
    "item",
    "quantity",
    "unit",
    "priority",
    "notes",
];

pub fn format_timestamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// The seed record for a new file in `category`, stamped with `now`
pub fn seed_record(category: &str, now: NaiveDateTime) -> Value {
    let mut record = Map::new();
    for field in RECORD_FIELDS {
        let value = match field {
            "timestamp" => format_timestamp(now),
            "category" => category.to_string(),
            _ => String::new(),
        };
        record.insert(field.to_string(), Value::String(value));
    }
    Value::Object(record)
}

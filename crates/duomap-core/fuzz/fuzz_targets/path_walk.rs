//! Fuzzing target for path parsing, extraction and injection
//!
//! Arbitrary JSON is parsed as a path and walked over a fixed set of
//! documents. Errors are fine; panics are not.

#![no_main]

use duomap_core::{extract, inject, Path};
use libfuzzer_sys::fuzz_target;
use serde_json::{json, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let Ok(path) = Path::from_value(&raw) else {
        return;
    };

    let docs = [
        json!(null),
        json!(false),
        json!(0),
        json!(""),
        json!([]),
        json!({}),
        json!([null, 1, {"a": [{"b": 2}]}]),
        json!({"a": {"b": [{"c": 1, "d": 2}, {"c": 2}]}}),
        json!({"telecom": [{"system": "phone", "value": "1"}]}),
    ];

    for doc in &docs {
        let _ = extract(doc, &path);

        if let Ok(Some(written)) = inject(doc.clone(), &path, json!("x")) {
            let _ = extract(&written, &path);
        }
    }

    // Round-trip through the document form
    assert_eq!(Path::from_value(&path.to_value()).ok(), Some(path));
});

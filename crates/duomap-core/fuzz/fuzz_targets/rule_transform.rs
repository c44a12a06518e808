//! Fuzzing target for rule documents
//!
//! Arbitrary JSON is parsed as a rule list and run in both directions over a
//! few records, checking that the engine never panics.

#![no_main]

use duomap_core::{transform, ConverterRegistry, Direction, RuleSet};
use libfuzzer_sys::fuzz_target;
use serde_json::{json, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let Ok(rules) = RuleSet::from_value(&raw, &ConverterRegistry::with_builtins()) else {
        return;
    };

    let records = [
        json!({}),
        json!({"a": 1, "b": "x", "c": false, "phones": [{"number": "1"}]}),
        json!({"telecom": [{"system": "phone", "value": "1"}, {"system": "email"}]}),
    ];

    let forward = Direction::new("form", "fhir");
    for record in &records {
        if let Ok(output) = transform(record, rules.rules(), &forward) {
            let _ = transform(&output, rules.rules(), &forward.reversed());
        }
    }
});

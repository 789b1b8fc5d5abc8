use log::debug;
use serde_json::Value;

/// Decode a fee-ledger column into its entry sequence. Never fails:
/// a JSON array is returned as-is, a lone object (legacy rows) is wrapped
/// in a one-element sequence, and anything else (parse errors, `null`,
/// scalars) yields an empty sequence.
pub fn decode(raw: Option<&str>) -> Vec<Value> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(entries)) => entries,
        Ok(value @ Value::Object(_)) => vec![value],
        Ok(other) => {
            debug!("Ignoring non-ledger payload: {}", other);
            Vec::new()
        }
        Err(err) => {
            debug!("Ignoring malformed ledger column: {}", err);
            Vec::new()
        }
    }
}

/// Serialize an entry sequence back into the column representation. No
/// validation: the read side must tolerate whatever was enqueued.
pub fn encode(entries: &[Value]) -> String {
    serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string())
}

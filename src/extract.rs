//! Recovery of a JSON object from free-form model output.
//!
//! Models are asked to reply with a bare JSON object but often wrap it in
//! prose or a markdown fence. Rather than slicing between the first `{` and
//! the last `}`, each `{` is tried in turn as the start of a JSON value and
//! the first one that tokenizes into a complete object wins. Braces inside
//! string values therefore cannot confuse the boundaries.

use serde_json::{Deserializer, Value};

/// Returns the first balanced top-level JSON object embedded in `text`,
/// or `None` if no `{` starts a complete object.
pub fn extract_json_object(text: &str) -> Option<&str> {
    for (start, _) in text.match_indices('{') {
        let rest = &text[start..];
        let mut stream = Deserializer::from_str(rest).into_iter::<Value>();
        if let Some(Ok(Value::Object(_))) = stream.next() {
            let end = stream.byte_offset();
            return Some(&rest[..end]);
        }
    }
    None
}

/// The slice handed to the schema parser: the embedded object when one is
/// found, otherwise the raw text so that parsing fails with a real error.
pub fn json_candidate(text: &str) -> &str {
    match extract_json_object(text) {
        Some(object) => object,
        None => {
            tracing::debug!("No balanced JSON object found in model output");
            text
        }
    }
}

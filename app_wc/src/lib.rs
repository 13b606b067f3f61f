use common::KeyValue;

/// Emits `(word, "1")` for every maximal run of alphabetic characters.
pub fn map(_filename: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| KeyValue::new(w, "1"))
        .collect()
}

pub fn reduce(_key: &str, values: Vec<String>) -> String {
    values.len().to_string()
}

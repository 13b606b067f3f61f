use common::KeyValue;
use itertools::Itertools;

/// Emits `(word, filename)` once for every distinct word of the document.
pub fn map(filename: &str, contents: &str) -> Vec<KeyValue> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .unique()
        .map(|w| KeyValue::new(w, filename))
        .collect()
}

/// `"<count> <doc,doc,...>"` with the documents sorted.
pub fn reduce(_key: &str, values: Vec<String>) -> String {
    format!("{} {}", values.len(), values.iter().sorted().join(","))
}

use serde::{Deserialize, Serialize};
use std::ops::Deref;

pub mod codec;
pub mod error;
pub mod naming;
pub mod output;
pub mod partition;

pub use error::{Error, Result};
pub use naming::Job;
pub use partition::{ihash, partition};

/// One record flowing through a job. Serialized with the field names
/// `Key` and `Value`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Turns one whole input document into records.
pub type MapFn = fn(filename: &str, contents: &str) -> Vec<KeyValue>;
/// Folds every value of one key into a single output value.
pub type ReduceFn = fn(key: &str, values: Vec<String>) -> String;

#[derive(Clone, Copy)]
pub struct Api {
    map: MapFn,
    reduce: ReduceFn,
}

impl Api {
    pub fn new(map: MapFn, reduce: ReduceFn) -> Self {
        Self { map, reduce }
    }

    pub fn map(&self, filename: &str, contents: &str) -> Vec<KeyValue> {
        (self.map)(filename, contents)
    }

    pub fn reduce(&self, key: &str, values: Vec<String>) -> String {
        (self.reduce)(key, values)
    }
}

/// A named map/reduce application.
#[derive(Clone)]
pub struct App {
    pub app_name: String,
    api: Api,
}

impl App {
    pub fn new(app_name: &str, map: MapFn, reduce: ReduceFn) -> Self {
        Self {
            app_name: app_name.to_string(),
            api: Api::new(map, reduce),
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("app_name", &self.app_name).finish()
    }
}

impl Deref for App {
    type Target = Api;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_map(filename: &str, contents: &str) -> Vec<KeyValue> {
        vec![KeyValue::new(filename, contents)]
    }

    fn join_reduce(_key: &str, values: Vec<String>) -> String {
        values.join("+")
    }

    #[test]
    fn test_app_dispatches_through_deref() {
        let app = App::new("echo", echo_map, join_reduce);
        assert_eq!(app.map("f", "body"), vec![KeyValue::new("f", "body")]);
        assert_eq!(app.reduce("k", vec!["a".into(), "b".into()]), "a+b");
        assert_eq!(format!("{:?}", app), "App { app_name: \"echo\" }");
    }

    #[test]
    fn test_key_value_json_field_names() {
        let kv = KeyValue::new("the", "1");
        let json = serde_json::to_string(&kv).unwrap();
        assert_eq!(json, r#"{"Key":"the","Value":"1"}"#);
    }
}

//! Request options and response values.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::FetchError;

/// Options for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// HTTP method; upper-cased before sending.
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers, keys kept as given.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body. Sent as `application/json` unless a `Content-Type`
    /// header says otherwise.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: default_method(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Build from a loosely-typed script object.
    ///
    /// `method` defaults to GET; non-string header values are dropped; a
    /// non-string `body` is sent as its JSON text.
    pub fn from_script_value(value: &Value) -> Self {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(default_method);

        let headers = value
            .get("headers")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let body = match value.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };

        Self {
            method,
            headers,
            body,
        }
    }

    /// The upper-cased method name.
    pub fn normalized_method(&self) -> String {
        self.method.trim().to_uppercase()
    }

    /// Value of the `Content-Type` header, matched case-insensitively.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.as_str())
    }
}

/// A completed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub status_code: u16,

    /// Reason phrase for the status code (may be empty).
    pub status_text: String,

    /// Response headers; for repeated headers the last value wins.
    pub headers: HashMap<String, String>,

    pub body_text: String,
}

impl FetchResult {
    /// `true` for 2xx status codes.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body as text.
    pub fn text(&self) -> &str {
        &self.body_text
    }

    /// Parse the body into an untyped JSON value.
    pub fn json(&self) -> Result<Value, FetchError> {
        self.json_as()
    }

    /// Parse the body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_str(&self.body_text).map_err(|e| FetchError::Decode {
            reason: e.to_string(),
        })
    }

    /// Look up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The object scripts receive.
    pub fn to_script_value(&self) -> Value {
        json!({
            "status": self.status_code,
            "statusText": self.status_text,
            "ok": self.ok(),
            "headers": self.headers,
            "text": self.body_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: u16, body: &str) -> FetchResult {
        FetchResult {
            status_code: status,
            status_text: String::new(),
            headers: HashMap::new(),
            body_text: body.into(),
        }
    }

    #[test]
    fn default_method_is_get() {
        assert_eq!(FetchOptions::default().method, "GET");
        let opts: FetchOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.method, "GET");
    }

    #[test]
    fn method_is_upper_cased() {
        assert_eq!(FetchOptions::new().method(" post ").normalized_method(), "POST");
    }

    #[test]
    fn from_script_value_is_lenient() {
        let opts = FetchOptions::from_script_value(&json!({
            "headers": { "X-Token": "abc", "X-Num": 5 },
            "body": { "a": 1 }
        }));
        assert_eq!(opts.method, "GET");
        assert_eq!(opts.headers.len(), 1);
        assert_eq!(opts.headers["X-Token"], "abc");
        assert_eq!(opts.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn content_type_lookup_ignores_case() {
        let opts = FetchOptions::new().header("content-TYPE", "text/plain");
        assert_eq!(opts.content_type(), Some("text/plain"));
        assert_eq!(FetchOptions::new().content_type(), None);
    }

    #[test]
    fn ok_is_2xx_only() {
        for status in [200, 201, 204, 299] {
            assert!(result(status, "").ok(), "{status}");
        }
        for status in [100, 301, 404, 500] {
            assert!(!result(status, "").ok(), "{status}");
        }
    }

    #[test]
    fn json_accessors() {
        let r = result(200, r#"{"name":"ann","age":3}"#);
        assert_eq!(r.json().unwrap()["name"], "ann");

        #[derive(Deserialize)]
        struct Person {
            age: u32,
        }
        assert_eq!(r.json_as::<Person>().unwrap().age, 3);
    }

    #[test]
    fn json_decode_failure_is_distinct() {
        let err = result(200, "not json").json().unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(!err.is_network());
    }

    #[test]
    fn script_value_shape() {
        let v = result(404, "not found").to_script_value();
        assert_eq!(v["status"], 404);
        assert_eq!(v["ok"], false);
        assert_eq!(v["text"], "not found");
    }
}

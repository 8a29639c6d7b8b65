//! Canonical log record and the loosely-typed field bag it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket used for records that carry no source address
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A single value in a field bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Text form of the value, as it would appear in a log line
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Empty strings count as absent during alias resolution
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Number(value.into())
    }
}

/// Intermediate key/value structure produced by a format matcher
///
/// Keys are kept verbatim; the normalizer maps them onto canonical fields
/// through its alias table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldBag {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldBag {
    pub fn new() -> Self {
        FieldBag {
            fields: BTreeMap::new(),
        }
    }

    /// Bag holding nothing but the original line
    pub fn raw_only(line: &str) -> Self {
        let mut bag = FieldBag::new();
        bag.insert("raw", line);
        bag
    }

    /// Insert a value, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Insert a value only when one is present
    pub fn insert_opt<V: Into<FieldValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize the bag as a compact JSON object
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.fields).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Canonical, normalized representation of one log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub source_ip: Option<String>,
    pub dest_ip: Option<String>,
    pub raw_time: Option<String>,
    pub parsed_time: Option<DateTime<Utc>>,
    pub request: Option<String>,
    pub status: Option<String>,
    pub port: Option<u16>,
    pub raw: String,
}

impl LogRecord {
    /// Source address, or the shared `unknown` bucket when absent
    pub fn source_key(&self) -> &str {
        self.source_ip.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }

    /// Rebuild a bag using canonical key names
    ///
    /// Normalizing the returned bag yields an equivalent record.
    pub fn to_field_bag(&self) -> FieldBag {
        let mut bag = FieldBag::new();
        bag.insert_opt("srcIP", self.source_ip.clone());
        bag.insert_opt("destIP", self.dest_ip.clone());
        bag.insert_opt("time", self.raw_time.clone());
        bag.insert_opt("request", self.request.clone());
        bag.insert_opt("status", self.status.clone());
        bag.insert_opt("port", self.port);
        bag.insert("raw", self.raw.clone());
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_serializes_numbers_and_text() {
        let mut bag = FieldBag::new();
        bag.insert("port", 22u16);
        bag.insert("ip", "10.0.0.1");
        assert_eq!(bag.to_json_string(), r#"{"ip":"10.0.0.1","port":22}"#);
    }

    #[test]
    fn test_insert_opt_skips_none() {
        let mut bag = FieldBag::new();
        bag.insert_opt("time", None::<String>);
        bag.insert_opt("status", Some("OK"));
        assert!(!bag.contains_key("time"));
        assert_eq!(bag.get("status"), Some(&FieldValue::from("OK")));
    }

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::from("").is_blank());
        assert!(!FieldValue::from("0").is_blank());
        assert!(!FieldValue::from(0u16).is_blank());
    }

    #[test]
    fn test_source_key_falls_back_to_unknown() {
        let record = LogRecord {
            source_ip: None,
            dest_ip: None,
            raw_time: None,
            parsed_time: None,
            request: None,
            status: None,
            port: None,
            raw: "line".to_string(),
        };
        assert_eq!(record.source_key(), UNKNOWN_SOURCE);
    }
}

//! Dotted-key access into a parsed JSON configuration document.
//!
//! `get("storage.ufile.bucket")` walks nested objects one segment at a time.
//! Lookups stop early when a non-object value is reached, so the remaining
//! segments of the key are ignored in that case.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};

/// A JSON configuration document together with its original bytes.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Map<String, Value>,
    raw: Vec<u8>,
}

impl ConfigDocument {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read(path).context(format!("Failed to read config file: {}", path.display()))?;
        Self::from_bytes(&raw)
    }

    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let root: Map<String, Value> =
            serde_json::from_slice(raw).context("Failed to parse JSON config")?;
        Ok(ConfigDocument {
            root,
            raw: raw.to_vec(),
        })
    }

    /// The original document, re-indented with tabs
    pub fn dump(&self) -> Result<String> {
        let value: Value = serde_json::from_slice(&self.raw).context("Failed to parse JSON config")?;
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        serde::Serialize::serialize(&value, &mut serializer).context("Failed to format JSON config")?;
        String::from_utf8(out).context("Formatted config is not UTF-8")
    }

    pub fn get(&self, key: &str) -> Result<&Value> {
        let mut current = &self.root;
        let mut nodes = key.split('.').peekable();

        while let Some(node) = nodes.next() {
            let value = current
                .get(node)
                .ok_or_else(|| anyhow!("no value for key {}", key))?;
            match value {
                Value::Object(inner) if nodes.peek().is_some() => current = inner,
                _ => return Ok(value),
            }
        }

        Err(anyhow!("no value for key {}", key))
    }

    /// True if the key resolves to a value
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("value for key {} is not string", key))
    }

    /// Integer value; JSON numbers with a fractional part are truncated
    pub fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get(key)?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .ok_or_else(|| anyhow!("value for key {} is not int", key))
    }

    pub fn get_u64(&self, key: &str) -> Result<u64> {
        let value = self.get_int(key)?;
        u64::try_from(value).map_err(|_| anyhow!("value for key {} is negative", key))
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get(key)?
            .as_f64()
            .ok_or_else(|| anyhow!("value for key {} is not float64", key))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)?
            .as_bool()
            .ok_or_else(|| anyhow!("value for key {} is not bool", key))
    }

    pub fn get_slice(&self, key: &str) -> Result<&Vec<Value>> {
        self.get(key)?
            .as_array()
            .ok_or_else(|| anyhow!("value for key {} is not slice", key))
    }

    pub fn get_string_slice(&self, key: &str) -> Result<Vec<String>> {
        self.get_slice(key)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("{}[{}] is not a string", key, i))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "ufile": {
            "public_key": "pub",
            "upload": { "concurrency": 8, "ratio": 1.5, "abort_on_failure": true }
        },
        "regions": ["cn-bj", "hk"],
        "mixed": ["a", 1],
        "debug": false
    }"#;

    fn doc() -> ConfigDocument {
        ConfigDocument::from_bytes(DOC.as_bytes()).unwrap()
    }

    #[test]
    fn test_nested_lookup() {
        let doc = doc();
        assert_eq!(doc.get_string("ufile.public_key").unwrap(), "pub");
        assert_eq!(doc.get_int("ufile.upload.concurrency").unwrap(), 8);
        assert_eq!(doc.get_u64("ufile.upload.concurrency").unwrap(), 8);
        assert_eq!(doc.get_float("ufile.upload.ratio").unwrap(), 1.5);
        assert!(doc.get_bool("ufile.upload.abort_on_failure").unwrap());
        assert!(!doc.get_bool("debug").unwrap());
    }

    #[test]
    fn test_intermediate_object_is_returned() {
        let doc = doc();
        let upload = doc.get("ufile.upload").unwrap();
        assert!(upload.is_object());
    }

    #[test]
    fn test_missing_key_names_the_key() {
        let err = doc().get("ufile.private_key").unwrap_err();
        assert_eq!(err.to_string(), "no value for key ufile.private_key");
        assert!(!doc().contains("nope"));
    }

    #[test]
    fn test_type_mismatch() {
        let doc = doc();
        assert_eq!(
            doc.get_string("ufile.upload.concurrency").unwrap_err().to_string(),
            "value for key ufile.upload.concurrency is not string"
        );
        assert!(doc.get_int("ufile.public_key").is_err());
        assert!(doc.get_slice("debug").is_err());
    }

    #[test]
    fn test_string_slices() {
        let doc = doc();
        assert_eq!(doc.get_string_slice("regions").unwrap(), vec!["cn-bj", "hk"]);
        assert_eq!(
            doc.get_string_slice("mixed").unwrap_err().to_string(),
            "mixed[1] is not a string"
        );
    }

    #[test]
    fn test_dump_uses_tabs() {
        let dumped = ConfigDocument::from_bytes(br#"{"a":{"b":1}}"#).unwrap().dump().unwrap();
        assert_eq!(dumped, "{\n\t\"a\": {\n\t\t\"b\": 1\n\t}\n}");
    }

    #[test]
    fn test_rejects_non_object_root() {
        assert!(ConfigDocument::from_bytes(b"[1,2,3]").is_err());
        assert!(ConfigDocument::from_bytes(b"{broken").is_err());
    }
}

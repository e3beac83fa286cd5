//! Record encoding for the synchronized tree.
//!
//! A [`RecordCodec`] turns a [`Record`] into the bytes of a file and back. The
//! encoding must be human-diffable (version control shows it to people) and
//! field-for-field reversible.
//!
//! [`KeyReset`] runs before encoding. It forces fields that only mean
//! something to the local client back to canonical values so they never show
//! up in synchronized history.

use serde_json::Value;
use thiserror::Error;

use docsync_types::{Record, RecordType};

/// Codec error type.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Content is not valid UTF-8.
    #[error("content is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Content does not parse as a record.
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// YAML content does not parse as a record.
    #[error("malformed record: {0}")]
    MalformedYaml(#[from] serde_yaml::Error),
}

/// Reversible text encoding of a record.
pub trait RecordCodec: Send + Sync {
    /// File extension (without the dot) for encoded records.
    fn extension(&self) -> &str;

    /// Encode a record to file content.
    fn encode(&self, record: &Record) -> Result<Vec<u8>, CodecError>;

    /// Decode file content to a record.
    fn decode(&self, data: &[u8]) -> Result<Record, CodecError>;
}

/// Pretty-printed JSON, one field per line, trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn extension(&self) -> &str {
        "json"
    }

    fn encode(&self, record: &Record) -> Result<Vec<u8>, CodecError> {
        let mut out = serde_json::to_vec_pretty(record)?;
        out.push(b'\n');
        Ok(out)
    }

    fn decode(&self, data: &[u8]) -> Result<Record, CodecError> {
        let text = std::str::from_utf8(data)?;
        Ok(serde_json::from_str(text)?)
    }
}

/// Block-style YAML, the format trees written by the desktop client use.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl RecordCodec for YamlCodec {
    fn extension(&self) -> &str {
        "yml"
    }

    fn encode(&self, record: &Record) -> Result<Vec<u8>, CodecError> {
        Ok(serde_yaml::to_string(record)?.into_bytes())
    }

    fn decode(&self, data: &[u8]) -> Result<Record, CodecError> {
        let text = std::str::from_utf8(data)?;
        Ok(serde_yaml::from_str(text)?)
    }
}

/// One field forced back to a canonical value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResetRule {
    /// Restrict to one record type; `None` applies to every type.
    pub record_type: Option<RecordType>,
    /// Wire name of the field.
    pub field: String,
    /// Canonical value.
    pub value: Value,
}

/// Set of fields reset before a record leaves the store.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyReset {
    rules: Vec<ResetRule>,
}

impl Default for KeyReset {
    /// Workspaces drop their `parentId`: the owning project is local
    /// organisation and is re-bound on every write.
    fn default() -> Self {
        Self::none().with_rule(Some(RecordType::Workspace), "parentId", Value::Null)
    }
}

impl KeyReset {
    /// No rules at all.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule.
    pub fn with_rule(
        mut self,
        record_type: Option<RecordType>,
        field: impl Into<String>,
        value: Value,
    ) -> Self {
        self.rules.push(ResetRule {
            record_type,
            field: field.into(),
            value,
        });
        self
    }

    pub fn rules(&self) -> &[ResetRule] {
        &self.rules
    }

    /// Apply every matching rule to `record`.
    pub fn apply(&self, record: &mut Record) {
        for rule in &self.rules {
            if rule.record_type.is_none_or(|t| t == record.record_type) {
                record.set_field(rule.field.clone(), rule.value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_keeps_opaque_fields() {
        let codec = JsonCodec;
        let record = Record::new(RecordType::Request, "req_1")
            .with_parent("wrk_1")
            .with_modified(1700000000000)
            .with_field("method", "GET")
            .with_field("headers", serde_json::json!([{"name": "Accept", "value": "*/*"}]));

        let bytes = codec.encode(&record).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(codec.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_json_is_line_oriented() {
        let bytes = JsonCodec
            .encode(&Record::new(RecordType::Environment, "env_1"))
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.lines().any(|l| l.trim() == r#""_id": "env_1","#));
        assert!(text.lines().any(|l| l.trim() == r#""type": "Environment","#));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            JsonCodec.decode(b"not a record"),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            JsonCodec.decode(&[0xff, 0xfe]),
            Err(CodecError::Utf8(_))
        ));
    }

    #[test]
    fn test_yaml_round_trip_keeps_opaque_fields() {
        let record = Record::new(RecordType::Request, "req_1")
            .with_parent("fld_1")
            .with_modified(1700000000000)
            .with_field("method", "GET")
            .with_field("body", serde_json::json!({"mimeType": "application/json"}));

        let bytes = YamlCodec.encode(&record).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.lines().any(|l| l == "_id: req_1"));
        assert!(text.lines().any(|l| l == "type: Request"));
        assert_eq!(YamlCodec.decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_yaml_reads_client_written_file() {
        let text = "\
_id: wrk_1
type: Workspace
parentId: null
modified: 1700000000000
created: 1690000000000
name: My API
scope: collection
";
        let record = YamlCodec.decode(text.as_bytes()).unwrap();
        assert_eq!(record.id, "wrk_1");
        assert!(record.is_workspace());
        assert_eq!(record.parent_id, None);
        assert_eq!(record.created, 1690000000000);
        assert_eq!(record.field("name"), Some(&Value::from("My API")));
        assert_eq!(YamlCodec.extension(), "yml");
    }

    #[test]
    fn test_default_reset_clears_workspace_parent() {
        let reset = KeyReset::default();

        let mut workspace = Record::new(RecordType::Workspace, "wrk_1").with_parent("proj_1");
        reset.apply(&mut workspace);
        assert_eq!(workspace.parent_id, None);

        let mut request = Record::new(RecordType::Request, "req_1").with_parent("wrk_1");
        reset.apply(&mut request);
        assert_eq!(request.parent_id.as_deref(), Some("wrk_1"));
    }

    #[test]
    fn test_untyped_rule_applies_everywhere() {
        let reset = KeyReset::none().with_rule(None, "isPinned", Value::Bool(false));
        let mut request = Record::new(RecordType::Request, "req_1").with_field("isPinned", true);
        reset.apply(&mut request);
        assert_eq!(request.field("isPinned"), Some(&Value::Bool(false)));
    }
}

//! Search document type.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A flat document ready to be submitted to the search index.
///
/// `fields` carries every column of the source row, with missing values as
/// explicit `null`. The synthetic `indexed_at` and `record_id` fields are
/// serialized alongside them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetDocument {
    /// Document key in the index. Equal to the row's hostname.
    #[serde(skip)]
    pub id: String,

    /// Column values keyed by column name.
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// When this run started building documents.
    #[serde(serialize_with = "serialize_millis")]
    pub indexed_at: DateTime<Utc>,

    /// Position of the source row in the input file.
    pub record_id: usize,
}

impl AssetDocument {
    /// Field names that are populated by the builder and never taken from a column.
    pub const SYNTHETIC_FIELDS: [&'static str; 2] = ["indexed_at", "record_id"];

    /// Create a new document. Column values named like a synthetic field are discarded.
    pub fn new(
        id: impl Into<String>,
        mut fields: Map<String, Value>,
        indexed_at: DateTime<Utc>,
        record_id: usize,
    ) -> Self {
        for name in Self::SYNTHETIC_FIELDS {
            fields.remove(name);
        }

        Self {
            id: id.into(),
            fields,
            indexed_at,
            record_id,
        }
    }

    /// Look up a column value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Render the full document body as JSON.
    pub fn to_source(&self) -> Value {
        let mut source = self.fields.clone();
        source.insert(
            "indexed_at".to_string(),
            Value::String(format_timestamp(&self.indexed_at)),
        );
        source.insert("record_id".to_string(), Value::from(self.record_id));
        Value::Object(source)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_millis<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_serialized_document_is_flat() {
        let mut fields = Map::new();
        fields.insert("hostname".into(), json!("web01"));
        fields.insert("country".into(), json!(null));

        let doc = AssetDocument::new("web01", fields, fixed_time(), 4);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(
            value,
            json!({
                "hostname": "web01",
                "country": null,
                "indexed_at": "2024-03-05T10:30:00.000Z",
                "record_id": 4
            })
        );
        assert_eq!(value, doc.to_source());
    }

    #[test]
    fn test_synthetic_columns_are_replaced() {
        let mut fields = Map::new();
        fields.insert("hostname".into(), json!("web01"));
        fields.insert("record_id".into(), json!("from-file"));

        let doc = AssetDocument::new("web01", fields, fixed_time(), 9);

        assert!(doc.field("record_id").is_none());
        assert_eq!(doc.to_source()["record_id"], json!(9));
    }
}

//! Index mapping for the asset inventory index.
//!
//! The index is recreated on every run, so this mapping is the whole schema.

use serde_json::{json, Value};

/// Default name of the search index.
pub const DEFAULT_INDEX_NAME: &str = "it_asset_inventory";

/// Accepted formats for the installation date field.
pub const INSTALLATION_DATE_FORMAT: &str = "yyyy-MM-dd||strict_date_optional_time||epoch_millis";

/// Fields compared by exact string match.
pub const KEYWORD_FIELDS: [&str; 9] = [
    "hostname",
    "country",
    "operating_system_name",
    "operating_system_provider",
    "operating_system_lifecycle_status",
    "os_is_virtual",
    "is_internet_facing",
    "image_purpose",
    "os_system_id",
];

/// Get the index creation body for the asset inventory index.
///
/// - **Keyword fields**: host and OS attributes, filtered by exact match
/// - `operating_system_installation_date`: date, `YYYY-MM-DD`, ISO or epoch millis
/// - `performance_score`: float
/// - `indexed_at`: date stamped by the indexer
pub fn get_index_mappings() -> Value {
    let mut properties = serde_json::Map::new();
    for field in KEYWORD_FIELDS {
        properties.insert(field.to_string(), json!({ "type": "keyword" }));
    }
    properties.insert(
        "operating_system_installation_date".to_string(),
        json!({
            "type": "date",
            "format": INSTALLATION_DATE_FORMAT
        }),
    );
    properties.insert("performance_score".to_string(), json!({ "type": "float" }));
    properties.insert("indexed_at".to_string(), json!({ "type": "date" }));

    json!({
        "mappings": {
            "properties": properties
        }
    })
}

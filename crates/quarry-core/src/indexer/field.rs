use serde::{Deserialize, Serialize};

/// Generic field type used when an engine type has no translation
pub const DEFAULT_FIELD_TYPE: &str = "string";

/// Engine (HiveServer2) type name -> index field type
const FIELD_TYPE_TRANSLATE: &[(&str, &str)] = &[
    ("BOOLEAN_TYPE", "string"),
    ("TINYINT_TYPE", "long"),
    ("SMALLINT_TYPE", "long"),
    ("INT_TYPE", "long"),
    ("BIGINT_TYPE", "long"),
    ("FLOAT_TYPE", "double"),
    ("DOUBLE_TYPE", "double"),
    ("DECIMAL_TYPE", "double"),
    ("STRING_TYPE", "string"),
    ("BINARY_TYPE", "string"),
    ("VARCHAR_TYPE", "string"),
    ("CHAR_TYPE", "string"),
    ("TIMESTAMP_TYPE", "date"),
    ("DATE_TYPE", "date"),
];

/// Translate an engine column type into an index field type
///
/// Accepts both `INT_TYPE` and bare `int` spellings. Total: anything
/// unrecognized becomes `string`.
///
/// ```
/// use quarry_core::indexer::translate_type;
///
/// assert_eq!(translate_type("BIGINT_TYPE"), "long");
/// assert_eq!(translate_type("timestamp"), "date");
/// assert_eq!(translate_type("MAP_TYPE"), "string");
/// ```
pub fn translate_type(engine_type: &str) -> &'static str {
    let mut key = engine_type.trim().to_ascii_uppercase();
    if !key.ends_with("_TYPE") {
        key.push_str("_TYPE");
    }

    FIELD_TYPE_TRANSLATE
        .iter()
        .find(|(engine, _)| *engine == key)
        .map(|(_, field)| *field)
        .unwrap_or(DEFAULT_FIELD_TYPE)
}

/// Index field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub keep: bool,
    pub required: bool,
    pub unique: bool,
    pub multi_valued: bool,
    pub indexed: bool,
    pub stored: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            keep: true,
            required: false,
            unique: false,
            multi_valued: false,
            indexed: true,
            stored: true,
        }
    }
}

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::field::{translate_type, Field};
use crate::interpreter::Sample;

/// Where the indexer reads rows from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputFormat {
    /// Re-run the source query
    #[serde(rename = "query")]
    Query,
    /// Pull batches from the live result handle
    #[serde(rename = "hs2_handle")]
    StreamingHandle,
}

/// Record layout of the exported rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvFormat {
    pub quote_char: String,
    pub record_separator: String,
    #[serde(rename = "type")]
    pub format_type: String,
    pub has_header: bool,
    pub field_separator: String,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            quote_char: "\"".to_string(),
            record_separator: "\n".to_string(),
            format_type: "csv".to_string(),
            has_header: false,
            field_separator: "\u{0001}".to_string(),
        }
    }
}

/// Schema and layout handed to the indexing job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFormatSpec {
    pub name: String,
    pub input_format: InputFormat,
    pub format: CsvFormat,
    pub sample: String,
    pub columns: Vec<Field>,
}

impl FileFormatSpec {
    /// Infer the index schema from a result sample
    ///
    /// Column names keep only their last dotted segment (`t.id` -> `id`).
    /// A segment already taken by an earlier column gets the first free
    /// `_<n>` suffix (`a.id, b.id` -> `id, id_1`).
    pub fn from_sample(sample: &Sample) -> Self {
        let mut taken = HashSet::new();
        let columns = sample
            .meta
            .iter()
            .map(|col| {
                let name = unique_column_name(short_column_name(&col.name), &mut taken);
                Field::new(name, translate_type(&col.type_name))
            })
            .collect();

        Self {
            name: "col".to_string(),
            input_format: InputFormat::Query,
            format: CsvFormat::default(),
            sample: String::new(),
            columns,
        }
    }

    pub fn streaming(mut self) -> Self {
        self.input_format = InputFormat::StreamingHandle;
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.input_format == InputFormat::StreamingHandle
    }

    /// `name:type` pairs, used to compare schemas of two submissions
    pub fn schema_signature(&self) -> String {
        self.columns
            .iter()
            .map(|f| format!("{}:{}", f.name, f.field_type))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn short_column_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn unique_column_name(base: &str, taken: &mut HashSet<String>) -> String {
    let mut name = base.to_string();
    let mut suffix = 1;
    while taken.contains(&name) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(name.clone());
    name
}

//! Indexing job inputs
//!
//! Schema inference from a result sample, the live batch capability and the
//! job handoff contract.

pub mod field;
pub mod file_format;
pub mod job;

pub use field::{translate_type, Field, DEFAULT_FIELD_TYPE};
pub use file_format::{CsvFormat, FileFormatSpec, InputFormat};
pub use job::{
    is_valid_collection_name, BatchSource, IndexInput, IndexJobSubmitter, JobHandle,
    SnippetBatchSource,
};

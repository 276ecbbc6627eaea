//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across every crate that logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_USER: &str = "user";

// Entity identifiers
pub const FIELD_DOCUMENT_ID: &str = "document_id";
pub const FIELD_NOTEBOOK_UUID: &str = "notebook_uuid";
pub const FIELD_SNIPPET_ID: &str = "snippet_id";
pub const FIELD_JOB_ID: &str = "job_id";

// Dispatch context
pub const FIELD_DIALECT: &str = "dialect";
pub const FIELD_ACTION: &str = "action";
pub const FIELD_DESTINATION: &str = "destination";
pub const FIELD_LIVE_INDEXING: &str = "live_indexing";

// Batch sizes
pub const FIELD_BATCH_LEN: &str = "batch_len";
pub const FIELD_FAILED_LEN: &str = "failed_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

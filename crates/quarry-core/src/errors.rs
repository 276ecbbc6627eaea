use quarry_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias for pure core operations
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Result type alias used at the seams (drivers, stores, job handoff)
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error that leaves a Quarry crate is classified by one of these
/// kinds. Each kind maps to a stable code used by callers, tests and the
/// JSON error surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Bad references
    NotFound,

    // Bad enumerated input
    UnknownAction,
    UnknownEngine,

    // Request validation
    InvalidDestination,
    InvalidStatement,
    InvalidInput,

    // Driver misuse
    NoActiveCursor,

    // Collaborators
    StorageException,
    SubmissionError,
    ExternalService,

    // Auth
    Forbidden,

    // Integration/IO
    Io,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::UnknownAction => "ERR_UNKNOWN_ACTION",
            ExErrorKind::UnknownEngine => "ERR_UNKNOWN_ENGINE",
            ExErrorKind::InvalidDestination => "ERR_INVALID_DESTINATION",
            ExErrorKind::InvalidStatement => "ERR_INVALID_STATEMENT",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NoActiveCursor => "ERR_NO_ACTIVE_CURSOR",
            ExErrorKind::StorageException => "ERR_STORAGE_EXCEPTION",
            ExErrorKind::SubmissionError => "ERR_SUBMISSION_ERROR",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification used for programmatic handling plus the
/// request context needed to correlate a failure with its log lines.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    snippet_id: Option<u32>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            snippet_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (document id or uuid, job id, destination)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_snippet_id(mut self, snippet_id: u32) -> Self {
        self.snippet_id = Some(snippet_id);
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn snippet_id(&self) -> Option<u32> {
        self.snippet_id
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(snippet_id) = self.snippet_id {
            write!(f, " (snippet_id: {})", snippet_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy raised by pure core code
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuarryError {
    /// Saved document does not exist (or is not visible)
    #[error("Document not found: {document_id}")]
    DocumentNotFound { document_id: String },

    /// Snippet index is outside the notebook's snippet list
    #[error("Snippet {index} not found in notebook {notebook}")]
    SnippetNotFound { notebook: String, index: usize },

    #[error("Action {action} is unknown")]
    UnknownAction { action: String },

    /// No interpreter is registered for the dialect
    #[error("No interpreter registered for dialect: {dialect}")]
    UnknownEngine { dialect: String },

    /// `fetch_result` continued a cursor that was never opened
    #[error("No active result cursor for snippet {snippet_id} of notebook {notebook_uuid}")]
    NoActiveCursor {
        notebook_uuid: String,
        snippet_id: u32,
    },

    #[error("Invalid destination '{destination}': {reason}")]
    InvalidDestination { destination: String, reason: String },

    /// Statement is empty or cannot be exported
    #[error("Invalid statement: {reason}")]
    InvalidStatement { reason: String },

    /// Serialized notebook payload could not be decoded
    #[error("Invalid notebook data for document {document_id}: {reason}")]
    InvalidNotebookData { document_id: String, reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The view is switched off by configuration
    #[error("{view} is not enabled")]
    Disabled { view: String },

    /// Lock around shared driver state was poisoned
    #[error("Internal state poisoned: {what}")]
    Poisoned { what: String },
}

impl From<QuarryError> for ExError {
    fn from(err: QuarryError) -> Self {
        match err {
            QuarryError::DocumentNotFound { document_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(document_id)
                .with_message("Document not found"),

            QuarryError::SnippetNotFound { notebook, index } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(notebook)
                    .with_message(format!("Snippet index {} out of range", index))
            }

            QuarryError::UnknownAction { action } => ExError::new(ExErrorKind::UnknownAction)
                .with_entity_id(action.clone())
                .with_message(format!("Action {} is unknown", action)),

            QuarryError::UnknownEngine { dialect } => ExError::new(ExErrorKind::UnknownEngine)
                .with_entity_id(dialect)
                .with_message("No interpreter registered for dialect"),

            QuarryError::NoActiveCursor {
                notebook_uuid,
                snippet_id,
            } => ExError::new(ExErrorKind::NoActiveCursor)
                .with_entity_id(notebook_uuid)
                .with_snippet_id(snippet_id)
                .with_message("No active result cursor; fetch with start_over first"),

            QuarryError::InvalidDestination {
                destination,
                reason,
            } => ExError::new(ExErrorKind::InvalidDestination)
                .with_entity_id(destination)
                .with_message(reason),

            QuarryError::InvalidStatement { reason } => {
                ExError::new(ExErrorKind::InvalidStatement).with_message(reason)
            }

            QuarryError::InvalidNotebookData {
                document_id,
                reason,
            } => ExError::new(ExErrorKind::Serialization)
                .with_entity_id(document_id)
                .with_message(format!("Invalid notebook data: {}", reason)),

            QuarryError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::Config).with_message(reason)
            }

            QuarryError::Disabled { view } => ExError::new(ExErrorKind::Forbidden)
                .with_entity_id(view.clone())
                .with_message(format!("{} is not enabled", view)),

            QuarryError::Poisoned { what } => ExError::new(ExErrorKind::Internal)
                .with_message(format!("Lock poisoned: {}", what)),
        }
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error-kind code attached to every diagnostics entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unspecified,
    MissingElementContents,
    UnhandledContent,
    UnhandledElement,
    MissingBindingValue,
    MissingOrUnhandledContent,
    DuplicateTemplate,
    DuplicateBindingValue,
    TemplateNotFound,
    AdapterCountMismatch,
    InvalidAdapterState,
    MissingStyle,
    MissingStylesheet,
    GridCellWidthWithoutContents,
    ImageLoadFailed,
    TypefaceLoadFailed,
}

/// Fatal binding failures. Anything recoverable goes through the
/// diagnostics channel instead of this type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TrellisError {
    #[error("Missing {kind}")]
    MissingContent { kind: &'static str },

    #[error("Unhandled Content type: {0}")]
    UnhandledContent(String),

    #[error("Unhandled Element type: {0}")]
    UnhandledElement(String),

    #[error("{kind} binding {binding_id} had no content")]
    NoContent {
        kind: &'static str,
        binding_id: String,
    },

    #[error("no BindingValues defined")]
    NoBindingContext,

    #[error("{what} key '{key}' already defined")]
    DuplicateKey { what: &'static str, key: String },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Internal error in adapters per content")]
    AdapterCountMismatch,

    #[error("Invalid adapter state: {0}")]
    InvalidState(String),
}

impl TrellisError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            TrellisError::MissingContent { .. } => ErrorCode::MissingElementContents,
            TrellisError::UnhandledContent(_) => ErrorCode::UnhandledContent,
            TrellisError::UnhandledElement(_) => ErrorCode::UnhandledElement,
            TrellisError::NoContent { .. } | TrellisError::NoBindingContext => {
                ErrorCode::MissingBindingValue
            }
            TrellisError::DuplicateKey { what, .. } if *what == "Template" => {
                ErrorCode::DuplicateTemplate
            }
            TrellisError::DuplicateKey { .. } => ErrorCode::DuplicateBindingValue,
            TrellisError::TemplateNotFound(_) => ErrorCode::TemplateNotFound,
            TrellisError::AdapterCountMismatch => ErrorCode::AdapterCountMismatch,
            TrellisError::InvalidState(_) => ErrorCode::InvalidAdapterState,
        }
    }
}

pub type Result<T, E = TrellisError> = std::result::Result<T, E>;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured error returned by MCP tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolError {
    /// Machine-readable error kind
    pub kind: ToolErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Whether repeating the same call later could succeed
    pub retryable: bool,
    /// Offending argument, for `invalid_arguments`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Arguments failed schema or range validation
    InvalidArguments,
    /// Tool name not in the registry
    UnknownTool,
    /// Platform rejected the access token
    Unauthorized,
    /// Flow id unknown to the platform
    NotFound,
    /// Platform unreachable after retries
    Unavailable,
    /// Too many timeline records could not be interpreted
    CorruptFlow,
    InternalError,
}

impl ToolErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolErrorKind::InvalidArguments => "invalid_arguments",
            ToolErrorKind::UnknownTool => "unknown_tool",
            ToolErrorKind::Unauthorized => "unauthorized",
            ToolErrorKind::NotFound => "not_found",
            ToolErrorKind::Unavailable => "unavailable",
            ToolErrorKind::CorruptFlow => "corrupt_flow",
            ToolErrorKind::InternalError => "internal_error",
        }
    }
}

impl ToolError {
    fn new(kind: ToolErrorKind, message: String) -> Self {
        Self {
            kind,
            message,
            retryable: kind == ToolErrorKind::Unavailable,
            field: None,
        }
    }

    pub fn invalid_argument(field: &str, reason: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            ..Self::new(
                ToolErrorKind::InvalidArguments,
                format!("Invalid argument '{}': {}", field, reason),
            )
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ToolErrorKind::UnknownTool, format!("Unknown tool: {}", name))
    }

    pub fn not_found(flow_id: &str) -> Self {
        Self::new(
            ToolErrorKind::NotFound,
            format!("Flow not found: {}", flow_id),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InternalError, message.into())
    }
}

impl From<flowlens_store::Error> for ToolError {
    fn from(err: flowlens_store::Error) -> Self {
        use flowlens_store::Error;

        match err {
            Error::Unauthorized => Self::new(
                ToolErrorKind::Unauthorized,
                format!(
                    "{}; restart the server with a valid token",
                    Error::Unauthorized
                ),
            ),
            Error::NotFound(id) => Self::not_found(&id),
            e @ (Error::Transient(_) | Error::Unavailable { .. }) => {
                Self::new(ToolErrorKind::Unavailable, e.to_string())
            }
            e => Self::internal(e.to_string()),
        }
    }
}

impl From<flowlens_normalizer::Error> for ToolError {
    fn from(err: flowlens_normalizer::Error) -> Self {
        match err {
            e @ flowlens_normalizer::Error::CorruptFlow { .. } => {
                Self::new(ToolErrorKind::CorruptFlow, e.to_string())
            }
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for ToolError {}

//! Tool-level error taxonomy.
//!
//! Internally the dispatcher distinguishes four failure cases; on the wire
//! only two JSON-RPC codes are surfaced. An unknown tool name is reported as
//! invalid params rather than a dedicated not-found code — that matches the
//! existing wire contract and callers depend on it, so `wire_code` folds
//! [`ToolError::UnknownTool`] accordingly while the variant itself stays
//! distinct for in-process callers.

use thiserror::Error;

use crate::mcp::protocol::ErrorCode;

/// A failure produced while dispatching a tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The requested tool name matches no registered descriptor.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The argument payload does not conform to the tool's schema.
    ///
    /// The message enumerates every violation found, each naming its field.
    #[error("Invalid arguments: {0}")]
    InvalidParams(String),

    /// The business-logic handler failed or panicked.
    #[error("Tool execution failed: {0}")]
    Handler(String),

    /// A well-formed result could not be serialised for the wire.
    #[error("Failed to encode tool result: {0}")]
    Encode(String),
}

impl ToolError {
    /// Maps this error onto the two wire-visible JSON-RPC codes.
    #[must_use]
    pub const fn wire_code(&self) -> ErrorCode {
        match self {
            Self::UnknownTool(_) | Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::Handler(_) | Self::Encode(_) => ErrorCode::InternalError,
        }
    }
}

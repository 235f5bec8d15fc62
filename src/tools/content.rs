//! Result encoding: typed tool results to wire content.
//!
//! A handler produces a [`ToolOutput`] — an ordered sequence of record
//! values. [`encode`] renders that sequence as human-readable JSON text
//! (2-space indent, field order matching struct declaration order, non-ASCII
//! text verbatim) wrapped in the MCP text-content envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::error::ToolError;

/// An ordered sequence of records produced by a tool handler.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    records: Vec<Value>,
}

impl ToolOutput {
    /// Captures a sequence of typed records.
    ///
    /// Serialisation to JSON values happens here, while the records are
    /// still typed; field order follows struct declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Encode`] if a record cannot be represented as
    /// JSON.
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self, ToolError> {
        let records = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ToolError::Encode(e.to_string()))?;

        Ok(Self { records })
    }

    /// The captured records.
    #[must_use]
    pub fn records(&self) -> &[Value] {
        &self.records
    }
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call, as sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }
}

/// Encodes a tool's record sequence into its wire content representation.
///
/// # Errors
///
/// Returns [`ToolError::Encode`] if rendering fails. For a well-formed
/// [`ToolOutput`] this cannot happen.
pub fn encode(output: &ToolOutput) -> Result<ToolCallResult, ToolError> {
    let text = serde_json::to_string_pretty(output.records())
        .map_err(|e| ToolError::Encode(e.to_string()))?;

    Ok(ToolCallResult::text(text))
}

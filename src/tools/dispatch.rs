//! Invocation dispatch.
//!
//! One lookup in the registry's closed table, validation against the tool's
//! schema, then the handler runs under a panic boundary. No failure from
//! business logic may escape as an unhandled fault: handler errors and
//! panics alike come back as [`ToolError::Handler`] with the original
//! message preserved, and the server stays up for the next request.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;

use crate::tools::error::ToolError;
use crate::tools::{ToolOutput, ToolRegistry};

/// Routes invocation requests to registered tool handlers.
pub struct Dispatcher {
    registry: ToolRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher over a fully built registry.
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry, for discovery.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Dispatches one invocation: lookup, validate, invoke.
    ///
    /// # Errors
    ///
    /// - [`ToolError::UnknownTool`] if `name` matches no registered tool
    /// - [`ToolError::InvalidParams`] if `raw_arguments` fails validation
    /// - [`ToolError::Handler`] if the handler fails or panics
    pub fn dispatch(&self, name: &str, raw_arguments: &Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let args = tool.descriptor.input_schema.validate(raw_arguments)?;

        tracing::debug!(tool = %name, "Dispatching tool invocation");

        match catch_unwind(AssertUnwindSafe(|| (tool.handler)(args))) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(ToolError::Handler(e.to_string())),
            Err(panic) => Err(ToolError::Handler(panic_message(&*panic))),
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

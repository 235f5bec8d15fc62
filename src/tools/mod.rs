//! Tool registry, schemas, dispatch, and result encoding.
//!
//! A tool is a named, schema-described operation. The registry is built
//! explicitly at startup, handed to the server by value, and read-only from
//! then on: registration order is the discovery order, names are exact-match
//! only, and there is no removal.
//!
//! Adding a tool means adding one registry entry carrying its descriptor
//! and handler; the dispatch path never grows per-tool branches.

pub mod content;
pub mod dispatch;
pub mod error;
pub mod schema;

pub use content::{encode, ToolCallResult, ToolContent, ToolOutput};
pub use dispatch::Dispatcher;
pub use error::ToolError;
pub use schema::{FieldType, ObjectSchema, ValidatedArguments};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Boxed business-logic handler invoked with validated arguments.
///
/// Handlers are external collaborators: the dispatcher treats them as
/// opaque functions and wraps any failure they report.
pub type ToolHandler = Box<
    dyn Fn(ValidatedArguments) -> Result<ToolOutput, Box<dyn std::error::Error + Send + Sync>>
        + Send
        + Sync,
>;

/// Static metadata for one registered tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Unique, stable tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Structural schema for the tool's arguments.
    pub input_schema: ObjectSchema,
}

impl ToolDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(name: &str, description: &str, input_schema: ObjectSchema) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// The wire shape of a descriptor in the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

impl From<&ToolDescriptor> for ToolDefinition {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            input_schema: descriptor.input_schema.to_json_schema(),
        }
    }
}

/// A registry entry: descriptor plus handler.
pub struct RegisteredTool {
    /// The tool's static metadata.
    pub descriptor: ToolDescriptor,
    /// The business-logic handler.
    pub handler: ToolHandler,
}

/// Failure while building the registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("tool already registered: {0}")]
    Duplicate(String),
}

/// Insertion-ordered mapping from tool name to registered tool.
///
/// Append-only for the life of the process.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if a tool with the same name is
    /// already registered; existing entries are never overwritten.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: ToolHandler,
    ) -> Result<(), RegistryError> {
        if self.tools.contains_key(&descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name));
        }

        let name = descriptor.name.clone();
        self.tools.insert(
            name,
            RegisteredTool {
                descriptor,
                handler,
            },
        );
        Ok(())
    }

    /// Returns all descriptors in registration order.
    ///
    /// This is exactly the payload surfaced by discovery.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values().map(|tool| &tool.descriptor)
    }

    /// Looks up a tool by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// The number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

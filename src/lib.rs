//! user-search-mcp: MCP server and client for user directory search tools
//!
//! A minimal tool-invocation protocol server: named tools with typed
//! arguments and typed results, exposed over a line-delimited JSON-RPC 2.0
//! stream, plus a companion client for discovery and invocation.
//!
//! # Architecture
//!
//! The protocol engine is the core: an insertion-ordered tool registry,
//! schema-based argument validation, a closed dispatch table with a hard
//! fault boundary around business logic, and deterministic result encoding.
//! Business logic itself (the user directory lookup) is a stub collaborator
//! behind the same calling convention a real backend would use.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Configuration error types
//! - [`mcp`] — Protocol layer: messages, transport, server loop, client
//! - [`tools`] — Registry, schemas, dispatch, result encoding
//! - [`users`] — User directory business logic (stub)

pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
pub mod users;

//! Model Context Protocol (MCP) implementation.
//!
//! The server side exposes the user directory tools to MCP clients over a
//! line-delimited JSON-RPC 2.0 transport; the client side drives discovery
//! and invocation against such a server.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        MCP Server                          │
//! │                                                            │
//! │   ┌─────────────┐   ┌─────────────┐   ┌───────────────┐    │
//! │   │  Transport  │──▶│   Server    │──▶│  Dispatcher   │    │
//! │   │ (any duplex)│   │ (lifecycle) │   │  + Registry   │    │
//! │   └─────────────┘   └─────────────┘   └───────────────┘    │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod client;
pub mod protocol;
pub mod server;
pub mod transport;

pub use client::{ClientError, McpClient, ToolInfo};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};

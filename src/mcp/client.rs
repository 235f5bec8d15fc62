//! MCP client: discovery and invocation against a tool server.
//!
//! The client drives one session over an already-connected duplex stream:
//! initialize handshake on connect, then `tools/list` and `tools/call`
//! round-trips, one at a time. Every failure mode — connection, transport,
//! protocol desync, or a remote JSON-RPC error — surfaces through the single
//! [`ClientError`] channel with the error kind and message intact, so a
//! caller can tell bad input from a server bug.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::mcp::protocol::{OutgoingNotification, RequestId, MCP_PROTOCOL_VERSION};
use crate::mcp::transport::Transport;
use crate::tools::{ToolCallResult, ToolContent};

/// A failure on the client side of the protocol.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport or subprocess I/O failed.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the stream mid-session.
    #[error("server closed the connection")]
    ConnectionClosed,

    /// The server sent something the client cannot reconcile with its
    /// outstanding request.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered with a JSON-RPC error.
    #[error("server error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the server.
        message: String,
    },
}

/// A tool as described in a discovery response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub input_schema: Value,
}

/// An MCP client over an arbitrary duplex transport.
pub struct McpClient<R, W> {
    transport: Transport<R, W>,
    next_id: i64,
}

impl McpClient<BufReader<ChildStdout>, ChildStdin> {
    /// Spawns a server subprocess and connects over its stdio.
    ///
    /// The child's stderr is inherited so server logs remain visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or the initialize
    /// handshake fails.
    pub async fn spawn(
        program: &str,
        args: &[&str],
    ) -> Result<(Self, Child), ClientError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClientError::Protocol("child stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClientError::Protocol("child stdout not captured".to_string()))?;

        let client = Self::connect(Transport::new(BufReader::new(stdout), stdin)).await?;
        Ok((client, child))
    }
}

impl<R, W> McpClient<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Connects over an already-established transport and performs the
    /// initialize handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake round-trip fails.
    pub async fn connect(transport: Transport<R, W>) -> Result<Self, ClientError> {
        let mut client = Self {
            transport,
            next_id: 1,
        };

        let result = client
            .request(
                "initialize",
                json!({
                    "protocolVersion": MCP_PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "user-search-mcp-client",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
            .await?;

        let version = result
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        tracing::debug!(version = %version, "Server initialised");

        client
            .transport
            .write_notification(&OutgoingNotification::new(
                "notifications/initialized",
                None,
            ))
            .await?;

        Ok(client)
    }

    /// Performs the discovery round-trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the round-trip fails or the response does not
    /// carry a tool list.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolInfo>, ClientError> {
        let result = self.request("tools/list", json!({})).await?;

        let tools = result
            .get("tools")
            .cloned()
            .ok_or_else(|| ClientError::Protocol("tools/list response missing tools".to_string()))?;

        serde_json::from_value(tools)
            .map_err(|e| ClientError::Protocol(format!("malformed tool list: {e}")))
    }

    /// Invokes one named tool with an argument payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rpc`] with the server's code and message if
    /// the invocation was rejected, or another variant for transport and
    /// protocol failures.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Vec<ToolContent>, ClientError> {
        let result = self
            .request(
                "tools/call",
                json!({
                    "name": name,
                    "arguments": arguments,
                }),
            )
            .await?;

        let result: ToolCallResult = serde_json::from_value(result)
            .map_err(|e| ClientError::Protocol(format!("malformed tool call result: {e}")))?;

        Ok(result.content)
    }

    /// Sends a ping and waits for the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the round-trip fails.
    pub async fn ping(&mut self) -> Result<(), ClientError> {
        self.request("ping", json!({})).await?;
        Ok(())
    }

    /// Sends one request and reads messages until its response arrives.
    ///
    /// Notifications from the server are skipped; a response carrying a
    /// different ID is a protocol desync.
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id;
        self.next_id += 1;

        let message = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        self.transport.write_json(&message).await?;

        loop {
            let line = self
                .transport
                .read_line()
                .await?
                .ok_or(ClientError::ConnectionClosed)?;

            if line.trim().is_empty() {
                continue;
            }

            let reply: Value = serde_json::from_str(&line)
                .map_err(|e| ClientError::Protocol(format!("unparseable reply: {e}")))?;

            // Server-initiated notifications have no id; skip them.
            let Some(reply_id) = reply.get("id") else {
                continue;
            };

            let matches = match serde_json::from_value::<RequestId>(reply_id.clone()) {
                Ok(RequestId::Number(n)) => n == id,
                Ok(RequestId::String(_)) | Err(_) => false,
            };
            if !matches {
                return Err(ClientError::Protocol(format!(
                    "response id {reply_id} does not match request id {id}"
                )));
            }

            if let Some(error) = reply.get("error") {
                let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                return Err(ClientError::Rpc { code, message });
            }

            return reply
                .get("result")
                .cloned()
                .ok_or_else(|| ClientError::Protocol("reply has neither result nor error".to_string()));
        }
    }
}

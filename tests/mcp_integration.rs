//! Integration tests for the MCP server loop.
//!
//! A full server runs over an in-memory duplex transport while the test
//! drives it with raw JSON-RPC lines, covering the lifecycle handshake,
//! discovery, invocation, error propagation, and fault isolation.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

use user_search_mcp::config::UsersConfig;
use user_search_mcp::mcp::server::McpServer;
use user_search_mcp::mcp::Transport;
use user_search_mcp::tools::{
    ObjectSchema, ToolDescriptor, ToolHandler, ToolOutput, ToolRegistry,
};
use user_search_mcp::users;

/// Raw line-level driver for the far end of the server's transport.
struct Driver {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl Driver {
    async fn send(&mut self, message: &Value) {
        let mut line = serde_json::to_string(message).unwrap();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "server closed the stream unexpectedly");
        serde_json::from_str(&line).unwrap()
    }

    /// Performs the initialize handshake.
    async fn initialize(&mut self) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "integration-test", "version": "0.0.0"}
            }
        }))
        .await;

        let reply = self.recv().await;
        assert_eq!(reply["result"]["protocolVersion"], "2024-11-05");

        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .await;
    }
}

/// Starts a server over a duplex pair and returns the driving end.
fn spawn_server(registry: ToolRegistry) -> (Driver, JoinHandle<std::io::Result<()>>) {
    let (server_side, client_side) = tokio::io::duplex(64 * 1024);
    let (server_rx, server_tx) = tokio::io::split(server_side);
    let (client_rx, client_tx) = tokio::io::split(client_side);

    let mut server = McpServer::over(
        Transport::new(BufReader::new(server_rx), server_tx),
        registry,
    );
    let handle = tokio::spawn(async move { server.serve().await });

    (
        Driver {
            reader: BufReader::new(client_rx),
            writer: client_tx,
        },
        handle,
    )
}

fn user_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    users::register_tools(&mut registry, &UsersConfig::default()).unwrap();
    registry
}

#[tokio::test]
async fn discovery_lists_registered_tools_in_order() {
    let mut registry = user_registry();
    let descriptor = ToolDescriptor::new("noop", "Does nothing", ObjectSchema::new());
    let handler: ToolHandler = Box::new(|_| Ok(ToolOutput::default()));
    registry.register(descriptor, handler).unwrap();

    let (mut driver, _handle) = spawn_server(registry);
    driver.initialize().await;

    driver
        .send(&json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list", "params": {}}))
        .await;
    let reply = driver.recv().await;

    let tools = reply["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "select_user");
    assert_eq!(tools[1]["name"], "noop");
    assert_eq!(
        tools[0]["inputSchema"]["properties"]["username"]["type"],
        "string"
    );
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["username"]));
}

#[tokio::test]
async fn select_user_round_trip() {
    let (mut driver, _handle) = spawn_server(user_registry());
    driver.initialize().await;

    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "select_user", "arguments": {"username": "ZhangSan"}}
        }))
        .await;
    let reply = driver.recv().await;

    let content = reply["result"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0]["type"], "text");

    let text = content[0]["text"].as_str().unwrap();
    let records: Vec<Value> = serde_json::from_str(text).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[0]["username"], "ZhangSan");
    assert_eq!(records[0]["email"], "test@example.com");
    assert_eq!(records[0]["is_active"], true);
    assert_eq!(records[0]["phone"], "13800138000");
}

#[tokio::test]
async fn non_latin_username_rendered_verbatim() {
    let (mut driver, _handle) = spawn_server(user_registry());
    driver.initialize().await;

    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "select_user", "arguments": {"username": "张三"}}
        }))
        .await;
    let reply = driver.recv().await;

    let text = reply["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("张三"));
    assert!(!text.contains("\\u"));
}

#[tokio::test]
async fn missing_username_names_the_field() {
    let (mut driver, _handle) = spawn_server(user_registry());
    driver.initialize().await;

    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "select_user", "arguments": {}}
        }))
        .await;
    let reply = driver.recv().await;

    assert_eq!(reply["error"]["code"], -32602);
    let message = reply["error"]["message"].as_str().unwrap();
    assert!(message.contains("username"));
}

#[tokio::test]
async fn unknown_tool_is_invalid_params_naming_the_tool() {
    let (mut driver, _handle) = spawn_server(user_registry());
    driver.initialize().await;

    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "delete_user", "arguments": {"username": "ZhangSan"}}
        }))
        .await;
    let reply = driver.recv().await;

    assert_eq!(reply["error"]["code"], -32602);
    assert!(reply["error"]["message"]
        .as_str()
        .unwrap()
        .contains("delete_user"));
}

#[tokio::test]
async fn handler_failure_is_internal_error_and_server_survives() {
    let mut registry = user_registry();
    let descriptor = ToolDescriptor::new("broken", "Always fails", ObjectSchema::new());
    let handler: ToolHandler = Box::new(|_| Err("directory backend unreachable".into()));
    registry.register(descriptor, handler).unwrap();

    let (mut driver, _handle) = spawn_server(registry);
    driver.initialize().await;

    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "broken", "arguments": {}}
        }))
        .await;
    let reply = driver.recv().await;

    assert_eq!(reply["error"]["code"], -32603);
    assert!(reply["error"]["message"]
        .as_str()
        .unwrap()
        .contains("directory backend unreachable"));

    // The loop must keep serving after a handler failure.
    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "select_user", "arguments": {"username": "LiSi"}}
        }))
        .await;
    let reply = driver.recv().await;
    assert!(reply["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("LiSi"));
}

#[tokio::test]
async fn handler_panic_is_internal_error_and_server_survives() {
    let mut registry = user_registry();
    let descriptor = ToolDescriptor::new("panicky", "Always panics", ObjectSchema::new());
    let handler: ToolHandler = Box::new(|_| panic!("invariant violated"));
    registry.register(descriptor, handler).unwrap();

    let (mut driver, _handle) = spawn_server(registry);
    driver.initialize().await;

    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "panicky", "arguments": {}}
        }))
        .await;
    let reply = driver.recv().await;

    assert_eq!(reply["error"]["code"], -32603);
    assert!(reply["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invariant violated"));

    driver
        .send(&json!({"jsonrpc": "2.0", "id": 2, "method": "ping", "params": {}}))
        .await;
    let reply = driver.recv().await;
    assert_eq!(reply["result"], json!({}));
}

#[tokio::test]
async fn unsupported_method_is_invalid_params() {
    let (mut driver, _handle) = spawn_server(user_registry());
    driver.initialize().await;

    driver
        .send(&json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list", "params": {}}))
        .await;
    let reply = driver.recv().await;

    assert_eq!(reply["error"]["code"], -32602);
    assert!(reply["error"]["message"]
        .as_str()
        .unwrap()
        .contains("resources/list"));
}

#[tokio::test]
async fn requests_before_initialisation_are_rejected() {
    let (mut driver, _handle) = spawn_server(user_registry());

    driver
        .send(&json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list", "params": {}}))
        .await;
    let reply = driver.recv().await;

    assert_eq!(reply["error"]["code"], -32600);
}

#[tokio::test]
async fn second_initialize_is_rejected() {
    let (mut driver, _handle) = spawn_server(user_registry());
    driver.initialize().await;

    driver
        .send(&json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }))
        .await;
    let reply = driver.recv().await;

    assert_eq!(reply["error"]["code"], -32600);
}

#[tokio::test]
async fn malformed_json_gets_parse_error_and_loop_continues() {
    let (mut driver, _handle) = spawn_server(user_registry());
    driver.initialize().await;

    driver.writer.write_all(b"this is not json\n").await.unwrap();
    driver.writer.flush().await.unwrap();
    let reply = driver.recv().await;
    assert_eq!(reply["error"]["code"], -32700);

    driver
        .send(&json!({"jsonrpc": "2.0", "id": 1, "method": "ping", "params": {}}))
        .await;
    let reply = driver.recv().await;
    assert_eq!(reply["result"], json!({}));
}

#[tokio::test]
async fn transport_close_shuts_the_server_down() {
    let (driver, handle) = spawn_server(user_registry());
    drop(driver);

    let result = handle.await.unwrap();
    assert!(result.is_ok());
}

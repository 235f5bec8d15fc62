//! Client/server round-trips over an in-process duplex transport.
//!
//! Mirrors how a real MCP client session plays out: connect, discover,
//! invoke, and surface remote errors, with the server running as a task on
//! the other end of the stream.

use serde_json::json;
use tokio::io::BufReader;
use tokio::task::JoinHandle;

use user_search_mcp::config::UsersConfig;
use user_search_mcp::mcp::client::{ClientError, McpClient};
use user_search_mcp::mcp::server::McpServer;
use user_search_mcp::mcp::Transport;
use user_search_mcp::tools::{ToolContent, ToolRegistry};
use user_search_mcp::users;

type DuplexReader = BufReader<tokio::io::ReadHalf<tokio::io::DuplexStream>>;
type DuplexWriter = tokio::io::WriteHalf<tokio::io::DuplexStream>;

async fn connect_pair() -> (
    McpClient<DuplexReader, DuplexWriter>,
    JoinHandle<std::io::Result<()>>,
) {
    let mut registry = ToolRegistry::new();
    users::register_tools(&mut registry, &UsersConfig::default()).unwrap();

    let (server_side, client_side) = tokio::io::duplex(64 * 1024);
    let (server_rx, server_tx) = tokio::io::split(server_side);
    let (client_rx, client_tx) = tokio::io::split(client_side);

    let mut server = McpServer::over(
        Transport::new(BufReader::new(server_rx), server_tx),
        registry,
    );
    let handle = tokio::spawn(async move { server.serve().await });

    let client = McpClient::connect(Transport::new(BufReader::new(client_rx), client_tx))
        .await
        .unwrap();

    (client, handle)
}

#[tokio::test]
async fn discover_then_invoke() {
    let (mut client, _handle) = connect_pair().await;

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "select_user");
    assert_eq!(
        tools[0].input_schema["properties"]["username"]["type"],
        "string"
    );

    let content = client
        .call_tool("select_user", json!({"username": "ZhangSan"}))
        .await
        .unwrap();

    let ToolContent::Text { text } = &content[0];
    assert!(text.contains("\"username\": \"ZhangSan\""));
    assert!(text.contains("\"email\": \"test@example.com\""));
}

#[tokio::test]
async fn remote_invalid_params_carries_code_and_message() {
    let (mut client, _handle) = connect_pair().await;

    let err = client
        .call_tool("select_user", json!({}))
        .await
        .unwrap_err();

    let ClientError::Rpc { code, message } = err else {
        panic!("expected Rpc error, got {err:?}");
    };
    assert_eq!(code, -32602);
    assert!(message.contains("username"));
}

#[tokio::test]
async fn remote_unknown_tool_carries_code_and_message() {
    let (mut client, _handle) = connect_pair().await;

    let err = client
        .call_tool("delete_user", json!({"username": "ZhangSan"}))
        .await
        .unwrap_err();

    let ClientError::Rpc { code, message } = err else {
        panic!("expected Rpc error, got {err:?}");
    };
    assert_eq!(code, -32602);
    assert!(message.contains("delete_user"));
}

#[tokio::test]
async fn session_survives_a_failed_call() {
    let (mut client, _handle) = connect_pair().await;

    let _ = client.call_tool("delete_user", json!({})).await.unwrap_err();

    client.ping().await.unwrap();
    let content = client
        .call_tool("select_user", json!({"username": "LiSi"}))
        .await
        .unwrap();
    let ToolContent::Text { text } = &content[0];
    assert!(text.contains("LiSi"));
}

#[tokio::test]
async fn spawn_real_server_binary() {
    let bin = env!("CARGO_BIN_EXE_user-search-mcp");
    let (mut client, mut child) = McpClient::spawn(bin, &["--quiet"]).await.unwrap();

    let tools = client.list_tools().await.unwrap();
    assert_eq!(tools[0].name, "select_user");

    let content = client
        .call_tool("select_user", json!({"username": "ZhangSan"}))
        .await
        .unwrap();
    let ToolContent::Text { text } = &content[0];
    assert!(text.contains("\"phone\": \"13800138000\""));

    // Dropping the client closes the child's stdin; EOF shuts it down.
    drop(client);
    let status = child.wait().await.unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn closed_server_surfaces_connection_closed() {
    let (mut client, handle) = connect_pair().await;

    handle.abort();
    let _ = handle.await;

    let err = client.ping().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::ConnectionClosed | ClientError::Io(_)
    ));
}

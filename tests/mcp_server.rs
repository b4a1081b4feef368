//! Drives the MCP server over an in-memory pipe with raw JSON-RPC lines.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};

use repo_onboarder::config::Config;
use repo_onboarder::env::Env;
use repo_onboarder::mcp::{self, OnboarderServer};
use repo_onboarder::providers::{CacheHandle, GenerationProvider, ProviderError};
use repo_onboarder::tool::{GenerateDocumentationTool, TOOL_NAME};

struct CannedProvider;

#[async_trait]
impl GenerationProvider for CannedProvider {
    async fn create_cache(
        &self,
        _content: &str,
        _mime_type: &str,
        _ttl_seconds: u64,
        key: &str,
    ) -> Result<CacheHandle, ProviderError> {
        Ok(CacheHandle {
            name: "cachedContents/1".into(),
            display_name: Some(key.to_string()),
            model: None,
        })
    }

    async fn generate_content(
        &self,
        _prompt: &str,
        _cache: Option<&CacheHandle>,
    ) -> Result<String, ProviderError> {
        Ok("# Canned".into())
    }
}

struct Client {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl Client {
    async fn send(&mut self, message: Value) {
        let mut line = serde_json::to_vec(&message).unwrap();
        line.push(b'\n');
        self.writer.write_all(&line).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Next message answering request `id`, skipping notifications.
    async fn response(&mut self, id: u64) -> Value {
        loop {
            let line = tokio::time::timeout(Duration::from_secs(30), self.lines.next_line())
                .await
                .expect("server response timed out")
                .unwrap()
                .expect("server closed the stream");
            let message: Value = serde_json::from_str(&line).unwrap();
            if message["id"] == json!(id) {
                return message;
            }
        }
    }

    async fn request(&mut self, id: u64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        self.response(id).await
    }
}

/// Start a server task and complete the initialize handshake.
async fn connect() -> (Client, tokio::task::JoinHandle<Result<(), mcp::ServeError>>) {
    let (client_io, server_io) = tokio::io::duplex(1 << 20);
    let (server_read, server_write) = tokio::io::split(server_io);

    let tool = GenerateDocumentationTool::new(
        Config::default(),
        Env::mock(Vec::<(&str, &str)>::new()),
        Arc::new(CannedProvider),
    );
    let server = tokio::spawn(mcp::serve(OnboarderServer::new(tool), server_read, server_write));

    let (client_read, client_write) = tokio::io::split(client_io);
    let mut client = Client {
        lines: BufReader::new(client_read).lines(),
        writer: client_write,
    };

    let init = client
        .request(
            1,
            "initialize",
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "integration-test", "version": "0.0.0"}
            }),
        )
        .await;
    assert_eq!(init["result"]["serverInfo"]["name"], "repo-onboarder");
    assert!(init["result"]["capabilities"]["tools"].is_object());

    client
        .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;

    (client, server)
}

#[tokio::test]
async fn lists_the_documentation_tool() {
    let (mut client, _server) = connect().await;

    let listed = client.request(2, "tools/list", json!({})).await;
    let tools = listed["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], TOOL_NAME);
    let properties = &tools[0]["inputSchema"]["properties"];
    assert!(properties["projectPath"].is_object());
    assert!(properties["targetLanguage"].is_object());
}

#[tokio::test]
async fn call_returns_documents_as_text() {
    let project = tempfile::tempdir().unwrap();
    std::fs::write(project.path().join("main.rs"), "fn main() {}\n").unwrap();
    let (mut client, _server) = connect().await;

    let called = client
        .request(
            2,
            "tools/call",
            json!({
                "name": TOOL_NAME,
                "arguments": {"projectPath": project.path()}
            }),
        )
        .await;

    let result = &called["result"];
    assert_ne!(result["isError"], json!(true));
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("RECOMMENDATION:"), "got: {text}");
    assert!(text.contains("## README\n\n# Canned"));
    assert!(text.contains("## Evaluation\n\n# Canned"));
}

#[tokio::test]
async fn failures_come_back_as_error_results() {
    let missing = tempfile::tempdir().unwrap().path().join("missing");
    let (mut client, _server) = connect().await;

    let called = client
        .request(
            2,
            "tools/call",
            json!({
                "name": TOOL_NAME,
                "arguments": {"projectPath": missing}
            }),
        )
        .await;

    let result = &called["result"];
    assert_eq!(result["isError"], json!(true));
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error analyzing repository: "), "got: {text}");
}

#[tokio::test]
async fn session_ends_when_client_disconnects() {
    let (client, server) = connect().await;
    drop(client);

    let outcome = tokio::time::timeout(Duration::from_secs(30), server)
        .await
        .expect("server did not shut down")
        .unwrap();
    assert!(outcome.is_ok(), "{outcome:?}");
}

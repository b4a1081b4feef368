//! MCP server exposing `generateDocumentation` over stdio.
//!
//! stdout carries the JSON-RPC stream. Logs go to stderr only.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData, ServerHandler, ServiceExt, tool, tool_handler, tool_router};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::constants;
use crate::tool::{GenerateDocumentationArgs, GenerateDocumentationTool, ToolOutput};

/// Errors that end an MCP session.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("failed to initialize MCP session: {0}")]
    Initialize(String),

    #[error("MCP session terminated abnormally: {0}")]
    Session(String),
}

/// MCP handler wrapping a [`GenerateDocumentationTool`].
#[derive(Clone)]
pub struct OnboarderServer {
    tool: Arc<GenerateDocumentationTool>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OnboarderServer {
    pub fn new(tool: GenerateDocumentationTool) -> Self {
        Self {
            tool: Arc::new(tool),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "generateDocumentation",
        description = "Analyzes a local git repository and generates documentation"
    )]
    async fn generate_documentation(
        &self,
        Parameters(args): Parameters<GenerateDocumentationArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        tracing::info!(path = %args.project_path.display(), "generateDocumentation called");
        Ok(call_result(self.tool.call(args).await))
    }
}

#[tool_handler]
impl ServerHandler for OnboarderServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = constants::APP_NAME.to_string();
        info.server_info.version = constants::VERSION.to_string();
        info.instructions = Some(
            "Call generateDocumentation with the absolute projectPath of a local repository.".to_string(),
        );
        info
    }
}

/// Map the in-band tool outcome onto an MCP tool result.
pub fn call_result(output: ToolOutput) -> CallToolResult {
    let content = vec![Content::text(output.text)];
    if output.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

/// Serve one MCP session over `reader`/`writer` until the peer disconnects.
pub async fn serve<R, W>(server: OnboarderServer, reader: R, writer: W) -> Result<(), ServeError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let running = server
        .serve((reader, writer))
        .await
        .map_err(|e| ServeError::Initialize(e.to_string()))?;

    let reason = running
        .waiting()
        .await
        .map_err(|e| ServeError::Session(e.to_string()))?;
    tracing::info!(?reason, "MCP session closed");
    Ok(())
}

/// Serve one MCP session on the process's stdin/stdout.
pub async fn serve_stdio(server: OnboarderServer) -> Result<(), ServeError> {
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(text: &str, is_error: bool) -> ToolOutput {
        ToolOutput {
            text: text.to_string(),
            is_error,
            ..ToolOutput::default()
        }
    }

    #[test]
    fn errors_map_to_error_results() {
        let result = call_result(output("Error analyzing repository: boom", true));
        assert_eq!(result.is_error, Some(true));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["content"][0]["text"], "Error analyzing repository: boom");
    }

    #[test]
    fn success_maps_to_text_content() {
        let result = call_result(output("DOCUMENTATION GENERATED.", false));
        assert_ne!(result.is_error, Some(true));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "DOCUMENTATION GENERATED.");
    }
}

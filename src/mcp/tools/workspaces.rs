//! MCP tools for Workspace management.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::mcp::server::BusinessMapServer;
use crate::mcp::tools::{failure, reply};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetWorkspaceParams {
    #[schemars(
        description = "The ID of the workspace. Falls back to BUSINESSMAP_DEFAULT_WORKSPACE_ID when omitted."
    )]
    pub workspace_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateWorkspaceParams {
    #[schemars(description = "The name of the workspace")]
    pub name: String,
    #[schemars(description = "Optional description for the workspace")]
    pub description: Option<String>,
}

#[tool_router(router = workspace_read_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(description = "Get a list of all workspaces")]
    pub async fn list_workspaces(&self) -> Result<CallToolResult, McpError> {
        reply(
            self.client().list_workspaces().await,
            "fetching workspaces",
            None,
        )
    }

    #[tool(description = "Get details of a specific workspace")]
    pub async fn get_workspace(
        &self,
        params: Parameters<GetWorkspaceParams>,
    ) -> Result<CallToolResult, McpError> {
        let Some(workspace_id) = params.0.workspace_id.or(self.default_workspace_id()) else {
            return Ok(failure(
                "workspace_id is required when no default workspace is configured",
                "fetching workspace",
            ));
        };
        reply(
            self.client().get_workspace(workspace_id).await,
            "fetching workspace",
            None,
        )
    }
}

#[tool_router(router = workspace_write_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(description = "Create a new workspace")]
    pub async fn create_workspace(
        &self,
        params: Parameters<CreateWorkspaceParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        reply(
            self.client()
                .create_workspace(&params.name, params.description.as_deref())
                .await,
            "creating workspace",
            Some("Workspace created successfully:"),
        )
    }
}

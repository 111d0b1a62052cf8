//! Custom field, workflow and connectivity tools.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::mcp::server::BusinessMapServer;
use crate::mcp::tools::{reply, success};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetCustomFieldParams {
    #[schemars(description = "The ID of the custom field")]
    pub custom_field_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowColumnsParams {
    #[schemars(description = "The ID of the board")]
    pub board_id: i64,
    #[schemars(description = "The ID of the workflow on that board")]
    pub workflow_id: i64,
}

#[tool_router(router = utility_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(description = "Get the definition of a custom field")]
    pub async fn get_custom_field(
        &self,
        params: Parameters<GetCustomFieldParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_custom_field(params.0.custom_field_id).await,
            "fetching custom field",
            None,
        )
    }

    #[tool(description = "Get the columns that count towards cycle time in a workflow")]
    pub async fn get_workflow_cycle_time_columns(
        &self,
        params: Parameters<WorkflowColumnsParams>,
    ) -> Result<CallToolResult, McpError> {
        let WorkflowColumnsParams {
            board_id,
            workflow_id,
        } = params.0;
        reply(
            self.client()
                .get_workflow_cycle_time_columns(board_id, workflow_id)
                .await,
            "fetching workflow cycle time columns",
            None,
        )
    }

    #[tool(
        description = "Get the effective cycle time columns of a workflow, as used in cycle time calculations"
    )]
    pub async fn get_workflow_effective_cycle_time_columns(
        &self,
        params: Parameters<WorkflowColumnsParams>,
    ) -> Result<CallToolResult, McpError> {
        let WorkflowColumnsParams {
            board_id,
            workflow_id,
        } = params.0;
        reply(
            self.client()
                .get_workflow_effective_cycle_time_columns(board_id, workflow_id)
                .await,
            "fetching workflow effective cycle time columns",
            None,
        )
    }

    #[tool(description = "Check that the BusinessMap API is reachable with the configured token")]
    pub async fn health_check(&self) -> Result<CallToolResult, McpError> {
        let healthy = self.client().health_check().await;
        let status = if healthy { "healthy" } else { "unhealthy" };
        Ok(success(
            &json!({ "status": status, "base_url": self.client().base_url() }),
            Some("API health check:"),
        ))
    }

    #[tool(description = "Get information about the BusinessMap API connection")]
    pub async fn get_api_info(&self) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_api_info().await,
            "fetching API info",
            None,
        )
    }
}

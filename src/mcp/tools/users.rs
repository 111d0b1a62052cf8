//! MCP tools for User management.

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
pub struct GetUserParams {
    #[schemars(description = "The ID of the user")]
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InviteUserParams {
    #[schemars(description = "The email address of the user to invite")]
    pub email: String,
    #[schemars(
        description = "When set to 1, no invitation email is sent and an admin must manually send it later (0 or 1, default 0)"
    )]
    pub do_not_send_confirmation_email: Option<u8>,
}

#[tool_router(router = user_read_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(description = "Get a list of all users")]
    pub async fn list_users(&self) -> Result<CallToolResult, McpError> {
        reply(self.client().list_users().await, "fetching users", None)
    }

    #[tool(description = "Get details of a specific user")]
    pub async fn get_user(
        &self,
        params: Parameters<GetUserParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_user(params.0.user_id).await,
            "fetching user",
            None,
        )
    }

    #[tool(description = "Get details of the user the API token belongs to")]
    pub async fn get_current_user(&self) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_current_user().await,
            "fetching current user",
            None,
        )
    }
}

#[tool_router(router = user_write_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(description = "Invite a new user by email")]
    pub async fn invite_user(
        &self,
        params: Parameters<InviteUserParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        if !params.email.contains('@') {
            return Ok(failure(
                format!("'{}' is not a valid email address", params.email),
                "inviting user",
            ));
        }
        reply(
            self.client()
                .invite_user(&params.email, params.do_not_send_confirmation_email)
                .await,
            "inviting user",
            Some("User invited successfully:"),
        )
    }
}

//! MCP server implementation
//!
//! [`BusinessMapServer`] is one dispatch context: an upstream client plus
//! the tool, resource and prompt tables bound to it. Every session gets its
//! own instance.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::router::{prompt::PromptRouter, tool::ToolRouter},
    model::{
        GetPromptRequestParams, GetPromptResult, Implementation, ListPromptsResult,
        ListResourcesResult, PaginatedRequestParams, ReadResourceRequestParams,
        ReadResourceResult, ServerCapabilities, ServerInfo,
    },
    prompt_handler,
    service::RequestContext,
    tool_handler,
};

use super::resources::listed_resources;
use crate::client::{BusinessMapClient, ClientConfig, ClientResult};
use crate::config::Config;

/// Identity and defaults a server instance reports and applies.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub name: String,
    pub version: String,
    pub default_workspace_id: Option<i64>,
    pub read_only: bool,
}

impl ServerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.server_name.clone(),
            version: config.server_version.clone(),
            default_workspace_id: config.default_workspace_id,
            read_only: config.read_only,
        }
    }
}

#[derive(Clone)]
pub struct BusinessMapServer {
    client: Arc<BusinessMapClient>,
    settings: Arc<ServerSettings>,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

impl BusinessMapServer {
    /// Build a server around `client`.
    ///
    /// In read-only mode (either the settings or the client say so) no
    /// mutating tool is registered at all.
    pub fn new(client: BusinessMapClient, settings: ServerSettings) -> Self {
        let read_only = settings.read_only || client.is_read_only();

        let mut tool_router = Self::workspace_read_tools()
            + Self::board_read_tools()
            + Self::card_read_tools()
            + Self::user_read_tools()
            + Self::utility_tools();
        if !read_only {
            tool_router = tool_router
                + Self::workspace_write_tools()
                + Self::board_write_tools()
                + Self::card_write_tools()
                + Self::user_write_tools();
        }

        Self {
            client: Arc::new(client),
            settings: Arc::new(ServerSettings {
                read_only,
                ..settings
            }),
            tool_router,
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let client = BusinessMapClient::new(&ClientConfig {
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
            read_only: config.read_only,
        })?;
        Ok(Self::new(client, ServerSettings::from_config(config)))
    }

    pub(crate) fn client(&self) -> &BusinessMapClient {
        &self.client
    }

    pub(crate) fn default_workspace_id(&self) -> Option<i64> {
        self.settings.default_workspace_id
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Names of every registered tool, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        names
    }

    fn instructions(&self) -> String {
        let mode = if self.settings.read_only {
            "Read-only mode: tools that modify BusinessMap are not available."
        } else {
            "Tools can read and modify workspaces, boards, cards and users."
        };
        format!(
            "BusinessMap MCP Server - Work with BusinessMap workspaces, boards, cards and users. {mode}"
        )
    }
}

#[tool_handler(router = self.tool_router)]
#[prompt_handler(router = self.prompt_router)]
impl ServerHandler for BusinessMapServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
        )
        .with_instructions(self.instructions())
        .with_server_info(Implementation::new(
            self.settings.name.clone(),
            self.settings.version.clone(),
        ))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(listed_resources()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_resource_uri(&request.uri).await
    }
}

//! MCP tools for Board, Lane and Column management.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::client::BoardFilters;
use crate::mcp::server::BusinessMapServer;
use crate::mcp::tools::{failure, reply, success};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BoardIdParams {
    #[schemars(description = "The ID of the board")]
    pub board_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchBoardParams {
    #[schemars(description = "The ID of the board to look up")]
    pub board_id: Option<i64>,
    #[schemars(description = "Part of the board name to search for (case-insensitive)")]
    pub board_name: Option<String>,
    #[schemars(
        description = "Restrict the search to this workspace. Falls back to BUSINESSMAP_DEFAULT_WORKSPACE_ID."
    )]
    pub workspace_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetLaneParams {
    #[schemars(description = "The ID of the lane")]
    pub lane_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateBoardParams {
    #[schemars(description = "The name of the board")]
    pub name: String,
    #[schemars(description = "Optional description for the board")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schemars(
        description = "The workspace to create the board in. Falls back to BUSINESSMAP_DEFAULT_WORKSPACE_ID."
    )]
    pub workspace_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateLaneParams {
    #[schemars(description = "The workflow ID the lane belongs to")]
    pub workflow_id: i64,
    #[schemars(description = "The name of the lane")]
    pub name: String,
    #[schemars(description = "Optional description for the lane")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schemars(description = "Lane color as a hex code without '#', e.g. 'ff0000'")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[schemars(description = "Zero-based position of the lane among its siblings")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateColumnParams {
    #[schemars(description = "The ID of the board")]
    #[serde(skip_serializing)]
    pub board_id: i64,
    #[schemars(description = "The workflow ID (required for main columns)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<i64>,
    #[schemars(description = "Section: 1=Backlog, 2=Requested, 3=Progress, 4=Done")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<u8>,
    #[schemars(description = "The parent column ID when creating a sub-column")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_column_id: Option<i64>,
    #[schemars(description = "Zero-based position of the column")]
    pub position: i64,
    #[schemars(description = "The name of the column")]
    pub name: String,
    #[schemars(description = "WIP limit, 0 for none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[schemars(description = "Optional description for the column")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateColumnParams {
    #[schemars(description = "The ID of the board")]
    #[serde(skip_serializing)]
    pub board_id: i64,
    #[schemars(description = "The ID of the column to update")]
    #[serde(skip_serializing)]
    pub column_id: i64,
    #[schemars(description = "New name (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[schemars(description = "New WIP limit (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[schemars(description = "New description (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schemars(description = "New position (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteColumnParams {
    #[schemars(description = "The ID of the board")]
    pub board_id: i64,
    #[schemars(description = "The ID of the column to delete")]
    pub column_id: i64,
}

// =============================================================================
// Board Tools
// =============================================================================

#[tool_router(router = board_read_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(
        description = "Get a list of boards, optionally filtered by board IDs, workspaces, archive state or assignment"
    )]
    pub async fn list_boards(
        &self,
        params: Parameters<BoardFilters>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().list_boards(&params.0).await,
            "fetching boards",
            None,
        )
    }

    #[tool(
        description = "Find a board by ID or by name. With neither, lists all boards. Board IDs that cannot be fetched directly are looked up in the board list."
    )]
    pub async fn search_board(
        &self,
        params: Parameters<SearchBoardParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let workspace_id = params.workspace_id.or(self.default_workspace_id());

        if let Some(board_id) = params.board_id {
            return Ok(self.search_board_by_id(board_id, workspace_id).await);
        }
        if let Some(name) = params.board_name.as_deref().map(str::trim)
            && !name.is_empty()
        {
            return Ok(self.search_board_by_name(name, workspace_id).await);
        }

        let filters = BoardFilters::for_workspace(workspace_id);
        reply(
            self.client()
                .list_boards(&filters)
                .await
                .map(|boards| summarize_boards(&boards)),
            "searching for board",
            Some("All available boards:"),
        )
    }

    #[tool(description = "Get the columns of a board")]
    pub async fn get_columns(
        &self,
        params: Parameters<BoardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_columns(params.0.board_id).await,
            "fetching board columns",
            None,
        )
    }

    #[tool(description = "Get the lanes of a board")]
    pub async fn get_lanes(
        &self,
        params: Parameters<BoardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_lanes(params.0.board_id).await,
            "fetching board lanes",
            None,
        )
    }

    #[tool(description = "Get details of a specific lane")]
    pub async fn get_lane(
        &self,
        params: Parameters<GetLaneParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_lane(params.0.lane_id).await,
            "fetching lane details",
            None,
        )
    }

    #[tool(
        description = "Get the current structure of a board: its workflows, columns, lanes and settings"
    )]
    pub async fn get_current_board_structure(
        &self,
        params: Parameters<BoardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_current_board_structure(params.0.board_id)
                .await,
            "fetching current board structure",
            Some("Board structure retrieved successfully:"),
        )
    }
}

#[tool_router(router = board_write_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(description = "Create a new board in a workspace")]
    pub async fn create_board(
        &self,
        params: Parameters<CreateBoardParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut params = params.0;
        params.workspace_id = params.workspace_id.or(self.default_workspace_id());
        if params.workspace_id.is_none() {
            return Ok(failure(
                "workspace_id is required when no default workspace is configured",
                "creating board",
            ));
        }
        reply(
            self.client().create_board(&params).await,
            "creating board",
            Some("Board created successfully:"),
        )
    }

    #[tool(description = "Create a new lane in a workflow")]
    pub async fn create_lane(
        &self,
        params: Parameters<CreateLaneParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().create_lane(&params.0).await,
            "creating lane",
            Some("Lane created successfully:"),
        )
    }

    #[tool(
        description = "Create a column on a board. Main columns need workflow_id and section; sub-columns need parent_column_id."
    )]
    pub async fn create_column(
        &self,
        params: Parameters<CreateColumnParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut params = params.0;
        if params.parent_column_id.is_some() {
            params.workflow_id = None;
            params.section = None;
        } else if params.workflow_id.is_none() || params.section.is_none() {
            return Ok(failure(
                "workflow_id and section are required unless parent_column_id is set",
                "creating column",
            ));
        }
        reply(
            self.client().create_column(params.board_id, &params).await,
            "creating column",
            Some("Column created successfully:"),
        )
    }

    #[tool(description = "Update the name, limit, description or position of a column")]
    pub async fn update_column(
        &self,
        params: Parameters<UpdateColumnParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        reply(
            self.client()
                .update_column(params.board_id, params.column_id, &params)
                .await,
            "updating column",
            Some("Column updated successfully:"),
        )
    }

    #[tool(description = "Delete a column from a board")]
    pub async fn delete_column(
        &self,
        params: Parameters<DeleteColumnParams>,
    ) -> Result<CallToolResult, McpError> {
        let DeleteColumnParams {
            board_id,
            column_id,
        } = params.0;
        reply(
            self.client()
                .delete_column(board_id, column_id)
                .await
                .map(|()| json!({ "board_id": board_id, "column_id": column_id })),
            "deleting column",
            Some("Column deleted successfully:"),
        )
    }
}

impl BusinessMapServer {
    async fn search_board_by_id(&self, board_id: i64, workspace_id: Option<i64>) -> CallToolResult {
        let direct = async {
            let board = self.client().get_board(board_id).await?;
            let structure = self.client().get_board_structure(board_id).await?;
            Ok::<_, crate::client::ClientError>(json!({ "board": board, "structure": structure }))
        };
        match direct.await {
            Ok(found) => success(&found, Some("Board found directly:")),
            Err(direct) => {
                warn!(board_id, "Direct board lookup failed, searching the board list: {}", direct);
                let boards = match self
                    .client()
                    .list_boards(&BoardFilters::for_workspace(workspace_id))
                    .await
                {
                    Ok(boards) => boards,
                    Err(e) => return failure(e, "searching for board"),
                };

                let found = as_list(&boards)
                    .iter()
                    .find(|b| b.get("board_id").and_then(Value::as_i64) == Some(board_id))
                    .cloned();
                let Some(board) = found else {
                    return failure(
                        format!(
                            "Board with ID {board_id} not found. Available boards:\n{}",
                            pretty(&summarize_boards(&boards))
                        ),
                        "searching for board",
                    );
                };

                match self.client().get_board_structure(board_id).await {
                    Ok(structure) => success(
                        &json!({ "board": board, "structure": structure }),
                        Some("Board found via list search:"),
                    ),
                    Err(_) => success(&board, Some("Board found via list search:")),
                }
            }
        }
    }

    async fn search_board_by_name(&self, name: &str, workspace_id: Option<i64>) -> CallToolResult {
        let boards = match self
            .client()
            .list_boards(&BoardFilters::for_workspace(workspace_id))
            .await
        {
            Ok(boards) => boards,
            Err(e) => return failure(e, "searching for board by name"),
        };

        let matches = matching_boards(&boards, name);
        match matches.as_slice() {
            [] => failure(
                format!(
                    "No boards found matching name \"{name}\". Available boards:\n{}",
                    pretty(&summarize_boards(&boards))
                ),
                "searching for board by name",
            ),
            [board] => {
                let Some(board_id) = board.get("board_id").and_then(Value::as_i64) else {
                    return success(*board, Some("Board found by name:"));
                };
                match self.client().get_board_structure(board_id).await {
                    Ok(structure) => success(
                        &json!({ "board": board, "structure": structure }),
                        Some("Board found by name:"),
                    ),
                    Err(e) => success(
                        *board,
                        Some(&format!(
                            "Board found but structure unavailable. Structure error: {e}"
                        )),
                    ),
                }
            }
            several => {
                let listed: Vec<Value> = several.iter().map(|b| summarize(b)).collect();
                success(
                    &listed,
                    Some(&format!("Multiple boards found matching \"{name}\":")),
                )
            }
        }
    }
}

fn as_list(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Boards whose name contains `needle`, ignoring case.
pub(crate) fn matching_boards<'a>(boards: &'a Value, needle: &str) -> Vec<&'a Value> {
    let needle = needle.to_lowercase();
    as_list(boards)
        .iter()
        .filter(|b| {
            b.get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

fn summarize(board: &Value) -> Value {
    json!({
        "board_id": board.get("board_id"),
        "name": board.get("name"),
        "workspace_id": board.get("workspace_id"),
    })
}

pub(crate) fn summarize_boards(boards: &Value) -> Value {
    Value::Array(as_list(boards).iter().map(summarize).collect())
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

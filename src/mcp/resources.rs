//! Read-only `businessmap://` resources.
//!
//! `businessmap://workspaces` and `businessmap://boards` are listed; the
//! per-board, per-board-cards and per-card URIs are readable on demand.

use rmcp::{
    ErrorData as McpError,
    model::{AnnotateAble, RawResource, ReadResourceResult, Resource, ResourceContents},
};
use serde_json::{Value, json};

use super::server::BusinessMapServer;
use crate::client::{BoardFilters, CardFilters};

pub const SCHEME: &str = "businessmap://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Workspaces,
    Boards,
    Board(i64),
    BoardCards(i64),
    Card(i64),
}

/// Map a resource URI onto what it addresses. Ids must be integers.
pub fn parse_resource_uri(uri: &str) -> Option<ResourceKind> {
    let path = uri.strip_prefix(SCHEME)?;
    let segments: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    match segments.as_slice() {
        ["workspaces"] => Some(ResourceKind::Workspaces),
        ["boards"] => Some(ResourceKind::Boards),
        ["boards", id] => id.parse().ok().map(ResourceKind::Board),
        ["boards", id, "cards"] => id.parse().ok().map(ResourceKind::BoardCards),
        ["cards", id] => id.parse().ok().map(ResourceKind::Card),
        _ => None,
    }
}

/// Resources advertised by `resources/list`.
pub fn listed_resources() -> Vec<Resource> {
    vec![
        RawResource::new(format!("{SCHEME}workspaces"), "workspaces").no_annotation(),
        RawResource::new(format!("{SCHEME}boards"), "boards").no_annotation(),
    ]
}

impl BusinessMapServer {
    pub(crate) async fn read_resource_uri(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let Some(kind) = parse_resource_uri(uri) else {
            return Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            ));
        };

        let client = self.client();
        let data = match kind {
            ResourceKind::Workspaces => client.list_workspaces().await,
            ResourceKind::Boards => client.list_boards(&BoardFilters::default()).await,
            ResourceKind::Board(board_id) => client.get_board(board_id).await,
            ResourceKind::BoardCards(board_id) => {
                client.list_cards(board_id, &CardFilters::default()).await
            }
            ResourceKind::Card(card_id) => client.get_card(card_id).await,
        }
        .map_err(|e| McpError::internal_error(e.to_string(), Some(json!({ "uri": uri }))))?;

        Ok(ReadResourceResult::new(vec![ResourceContents::text(
            render(&data),
            uri,
        )]))
    }
}

fn render(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}

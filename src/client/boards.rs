use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BusinessMapClient, ClientResult, Query};

/// Filters accepted by `GET /boards`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BoardFilters {
    #[schemars(description = "Only return boards with these IDs")]
    pub board_ids: Option<Vec<i64>>,
    #[schemars(description = "Only return boards in these workspaces")]
    pub workspace_ids: Option<Vec<i64>>,
    #[schemars(description = "Extra data to include: 'workflows', 'settings', 'structure'")]
    pub expand: Option<Vec<String>>,
    #[schemars(description = "Fields to return, e.g. 'board_id', 'name', 'workspace_id'")]
    pub fields: Option<Vec<String>>,
    #[schemars(description = "1 to only return boards the current user is assigned to")]
    pub if_assigned: Option<u8>,
    #[schemars(description = "0 for active boards, 1 for archived boards")]
    pub is_archived: Option<u8>,
    #[schemars(description = "Single workspace filter (legacy form of workspace_ids)")]
    pub workspace_id: Option<i64>,
}

impl BoardFilters {
    pub fn for_workspace(workspace_id: Option<i64>) -> Self {
        Self {
            workspace_id,
            ..Default::default()
        }
    }

    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        Query::new()
            .list("board_ids", self.board_ids.as_deref())
            .list("workspace_ids", self.workspace_ids.as_deref())
            .list("expand", self.expand.as_deref())
            .list("fields", self.fields.as_deref())
            .value("if_assigned", self.if_assigned)
            .value("is_archived", self.is_archived)
            .value("workspace_id", self.workspace_id)
            .into_pairs()
    }
}

impl BusinessMapClient {
    pub async fn list_boards(&self, filters: &BoardFilters) -> ClientResult<Value> {
        self.get_with_query("/boards", &filters.to_query()).await
    }

    pub async fn get_board(&self, board_id: i64) -> ClientResult<Value> {
        self.get(&format!("/boards/{board_id}")).await
    }

    pub async fn get_board_structure(&self, board_id: i64) -> ClientResult<Value> {
        self.get(&format!("/boards/{board_id}/structure")).await
    }

    /// Workflows, columns and lanes of a board as currently configured.
    pub async fn get_current_board_structure(&self, board_id: i64) -> ClientResult<Value> {
        self.get(&format!("/boards/{board_id}/currentStructure"))
            .await
    }

    pub async fn get_columns(&self, board_id: i64) -> ClientResult<Value> {
        self.get(&format!("/boards/{board_id}/columns")).await
    }

    pub async fn get_lanes(&self, board_id: i64) -> ClientResult<Value> {
        self.get(&format!("/boards/{board_id}/lanes")).await
    }

    pub async fn get_lane(&self, lane_id: i64) -> ClientResult<Value> {
        self.get(&format!("/lanes/{lane_id}")).await
    }

    pub async fn create_board<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        self.post("create board", "/boards", body).await
    }

    pub async fn create_lane<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        self.post("create lane", "/lanes", body).await
    }

    pub async fn create_column<B: Serialize + ?Sized>(
        &self,
        board_id: i64,
        body: &B,
    ) -> ClientResult<Value> {
        self.post("create column", &format!("/boards/{board_id}/columns"), body)
            .await
    }

    pub async fn update_column<B: Serialize + ?Sized>(
        &self,
        board_id: i64,
        column_id: i64,
        body: &B,
    ) -> ClientResult<Value> {
        self.patch(
            "update column",
            &format!("/boards/{board_id}/columns/{column_id}"),
            body,
        )
        .await
    }

    pub async fn delete_column(&self, board_id: i64, column_id: i64) -> ClientResult<()> {
        self.delete(
            "delete column",
            &format!("/boards/{board_id}/columns/{column_id}"),
        )
        .await
    }
}

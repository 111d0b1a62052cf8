use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{BusinessMapClient, ClientResult, Query};

/// Optional filters for `GET /cards`.
///
/// Date filters take `YYYY-MM-DD`; list filters are sent comma-separated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CardFilters {
    #[schemars(description = "Cards created on or after this date (YYYY-MM-DD)")]
    pub created_from_date: Option<String>,
    #[schemars(description = "Cards created on or before this date (YYYY-MM-DD)")]
    pub created_to_date: Option<String>,
    #[schemars(description = "Cards with a deadline on or after this date (YYYY-MM-DD)")]
    pub deadline_from_date: Option<String>,
    #[schemars(description = "Cards with a deadline on or before this date (YYYY-MM-DD)")]
    pub deadline_to_date: Option<String>,
    #[schemars(description = "Cards modified on or after this date (YYYY-MM-DD)")]
    pub last_modified_from_date: Option<String>,
    #[schemars(description = "Cards modified on or before this date (YYYY-MM-DD)")]
    pub last_modified_to_date: Option<String>,
    #[schemars(description = "Cards archived on or after this date (YYYY-MM-DD)")]
    pub archived_from_date: Option<String>,
    #[schemars(description = "Cards archived on or before this date (YYYY-MM-DD)")]
    pub archived_to_date: Option<String>,
    pub card_ids: Option<Vec<i64>>,
    pub column_ids: Option<Vec<i64>>,
    pub lane_ids: Option<Vec<i64>>,
    pub workflow_ids: Option<Vec<i64>>,
    pub owner_user_ids: Option<Vec<i64>>,
    pub type_ids: Option<Vec<i64>>,
    pub tag_ids: Option<Vec<i64>>,
    pub priorities: Option<Vec<i64>>,
    pub sizes: Option<Vec<i64>>,
    #[schemars(description = "Sections: 1=Backlog, 2=Requested, 3=Progress, 4=Done, 5=Archive")]
    pub sections: Option<Vec<i64>>,
    pub colors: Option<Vec<String>>,
    pub custom_ids: Option<Vec<String>>,
    #[schemars(description = "Page number (1-based)")]
    pub page: Option<u32>,
    #[schemars(description = "Cards per page")]
    pub per_page: Option<u32>,
}

impl CardFilters {
    pub(crate) fn to_query(&self, board_id: i64) -> Vec<(String, String)> {
        Query::new()
            .value("board_id", Some(board_id))
            .value("created_from_date", self.created_from_date.as_deref())
            .value("created_to_date", self.created_to_date.as_deref())
            .value("deadline_from_date", self.deadline_from_date.as_deref())
            .value("deadline_to_date", self.deadline_to_date.as_deref())
            .value("last_modified_from_date", self.last_modified_from_date.as_deref())
            .value("last_modified_to_date", self.last_modified_to_date.as_deref())
            .value("archived_from_date", self.archived_from_date.as_deref())
            .value("archived_to_date", self.archived_to_date.as_deref())
            .list("card_ids", self.card_ids.as_deref())
            .list("column_ids", self.column_ids.as_deref())
            .list("lane_ids", self.lane_ids.as_deref())
            .list("workflow_ids", self.workflow_ids.as_deref())
            .list("owner_user_ids", self.owner_user_ids.as_deref())
            .list("type_ids", self.type_ids.as_deref())
            .list("tag_ids", self.tag_ids.as_deref())
            .list("priorities", self.priorities.as_deref())
            .list("sizes", self.sizes.as_deref())
            .list("sections", self.sections.as_deref())
            .list("colors", self.colors.as_deref())
            .list("custom_ids", self.custom_ids.as_deref())
            .value("page", self.page)
            .value("per_page", self.per_page)
            .into_pairs()
    }
}

impl BusinessMapClient {
    pub async fn list_cards(&self, board_id: i64, filters: &CardFilters) -> ClientResult<Value> {
        self.get_with_query("/cards", &filters.to_query(board_id))
            .await
    }

    pub async fn get_card(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}")).await
    }

    pub async fn create_card<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        self.post("create card", "/cards", body).await
    }

    pub async fn update_card<B: Serialize + ?Sized>(
        &self,
        card_id: i64,
        body: &B,
    ) -> ClientResult<Value> {
        self.patch("update card", &format!("/cards/{card_id}"), body)
            .await
    }

    pub async fn move_card(
        &self,
        card_id: i64,
        column_id: i64,
        lane_id: Option<i64>,
        position: Option<i64>,
    ) -> ClientResult<Value> {
        let mut body = json!({ "column_id": column_id });
        if let Some(lane_id) = lane_id {
            body["lane_id"] = json!(lane_id);
        }
        if let Some(position) = position {
            body["position"] = json!(position);
        }
        self.patch("move card", &format!("/cards/{card_id}"), &body)
            .await
    }

    pub async fn delete_card(&self, card_id: i64) -> ClientResult<()> {
        self.delete("delete card", &format!("/cards/{card_id}"))
            .await
    }

    // Comments

    pub async fn get_card_comments(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/comments")).await
    }

    pub async fn get_card_comment(&self, card_id: i64, comment_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/comments/{comment_id}"))
            .await
    }

    pub async fn create_card_comment(&self, card_id: i64, text: &str) -> ClientResult<Value> {
        self.post(
            "create comment",
            &format!("/cards/{card_id}/comments"),
            &json!({ "text": text }),
        )
        .await
    }

    pub async fn update_card_comment(
        &self,
        card_id: i64,
        comment_id: i64,
        text: &str,
    ) -> ClientResult<Value> {
        self.patch(
            "update comment",
            &format!("/cards/{card_id}/comments/{comment_id}"),
            &json!({ "text": text }),
        )
        .await
    }

    pub async fn delete_card_comment(&self, card_id: i64, comment_id: i64) -> ClientResult<()> {
        self.delete(
            "delete comment",
            &format!("/cards/{card_id}/comments/{comment_id}"),
        )
        .await
    }

    // Card metadata

    pub async fn get_card_custom_fields(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/customFields")).await
    }

    pub async fn get_card_types(&self) -> ClientResult<Value> {
        self.get("/cardTypes").await
    }

    pub async fn get_card_outcomes(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/outcomes")).await
    }

    pub async fn get_card_history(&self, card_id: i64, outcome_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/outcomes/{outcome_id}/history"))
            .await
    }

    pub async fn get_card_linked_cards(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/linkedCards")).await
    }

    // Subtasks

    pub async fn get_card_subtasks(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/subtasks")).await
    }

    pub async fn get_card_subtask(&self, card_id: i64, subtask_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/subtasks/{subtask_id}"))
            .await
    }

    pub async fn create_card_subtask<B: Serialize + ?Sized>(
        &self,
        card_id: i64,
        body: &B,
    ) -> ClientResult<Value> {
        self.post(
            "create subtask",
            &format!("/cards/{card_id}/subtasks"),
            body,
        )
        .await
    }

    // Parent/child links

    pub async fn get_card_parents(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/parents")).await
    }

    /// Returns the link position when `parent_card_id` is a parent of `card_id`.
    pub async fn get_card_parent(&self, card_id: i64, parent_card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/parents/{parent_card_id}"))
            .await
    }

    pub async fn add_card_parent(&self, card_id: i64, parent_card_id: i64) -> ClientResult<Value> {
        self.put::<Value>(
            "add card parent",
            &format!("/cards/{card_id}/parents/{parent_card_id}"),
            None,
        )
        .await
    }

    pub async fn remove_card_parent(&self, card_id: i64, parent_card_id: i64) -> ClientResult<()> {
        self.delete(
            "remove card parent",
            &format!("/cards/{card_id}/parents/{parent_card_id}"),
        )
        .await
    }

    /// Parents of a card including their own parents.
    pub async fn get_card_parent_graph(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/parentGraph")).await
    }

    // Predecessor/successor links

    /// `body` may carry `linked_card_position` and `card_position`.
    pub async fn add_card_predecessor<B: Serialize + ?Sized>(
        &self,
        card_id: i64,
        predecessor_card_id: i64,
        body: &B,
    ) -> ClientResult<Value> {
        self.put(
            "add card predecessor",
            &format!("/cards/{card_id}/predecessors/{predecessor_card_id}"),
            Some(body),
        )
        .await
    }

    pub async fn remove_card_predecessor(
        &self,
        card_id: i64,
        predecessor_card_id: i64,
    ) -> ClientResult<()> {
        self.delete(
            "remove card predecessor",
            &format!("/cards/{card_id}/predecessors/{predecessor_card_id}"),
        )
        .await
    }

    pub async fn get_card_children(&self, card_id: i64) -> ClientResult<Value> {
        self.get(&format!("/cards/{card_id}/children")).await
    }

    // Blocking

    pub async fn block_card(&self, card_id: i64, reason: &str) -> ClientResult<()> {
        let body = json!([{ "comment": reason }]);
        self.put(
            "block card",
            &format!("/cards/{card_id}/blockReason"),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn unblock_card(&self, card_id: i64) -> ClientResult<()> {
        self.delete("unblock card", &format!("/cards/{card_id}/blockReason"))
            .await
    }

    // Tags and stickers

    pub async fn create_tag(&self, label: &str, color: Option<&str>) -> ClientResult<Value> {
        let mut body = json!({ "label": label });
        if let Some(color) = color {
            body["color"] = json!(color);
        }
        self.post("create tag", "/tags", &body).await
    }

    pub async fn add_tag_to_card(&self, card_id: i64, tag_id: i64) -> ClientResult<()> {
        self.put::<Value>(
            "add tag to card",
            &format!("/cards/{card_id}/tags/{tag_id}"),
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn remove_tag_from_card(&self, card_id: i64, tag_id: i64) -> ClientResult<()> {
        self.delete(
            "remove tag from card",
            &format!("/cards/{card_id}/tags/{tag_id}"),
        )
        .await
    }

    pub async fn add_sticker_to_card(&self, card_id: i64, sticker_id: i64) -> ClientResult<Value> {
        self.post(
            "add sticker to card",
            &format!("/cards/{card_id}/stickers"),
            &json!({ "sticker_id": sticker_id }),
        )
        .await
    }

    /// `sticker_card_id` is the id of the card/sticker association, not of the sticker.
    pub async fn remove_sticker_from_card(
        &self,
        card_id: i64,
        sticker_card_id: i64,
    ) -> ClientResult<()> {
        self.delete(
            "remove sticker from card",
            &format!("/cards/{card_id}/stickers/{sticker_card_id}"),
        )
        .await
    }
}

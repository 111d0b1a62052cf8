//! MCP tools for Card management: cards, comments, subtasks, parent and
//! predecessor links, blocking, tags and stickers.

use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::client::CardFilters;
use crate::mcp::server::BusinessMapServer;
use crate::mcp::tools::{counted, failure, reply};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListCardsParams {
    #[schemars(description = "The ID of the board")]
    pub board_id: i64,
    #[serde(flatten)]
    pub filters: CardFilters,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CardIdParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateCardParams {
    #[schemars(description = "The title of the card")]
    pub title: String,
    #[schemars(description = "The column to create the card in")]
    pub column_id: i64,
    #[schemars(description = "The lane to create the card in")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<i64>,
    #[schemars(description = "Card description")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schemars(description = "The user who owns the card")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<i64>,
    #[schemars(description = "Size of the card in points")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[schemars(description = "Card priority")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[schemars(description = "Card color as a hex code without '#'")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[schemars(description = "Deadline in ISO 8601 format")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveCardParams {
    #[schemars(description = "The ID of the card to move")]
    pub card_id: i64,
    #[schemars(description = "The target column")]
    pub column_id: i64,
    #[schemars(description = "The target lane (optional)")]
    pub lane_id: Option<i64>,
    #[schemars(description = "Position within the target cell (optional)")]
    pub position: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateCardParams {
    #[schemars(description = "The ID of the card to update")]
    #[serde(skip_serializing)]
    pub card_id: i64,
    #[schemars(description = "New title (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[schemars(description = "New description (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[schemars(description = "New column (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<i64>,
    #[schemars(description = "New lane (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<i64>,
    #[schemars(description = "New owner (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<i64>,
    #[schemars(description = "New size in points (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[schemars(description = "New priority (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[schemars(description = "New color as a hex code without '#' (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[schemars(description = "New deadline in ISO 8601 format (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SetCardSizeParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The new size in points")]
    pub size: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CardCommentParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The ID of the comment")]
    pub comment_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateCommentParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The comment text")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateCommentParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The ID of the comment")]
    pub comment_id: i64,
    #[schemars(description = "The new comment text")]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CardHistoryParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The ID of the outcome, see get_card_outcomes")]
    pub outcome_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CardSubtaskParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The ID of the subtask")]
    pub subtask_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateSubtaskParams {
    #[schemars(description = "The ID of the card to add the subtask to")]
    #[serde(skip_serializing)]
    pub card_id: i64,
    #[schemars(description = "What the subtask is about")]
    pub description: String,
    #[schemars(description = "The user who owns the subtask")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<i64>,
    #[schemars(description = "1 when the subtask is already finished, 0 otherwise")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_finished: Option<u8>,
    #[schemars(description = "Deadline in ISO 8601 format")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[schemars(description = "Position among the card's subtasks")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CardParentParams {
    #[schemars(description = "The ID of the child card")]
    pub card_id: i64,
    #[schemars(description = "The ID of the parent card")]
    pub parent_card_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddPredecessorParams {
    #[schemars(description = "The ID of the card that depends on the predecessor")]
    pub card_id: i64,
    #[schemars(description = "The ID of the card that must be completed first")]
    pub predecessor_card_id: i64,
    #[schemars(description = "Position of the link among the predecessor's successors")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_card_position: Option<i64>,
    #[schemars(description = "Position of the link among the card's predecessors")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_position: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PredecessorParams {
    #[schemars(description = "The ID of the card that depends on the predecessor")]
    pub card_id: i64,
    #[schemars(description = "The ID of the predecessor card")]
    pub predecessor_card_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BlockCardParams {
    #[schemars(description = "The ID of the card to block")]
    pub card_id: i64,
    #[schemars(description = "Why the card is blocked")]
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTagParams {
    #[schemars(description = "The tag label")]
    pub label: String,
    #[schemars(description = "Tag color as a hex code without '#' (optional)")]
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CardTagParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The ID of the tag")]
    pub tag_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddStickerParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(description = "The ID of the sticker")]
    pub sticker_id: i64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RemoveStickerParams {
    #[schemars(description = "The ID of the card")]
    pub card_id: i64,
    #[schemars(
        description = "The ID of the sticker association on the card (not the sticker ID)"
    )]
    pub sticker_card_id: i64,
}

// =============================================================================
// Card Tools
// =============================================================================

#[tool_router(router = card_read_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(
        description = "List cards on a board. Supports date ranges, ID lists (columns, lanes, owners, tags, types), sections and paging."
    )]
    pub async fn list_cards(
        &self,
        params: Parameters<ListCardsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        reply(
            self.client()
                .list_cards(params.board_id, &params.filters)
                .await,
            "fetching cards",
            None,
        )
    }

    #[tool(description = "Get details of a specific card")]
    pub async fn get_card(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().get_card(params.0.card_id).await,
            "fetching card",
            None,
        )
    }

    #[tool(description = "Get the size (points) of a card")]
    pub async fn get_card_size(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = params.0.card_id;
        Ok(match self.client().get_card(card_id).await {
            Ok(card) => CallToolResult::success(vec![Content::text(format!(
                "{} has size: {} points",
                describe_card(&card, card_id),
                card_size(&card)
            ))]),
            Err(e) => failure(e, "getting card size"),
        })
    }

    #[tool(description = "Get all comments on a card")]
    pub async fn get_card_comments(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_comments(params.0.card_id)
                .await
                .map(|items| counted("comments", items)),
            "fetching card comments",
            None,
        )
    }

    #[tool(description = "Get a single comment on a card")]
    pub async fn get_card_comment(
        &self,
        params: Parameters<CardCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardCommentParams {
            card_id,
            comment_id,
        } = params.0;
        reply(
            self.client().get_card_comment(card_id, comment_id).await,
            "fetching card comment",
            None,
        )
    }

    #[tool(description = "Get the custom field values of a card")]
    pub async fn get_card_custom_fields(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_custom_fields(params.0.card_id)
                .await
                .map(|items| counted("customFields", items)),
            "fetching card custom fields",
            None,
        )
    }

    #[tool(description = "Get all card types")]
    pub async fn get_card_types(&self) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_types()
                .await
                .map(|items| counted("cardTypes", items)),
            "fetching card types",
            None,
        )
    }

    #[tool(description = "Get the history of a card outcome")]
    pub async fn get_card_history(
        &self,
        params: Parameters<CardHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardHistoryParams {
            card_id,
            outcome_id,
        } = params.0;
        reply(
            self.client()
                .get_card_history(card_id, outcome_id)
                .await
                .map(|items| counted("history", items)),
            "fetching card history",
            None,
        )
    }

    #[tool(description = "Get the outcomes of a card")]
    pub async fn get_card_outcomes(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_outcomes(params.0.card_id)
                .await
                .map(|items| counted("outcomes", items)),
            "fetching card outcomes",
            None,
        )
    }

    #[tool(description = "Get the cards linked to a card")]
    pub async fn get_card_linked_cards(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_linked_cards(params.0.card_id)
                .await
                .map(|items| counted("linkedCards", items)),
            "fetching linked cards",
            None,
        )
    }

    #[tool(description = "Get the subtasks of a card")]
    pub async fn get_card_subtasks(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_subtasks(params.0.card_id)
                .await
                .map(|items| counted("subtasks", items)),
            "fetching card subtasks",
            None,
        )
    }

    #[tool(description = "Get a single subtask of a card")]
    pub async fn get_card_subtask(
        &self,
        params: Parameters<CardSubtaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardSubtaskParams {
            card_id,
            subtask_id,
        } = params.0;
        reply(
            self.client().get_card_subtask(card_id, subtask_id).await,
            "fetching card subtask",
            None,
        )
    }

    #[tool(description = "Get the parent cards of a card")]
    pub async fn get_card_parents(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_parents(params.0.card_id)
                .await
                .map(|items| counted("parents", items)),
            "fetching card parents",
            None,
        )
    }

    #[tool(description = "Check whether a card is a parent of another card")]
    pub async fn get_card_parent(
        &self,
        params: Parameters<CardParentParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardParentParams {
            card_id,
            parent_card_id,
        } = params.0;
        reply(
            self.client().get_card_parent(card_id, parent_card_id).await,
            "fetching card parent",
            None,
        )
    }

    #[tool(description = "Get the parents of a card together with their own parents")]
    pub async fn get_card_parent_graph(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_parent_graph(params.0.card_id)
                .await
                .map(|items| counted("parentGraph", items)),
            "fetching card parent graph",
            None,
        )
    }

    #[tool(description = "Get the child cards of a card")]
    pub async fn get_card_children(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client()
                .get_card_children(params.0.card_id)
                .await
                .map(|items| counted("children", items)),
            "fetching card children",
            None,
        )
    }
}

#[tool_router(router = card_write_tools, vis = "pub(crate)")]
impl BusinessMapServer {
    #[tool(description = "Create a new card")]
    pub async fn create_card(
        &self,
        params: Parameters<CreateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        reply(
            self.client().create_card(&params.0).await,
            "creating card",
            Some("Card created successfully:"),
        )
    }

    #[tool(description = "Move a card to a different column and optionally lane and position")]
    pub async fn move_card(
        &self,
        params: Parameters<MoveCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let MoveCardParams {
            card_id,
            column_id,
            lane_id,
            position,
        } = params.0;
        reply(
            self.client()
                .move_card(card_id, column_id, lane_id, position)
                .await,
            "moving card",
            Some("Card moved successfully:"),
        )
    }

    #[tool(description = "Update the fields of a card. Only provided fields are changed.")]
    pub async fn update_card(
        &self,
        params: Parameters<UpdateCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        reply(
            self.client().update_card(params.card_id, &params).await,
            "updating card",
            Some("Card updated successfully:"),
        )
    }

    #[tool(description = "Set the size (points) of a card")]
    pub async fn set_card_size(
        &self,
        params: Parameters<SetCardSizeParams>,
    ) -> Result<CallToolResult, McpError> {
        let SetCardSizeParams { card_id, size } = params.0;
        Ok(
            match self
                .client()
                .update_card(card_id, &json!({ "size": size }))
                .await
            {
                Ok(card) => CallToolResult::success(vec![Content::text(format!(
                    "{} size updated to: {} points",
                    describe_card(&card, card_id),
                    card_size(&card)
                ))]),
                Err(e) => failure(e, "setting card size"),
            },
        )
    }

    #[tool(description = "Delete a card")]
    pub async fn delete_card(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = params.0.card_id;
        reply(
            self.client()
                .delete_card(card_id)
                .await
                .map(|()| json!({ "card_id": card_id })),
            "deleting card",
            Some("Card deleted successfully:"),
        )
    }

    #[tool(description = "Add a subtask to a card")]
    pub async fn create_card_subtask(
        &self,
        params: Parameters<CreateSubtaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        reply(
            self.client()
                .create_card_subtask(params.card_id, &params)
                .await,
            "creating card subtask",
            Some("Subtask created successfully:"),
        )
    }

    #[tool(description = "Make a card the parent of another card")]
    pub async fn add_card_parent(
        &self,
        params: Parameters<CardParentParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardParentParams {
            card_id,
            parent_card_id,
        } = params.0;
        reply(
            self.client().add_card_parent(card_id, parent_card_id).await,
            "adding card parent",
            Some("Card parent added successfully:"),
        )
    }

    #[tool(description = "Remove a parent link from a card")]
    pub async fn remove_card_parent(
        &self,
        params: Parameters<CardParentParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardParentParams {
            card_id,
            parent_card_id,
        } = params.0;
        reply(
            self.client()
                .remove_card_parent(card_id, parent_card_id)
                .await
                .map(|()| json!({ "card_id": card_id, "parent_card_id": parent_card_id })),
            "removing card parent",
            Some("Card parent removed successfully:"),
        )
    }

    #[tool(
        description = "Make one card a prerequisite of another. The predecessor must be completed before the card."
    )]
    pub async fn add_predecessor(
        &self,
        params: Parameters<AddPredecessorParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddPredecessorParams {
            card_id,
            predecessor_card_id,
            linked_card_position,
            card_position,
        } = params.0;
        let mut positions = Map::new();
        if let Some(position) = linked_card_position {
            positions.insert("linked_card_position".to_string(), json!(position));
        }
        if let Some(position) = card_position {
            positions.insert("card_position".to_string(), json!(position));
        }
        reply(
            self.client()
                .add_card_predecessor(card_id, predecessor_card_id, &positions)
                .await
                .map(|_| json!({ "card_id": card_id, "predecessor_card_id": predecessor_card_id })),
            "adding predecessor",
            Some("Predecessor added successfully:"),
        )
    }

    #[tool(description = "Remove the predecessor-successor link between two cards")]
    pub async fn remove_predecessor(
        &self,
        params: Parameters<PredecessorParams>,
    ) -> Result<CallToolResult, McpError> {
        let PredecessorParams {
            card_id,
            predecessor_card_id,
        } = params.0;
        reply(
            self.client()
                .remove_card_predecessor(card_id, predecessor_card_id)
                .await
                .map(|()| json!({ "card_id": card_id, "predecessor_card_id": predecessor_card_id })),
            "removing predecessor",
            Some("Predecessor removed successfully:"),
        )
    }

    #[tool(description = "Mark a card as blocked with a reason")]
    pub async fn block_card(
        &self,
        params: Parameters<BlockCardParams>,
    ) -> Result<CallToolResult, McpError> {
        let BlockCardParams { card_id, reason } = params.0;
        reply(
            self.client()
                .block_card(card_id, &reason)
                .await
                .map(|()| json!({ "card_id": card_id, "reason": reason })),
            "blocking card",
            Some("Card blocked successfully:"),
        )
    }

    #[tool(description = "Remove the block from a card")]
    pub async fn unblock_card(
        &self,
        params: Parameters<CardIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = params.0.card_id;
        reply(
            self.client()
                .unblock_card(card_id)
                .await
                .map(|()| json!({ "card_id": card_id })),
            "unblocking card",
            Some("Card unblocked successfully:"),
        )
    }

    #[tool(description = "Add a comment to a card")]
    pub async fn create_comment(
        &self,
        params: Parameters<CreateCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateCommentParams { card_id, text } = params.0;
        reply(
            self.client().create_card_comment(card_id, &text).await,
            "creating comment",
            Some("Comment created successfully:"),
        )
    }

    #[tool(description = "Change the text of a comment")]
    pub async fn update_comment(
        &self,
        params: Parameters<UpdateCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let UpdateCommentParams {
            card_id,
            comment_id,
            text,
        } = params.0;
        reply(
            self.client()
                .update_card_comment(card_id, comment_id, &text)
                .await,
            "updating comment",
            Some("Comment updated successfully:"),
        )
    }

    #[tool(description = "Delete a comment from a card")]
    pub async fn delete_comment(
        &self,
        params: Parameters<CardCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardCommentParams {
            card_id,
            comment_id,
        } = params.0;
        reply(
            self.client()
                .delete_card_comment(card_id, comment_id)
                .await
                .map(|()| json!({ "card_id": card_id, "comment_id": comment_id })),
            "deleting comment",
            Some("Comment deleted successfully:"),
        )
    }

    #[tool(description = "Create a new tag")]
    pub async fn create_tag(
        &self,
        params: Parameters<CreateTagParams>,
    ) -> Result<CallToolResult, McpError> {
        let CreateTagParams { label, color } = params.0;
        reply(
            self.client().create_tag(&label, color.as_deref()).await,
            "creating tag",
            Some("Tag created successfully:"),
        )
    }

    #[tool(description = "Add an existing tag to a card")]
    pub async fn add_tag_to_card(
        &self,
        params: Parameters<CardTagParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardTagParams { card_id, tag_id } = params.0;
        reply(
            self.client()
                .add_tag_to_card(card_id, tag_id)
                .await
                .map(|()| json!({ "card_id": card_id, "tag_id": tag_id })),
            "adding tag to card",
            Some("Tag added to card successfully:"),
        )
    }

    #[tool(description = "Remove a tag from a card")]
    pub async fn remove_tag_from_card(
        &self,
        params: Parameters<CardTagParams>,
    ) -> Result<CallToolResult, McpError> {
        let CardTagParams { card_id, tag_id } = params.0;
        reply(
            self.client()
                .remove_tag_from_card(card_id, tag_id)
                .await
                .map(|()| json!({ "card_id": card_id, "tag_id": tag_id })),
            "removing tag from card",
            Some("Tag removed from card successfully:"),
        )
    }

    #[tool(description = "Add a sticker to a card")]
    pub async fn add_sticker_to_card(
        &self,
        params: Parameters<AddStickerParams>,
    ) -> Result<CallToolResult, McpError> {
        let AddStickerParams {
            card_id,
            sticker_id,
        } = params.0;
        reply(
            self.client().add_sticker_to_card(card_id, sticker_id).await,
            "adding sticker to card",
            Some("Sticker added to card successfully:"),
        )
    }

    #[tool(description = "Remove a sticker from a card")]
    pub async fn remove_sticker_from_card(
        &self,
        params: Parameters<RemoveStickerParams>,
    ) -> Result<CallToolResult, McpError> {
        let RemoveStickerParams {
            card_id,
            sticker_card_id,
        } = params.0;
        reply(
            self.client()
                .remove_sticker_from_card(card_id, sticker_card_id)
                .await
                .map(|()| json!({ "card_id": card_id, "sticker_card_id": sticker_card_id })),
            "removing sticker from card",
            Some("Sticker removed from card successfully:"),
        )
    }
}

/// `Card "<title>" (ID: <id>)`
fn describe_card(card: &Value, card_id: i64) -> String {
    let title = card.get("title").and_then(Value::as_str).unwrap_or("");
    let id = card.get("card_id").and_then(Value::as_i64).unwrap_or(card_id);
    format!("Card \"{title}\" (ID: {id})")
}

fn card_size(card: &Value) -> Value {
    card.get("size")
        .filter(|size| !size.is_null())
        .cloned()
        .unwrap_or(json!(0))
}

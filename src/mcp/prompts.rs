//! Prompt templates that walk an assistant through multi-step board,
//! card and workspace analyses using the registered tools.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::{PromptMessage, PromptMessageRole},
    prompt, prompt_router,
    schemars::{self, JsonSchema},
};
use serde::{Deserialize, Serialize};

use super::server::BusinessMapServer;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BoardPromptArgs {
    #[schemars(description = "The board ID")]
    pub board_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CardFromDescriptionArgs {
    #[schemars(description = "Natural language description of what the card should be")]
    pub description: String,
    #[schemars(description = "The board ID where the card should be created")]
    pub board_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WorkspacePromptArgs {
    #[schemars(description = "The workspace ID to generate an overview for")]
    pub workspace_id: String,
}

#[prompt_router(vis = "pub(crate)")]
impl BusinessMapServer {
    #[prompt(
        name = "analyze-board-performance",
        description = "Analyze a board's performance: flow efficiency, bottlenecks, cycle time and workload distribution across columns and lanes."
    )]
    pub async fn analyze_board_performance(
        &self,
        params: Parameters<BoardPromptArgs>,
    ) -> Vec<PromptMessage> {
        user_message(analyze_board_performance_text(&params.0.board_id))
    }

    #[prompt(
        name = "generate-board-report",
        description = "Generate a comprehensive status report for a board, including cards summary, progress, and highlights."
    )]
    pub async fn generate_board_report(
        &self,
        params: Parameters<BoardPromptArgs>,
    ) -> Vec<PromptMessage> {
        user_message(generate_board_report_text(&params.0.board_id))
    }

    #[prompt(
        name = "create-card-from-description",
        description = "Guide the creation of a well-structured card from a natural language description."
    )]
    pub async fn create_card_from_description(
        &self,
        params: Parameters<CardFromDescriptionArgs>,
    ) -> Vec<PromptMessage> {
        let args = params.0;
        user_message(create_card_from_description_text(
            &args.description,
            &args.board_id,
        ))
    }

    #[prompt(
        name = "workspace-status-overview",
        description = "Generate a high-level status overview of a workspace, including all boards and their key metrics."
    )]
    pub async fn workspace_status_overview(
        &self,
        params: Parameters<WorkspacePromptArgs>,
    ) -> Vec<PromptMessage> {
        user_message(workspace_status_overview_text(&params.0.workspace_id))
    }
}

fn user_message(text: String) -> Vec<PromptMessage> {
    vec![PromptMessage::new_text(PromptMessageRole::User, text)]
}

pub(crate) fn analyze_board_performance_text(board_id: &str) -> String {
    format!(
        r#"Please analyze the performance of board ID {board_id} in BusinessMap.

Follow these steps:
1. Use `get_current_board_structure` to retrieve the full board structure (workflows, columns, lanes).
2. Use `list_cards` to retrieve all active cards on the board.
3. Use `get_workflow_cycle_time_columns` for each workflow to understand which columns count for cycle time.

Based on the data collected, provide a structured analysis including:

**Flow Analysis**
- Number of cards per column and lane
- Columns with the highest accumulation (bottlenecks)
- WIP distribution

**Cycle Time**
- Average cycle time estimation per column
- Columns that are cycle time columns vs. buffer columns

**Workload Distribution**
- Cards per assignee (if available)
- Lanes with the most blocked/overdue items

**Recommendations**
- Top 3 actionable improvements to increase flow efficiency
- Any WIP limit violations or risks identified

Format the response as a clear executive report with sections and bullet points."#
    )
}

pub(crate) fn generate_board_report_text(board_id: &str) -> String {
    format!(
        r#"Generate a comprehensive status report for board ID {board_id}.

Steps to gather data:
1. Use `get_current_board_structure` to get the board structure.
2. Use `list_cards` to get all cards (use filters as needed for active cards).
3. For a sample of cards (up to 10), use `get_card` to get detailed information.

Report structure:
# Board Status Report - [Board Name]
**Date:** [Today's date]

## Executive Summary
- Total cards in progress
- Total cards completed (if available)
- Key highlights and risks

## Column Breakdown
For each column: card count, key items, blockers

## Recently Updated Cards
List the 5 most recently updated cards with status

## Risks & Blockers
- Cards that appear stuck or overdue
- Any notable concerns

## Next Steps
- Suggested actions based on current board state

Keep the report concise, factual, and actionable."#
    )
}

pub(crate) fn create_card_from_description_text(description: &str, board_id: &str) -> String {
    format!(
        r#"Help me create a well-structured card in BusinessMap based on the following description:

"{description}"

Target board ID: {board_id}

Steps to follow:
1. Use `get_current_board_structure` to understand the available columns, lanes, and workflows on board {board_id}.
2. Use `get_card_types` to list available card types.
3. Based on the description and board structure, determine the best:
  - Card title (concise, action-oriented)
  - Card description (detailed, with acceptance criteria if applicable)
  - Card type (story, task, bug, etc.)
  - Target column (most appropriate initial stage)
  - Lane (if applicable)
  - Size/priority estimate (if inferable)

4. Use `create_card` to create the card with the determined values.
5. Confirm the card was created and provide its ID and a link summary.

Make the card title clear and actionable. Include acceptance criteria in the description if the request is a feature or user story."#
    )
}

pub(crate) fn workspace_status_overview_text(workspace_id: &str) -> String {
    format!(
        r#"Generate a high-level status overview for workspace ID {workspace_id}.

Steps:
1. Use `get_workspace` to get workspace details.
2. Use `list_boards` with workspace_id filter to list all boards in this workspace.
3. For each board (up to 5 boards), use `list_cards` to get a count of active cards.
4. For up to 3 boards, use `get_current_board_structure` for column distribution.

Deliver a structured overview:

# Workspace Overview - [Workspace Name]
**Date:** [Today's date]

## Workspace Summary
- Total boards
- Total active cards (estimate)
- Overall health status (Green/Yellow/Red based on workload)

## Board Summaries
For each board:
- Board name and ID
- Active card count
- Columns with most cards (top 2-3)
- Any notable concerns (high WIP, empty boards, etc.)

## Highlights
- Most active board
- Any boards with potential bottlenecks
- Boards with no activity

## Recommendations
- Top 2-3 areas to focus attention on

Keep it concise. This is a management-level overview."#
    )
}

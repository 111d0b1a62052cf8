use rmcp::handler::server::wrapper::Parameters;
use serde_json::json;

use crate::client::BoardFilters;
use crate::mcp::tools::boards::{matching_boards, summarize_boards};
use crate::mcp::tools::*;
use crate::test_support::{
    is_error, result_json, result_text, spawn_fake_businessmap, test_server,
    test_server_with_workspace,
};

fn search(board_id: Option<i64>, board_name: Option<&str>) -> Parameters<SearchBoardParams> {
    Parameters(SearchBoardParams {
        board_id,
        board_name: board_name.map(str::to_string),
        workspace_id: None,
    })
}

#[test]
fn test_matching_boards_ignores_case() {
    let boards = json!([
        { "board_id": 1, "name": "Team Alpha" },
        { "board_id": 2, "name": "ALPHA releases" },
        { "board_id": 3, "name": "Marketing" },
        { "board_id": 4 }
    ]);

    let found = matching_boards(&boards, "alpha");
    assert_eq!(found.len(), 2);
    assert_eq!(found[1]["board_id"], 2);
    assert!(matching_boards(&boards, "zeta").is_empty());
}

#[test]
fn test_summarize_boards_keeps_identity_fields() {
    let boards = json!([{ "board_id": 1, "name": "Team Alpha", "workspace_id": 10, "is_archived": 0 }]);
    assert_eq!(
        summarize_boards(&boards),
        json!([{ "board_id": 1, "name": "Team Alpha", "workspace_id": 10 }])
    );
}

#[tokio::test]
async fn test_list_boards_passes_filters() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server
        .list_boards(Parameters(BoardFilters::for_workspace(Some(10))))
        .await
        .unwrap();
    let boards = result_json(&result);
    assert_eq!(boards.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_board_by_id_direct() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.search_board(search(Some(1), None)).await.unwrap();
    assert!(result_text(&result).starts_with("Board found directly:\n"));
    let found = result_json(&result);
    assert_eq!(found["board"]["name"], "Team Alpha");
    assert_eq!(found["structure"]["board_id"], 1);
}

#[tokio::test]
async fn test_search_board_by_id_falls_back_to_list() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    // Board 3 is forbidden on direct lookup but present in the list.
    let result = server.search_board(search(Some(3), None)).await.unwrap();
    assert!(!is_error(&result));
    assert!(result_text(&result).starts_with("Board found via list search:\n"));
    assert_eq!(result_json(&result)["board"]["name"], "Marketing");
}

#[tokio::test]
async fn test_search_board_by_unknown_id_lists_available_boards() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.search_board(search(Some(404), None)).await.unwrap();
    assert!(is_error(&result));
    let text = result_text(&result);
    assert!(text.starts_with(
        "Error searching for board: Board with ID 404 not found. Available boards:\n"
    ));
    assert!(text.contains("Marketing"));
}

#[tokio::test]
async fn test_search_board_by_id_respects_default_workspace() {
    let url = spawn_fake_businessmap().await;
    let server = test_server_with_workspace(&url, false, Some(10));

    // Board 3 lives in workspace 20, so the filtered fallback cannot see it.
    let result = server.search_board(search(Some(3), None)).await.unwrap();
    assert!(is_error(&result));
}

#[tokio::test]
async fn test_search_board_by_name_single_match() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.search_board(search(None, Some("team"))).await.unwrap();
    assert!(result_text(&result).starts_with("Board found by name:\n"));
    assert_eq!(result_json(&result)["board"]["board_id"], 1);
}

#[tokio::test]
async fn test_search_board_by_name_multiple_matches() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.search_board(search(None, Some("ALPHA"))).await.unwrap();
    assert!(result_text(&result).starts_with("Multiple boards found matching \"ALPHA\":\n"));
    assert_eq!(result_json(&result).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_board_by_name_without_match() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.search_board(search(None, Some("Zeta"))).await.unwrap();
    assert!(is_error(&result));
    assert!(result_text(&result).starts_with(
        "Error searching for board by name: No boards found matching name \"Zeta\". Available boards:\n"
    ));
}

#[tokio::test]
async fn test_search_board_without_criteria_lists_all() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.search_board(search(None, Some("  "))).await.unwrap();
    assert!(result_text(&result).starts_with("All available boards:\n"));
    assert_eq!(result_json(&result).as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_current_board_structure() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server
        .get_current_board_structure(Parameters(BoardIdParams { board_id: 2 }))
        .await
        .unwrap();
    assert!(result_text(&result).starts_with("Board structure retrieved successfully:\n"));
    assert_eq!(result_json(&result)["board_id"], 2);
}

#[tokio::test]
async fn test_create_board_needs_a_workspace() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server
        .create_board(Parameters(CreateBoardParams {
            name: "New".to_string(),
            description: None,
            workspace_id: None,
        }))
        .await
        .unwrap();
    assert!(is_error(&result));
    assert!(result_text(&result).starts_with("Error creating board: workspace_id is required"));
}

#[tokio::test]
async fn test_create_column_requires_workflow_and_section_for_main_columns() {
    // Validation happens before any upstream call.
    let server = test_server("http://127.0.0.1:9", false);

    let result = server
        .create_column(Parameters(CreateColumnParams {
            board_id: 1,
            workflow_id: Some(5),
            section: None,
            parent_column_id: None,
            position: 0,
            name: "Doing".to_string(),
            limit: None,
            description: None,
        }))
        .await
        .unwrap();
    assert!(is_error(&result));
    assert_eq!(
        result_text(&result),
        "Error creating column: workflow_id and section are required unless parent_column_id is set"
    );
}

#[tokio::test]
async fn test_delete_column_in_read_only_mode_is_refused() {
    let server = test_server("http://127.0.0.1:9", true);

    let result = server
        .delete_column(Parameters(DeleteColumnParams {
            board_id: 1,
            column_id: 2,
        }))
        .await
        .unwrap();
    assert!(is_error(&result));
    assert_eq!(
        result_text(&result),
        "Error deleting column: Cannot delete column: server is running in read-only mode"
    );
}

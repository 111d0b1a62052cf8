use rmcp::handler::server::wrapper::Parameters;

use crate::mcp::tools::*;
use crate::test_support::{
    is_error, result_json, result_text, spawn_fake_businessmap, test_server,
};

#[tokio::test]
async fn test_list_users() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.list_users().await.unwrap();
    assert!(!is_error(&result));
    assert_eq!(result_json(&result).as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server
        .get_user(Parameters(GetUserParams { user_id: 404 }))
        .await
        .unwrap();
    assert!(is_error(&result));
    assert_eq!(
        result_text(&result),
        "Error fetching user: BusinessMap API Error: User not found"
    );
}

#[tokio::test]
async fn test_get_current_user() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server.get_current_user().await.unwrap();
    assert_eq!(result_json(&result)["username"], "tester");
}

#[tokio::test]
async fn test_invite_user() {
    let url = spawn_fake_businessmap().await;
    let server = test_server(&url, false);

    let result = server
        .invite_user(Parameters(InviteUserParams {
            email: "new@example.com".to_string(),
            do_not_send_confirmation_email: Some(1),
        }))
        .await
        .unwrap();
    assert!(result_text(&result).starts_with("User invited successfully:\n"));
    assert_eq!(result_json(&result)["email"], "new@example.com");
}

#[tokio::test]
async fn test_invite_user_rejects_malformed_email() {
    let server = test_server("http://127.0.0.1:9", false);

    let result = server
        .invite_user(Parameters(InviteUserParams {
            email: "not-an-email".to_string(),
            do_not_send_confirmation_email: None,
        }))
        .await
        .unwrap();
    assert!(is_error(&result));
    assert_eq!(
        result_text(&result),
        "Error inviting user: 'not-an-email' is not a valid email address"
    );
}

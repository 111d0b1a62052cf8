use serde_json::{Value, json};

use super::{BusinessMapClient, ClientResult};

impl BusinessMapClient {
    pub async fn list_workspaces(&self) -> ClientResult<Value> {
        self.get("/workspaces").await
    }

    pub async fn get_workspace(&self, workspace_id: i64) -> ClientResult<Value> {
        self.get(&format!("/workspaces/{workspace_id}")).await
    }

    pub async fn create_workspace(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> ClientResult<Value> {
        let mut body = json!({ "name": name });
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        self.post("create workspace", "/workspaces", &body).await
    }
}

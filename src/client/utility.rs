use serde_json::{Value, json};
use tracing::error;

use super::{BusinessMapClient, ClientError, ClientResult};

impl BusinessMapClient {
    /// Whether the API is reachable with the configured token.
    ///
    /// BusinessMap has no dedicated health endpoint, so this calls `/me`.
    pub async fn health_check(&self) -> bool {
        match self.get("/me").await {
            Ok(_) => true,
            Err(e) => {
                error!("Health check failed: {}", e);
                false
            }
        }
    }

    /// Connectivity summary. The public API has no `/info` endpoint.
    pub async fn get_api_info(&self) -> ClientResult<Value> {
        self.get("/me")
            .await
            .map_err(|e| ClientError::Network {
                message: format!("API connection failed: {e}"),
            })?;

        Ok(json!({
            "message": "API is responding",
            "endpoint": "/me",
            "status": "healthy",
            "api_version": "v2",
            "base_url": self.base_url(),
            "read_only": self.is_read_only(),
        }))
    }

    pub async fn get_custom_field(&self, custom_field_id: i64) -> ClientResult<Value> {
        self.get(&format!("/customFields/{custom_field_id}")).await
    }

    /// Columns that count towards cycle time in a workflow.
    pub async fn get_workflow_cycle_time_columns(
        &self,
        board_id: i64,
        workflow_id: i64,
    ) -> ClientResult<Value> {
        self.get(&format!(
            "/boards/{board_id}/workflows/{workflow_id}/cycleTimeColumns"
        ))
        .await
    }

    pub async fn get_workflow_effective_cycle_time_columns(
        &self,
        board_id: i64,
        workflow_id: i64,
    ) -> ClientResult<Value> {
        self.get(&format!(
            "/boards/{board_id}/workflows/{workflow_id}/effectiveCycleTimeColumns"
        ))
        .await
    }
}

use serde_json::{Value, json};

use super::{BusinessMapClient, ClientResult};

impl BusinessMapClient {
    pub async fn list_users(&self) -> ClientResult<Value> {
        self.get("/users").await
    }

    pub async fn get_user(&self, user_id: i64) -> ClientResult<Value> {
        self.get(&format!("/users/{user_id}")).await
    }

    /// The user the API token belongs to.
    pub async fn get_current_user(&self) -> ClientResult<Value> {
        self.get("/me").await
    }

    /// Invite a user by email.
    ///
    /// With `skip_confirmation_email` set, no invitation is mailed and an
    /// administrator has to send it later.
    pub async fn invite_user(
        &self,
        email: &str,
        skip_confirmation_email: Option<u8>,
    ) -> ClientResult<Value> {
        let mut body = json!({ "email": email });
        if let Some(flag) = skip_confirmation_email {
            body["do_not_send_confirmation_email"] = json!(flag);
        }
        self.post("invite user", "/users/invite", &body).await
    }
}

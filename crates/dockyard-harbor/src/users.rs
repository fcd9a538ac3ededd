//! User endpoints (`/users`)

use crate::client::HarborClient;
use crate::error::Result;
use crate::models::{User, UserCreationReq, UserProfile};

impl HarborClient {
    /// List every local user (requires admin)
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.list_all("users").await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.get_json(&format!("users/{}", id)).await
    }

    /// Create a user and return its ID
    pub async fn create_user(&self, req: &UserCreationReq) -> Result<i64> {
        self.post_json("users", req, "user").await
    }

    /// Update the profile of a user; passwords are not touched
    pub async fn update_user(&self, id: i64, profile: &UserProfile) -> Result<()> {
        self.put_json(&format!("users/{}", id), profile).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.delete_path(&format!("users/{}", id)).await
    }

    /// The identity the client's credentials resolve to
    pub async fn current_user(&self) -> Result<User> {
        self.get_json("users/current").await
    }
}

//! Project endpoints (`/projects`)

use crate::client::HarborClient;
use crate::error::Result;
use crate::models::{Project, ProjectReq};

impl HarborClient {
    /// List every project visible to the caller
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.list_all("projects").await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        self.get_json(&format!("projects/{}", id)).await
    }

    /// Create a project and return its ID
    pub async fn create_project(&self, req: &ProjectReq) -> Result<i64> {
        self.post_json("projects", req, "project").await
    }

    pub async fn update_project(&self, id: i64, req: &ProjectReq) -> Result<()> {
        self.put_json(&format!("projects/{}", id), req).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<()> {
        self.delete_path(&format!("projects/{}", id)).await
    }
}

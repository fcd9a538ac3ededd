//! Registry endpoints (`/registries`)

use crate::client::HarborClient;
use crate::error::Result;
use crate::models::{Registry, RegistryReq};

impl HarborClient {
    /// List every registry endpoint
    pub async fn list_registries(&self) -> Result<Vec<Registry>> {
        self.list_all("registries").await
    }

    pub async fn get_registry(&self, id: i64) -> Result<Registry> {
        self.get_json(&format!("registries/{}", id)).await
    }

    /// Create a registry and return its ID
    pub async fn create_registry(&self, req: &RegistryReq) -> Result<i64> {
        self.post_json("registries", req, "registry").await
    }

    pub async fn update_registry(&self, id: i64, req: &RegistryReq) -> Result<()> {
        self.put_json(&format!("registries/{}", id), req).await
    }

    pub async fn delete_registry(&self, id: i64) -> Result<()> {
        self.delete_path(&format!("registries/{}", id)).await
    }
}

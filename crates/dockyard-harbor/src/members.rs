//! Project member endpoints (`/projects/{project_id}/members`)

use crate::client::HarborClient;
use crate::error::Result;
use crate::models::{Member, MemberReq, RoleRequest};

impl HarborClient {
    /// List every member of a project
    pub async fn list_members(&self, project_id: i64) -> Result<Vec<Member>> {
        self.list_all(&format!("projects/{}/members", project_id))
            .await
    }

    pub async fn get_member(&self, project_id: i64, member_id: i64) -> Result<Member> {
        self.get_json(&format!("projects/{}/members/{}", project_id, member_id))
            .await
    }

    /// Add a member and return the membership ID
    pub async fn create_member(&self, project_id: i64, req: &MemberReq) -> Result<i64> {
        self.post_json(&format!("projects/{}/members", project_id), req, "member")
            .await
    }

    /// Change a member's role; the identity of a membership is immutable
    pub async fn update_member(
        &self,
        project_id: i64,
        member_id: i64,
        req: &RoleRequest,
    ) -> Result<()> {
        self.put_json(&format!("projects/{}/members/{}", project_id, member_id), req)
            .await
    }

    pub async fn delete_member(&self, project_id: i64, member_id: i64) -> Result<()> {
        self.delete_path(&format!("projects/{}/members/{}", project_id, member_id))
            .await
    }
}

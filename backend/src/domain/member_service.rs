//! Member profile lookups.
//!
//! Group membership and invitations live in the external auth layer; this
//! service only keeps the display profiles the summary and report views need
//! for per-user attribution.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::models::member::MemberProfile;
use crate::storage::{Connection, MemberStorage};

#[derive(Clone)]
pub struct MemberService<C: Connection> {
    member_repository: C::MemberRepository,
}

impl<C: Connection> MemberService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            member_repository: connection.create_member_repository(),
        }
    }

    pub async fn upsert_member(&self, group_id: &str, member: MemberProfile) -> Result<MemberProfile> {
        self.member_repository.store_member(group_id, &member).await?;
        Ok(member)
    }

    pub async fn list_members(&self, group_id: &str) -> Result<Vec<MemberProfile>> {
        self.member_repository.list_members(group_id).await
    }

    /// Resolve the id -> profile map used for display-name attribution.
    pub async fn profile_map(&self, group_id: &str) -> Result<HashMap<String, MemberProfile>> {
        let members = self.member_repository.list_members(group_id).await?;
        Ok(members.into_iter().map(|m| (m.id.clone(), m)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::CsvConnection;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upsert_and_profile_map() {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        let service = MemberService::new(connection);

        service
            .upsert_member(
                "group-1",
                MemberProfile {
                    id: "member-1".to_string(),
                    name: "Ana".to_string(),
                    avatar_url: None,
                },
            )
            .await
            .unwrap();

        let map = service.profile_map("group-1").await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("member-1").unwrap().name, "Ana");
    }
}

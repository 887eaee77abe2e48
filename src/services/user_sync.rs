//! Identity-to-user sync bridge
//!
//! Mirrors the identity provider's view of a signed-in person into our
//! users table. Runs on session start: first sight of a subject creates a
//! least-privileged record, later sign-ins overwrite the mutable profile
//! fields. Roles are assigned separately and never touched here.

use std::sync::Arc;
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::db::repositories::{UserProfile, UserRepository};
use crate::identity::IdentityClaims;
use crate::models::User;

pub struct UserSyncService {
    users: Arc<dyn UserRepository>,
}

impl UserSyncService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Sync verified identity claims into the users table.
    ///
    /// Idempotent per subject: syncing the same claims twice yields one
    /// record. Claims without a subject or email are rejected before any
    /// write happens.
    pub async fn sync(&self, claims: &IdentityClaims) -> ServiceResult<User> {
        if claims.sub.trim().is_empty() {
            return Err(ServiceError::validation("Identity claims missing subject"));
        }
        let email = claims
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| ServiceError::validation("Identity claims missing email"))?;

        let profile = UserProfile {
            email: email.to_string(),
            first_name: claims.given_name.clone(),
            last_name: claims.family_name.clone(),
            avatar_url: claims.picture.clone(),
        };

        match self.users.get_by_external_id(&claims.sub).await? {
            Some(existing) => {
                let user = self.users.update_profile(existing.id, &profile).await?;
                Ok(user)
            }
            None => {
                let user = self.users.create(&claims.sub, &profile).await?;
                info!(user_id = user.id, "new user synced from identity provider");
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxUserRepository;
    use crate::models::UserRole;

    fn claims(sub: &str, email: Option<&str>) -> IdentityClaims {
        IdentityClaims {
            sub: sub.to_string(),
            email: email.map(str::to_string),
            given_name: Some("Amina".to_string()),
            family_name: Some("Diallo".to_string()),
            picture: None,
            exp: chrono::Utc::now().timestamp() + 3600,
        }
    }

    #[tokio::test]
    async fn test_first_sync_creates_least_privileged_user() {
        let pool = create_test_pool().await.unwrap();
        let service = UserSyncService::new(SqlxUserRepository::boxed(pool));

        let user = service
            .sync(&claims("ext_abc", Some("amina@example.org")))
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.email, "amina@example.org");
        assert_eq!(user.first_name.as_deref(), Some("Amina"));
    }

    #[tokio::test]
    async fn test_repeat_sync_is_idempotent() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxUserRepository::boxed(pool);
        let service = UserSyncService::new(repo.clone());

        let first = service
            .sync(&claims("ext_abc", Some("amina@example.org")))
            .await
            .unwrap();
        let second = service
            .sync(&claims("ext_abc", Some("amina@example.org")))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sync_updates_profile_but_not_role() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxUserRepository::boxed(pool);
        let service = UserSyncService::new(repo.clone());

        let user = service
            .sync(&claims("ext_abc", Some("old@example.org")))
            .await
            .unwrap();
        repo.update_role(user.id, UserRole::Editor).await.unwrap();

        let resynced = service
            .sync(&claims("ext_abc", Some("new@example.org")))
            .await
            .unwrap();
        assert_eq!(resynced.email, "new@example.org");
        assert_eq!(resynced.role, UserRole::Editor);
    }

    #[tokio::test]
    async fn test_incomplete_claims_rejected_without_writes() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxUserRepository::boxed(pool);
        let service = UserSyncService::new(repo.clone());

        assert!(matches!(
            service.sync(&claims("ext_abc", None)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.sync(&claims("", Some("a@example.org"))).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.sync(&claims("ext_abc", Some("   "))).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}

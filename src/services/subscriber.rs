//! Newsletter subscriber service

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::db::repositories::SubscriberRepository;
use crate::models::{ListParams, PagedResult, Subscriber};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex")
});

pub struct SubscriberService {
    repo: Arc<dyn SubscriberRepository>,
}

impl SubscriberService {
    pub fn new(repo: Arc<dyn SubscriberRepository>) -> Self {
        Self { repo }
    }

    /// Subscribe an email address. Addresses are normalized to lowercase;
    /// re-subscribing is a quiet no-op.
    pub async fn subscribe(&self, email: &str) -> ServiceResult<Subscriber> {
        let email = email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(ServiceError::validation("Invalid email address"));
        }
        Ok(self.repo.subscribe(&email).await?)
    }

    /// List subscribers for the dashboard.
    pub async fn list(&self, params: &ListParams) -> ServiceResult<PagedResult<Subscriber>> {
        let items = self.repo.list(params.offset(), params.limit()).await?;
        let total = self.repo.count().await?;
        Ok(PagedResult::new(items, total, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxSubscriberRepository;

    async fn service() -> SubscriberService {
        let pool = create_test_pool().await.unwrap();
        SubscriberService::new(SqlxSubscriberRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_subscribe_normalizes_case() {
        let service = service().await;
        let first = service.subscribe("Amina@Example.ORG").await.unwrap();
        let second = service.subscribe("amina@example.org").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.email, "amina@example.org");
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let service = service().await;
        for bad in ["", "no-at-sign", "a@b", "spaces in@example.org"] {
            assert!(
                matches!(
                    service.subscribe(bad).await,
                    Err(ServiceError::Validation(_))
                ),
                "accepted invalid email: {bad:?}"
            );
        }
    }
}

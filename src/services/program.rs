//! Program service
//!
//! Validation and change-event publication around the program repository.

use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::db::repositories::{ProgramFilter, ProgramRepository};
use crate::events::{ChangeAction, Collection, ContentEvent, EventBus};
use crate::models::{CreateProgramInput, ListParams, PagedResult, Program, UpdateProgramInput};

pub struct ProgramService {
    repo: Arc<dyn ProgramRepository>,
    events: EventBus,
}

impl ProgramService {
    pub fn new(repo: Arc<dyn ProgramRepository>, events: EventBus) -> Self {
        Self { repo, events }
    }

    /// Create a program. Name and description are required.
    pub async fn create(&self, input: &CreateProgramInput) -> ServiceResult<Program> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }
        if input.description.trim().is_empty() {
            return Err(ServiceError::validation("Description is required"));
        }
        if let (Some(end), start) = (input.end_date, input.start_date) {
            if end < start {
                return Err(ServiceError::validation("End date precedes start date"));
            }
        }

        let program = self.repo.create(input).await?;
        self.events.publish(ContentEvent::new(
            Collection::Programs,
            ChangeAction::Created,
            program.id,
        ));
        Ok(program)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Program> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Program"))
    }

    /// List all programs for the dashboard, unapproved included.
    pub async fn list_all(&self, params: &ListParams) -> ServiceResult<PagedResult<Program>> {
        let items = self.repo.list(params.offset(), params.limit()).await?;
        let total = self.repo.count().await?;
        Ok(PagedResult::new(items, total, params))
    }

    /// List approved programs matching the filter, for the public site.
    pub async fn list_approved(
        &self,
        filter: &ProgramFilter,
        params: &ListParams,
    ) -> ServiceResult<PagedResult<Program>> {
        let items = self
            .repo
            .list_approved(filter, params.offset(), params.limit())
            .await?;
        let total = self.repo.count_approved(filter).await?;
        Ok(PagedResult::new(items, total, params))
    }

    /// Get a single approved program, for the public site.
    pub async fn get_approved(&self, id: i64) -> ServiceResult<Program> {
        let program = self.get(id).await?;
        if !program.is_approved {
            return Err(ServiceError::NotFound("Program"));
        }
        Ok(program)
    }

    /// Apply a partial update. A no-op payload returns the program
    /// unchanged without touching the database.
    pub async fn update(&self, id: i64, input: &UpdateProgramInput) -> ServiceResult<Program> {
        if !input.has_changes() {
            return self.get(id).await;
        }
        if matches!(&input.name, Some(name) if name.trim().is_empty()) {
            return Err(ServiceError::validation("Name cannot be empty"));
        }
        if matches!(&input.description, Some(desc) if desc.trim().is_empty()) {
            return Err(ServiceError::validation("Description cannot be empty"));
        }

        self.get(id).await?;

        let program = self.repo.update(id, input).await?;
        self.events.publish(ContentEvent::new(
            Collection::Programs,
            ChangeAction::Updated,
            id,
        ));
        Ok(program)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound("Program"));
        }
        self.events.publish(ContentEvent::new(
            Collection::Programs,
            ChangeAction::Deleted,
            id,
        ));
        Ok(())
    }
}

use async_trait::async_trait;
use serde::Serialize;

use super::domain::{
    EmployeeId, EmployeeSkillProfile, Requisition, RequisitionDraft, RequisitionId,
    RequisitionStatus, Skill, SkillId, SkillRequirement,
};

impl Requisition {
    pub fn view(&self) -> RequisitionView {
        RequisitionView {
            requisition_id: self.id,
            manager_id: self.manager_id,
            role_title: self.role_title.clone(),
            department: self.department.clone(),
            required_skills: self.required_skills.clone(),
            status: self.status.label(),
            matched_employee_ids: self.matched_employee_ids.clone(),
            created_at: self.created_at.to_rfc3339(),
            scanned_at: self.scanned_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Requisition storage. `record_scan` must be atomic with respect to the stored status so
/// that concurrent scans from independent processes commit at most once.
#[async_trait]
pub trait RequisitionRepository: Send + Sync {
    async fn insert(&self, draft: RequisitionDraft) -> Result<Requisition, RepositoryError>;
    async fn fetch(&self, id: RequisitionId) -> Result<Option<Requisition>, RepositoryError>;
    async fn record_scan(
        &self,
        id: RequisitionId,
        expected: RequisitionStatus,
        status: RequisitionStatus,
        matched: Vec<EmployeeId>,
    ) -> Result<Requisition, RepositoryError>;
    async fn list_by_status(
        &self,
        status: RequisitionStatus,
    ) -> Result<Vec<Requisition>, RepositoryError>;
}

/// Read-only access to the skill catalog.
#[async_trait]
pub trait SkillCatalog: Send + Sync {
    async fn skill_exists(&self, id: SkillId) -> Result<bool, RepositoryError>;
    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError>;
}

/// Read-only access to the workforce's held skills.
#[async_trait]
pub trait WorkforceDirectory: Send + Sync {
    async fn skill_profiles(&self) -> Result<Vec<EmployeeSkillProfile>, RepositoryError>;
}

/// Error enumeration for data-layer failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("status is {actual}, expected {expected}")]
    StatusConflict {
        expected: RequisitionStatus,
        actual: RequisitionStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

/// Public representation of a requisition for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RequisitionView {
    pub requisition_id: RequisitionId,
    pub manager_id: EmployeeId,
    pub role_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub required_skills: SkillRequirement,
    pub status: &'static str,
    pub matched_employee_ids: Vec<EmployeeId>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<String>,
}

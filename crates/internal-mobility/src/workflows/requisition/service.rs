use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    join_skill_ids, CandidateMatch, EmployeeId, EmployeeSkillProfile, HeldSkill,
    ProficiencyLevel, Requisition, RequisitionDraft, RequisitionId, RequisitionStatus,
    ScanResult, Skill, SkillId, SkillRequirement,
};
use super::matching::{match_candidates, MatchError};
use super::repository::{
    RepositoryError, RequisitionRepository, SkillCatalog, WorkforceDirectory,
};

/// Orchestrates a requisition scan: load, match against the workforce, advance the status and
/// commit the outcome as one conditional update.
pub struct RequisitionScanService<R, C, W> {
    requisitions: Arc<R>,
    catalog: Arc<C>,
    workforce: Arc<W>,
}

impl<R, C, W> RequisitionScanService<R, C, W>
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    pub fn new(requisitions: Arc<R>, catalog: Arc<C>, workforce: Arc<W>) -> Self {
        Self {
            requisitions,
            catalog,
            workforce,
        }
    }

    /// Open a requisition in `PENDING_SCAN`. Scanning is a separate call.
    pub async fn submit(&self, draft: RequisitionDraft) -> Result<Requisition, ScanError> {
        let role_title = draft.role_title.trim().to_string();
        if role_title.is_empty() {
            return Err(InputError::MissingRoleTitle.into());
        }

        let department = draft
            .department
            .map(|department| department.trim().to_string())
            .filter(|department| !department.is_empty());

        let stored = self
            .requisitions
            .insert(RequisitionDraft {
                role_title,
                department,
                ..draft
            })
            .await?;

        info!(
            requisition_id = %stored.id,
            required_skills = stored.required_skills.len(),
            "requisition opened"
        );
        Ok(stored)
    }

    /// Run the scan for one requisition. A second scan of the same requisition fails with
    /// `InvalidTransition` and leaves the first outcome untouched.
    pub async fn scan(&self, requisition_id: RequisitionId) -> Result<ScanResult, ScanError> {
        match self.run_scan(requisition_id).await {
            Ok(result) => {
                info!(
                    %requisition_id,
                    status = %result.status,
                    matched = result.matched_employee_ids.len(),
                    "requisition scan committed"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    %requisition_id,
                    kind = err.kind().label(),
                    retryable = err.is_retryable(),
                    error = %err,
                    "requisition scan failed"
                );
                Err(err)
            }
        }
    }

    async fn run_scan(&self, requisition_id: RequisitionId) -> Result<ScanResult, ScanError> {
        let requisition = self
            .requisitions
            .fetch(requisition_id)
            .await?
            .ok_or(ScanError::NotFound(requisition_id))?;

        if !requisition.status.is_scannable() {
            return Err(ScanError::InvalidTransition {
                requisition_id,
                status: requisition.status,
            });
        }

        let required = &requisition.required_skills;
        let known = self.known_skills(required).await?;

        // An empty requirement never matches, so the population read is skipped.
        let profiles = if required.is_empty() {
            Vec::new()
        } else {
            self.workforce.skill_profiles().await?
        };
        debug!(
            %requisition_id,
            required_skills = required.len(),
            population = profiles.len(),
            "matching requisition against workforce"
        );

        let matched = match_candidates(
            required,
            |skill| known.contains(&skill),
            profiles.iter().map(|profile| {
                (
                    profile.employee_id,
                    profile.skills.iter().map(|held| held.skill_id),
                )
            }),
        )?;

        let next = requisition
            .status
            .after_scan(matched.len())
            .map_err(|err| ScanError::InvalidTransition {
                requisition_id,
                status: err.from,
            })?;

        let candidates = candidate_details(required, &matched, &profiles);

        let stored = self
            .requisitions
            .record_scan(
                requisition_id,
                RequisitionStatus::PendingScan,
                next,
                matched,
            )
            .await
            .map_err(|err| match err {
                RepositoryError::StatusConflict { actual, .. } => ScanError::InvalidTransition {
                    requisition_id,
                    status: actual,
                },
                RepositoryError::NotFound => ScanError::NotFound(requisition_id),
                other => ScanError::DependencyFailure(other),
            })?;

        Ok(ScanResult {
            requisition_id,
            status: stored.status,
            matched_employee_ids: stored.matched_employee_ids,
            candidates,
        })
    }

    async fn known_skills(
        &self,
        required: &SkillRequirement,
    ) -> Result<BTreeSet<SkillId>, RepositoryError> {
        let mut known = BTreeSet::new();
        for skill in required.iter() {
            if self.catalog.skill_exists(skill).await? {
                known.insert(skill);
            }
        }
        Ok(known)
    }

    /// Fetch a requisition and its recorded scan outcome.
    pub async fn get(&self, requisition_id: RequisitionId) -> Result<Requisition, ScanError> {
        self.requisitions
            .fetch(requisition_id)
            .await?
            .ok_or(ScanError::NotFound(requisition_id))
    }

    /// Requisitions awaiting internal candidates, newest first.
    pub async fn open_roles(&self) -> Result<Vec<Requisition>, ScanError> {
        let mut roles = self
            .requisitions
            .list_by_status(RequisitionStatus::PendingInternalReview)
            .await?;
        roles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(roles)
    }

    /// Skill catalog ordered by category, then name.
    pub async fn skills(&self) -> Result<Vec<Skill>, ScanError> {
        let mut skills = self.catalog.list_skills().await?;
        skills.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(skills)
    }
}

fn candidate_details(
    required: &SkillRequirement,
    matched: &[EmployeeId],
    profiles: &[EmployeeSkillProfile],
) -> Vec<CandidateMatch> {
    let wanted: BTreeSet<EmployeeId> = matched.iter().copied().collect();
    let mut depth: BTreeMap<EmployeeId, BTreeMap<SkillId, ProficiencyLevel>> = BTreeMap::new();

    for profile in profiles
        .iter()
        .filter(|profile| wanted.contains(&profile.employee_id))
    {
        let held = depth.entry(profile.employee_id).or_default();
        for skill in profile
            .skills
            .iter()
            .filter(|skill| required.contains(skill.skill_id))
        {
            held.entry(skill.skill_id)
                .and_modify(|level| *level = (*level).max(skill.proficiency))
                .or_insert(skill.proficiency);
        }
    }

    matched
        .iter()
        .map(|employee_id| CandidateMatch {
            employee_id: *employee_id,
            skills: depth
                .remove(employee_id)
                .unwrap_or_default()
                .into_iter()
                .map(|(skill_id, proficiency)| HeldSkill {
                    skill_id,
                    proficiency,
                })
                .collect(),
        })
        .collect()
}

/// Malformed input rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("required skills not present in the catalog: {}", join_skill_ids(.0))]
    UnknownSkills(Vec<SkillId>),
    #[error("role title must not be blank")]
    MissingRoleTitle,
}

impl From<MatchError> for ScanError {
    fn from(value: MatchError) -> Self {
        Self::InvalidInput(InputError::UnknownSkills(value.0))
    }
}

/// Error raised by the requisition scan service.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("requisition {0} not found")]
    NotFound(RequisitionId),
    #[error("requisition {requisition_id} is {status} and cannot be scanned")]
    InvalidTransition {
        requisition_id: RequisitionId,
        status: RequisitionStatus,
    },
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("data layer failure: {0}")]
    DependencyFailure(#[from] RepositoryError),
}

/// Coarse error classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanErrorKind {
    NotFound,
    InvalidTransition,
    InvalidInput,
    DependencyFailure,
}

impl ScanErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ScanErrorKind::NotFound => "not_found",
            ScanErrorKind::InvalidTransition => "invalid_transition",
            ScanErrorKind::InvalidInput => "invalid_input",
            ScanErrorKind::DependencyFailure => "dependency_failure",
        }
    }
}

impl ScanError {
    pub fn kind(&self) -> ScanErrorKind {
        match self {
            ScanError::NotFound(_) => ScanErrorKind::NotFound,
            ScanError::InvalidTransition { .. } => ScanErrorKind::InvalidTransition,
            ScanError::InvalidInput(_) => ScanErrorKind::InvalidInput,
            ScanError::DependencyFailure(_) => ScanErrorKind::DependencyFailure,
        }
    }

    /// Only data-layer failures are safe to retry; nothing is committed before the final update.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanError::DependencyFailure(_))
    }
}

use async_trait::async_trait;
use chrono::Utc;
use internal_mobility::workflows::requisition::{
    EmployeeId, EmployeeSkillProfile, HeldSkill, ProficiencyLevel, RepositoryError, Requisition,
    RequisitionDraft, RequisitionId, RequisitionRepository, RequisitionStatus, Skill,
    SkillCatalog, SkillId, WorkforceDirectory,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct WorkforceState {
    requisitions: BTreeMap<RequisitionId, Requisition>,
    last_id: i64,
    skills: Vec<Skill>,
    profiles: Vec<EmployeeSkillProfile>,
}

/// Process-local data layer used when no database is configured. Every operation runs under
/// one lock, so the scan commit is a true compare-and-set.
#[derive(Default, Clone)]
pub(crate) struct InMemoryWorkforceStore {
    state: Arc<Mutex<WorkforceState>>,
}

impl InMemoryWorkforceStore {
    pub(crate) fn seeded() -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().expect("workforce mutex poisoned");
            state.skills = demo_catalog();
            state.profiles = demo_workforce();
        }
        store
    }
}

#[async_trait]
impl RequisitionRepository for InMemoryWorkforceStore {
    async fn insert(&self, draft: RequisitionDraft) -> Result<Requisition, RepositoryError> {
        let mut guard = self.state.lock().expect("workforce mutex poisoned");
        guard.last_id += 1;
        let record = Requisition {
            id: RequisitionId(guard.last_id),
            manager_id: draft.manager_id,
            role_title: draft.role_title,
            department: draft.department,
            required_skills: draft.required_skills,
            status: RequisitionStatus::PendingScan,
            matched_employee_ids: Vec::new(),
            created_at: Utc::now(),
            scanned_at: None,
        };
        guard.requisitions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: RequisitionId) -> Result<Option<Requisition>, RepositoryError> {
        let guard = self.state.lock().expect("workforce mutex poisoned");
        Ok(guard.requisitions.get(&id).cloned())
    }

    async fn record_scan(
        &self,
        id: RequisitionId,
        expected: RequisitionStatus,
        status: RequisitionStatus,
        matched: Vec<EmployeeId>,
    ) -> Result<Requisition, RepositoryError> {
        let mut guard = self.state.lock().expect("workforce mutex poisoned");
        let record = guard
            .requisitions
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if record.status != expected {
            return Err(RepositoryError::StatusConflict {
                expected,
                actual: record.status,
            });
        }
        record.status = status;
        record.matched_employee_ids = matched;
        record.scanned_at = Some(Utc::now());
        Ok(record.clone())
    }

    async fn list_by_status(
        &self,
        status: RequisitionStatus,
    ) -> Result<Vec<Requisition>, RepositoryError> {
        let guard = self.state.lock().expect("workforce mutex poisoned");
        Ok(guard
            .requisitions
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SkillCatalog for InMemoryWorkforceStore {
    async fn skill_exists(&self, id: SkillId) -> Result<bool, RepositoryError> {
        let guard = self.state.lock().expect("workforce mutex poisoned");
        Ok(guard.skills.iter().any(|skill| skill.id == id))
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError> {
        let guard = self.state.lock().expect("workforce mutex poisoned");
        Ok(guard.skills.clone())
    }
}

#[async_trait]
impl WorkforceDirectory for InMemoryWorkforceStore {
    async fn skill_profiles(&self) -> Result<Vec<EmployeeSkillProfile>, RepositoryError> {
        let guard = self.state.lock().expect("workforce mutex poisoned");
        Ok(guard.profiles.clone())
    }
}

pub(crate) const SQL: SkillId = SkillId(1);
pub(crate) const PYTHON: SkillId = SkillId(2);
const GO: SkillId = SkillId(3);
pub(crate) const RUST: SkillId = SkillId(4);
const KUBERNETES: SkillId = SkillId(5);
const FINANCIAL_MODELING: SkillId = SkillId(6);

pub(crate) fn demo_employee(n: u128) -> EmployeeId {
    EmployeeId(Uuid::from_u128(0x4d0b_1e00_0000_0000_0000_0000_0000_0000 + n))
}

pub(crate) fn demo_catalog() -> Vec<Skill> {
    [
        (SQL, "SQL", "Data"),
        (PYTHON, "Python", "Engineering"),
        (GO, "Go", "Engineering"),
        (RUST, "Rust", "Engineering"),
        (KUBERNETES, "Kubernetes", "Infrastructure"),
        (FINANCIAL_MODELING, "Financial Modeling", "Finance"),
    ]
    .into_iter()
    .map(|(id, name, category)| Skill {
        id,
        name: name.to_string(),
        category: category.to_string(),
    })
    .collect()
}

pub(crate) fn demo_workforce() -> Vec<EmployeeSkillProfile> {
    let profile = |n: u128, skills: &[(SkillId, u8)]| EmployeeSkillProfile {
        employee_id: demo_employee(n),
        skills: skills
            .iter()
            .filter_map(|(skill_id, level)| {
                ProficiencyLevel::try_from(*level)
                    .ok()
                    .map(|proficiency| HeldSkill {
                        skill_id: *skill_id,
                        proficiency,
                    })
            })
            .collect(),
    };

    vec![
        profile(1, &[(SQL, 4), (PYTHON, 5), (GO, 3)]),
        profile(2, &[(SQL, 3)]),
        profile(3, &[(KUBERNETES, 4), (GO, 4)]),
        profile(4, &[(FINANCIAL_MODELING, 5), (SQL, 2)]),
    ]
}

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::workflows::requisition::domain::{
    EmployeeId, EmployeeSkillProfile, HeldSkill, ProficiencyLevel, Requisition, RequisitionDraft,
    RequisitionId, RequisitionStatus, Skill, SkillId, SkillRequirement,
};
use crate::workflows::requisition::repository::{
    RepositoryError, RequisitionRepository, SkillCatalog, WorkforceDirectory,
};
use crate::workflows::requisition::{requisition_router, RequisitionScanService};

pub(super) const SQL: SkillId = SkillId(1);
pub(super) const PYTHON: SkillId = SkillId(2);
pub(super) const GO: SkillId = SkillId(3);
pub(super) const RUST: SkillId = SkillId(4);

pub(super) fn employee(n: u128) -> EmployeeId {
    EmployeeId(Uuid::from_u128(n))
}

pub(super) fn manager() -> EmployeeId {
    employee(900)
}

pub(super) fn catalog() -> Vec<Skill> {
    vec![
        skill(SQL, "SQL", "Data"),
        skill(PYTHON, "Python", "Engineering"),
        skill(GO, "Go", "Engineering"),
        skill(RUST, "Rust", "Engineering"),
    ]
}

fn skill(id: SkillId, name: &str, category: &str) -> Skill {
    Skill {
        id,
        name: name.to_string(),
        category: category.to_string(),
    }
}

pub(super) fn profile(n: u128, skills: &[(SkillId, u8)]) -> EmployeeSkillProfile {
    EmployeeSkillProfile {
        employee_id: employee(n),
        skills: skills
            .iter()
            .map(|(skill_id, level)| HeldSkill {
                skill_id: *skill_id,
                proficiency: ProficiencyLevel::try_from(*level).expect("valid proficiency"),
            })
            .collect(),
    }
}

/// E1 holds {SQL, Python, Go}; E2 holds {SQL}.
pub(super) fn workforce() -> Vec<EmployeeSkillProfile> {
    vec![
        profile(1, &[(SQL, 4), (PYTHON, 3), (GO, 2)]),
        profile(2, &[(SQL, 5)]),
    ]
}

pub(super) fn draft(skills: &[SkillId]) -> RequisitionDraft {
    RequisitionDraft {
        manager_id: manager(),
        role_title: "Analytics Engineer".to_string(),
        department: Some("Data Platform".to_string()),
        required_skills: SkillRequirement::new(skills.iter().copied()),
    }
}

#[derive(Default)]
struct MemoryState {
    requisitions: BTreeMap<RequisitionId, Requisition>,
    next_id: i64,
    skills: Vec<Skill>,
    profiles: Vec<EmployeeSkillProfile>,
}

/// Single-lock store implementing every data-access trait.
#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    commits: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub(super) fn seeded() -> Self {
        Self::with(catalog(), workforce())
    }

    pub(super) fn with(skills: Vec<Skill>, profiles: Vec<EmployeeSkillProfile>) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().expect("lock");
            state.skills = skills;
            state.profiles = profiles;
        }
        store
    }

    pub(super) fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub(super) fn stored(&self, id: RequisitionId) -> Requisition {
        self.state
            .lock()
            .expect("lock")
            .requisitions
            .get(&id)
            .cloned()
            .expect("requisition stored")
    }

    /// Store a requisition directly, bypassing the service.
    pub(super) fn put(&self, requisition: Requisition) {
        self.state
            .lock()
            .expect("lock")
            .requisitions
            .insert(requisition.id, requisition);
    }
}

pub(super) fn requisition(id: i64, status: RequisitionStatus, hours_ago: i64) -> Requisition {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    Requisition {
        id: RequisitionId(id),
        manager_id: manager(),
        role_title: format!("Role {id}"),
        department: None,
        required_skills: SkillRequirement::new([SQL]),
        status,
        matched_employee_ids: Vec::new(),
        created_at: base - Duration::hours(hours_ago),
        scanned_at: None,
    }
}

#[async_trait]
impl RequisitionRepository for MemoryStore {
    async fn insert(&self, draft: RequisitionDraft) -> Result<Requisition, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        state.next_id += 1;
        let requisition = Requisition {
            id: RequisitionId(state.next_id),
            manager_id: draft.manager_id,
            role_title: draft.role_title,
            department: draft.department,
            required_skills: draft.required_skills,
            status: RequisitionStatus::PendingScan,
            matched_employee_ids: Vec::new(),
            created_at: Utc::now(),
            scanned_at: None,
        };
        state
            .requisitions
            .insert(requisition.id, requisition.clone());
        Ok(requisition)
    }

    async fn fetch(&self, id: RequisitionId) -> Result<Option<Requisition>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .expect("lock")
            .requisitions
            .get(&id)
            .cloned())
    }

    async fn record_scan(
        &self,
        id: RequisitionId,
        expected: RequisitionStatus,
        status: RequisitionStatus,
        matched: Vec<EmployeeId>,
    ) -> Result<Requisition, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        let record = state
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
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(record.clone())
    }

    async fn list_by_status(
        &self,
        status: RequisitionStatus,
    ) -> Result<Vec<Requisition>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .expect("lock")
            .requisitions
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SkillCatalog for MemoryStore {
    async fn skill_exists(&self, id: SkillId) -> Result<bool, RepositoryError> {
        Ok(self
            .state
            .lock()
            .expect("lock")
            .skills
            .iter()
            .any(|skill| skill.id == id))
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError> {
        Ok(self.state.lock().expect("lock").skills.clone())
    }
}

#[async_trait]
impl WorkforceDirectory for MemoryStore {
    async fn skill_profiles(&self) -> Result<Vec<EmployeeSkillProfile>, RepositoryError> {
        Ok(self.state.lock().expect("lock").profiles.clone())
    }
}

pub(super) struct UnavailableDirectory;

#[async_trait]
impl WorkforceDirectory for UnavailableDirectory {
    async fn skill_profiles(&self) -> Result<Vec<EmployeeSkillProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("directory offline".to_string()))
    }
}

pub(super) type MemoryService = RequisitionScanService<MemoryStore, MemoryStore, MemoryStore>;

pub(super) fn build_service() -> (MemoryService, MemoryStore) {
    let store = MemoryStore::seeded();
    let shared = Arc::new(store.clone());
    let service = RequisitionScanService::new(shared.clone(), shared.clone(), shared);
    (service, store)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    requisition_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

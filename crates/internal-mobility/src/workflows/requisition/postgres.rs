//! PostgreSQL-backed requisition, catalog, and workforce storage.
//!
//! The scan commit is a single conditional `UPDATE ... WHERE status = 'PENDING_SCAN'`, so the
//! at-most-one-scan guarantee holds across processes sharing the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use super::domain::{
    EmployeeId, EmployeeSkillProfile, HeldSkill, ProficiencyLevel, Requisition, RequisitionDraft,
    RequisitionId, RequisitionStatus, Skill, SkillId, SkillRequirement,
};
use super::repository::{
    RepositoryError, RequisitionRepository, SkillCatalog, WorkforceDirectory,
};
use crate::config::DatabaseConfig;

const REQUISITION_COLUMNS: &str = "id, manager_id, role_title, department, required_skill_ids, \
     status, matched_employee_ids, created_at, scanned_at";

/// Store implementing every data-access trait of the scan workflow over one pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("requisition schema migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn unavailable(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

#[derive(Debug, FromRow)]
struct RequisitionRow {
    id: i64,
    manager_id: Uuid,
    role_title: String,
    department: Option<String>,
    required_skill_ids: Vec<i64>,
    status: String,
    matched_employee_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    scanned_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequisitionRow> for Requisition {
    type Error = RepositoryError;

    fn try_from(row: RequisitionRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<RequisitionStatus>()
            .map_err(|err| RepositoryError::Corrupt(format!("requisition {}: {err}", row.id)))?;

        Ok(Requisition {
            id: RequisitionId(row.id),
            manager_id: EmployeeId(row.manager_id),
            role_title: row.role_title,
            department: row.department,
            required_skills: row.required_skill_ids.into_iter().map(SkillId).collect(),
            status,
            matched_employee_ids: row.matched_employee_ids.into_iter().map(EmployeeId).collect(),
            created_at: row.created_at,
            scanned_at: row.scanned_at,
        })
    }
}

fn skill_row_ids(requirement: &SkillRequirement) -> Vec<i64> {
    requirement.iter().map(|skill| skill.0).collect()
}

fn group_profiles(
    rows: Vec<(Uuid, i64, i16)>,
) -> Result<Vec<EmployeeSkillProfile>, RepositoryError> {
    let mut profiles: Vec<EmployeeSkillProfile> = Vec::new();

    for (employee, skill, level) in rows {
        let proficiency = u8::try_from(level)
            .ok()
            .and_then(|level| ProficiencyLevel::try_from(level).ok())
            .ok_or_else(|| {
                RepositoryError::Corrupt(format!(
                    "employee {employee} holds skill {skill} at level {level}"
                ))
            })?;
        let held = HeldSkill {
            skill_id: SkillId(skill),
            proficiency,
        };

        match profiles.last_mut() {
            Some(profile) if profile.employee_id.0 == employee => profile.skills.push(held),
            _ => profiles.push(EmployeeSkillProfile {
                employee_id: EmployeeId(employee),
                skills: vec![held],
            }),
        }
    }

    Ok(profiles)
}

#[async_trait]
impl RequisitionRepository for PostgresStore {
    async fn insert(&self, draft: RequisitionDraft) -> Result<Requisition, RepositoryError> {
        let row = sqlx::query_as::<_, RequisitionRow>(&format!(
            r#"
            INSERT INTO process_requisitions (manager_id, role_title, department, required_skill_ids, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REQUISITION_COLUMNS}
            "#
        ))
        .bind(draft.manager_id.0)
        .bind(&draft.role_title)
        .bind(&draft.department)
        .bind(skill_row_ids(&draft.required_skills))
        .bind(RequisitionStatus::PendingScan.label())
        .fetch_one(&self.pool)
        .await
        .map_err(unavailable)?;

        row.try_into()
    }

    async fn fetch(&self, id: RequisitionId) -> Result<Option<Requisition>, RepositoryError> {
        let row = sqlx::query_as::<_, RequisitionRow>(&format!(
            "SELECT {REQUISITION_COLUMNS} FROM process_requisitions WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(Requisition::try_from).transpose()
    }

    async fn record_scan(
        &self,
        id: RequisitionId,
        expected: RequisitionStatus,
        status: RequisitionStatus,
        matched: Vec<EmployeeId>,
    ) -> Result<Requisition, RepositoryError> {
        let matched: Vec<Uuid> = matched.into_iter().map(|employee| employee.0).collect();

        let updated = sqlx::query_as::<_, RequisitionRow>(&format!(
            r#"
            UPDATE process_requisitions
            SET status = $1,
                matched_employee_ids = $2,
                scanned_at = NOW()
            WHERE id = $3 AND status = $4
            RETURNING {REQUISITION_COLUMNS}
            "#
        ))
        .bind(status.label())
        .bind(&matched)
        .bind(id.0)
        .bind(expected.label())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        if let Some(row) = updated {
            return row.try_into();
        }

        // Zero rows: either the requisition vanished or another scan committed first.
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM process_requisitions WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(unavailable)?;

        match current {
            None => Err(RepositoryError::NotFound),
            Some(raw) => {
                let actual = raw
                    .parse::<RequisitionStatus>()
                    .map_err(|err| RepositoryError::Corrupt(err.to_string()))?;
                Err(RepositoryError::StatusConflict { expected, actual })
            }
        }
    }

    async fn list_by_status(
        &self,
        status: RequisitionStatus,
    ) -> Result<Vec<Requisition>, RepositoryError> {
        let rows = sqlx::query_as::<_, RequisitionRow>(&format!(
            "SELECT {REQUISITION_COLUMNS} FROM process_requisitions \
             WHERE status = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(status.label())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.into_iter().map(Requisition::try_from).collect()
    }
}

#[async_trait]
impl SkillCatalog for PostgresStore {
    async fn skill_exists(&self, id: SkillId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM skills WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, category FROM skills ORDER BY category, name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(rows
            .into_iter()
            .map(|(id, name, category)| Skill {
                id: SkillId(id),
                name,
                category,
            })
            .collect())
    }
}

#[async_trait]
impl WorkforceDirectory for PostgresStore {
    async fn skill_profiles(&self) -> Result<Vec<EmployeeSkillProfile>, RepositoryError> {
        let rows = sqlx::query_as::<_, (Uuid, i64, i16)>(
            "SELECT employee_id, skill_id, proficiency_level FROM employee_skills \
             ORDER BY employee_id, skill_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        group_profiles(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> RequisitionRow {
        RequisitionRow {
            id: 7,
            manager_id: Uuid::from_u128(1),
            role_title: "Data Engineer".to_string(),
            department: Some("Analytics".to_string()),
            required_skill_ids: vec![3, 1, 3],
            status: status.to_string(),
            matched_employee_ids: vec![Uuid::from_u128(42)],
            created_at: Utc::now(),
            scanned_at: None,
        }
    }

    #[test]
    fn rows_convert_into_requisitions() {
        let requisition = Requisition::try_from(row("PENDING_INTERNAL_REVIEW")).expect("valid row");
        assert_eq!(requisition.id, RequisitionId(7));
        assert_eq!(requisition.status, RequisitionStatus::PendingInternalReview);
        assert_eq!(
            requisition.required_skills.iter().collect::<Vec<_>>(),
            vec![SkillId(1), SkillId(3)]
        );
        assert_eq!(
            requisition.matched_employee_ids,
            vec![EmployeeId(Uuid::from_u128(42))]
        );
    }

    #[test]
    fn unknown_status_is_reported_as_corrupt() {
        match Requisition::try_from(row("ARCHIVED")) {
            Err(RepositoryError::Corrupt(message)) => assert!(message.contains("ARCHIVED")),
            other => panic!("expected corrupt row, got {other:?}"),
        }
    }

    #[test]
    fn profile_rows_are_grouped_per_employee() {
        let first = Uuid::from_u128(1);
        let second = Uuid::from_u128(2);
        let profiles =
            group_profiles(vec![(first, 1, 3), (first, 2, 5), (second, 1, 1)]).expect("valid");

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].employee_id, EmployeeId(first));
        assert_eq!(profiles[0].skills.len(), 2);
        assert_eq!(profiles[1].held_skill_ids().len(), 1);
    }

    #[test]
    fn out_of_range_proficiency_is_corrupt() {
        let result = group_profiles(vec![(Uuid::from_u128(1), 1, 9)]);
        assert!(matches!(result, Err(RepositoryError::Corrupt(_))));
    }
}

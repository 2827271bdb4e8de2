use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog identity of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub i64);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Comma-separated skill ids for error messages.
pub(crate) fn join_skill_ids(ids: &[SkillId]) -> String {
    ids.iter()
        .map(SkillId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Identifier wrapper for hiring requisitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequisitionId(pub i64);

impl fmt::Display for RequisitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workforce identity shared by employees and the managers who raise requisitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub Uuid);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference data describing a skill that can be required or held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub category: String,
}

/// Self-assessed depth of a held skill, 1 (aware) through 5 (expert).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ProficiencyLevel(u8);

impl ProficiencyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ProficiencyLevel {
    type Error = InvalidProficiency;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidProficiency(value))
        }
    }
}

impl From<ProficiencyLevel> for u8 {
    fn from(value: ProficiencyLevel) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("proficiency level {0} is outside 1..=5")]
pub struct InvalidProficiency(pub u8);

/// A single skill held by an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldSkill {
    pub skill_id: SkillId,
    pub proficiency: ProficiencyLevel,
}

/// Snapshot of the skills one employee currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSkillProfile {
    pub employee_id: EmployeeId,
    pub skills: Vec<HeldSkill>,
}

impl EmployeeSkillProfile {
    pub fn held_skill_ids(&self) -> BTreeSet<SkillId> {
        self.skills.iter().map(|held| held.skill_id).collect()
    }
}

/// Deduplicated set of skills a requisition asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillRequirement(BTreeSet<SkillId>);

impl SkillRequirement {
    pub fn new<I>(skills: I) -> Self
    where
        I: IntoIterator<Item = SkillId>,
    {
        Self(skills.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, skill: SkillId) -> bool {
        self.0.contains(&skill)
    }

    pub fn as_set(&self) -> &BTreeSet<SkillId> {
        &self.0
    }

    /// Coverage test: every required skill appears in `held`.
    pub fn is_covered_by(&self, held: &BTreeSet<SkillId>) -> bool {
        self.0.is_subset(held)
    }
}

impl FromIterator<SkillId> for SkillRequirement {
    fn from_iter<T: IntoIterator<Item = SkillId>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Lifecycle status of a requisition. Only the first three are touched by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequisitionStatus {
    PendingScan,
    PendingInternalReview,
    PendingFinance,
    Approved,
    Rejected,
    Closed,
}

impl RequisitionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequisitionStatus::PendingScan => "PENDING_SCAN",
            RequisitionStatus::PendingInternalReview => "PENDING_INTERNAL_REVIEW",
            RequisitionStatus::PendingFinance => "PENDING_FINANCE",
            RequisitionStatus::Approved => "APPROVED",
            RequisitionStatus::Rejected => "REJECTED",
            RequisitionStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RequisitionStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "PENDING_SCAN" => Ok(Self::PendingScan),
            "PENDING_INTERNAL_REVIEW" => Ok(Self::PendingInternalReview),
            "PENDING_FINANCE" => Ok(Self::PendingFinance),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CLOSED" => Ok(Self::Closed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown requisition status '{0}'")]
pub struct UnknownStatus(pub String);

/// Manager-provided input for opening a requisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequisitionDraft {
    pub manager_id: EmployeeId,
    pub role_title: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub required_skills: SkillRequirement,
}

/// Stored requisition including the outcome of its scan, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requisition {
    pub id: RequisitionId,
    pub manager_id: EmployeeId,
    pub role_title: String,
    pub department: Option<String>,
    pub required_skills: SkillRequirement,
    pub status: RequisitionStatus,
    pub matched_employee_ids: Vec<EmployeeId>,
    pub created_at: DateTime<Utc>,
    pub scanned_at: Option<DateTime<Utc>>,
}

/// Matched employee together with the held skills covering the requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub employee_id: EmployeeId,
    pub skills: Vec<HeldSkill>,
}

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub requisition_id: RequisitionId,
    pub status: RequisitionStatus,
    pub matched_employee_ids: Vec<EmployeeId>,
    pub candidates: Vec<CandidateMatch>,
}

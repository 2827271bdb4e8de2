//! Coverage matching between a requisition's required skills and the workforce.
//!
//! Eligibility is binary: an employee qualifies when every required skill appears in their
//! held set. Proficiency never influences the decision and results are never ranked.

use std::collections::{BTreeMap, BTreeSet};

use super::domain::{join_skill_ids, EmployeeId, SkillId, SkillRequirement};

/// Raised when a requirement references skills missing from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("requirement references unknown skill ids {}", join_skill_ids(.0))]
pub struct MatchError(pub Vec<SkillId>);

/// Return the employees whose held skills cover `required`, in ascending id order.
///
/// An empty requirement matches nobody. Held skills listed twice, or an employee appearing
/// more than once in `population`, are merged before the coverage test.
pub fn match_candidates<F, I, H>(
    required: &SkillRequirement,
    is_known_skill: F,
    population: I,
) -> Result<Vec<EmployeeId>, MatchError>
where
    F: Fn(SkillId) -> bool,
    I: IntoIterator<Item = (EmployeeId, H)>,
    H: IntoIterator<Item = SkillId>,
{
    let unknown: Vec<SkillId> = required.iter().filter(|id| !is_known_skill(*id)).collect();
    if !unknown.is_empty() {
        return Err(MatchError(unknown));
    }

    if required.is_empty() {
        return Ok(Vec::new());
    }

    let mut held_by_employee: BTreeMap<EmployeeId, BTreeSet<SkillId>> = BTreeMap::new();
    for (employee_id, held) in population {
        held_by_employee
            .entry(employee_id)
            .or_default()
            .extend(held);
    }

    Ok(held_by_employee
        .into_iter()
        .filter(|(_, held)| required.is_covered_by(held))
        .map(|(employee_id, _)| employee_id)
        .collect())
}

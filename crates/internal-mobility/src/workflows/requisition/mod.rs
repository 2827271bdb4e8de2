//! Requisition scan workflow: what happens after a hiring requisition is opened.
//!
//! A scan matches the requisition's required skills against the workforce and advances the
//! requisition to internal review (candidates found) or finance (no candidates). The data
//! layer is reached only through the traits in [`repository`], so the same service runs over
//! PostgreSQL in production and over in-memory fixtures in tests and demos.

pub mod domain;
pub mod matching;
pub mod postgres;
pub mod repository;
pub mod router;
pub mod service;
mod state;

#[cfg(test)]
mod tests;

pub use domain::{
    CandidateMatch, EmployeeId, EmployeeSkillProfile, HeldSkill, InvalidProficiency,
    ProficiencyLevel, Requisition, RequisitionDraft, RequisitionId, RequisitionStatus,
    ScanResult, Skill, SkillId, SkillRequirement, UnknownStatus,
};
pub use matching::{match_candidates, MatchError};
pub use postgres::PostgresStore;
pub use repository::{
    RepositoryError, RequisitionRepository, RequisitionView, SkillCatalog, WorkforceDirectory,
};
pub use router::requisition_router;
pub use service::{InputError, RequisitionScanService, ScanError, ScanErrorKind};
pub use state::TransitionError;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{RequisitionDraft, RequisitionId};
use super::repository::{RequisitionRepository, RequisitionView, SkillCatalog, WorkforceDirectory};
use super::service::{RequisitionScanService, ScanError, ScanErrorKind};

/// Router builder exposing requisition intake, scanning and the mobility board.
pub fn requisition_router<R, C, W>(service: Arc<RequisitionScanService<R, C, W>>) -> Router
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    Router::new()
        .route("/api/v1/requisitions", post(submit_handler::<R, C, W>))
        .route(
            "/api/v1/requisitions/:requisition_id",
            get(status_handler::<R, C, W>),
        )
        .route(
            "/api/v1/requisitions/:requisition_id/scan",
            post(scan_handler::<R, C, W>),
        )
        .route(
            "/api/v1/mobility/open-roles",
            get(open_roles_handler::<R, C, W>),
        )
        .route("/api/v1/skills", get(skills_handler::<R, C, W>))
        .with_state(service)
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ScanErrorKind::NotFound => StatusCode::NOT_FOUND,
            ScanErrorKind::InvalidTransition => StatusCode::CONFLICT,
            ScanErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
            ScanErrorKind::DependencyFailure => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = json!({
            "error": kind,
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        });
        (status, axum::Json(payload)).into_response()
    }
}

pub(crate) async fn submit_handler<R, C, W>(
    State(service): State<Arc<RequisitionScanService<R, C, W>>>,
    axum::Json(draft): axum::Json<RequisitionDraft>,
) -> Response
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    match service.submit(draft).await {
        Ok(requisition) => (StatusCode::CREATED, axum::Json(requisition.view())).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn status_handler<R, C, W>(
    State(service): State<Arc<RequisitionScanService<R, C, W>>>,
    Path(requisition_id): Path<i64>,
) -> Response
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    match service.get(RequisitionId(requisition_id)).await {
        Ok(requisition) => (StatusCode::OK, axum::Json(requisition.view())).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn scan_handler<R, C, W>(
    State(service): State<Arc<RequisitionScanService<R, C, W>>>,
    Path(requisition_id): Path<i64>,
) -> Response
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    match service.scan(RequisitionId(requisition_id)).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn open_roles_handler<R, C, W>(
    State(service): State<Arc<RequisitionScanService<R, C, W>>>,
) -> Response
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    match service.open_roles().await {
        Ok(roles) => {
            let views: Vec<RequisitionView> = roles.iter().map(|role| role.view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn skills_handler<R, C, W>(
    State(service): State<Arc<RequisitionScanService<R, C, W>>>,
) -> Response
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    match service.skills().await {
        Ok(skills) => (StatusCode::OK, axum::Json(skills)).into_response(),
        Err(err) => err.into_response(),
    }
}

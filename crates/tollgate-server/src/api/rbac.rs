//! Matrix and seeding handlers.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use surrealdb::Connection;
use tollgate_authz::admin::RoleMatrix;

use crate::api::error::ApiError;
use crate::api::types::SeedResponse;
use crate::app::AppState;

pub(crate) async fn matrix<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<RoleMatrix>, ApiError> {
    let request = state.request_context(&headers);
    Ok(Json(state.admin.matrix(&request).await?))
}

pub(crate) async fn seed<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<SeedResponse>, ApiError> {
    let request = state.request_context(&headers);
    let report = state.admin.seed(&request).await?;
    Ok(Json(SeedResponse {
        message: "RBAC catalog seeded".to_string(),
        report,
    }))
}

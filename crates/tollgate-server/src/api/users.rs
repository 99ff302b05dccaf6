//! User role assignment and effective permission handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use surrealdb::Connection;
use tollgate_authz::EffectivePermissions;
use uuid::Uuid;

use crate::api::error::{ApiError, api_validation_error};
use crate::api::types::{AssignRoleRequest, AssignmentListResponse, MessageResponse};
use crate::app::AppState;

pub(crate) async fn assign_role<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AssignRoleRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(user_id) = path?;
    let Json(body) = payload?;
    let role_id = body
        .role_id
        .ok_or_else(|| api_validation_error("role_id is required"))?;
    state
        .admin
        .assign_role_to_user(&request, user_id, role_id)
        .await?;
    Ok(Json(MessageResponse::new("role assigned to user")))
}

pub(crate) async fn remove_role<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path((user_id, role_id)) = path?;
    state
        .admin
        .remove_role_from_user(&request, user_id, role_id)
        .await?;
    Ok(Json(MessageResponse::new("role removed from user")))
}

pub(crate) async fn list_assignments<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AssignmentListResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(user_id) = path?;
    let assignments = state.admin.list_user_assignments(&request, user_id).await?;
    Ok(Json(AssignmentListResponse { assignments }))
}

pub(crate) async fn effective_permissions<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<EffectivePermissions>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(user_id) = path?;
    let effective = state.admin.effective_permissions(&request, user_id).await?;
    Ok(Json(effective))
}

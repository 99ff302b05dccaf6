//! Role and role-permission link handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use surrealdb::Connection;
use tollgate_authz::admin::{NewRole, RolePatch};
use uuid::Uuid;

use crate::api::error::{ApiError, api_validation_error};
use crate::api::types::{
    AssignPermissionRequest, MessageResponse, PermissionIdsRequest, RoleCreatedResponse,
    RoleListResponse, RoleResponse,
};
use crate::app::AppState;

pub(crate) async fn list_roles<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<RoleListResponse>, ApiError> {
    let request = state.request_context(&headers);
    let roles = state.admin.list_roles(&request).await?;
    Ok(Json(RoleListResponse { roles }))
}

pub(crate) async fn create_role<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    payload: Result<Json<NewRole>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state.caller(&headers).await?;
    let Json(input) = payload?;
    let role = state.admin.create_role(&request, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(RoleCreatedResponse {
            role_id: role.id,
            message: format!("role {} created", role.name),
        }),
    ))
}

pub(crate) async fn get_role<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RoleResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(id) = path?;
    let role = state.admin.get_role(&request, id).await?;
    Ok(Json(RoleResponse { role }))
}

pub(crate) async fn update_role<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RolePatch>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(id) = path?;
    let Json(patch) = payload?;
    state.admin.update_role(&request, id, patch).await?;
    Ok(Json(MessageResponse::new("role updated")))
}

pub(crate) async fn delete_role<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(id) = path?;
    state.admin.delete_role(&request, id).await?;
    Ok(Json(MessageResponse::new("role deleted")))
}

pub(crate) async fn assign_permission<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AssignPermissionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(role_id) = path?;
    let Json(body) = payload?;
    let permission_id = body
        .permission_id
        .ok_or_else(|| api_validation_error("permission_id is required"))?;
    state
        .admin
        .assign_permission(&request, role_id, permission_id)
        .await?;
    Ok(Json(MessageResponse::new("permission assigned to role")))
}

pub(crate) async fn remove_permission<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path((role_id, permission_id)) = path?;
    state
        .admin
        .remove_permission(&request, role_id, permission_id)
        .await?;
    Ok(Json(MessageResponse::new("permission removed from role")))
}

pub(crate) async fn bulk_assign_permissions<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PermissionIdsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(role_id) = path?;
    let Json(body) = payload?;
    let ids = body
        .permission_ids
        .ok_or_else(|| api_validation_error("permission_ids is required"))?;
    let count = state
        .admin
        .bulk_assign_permissions(&request, role_id, &ids)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "{count} permissions assigned to role"
    ))))
}

pub(crate) async fn bulk_remove_permissions<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PermissionIdsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(role_id) = path?;
    let Json(body) = payload?;
    let ids = body
        .permission_ids
        .ok_or_else(|| api_validation_error("permission_ids is required"))?;
    let count = state
        .admin
        .bulk_remove_permissions(&request, role_id, &ids)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "{count} permissions removed from role"
    ))))
}

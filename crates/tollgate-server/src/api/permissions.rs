//! Permission catalog handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use surrealdb::Connection;
use tollgate_authz::admin::{NewPermission, PermissionPatch};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{MessageResponse, PermissionListResponse, PermissionResponse};
use crate::app::AppState;

pub(crate) async fn list_permissions<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
) -> Result<Json<PermissionListResponse>, ApiError> {
    let request = state.request_context(&headers);
    let permissions = state.admin.list_permissions(&request).await?;
    Ok(Json(PermissionListResponse { permissions }))
}

pub(crate) async fn create_permission<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    payload: Result<Json<NewPermission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state.caller(&headers).await?;
    let Json(input) = payload?;
    let permission = state.admin.create_permission(&request, input).await?;
    Ok((StatusCode::CREATED, Json(PermissionResponse { permission })))
}

pub(crate) async fn get_permission<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PermissionResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(id) = path?;
    let permission = state.admin.get_permission(&request, id).await?;
    Ok(Json(PermissionResponse { permission }))
}

pub(crate) async fn update_permission<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<PermissionPatch>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(id) = path?;
    let Json(patch) = payload?;
    state.admin.update_permission(&request, id, patch).await?;
    Ok(Json(MessageResponse::new("permission updated")))
}

pub(crate) async fn delete_permission<C: Connection>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = state.caller(&headers).await?;
    let Path(id) = path?;
    state.admin.delete_permission(&request, id).await?;
    Ok(Json(MessageResponse::new("permission deleted")))
}

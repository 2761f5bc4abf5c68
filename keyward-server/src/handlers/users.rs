use axum::{Extension, Json, extract::State};
use keyward_core::Account;
use serde::Deserialize;
use tracing::info;

use super::{ApiJson, run_blocking};
use crate::{
    api_response::ApiResponse, errors::AppResult, infra::app_state::AppState,
    validation,
};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct AddRoleRequest {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckRoleRequest {
    pub role: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let username = validation::username(&request.username)?;
    let password = validation::password(&request.password)?.to_owned();

    let identity = state.identity().clone();
    let account = run_blocking(move || {
        identity.credentials().create(&username, &password)
    })
    .await??;

    info!(username = %account.username(), "account created");
    Ok(Json(ApiResponse::ok()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteUserRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let username = validation::username(&request.username)?;
    state.identity().credentials().delete(&username)?;

    info!(username = %username, "account deleted");
    Ok(Json(ApiResponse::ok()))
}

/// Both the account and the role must exist before a membership is recorded.
pub async fn add_role(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddRoleRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let username = validation::username(&request.username)?;
    let role = validation::role(&request.role)?;

    let identity = state.identity();
    let account = identity.credentials().get(&username)?;
    let role = identity.roles().get(&role)?;
    identity
        .assignments()
        .add_role(account.username(), role.name());

    info!(username = %account.username(), role = %role.name(), "role granted");
    Ok(Json(ApiResponse::ok()))
}

pub async fn check_role(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    ApiJson(request): ApiJson<CheckRoleRequest>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let role = validation::role(&request.role)?;

    let identity = state.identity();
    let role = identity.roles().get(&role)?;
    let held = identity
        .assignments()
        .has_role(account.username(), role.name());

    Ok(Json(ApiResponse::success(held)))
}

pub async fn list_roles(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> Json<ApiResponse<Vec<String>>> {
    let roles = state.identity().assignments().list_roles(account.username());
    Json(ApiResponse::success(roles))
}

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::info;

use super::ApiJson;
use crate::{
    api_response::ApiResponse, errors::AppResult, infra::app_state::AppState,
    validation,
};

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

pub async fn create_role(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RoleRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let name = validation::role(&request.role)?;
    let role = state.identity().roles().create(&name)?;

    info!(role = %role.name(), "role created");
    Ok(Json(ApiResponse::ok()))
}

/// Memberships pointing at the role are left in place and stop counting.
pub async fn delete_role(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RoleRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let name = validation::role(&request.role)?;
    state.identity().roles().delete(&name)?;

    info!(role = %name, "role deleted");
    Ok(Json(ApiResponse::ok()))
}

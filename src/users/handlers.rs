use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::dto::{CountResponse, UserResponse, UsersResponse};
use super::repo::User;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/count", get(user_count))
        .route("/users/:unique_id", get(get_user))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UsersResponse>> {
    let users = User::list_all(&state.db).await?;
    let count = User::count(&state.db).await?;
    Ok(Json(UsersResponse {
        success: true,
        count,
        users,
    }))
}

#[instrument(skip(state))]
pub async fn user_count(State(state): State<AppState>) -> ApiResult<Json<CountResponse>> {
    let count = User::count(&state.db).await?;
    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    match User::get_by_unique_id(&state.db, &unique_id).await? {
        Some(user) => Ok(Json(UserResponse {
            success: true,
            user,
        })),
        None => Err(ApiError::not_found("User", "uniqueId", unique_id)),
    }
}

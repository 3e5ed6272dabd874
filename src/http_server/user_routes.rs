//! User HTTP Routes
//!
//! | Method | Path            | Operation   |
//! |--------|-----------------|-------------|
//! | GET    | `/users`        | list all    |
//! | GET    | `/users/filter` | filter      |
//! | POST   | `/users`        | create      |
//! | PUT    | `/users/:id`    | update      |
//! | DELETE | `/users/:id`    | delete one  |
//! | DELETE | `/users`        | delete all  |

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::observability::Logger;
use crate::store::{NewUser, User, UserChanges, UserStore, UserWithBio};

use super::errors::{ApiError, ApiResult};

// ==================
// Shared State
// ==================

/// State shared across user handlers
pub struct UsersState {
    pub users: UserStore,
}

impl UsersState {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

// ==================
// User Routes
// ==================

/// Create user routes
pub fn user_routes(state: Arc<UsersState>) -> Router {
    Router::new()
        .route(
            "/users",
            get(list_users_handler)
                .post(create_user_handler)
                .delete(clear_users_handler),
        )
        .route(
            "/users/filter",
            get(filter_users_handler)
                .put(missing_user_handler)
                .delete(missing_user_handler),
        )
        .route(
            "/users/:id",
            put(update_user_handler).delete(delete_user_handler),
        )
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

/// Non-numeric and out-of-range ids cannot name a row
fn user_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    path.map(|Path(id)| id).map_err(|_| ApiError::UserNotFound)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

// ==================
// Handlers
// ==================

async fn list_users_handler(State(state): State<Arc<UsersState>>) -> ApiResult<Json<Vec<User>>> {
    let users = state.users.all().await?;
    Ok(Json(users))
}

/// Users named exactly `name` that have a profile, with its bio
async fn filter_users_handler(
    State(state): State<Arc<UsersState>>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<UserWithBio>>> {
    let name = match query.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(Json(Vec::new())),
    };

    let rows = state.users.filter_by_name(name).await?;
    Ok(Json(rows))
}

/// `/users/filter` shadows `/users/:id`; as an id, "filter" names no user
async fn missing_user_handler() -> ApiError {
    ApiError::UserNotFound
}

async fn create_user_handler(
    State(state): State<Arc<UsersState>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let new_user = json_body(body)?;
    let user = state.users.create(new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user_handler(
    State(state): State<Arc<UsersState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UserChanges>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = user_id(path)?;
    let changes = json_body(body)?;
    let user = state.users.update(id, changes).await?;
    Ok(Json(user))
}

async fn delete_user_handler(
    State(state): State<Arc<UsersState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = user_id(path)?;
    state.users.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

async fn clear_users_handler(
    State(state): State<Arc<UsersState>>,
) -> ApiResult<Json<MessageResponse>> {
    let removed = state.users.truncate().await?;
    Logger::info("USERS_CLEARED", &[("removed", removed.to_string().as_str())]);
    Ok(Json(MessageResponse::new("All users cleared successfully")))
}

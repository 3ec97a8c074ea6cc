use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use service::crud::{Record, Variant};
use tracing::info;

use crate::errors::ApiError;
use crate::extract::UserJson;
use crate::state::UsersState;

/// User routes for one of the users tiers.
pub fn router(state: UsersState) -> Router {
    let router = match state.variant {
        Variant::UsersBasic => Router::new()
            .route("/users/:user_id", get(read).post(create_at).put(update).delete(delete)),
        Variant::UsersAdvanced => Router::new()
            .route("/", get(index))
            .route("/users", get(list).post(create))
            .route("/users/:user_id", get(read).put(update).delete(delete)),
        _ => Router::new()
            .route("/users", axum::routing::post(create))
            .route("/users/:user_id", get(read).put(update).delete(delete)),
    };
    router.with_state(state)
}

/// Static route directory.
pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Flask Advanced CRUD API",
        "routes": {
            "GET /users": "Get all users",
            "GET /users/<user_id>": "Get a specific user",
            "POST /users": "Create a new user",
            "PUT /users/<user_id>": "Update a user",
            "DELETE /users/<user_id>": "Delete a user"
        }
    }))
}

/// Every user, ordered by id compared as text (`"10"` sorts before `"2"`).
pub async fn list(State(state): State<UsersState>) -> Json<Vec<Record>> {
    Json(state.crud.list(None).await.into_values().collect())
}

pub async fn read(State(state): State<UsersState>, Path(user_id): Path<String>) -> Result<Json<Record>, ApiError> {
    match state.crud.read(&user_id).await.map_err(|e| state.reject(e))? {
        Some(rec) => Ok(Json(rec)),
        None => Err(state.reject(service::errors::ServiceError::not_found("User"))),
    }
}

/// Create with the id in the path; answers with the bare stored record.
pub async fn create_at(
    State(state): State<UsersState>,
    Path(user_id): Path<String>,
    UserJson(payload): UserJson,
) -> Result<Response, ApiError> {
    let w = state.crud.create(Some(user_id), payload).await.map_err(|e| state.reject(e))?;
    info!(variant = %state.variant, user_id = %w.id, event = "created", "user created");
    Ok((StatusCode::CREATED, Json(w.record)).into_response())
}

/// Create with the id taken from the body's `user_id`.
pub async fn create(State(state): State<UsersState>, UserJson(payload): UserJson) -> Result<Response, ApiError> {
    let w = state.crud.create(None, payload).await.map_err(|e| state.reject(e))?;
    info!(variant = %state.variant, user_id = %w.id, event = "created", "user created");
    Ok((StatusCode::CREATED, Json(json!({"message": "User created", "user": w.record}))).into_response())
}

pub async fn update(
    State(state): State<UsersState>,
    Path(user_id): Path<String>,
    UserJson(payload): UserJson,
) -> Result<Response, ApiError> {
    let w = state.crud.update(user_id, payload).await.map_err(|e| state.reject(e))?;
    info!(variant = %state.variant, user_id = %w.id, event = "updated", "user updated");
    let resp = if state.variant == Variant::UsersBasic {
        Json(w.record).into_response()
    } else {
        Json(json!({"message": "User updated", "user": w.record})).into_response()
    };
    Ok(resp)
}

pub async fn delete(State(state): State<UsersState>, Path(user_id): Path<String>) -> Result<Response, ApiError> {
    state.crud.delete(&user_id).await.map_err(|e| state.reject(e))?;
    info!(variant = %state.variant, %user_id, event = "deleted", "user deleted");
    if state.variant == Variant::UsersAdvanced {
        // 204 carries no body
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(json!({"message": format!("User {user_id} deleted")})).into_response())
}

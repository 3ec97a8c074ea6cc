use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use service::crud::{Outcome, Record, Removal, Variant, Written};
use tracing::info;

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::extract::{ItemId, ItemJson};
use crate::state::ItemsState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring of the item name.
    pub name: Option<String>,
}

/// Item routes for one of the items tiers. The basic tier has no list route.
pub fn router(state: ItemsState) -> Router {
    let mut router = Router::new().route(
        "/items/:id",
        get(read).post(create).put(update).delete(delete),
    );
    if state.variant != Variant::ItemsBasic {
        router = router.route("/items", get(list));
    }
    router.with_state(state)
}

/// Response for a create or update; tiers differ only in wording, status
/// codes and wrapping.
fn written(variant: Variant, w: Written<i64>) -> Response {
    let id = w.id;
    let (status, message) = match (variant, w.outcome) {
        (Variant::ItemsBasic, Outcome::Created) => (StatusCode::OK, format!("Item {id} created")),
        (Variant::ItemsBasic, Outcome::Updated) => (StatusCode::OK, format!("Item {id} updated")),
        (Variant::ItemsBasic, Outcome::Existing) => (StatusCode::OK, format!("Item {id} already exists")),
        (_, Outcome::Created) => (StatusCode::CREATED, "Item created".to_string()),
        (_, Outcome::Updated) => (StatusCode::OK, "Item updated".to_string()),
        (_, Outcome::Existing) => (StatusCode::OK, "Item already exists".to_string()),
    };
    if variant == Variant::ItemsAdvanced {
        (status, Json(Envelope::success(message, w.record))).into_response()
    } else {
        (status, Json(json!({"message": message, "item": w.record}))).into_response()
    }
}

#[utoipa::path(
    post, path = "/items/{id}", tag = "items",
    params(("id" = i64, Path, description = "Item id")),
    request_body = crate::extract::ItemInput,
    responses(
        (status = 201, description = "Created"),
        (status = 200, description = "Already exists (basic tier)"),
        (status = 400, description = "Item already exists"),
        (status = 422, description = "Invalid body")
    )
)]
pub async fn create(
    State(state): State<ItemsState>,
    ItemId(id): ItemId,
    ItemJson(input): ItemJson,
) -> Result<Response, ApiError> {
    let w = state
        .crud
        .create(Some(id), Some(input.into_record()))
        .await
        .map_err(|e| state.reject(e))?;
    if w.outcome == Outcome::Created {
        info!(variant = %state.variant, id, event = "created", "Item {id} created");
    }
    Ok(written(state.variant, w))
}

#[utoipa::path(
    get, path = "/items/{id}", tag = "items",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn read(State(state): State<ItemsState>, ItemId(id): ItemId) -> Result<Response, ApiError> {
    let item: Option<Record> = state.crud.read(&id).await.map_err(|e| state.reject(e))?;
    let resp = match (state.variant, item) {
        (Variant::ItemsAdvanced, Some(rec)) => Json(Envelope::success("Item retrieved", rec)).into_response(),
        // basic tier answers an unknown id with a null item
        (_, item) => Json(json!({"item_id": id, "item": item})).into_response(),
    };
    Ok(resp)
}

#[utoipa::path(
    get, path = "/items", tag = "items",
    params(ListQuery),
    responses((status = 200, description = "All items keyed by id"))
)]
pub async fn list(State(state): State<ItemsState>, Query(q): Query<ListQuery>) -> Response {
    if state.variant == Variant::ItemsAdvanced {
        let items = state.crud.list(q.name.as_deref()).await;
        Json(Envelope::success("Items listed", items)).into_response()
    } else {
        Json(state.crud.list(None).await).into_response()
    }
}

#[utoipa::path(
    put, path = "/items/{id}", tag = "items",
    params(("id" = i64, Path, description = "Item id")),
    request_body = crate::extract::ItemInput,
    responses(
        (status = 200, description = "Updated"),
        (status = 201, description = "Created"),
        (status = 422, description = "Invalid body")
    )
)]
pub async fn update(
    State(state): State<ItemsState>,
    ItemId(id): ItemId,
    ItemJson(input): ItemJson,
) -> Result<Response, ApiError> {
    let w = state
        .crud
        .update(id, Some(input.into_record()))
        .await
        .map_err(|e| state.reject(e))?;
    match w.outcome {
        Outcome::Created => info!(variant = %state.variant, id, event = "created", "Item {id} created via PUT"),
        _ => info!(variant = %state.variant, id, event = "updated", "Item {id} updated"),
    }
    Ok(written(state.variant, w))
}

#[utoipa::path(
    delete, path = "/items/{id}", tag = "items",
    params(("id" = i64, Path, description = "Item id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete(State(state): State<ItemsState>, ItemId(id): ItemId) -> Result<Response, ApiError> {
    let removal = state.crud.delete(&id).await.map_err(|e| state.reject(e))?;
    let message = match removal {
        Removal::Deleted => {
            info!(variant = %state.variant, id, event = "deleted", "Item {id} deleted");
            format!("Item {id} deleted")
        }
        Removal::Absent => format!("Item {id} does not exist"),
    };
    if state.variant == Variant::ItemsAdvanced {
        Ok(Json(Envelope::<()>::done(message)).into_response())
    } else {
        Ok(Json(json!({"message": message})).into_response())
    }
}

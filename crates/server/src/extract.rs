//! Request extractors whose rejections go through [`ApiError`], so body and
//! path failures use the variant's error layout like every other fault.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::crud::Record;

use crate::errors::ApiError;
use crate::state::{ItemsState, UsersState};

/// Typed item payload: `name` is required, `description` defaults to "".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct ItemInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ItemInput {
    /// The stored form; always carries both fields.
    pub fn into_record(self) -> Record {
        let mut rec = Record::new();
        rec.insert("name".into(), Value::String(self.name));
        rec.insert("description".into(), Value::String(self.description));
        rec
    }
}

/// JSON body validated against [`ItemInput`].
#[derive(Debug)]
pub struct ItemJson(pub ItemInput);

#[async_trait]
impl FromRequest<ItemsState> for ItemJson {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &ItemsState) -> Result<Self, Self::Rejection> {
        match Json::<ItemInput>::from_request(req, state).await {
            Ok(Json(input)) => Ok(ItemJson(input)),
            // malformed JSON, missing body or content type all fail the item model
            Err(rejection) => Err(ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text(), state.style())),
        }
    }
}

/// Integer item id from the path.
#[derive(Debug, Clone, Copy)]
pub struct ItemId(pub i64);

#[async_trait]
impl FromRequestParts<ItemsState> for ItemId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ItemsState) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(ItemId(id)),
            Err(rejection) => Err(ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text(), state.style())),
        }
    }
}

/// Free-form user payload. Anything that is not a JSON object (missing body,
/// wrong content, malformed JSON) comes through as `None` and is left to the
/// handler set's validation.
#[derive(Debug, Default)]
pub struct UserJson(pub Option<Record>);

impl UserJson {
    pub fn parse(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => UserJson(Some(map)),
            _ => UserJson(None),
        }
    }
}

#[async_trait]
impl FromRequest<UsersState> for UserJson {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &UsersState) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text(), state.style()))?;
        Ok(UserJson::parse(&bytes))
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// The six tutorial tiers: two resource flavours times three strictness levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    ItemsBasic,
    ItemsIntermediate,
    ItemsAdvanced,
    UsersBasic,
    UsersIntermediate,
    UsersAdvanced,
}

/// What a variant stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Integer ids, typed `{name, description}` payload.
    Items,
    /// String ids, free-form JSON payload.
    Users,
}

impl Resource {
    /// Name used in messages such as `Item not found`.
    pub fn singular(self) -> &'static str {
        match self {
            Resource::Items => "Item",
            Resource::Users => "User",
        }
    }
}

/// Behaviour of Create when the id is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Fail with `Conflict`.
    Strict,
    /// Hand back the existing record untouched.
    Lenient,
}

/// Behaviour of Update when the id is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Create the record.
    Upsert,
    /// Fail with `NotFound`.
    Strict,
}

/// Behaviour of Read/Delete when the id is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    Error,
    Tolerate,
}

/// Where Create takes the record id from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Path,
    Body(&'static str),
}

/// Required-field validation applied to a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    /// Only a non-empty body is required.
    NonEmpty,
    /// All fields required; one message covers every failure, including an
    /// absent body.
    Aggregate(&'static [&'static str]),
    /// All fields required; the first missing one is named.
    PerField(&'static [&'static str]),
}

/// What Create writes into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateShape {
    /// The payload as submitted.
    AsSubmitted,
    /// The id under `id_field` plus only the listed payload fields.
    Project { id_field: &'static str, fields: &'static [&'static str] },
}

/// Strictness profile consumed by [`crate::crud::CrudService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrudPolicy {
    pub create: CreateMode,
    pub update: UpdateMode,
    pub missing_read: MissingPolicy,
    pub missing_delete: MissingPolicy,
    pub id_source: IdSource,
    pub create_fields: FieldCheck,
    pub update_fields: FieldCheck,
    pub create_shape: CreateShape,
    /// Look the id up before validating the body.
    pub lookup_first: bool,
}

const USER_FIELDS: &[&str] = &["name", "email"];
const USER_FIELDS_WITH_ID: &[&str] = &["user_id", "name", "email"];

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::ItemsBasic,
        Variant::ItemsIntermediate,
        Variant::ItemsAdvanced,
        Variant::UsersBasic,
        Variant::UsersIntermediate,
        Variant::UsersAdvanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::ItemsBasic => "items-basic",
            Variant::ItemsIntermediate => "items-intermediate",
            Variant::ItemsAdvanced => "items-advanced",
            Variant::UsersBasic => "users-basic",
            Variant::UsersIntermediate => "users-intermediate",
            Variant::UsersAdvanced => "users-advanced",
        }
    }

    pub fn resource(self) -> Resource {
        match self {
            Variant::ItemsBasic | Variant::ItemsIntermediate | Variant::ItemsAdvanced => Resource::Items,
            Variant::UsersBasic | Variant::UsersIntermediate | Variant::UsersAdvanced => Resource::Users,
        }
    }

    pub fn policy(self) -> CrudPolicy {
        // items payloads are shaped by the typed input model before they get
        // here, so they only need to be non-empty
        let items = CrudPolicy {
            create: CreateMode::Strict,
            update: UpdateMode::Upsert,
            missing_read: MissingPolicy::Error,
            missing_delete: MissingPolicy::Error,
            id_source: IdSource::Path,
            create_fields: FieldCheck::NonEmpty,
            update_fields: FieldCheck::NonEmpty,
            create_shape: CreateShape::AsSubmitted,
            lookup_first: false,
        };
        let users = CrudPolicy {
            create: CreateMode::Strict,
            update: UpdateMode::Strict,
            missing_read: MissingPolicy::Error,
            missing_delete: MissingPolicy::Error,
            id_source: IdSource::Body("user_id"),
            create_fields: FieldCheck::Aggregate(USER_FIELDS_WITH_ID),
            update_fields: FieldCheck::NonEmpty,
            create_shape: CreateShape::AsSubmitted,
            lookup_first: false,
        };

        match self {
            Variant::ItemsBasic => CrudPolicy {
                create: CreateMode::Lenient,
                missing_read: MissingPolicy::Tolerate,
                missing_delete: MissingPolicy::Tolerate,
                ..items
            },
            Variant::ItemsIntermediate | Variant::ItemsAdvanced => items,
            Variant::UsersBasic => CrudPolicy {
                id_source: IdSource::Path,
                create_fields: FieldCheck::Aggregate(USER_FIELDS),
                create_shape: CreateShape::Project { id_field: "user_id", fields: USER_FIELDS },
                lookup_first: true,
                ..users
            },
            Variant::UsersIntermediate => users,
            Variant::UsersAdvanced => CrudPolicy {
                create_fields: FieldCheck::PerField(USER_FIELDS_WITH_ID),
                update_fields: FieldCheck::PerField(USER_FIELDS),
                ..users
            },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Variant::ALL.iter().map(|v| v.as_str()).collect();
                ServiceError::bad_request(format!("unknown variant `{s}`; expected one of {}", known.join(", ")))
            })
    }
}

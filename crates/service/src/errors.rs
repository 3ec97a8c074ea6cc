use thiserror::Error;

/// Faults raised by the CRUD handler set.
///
/// The payload is the client-facing message; the HTTP layer decides status
/// code and body shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn already_exists(entity: &str) -> Self { Self::Conflict(format!("{} already exists", entity)) }

    pub fn bad_request(msg: impl Into<String>) -> Self { Self::BadRequest(msg.into()) }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m) | Self::Conflict(m) | Self::NotFound(m) | Self::Internal(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_format_entity_messages() {
        assert_eq!(ServiceError::not_found("Item").message(), "Item not found");
        assert_eq!(ServiceError::already_exists("User").to_string(), "User already exists");
        assert!(matches!(ServiceError::bad_request("x"), ServiceError::BadRequest(_)));
    }
}

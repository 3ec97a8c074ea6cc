//! Normalized `{status, message, data}` response body.

use serde::{Deserialize, Serialize};

pub const SUCCESS: &str = "success";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self { status: SUCCESS.into(), message: message.into(), data: Some(data) }
    }

    /// Success without a payload, e.g. after a delete.
    pub fn done(message: impl Into<String>) -> Self {
        Self { status: SUCCESS.into(), message: message.into(), data: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: ERROR.into(), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_missing_data_as_null() {
        let v = serde_json::to_value(Envelope::<()>::done("Item 3 deleted")).expect("serialize");
        assert_eq!(v, json!({"status": "success", "message": "Item 3 deleted", "data": null}));
    }

    #[test]
    fn success_wraps_payload() {
        let v = serde_json::to_value(Envelope::success("Item created", json!({"name": "a"}))).expect("serialize");
        assert_eq!(v["status"], "success");
        assert_eq!(v["data"]["name"], "a");
    }
}

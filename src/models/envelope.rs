//! Response envelopes.
//!
//! Every API response is a JSON object. A non-null `errors` object marks a
//! failure regardless of the HTTP status. List endpoints wrap a page of
//! items together with a `response_data` block carrying `total_records`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, UserVoiceError};

/// Key of the pagination metadata block in list responses.
pub const RESPONSE_DATA_KEY: &str = "response_data";

/// Message used when a list endpoint returns something that is not a page.
pub const NOT_A_COLLECTION: &str = "The resource you requested is not a collection.";

/// The `errors` block of a failed response.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiErrorBody {
    /// Error classification, e.g. `record_not_found`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Human-readable message from the server.
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    /// Converts the error block into the matching error variant.
    pub fn into_error(self) -> UserVoiceError {
        UserVoiceError::from_api(&self.kind, self.message)
    }
}

/// Returns the classified error if `body` carries a non-null `errors` object.
pub fn check_errors(body: &Value) -> Result<()> {
    match body.get("errors") {
        Some(errors) if errors.is_object() => {
            let parsed: ApiErrorBody = serde_json::from_value(errors.clone()).unwrap_or_default();
            Err(parsed.into_error())
        }
        _ => Ok(()),
    }
}

/// Pagination metadata from `response_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData {
    /// Total number of records behind the list endpoint.
    pub total_records: usize,

    /// Page number reported by the server.
    #[serde(default)]
    pub page: Option<u64>,

    /// Page size reported by the server.
    #[serde(default)]
    pub per_page: Option<u64>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page {
    /// Pagination metadata.
    pub response_data: ResponseData,

    /// Name of the key that held the items, e.g. `tickets`.
    pub resource: String,

    /// The items of this page, in server order.
    pub items: Vec<Value>,
}

impl Page {
    /// Parses a list envelope.
    ///
    /// The body must be an object with exactly two keys: `response_data` and
    /// one other key whose value is an array. Anything else is reported as
    /// `NotFound`, since the resource is simply not list-shaped.
    pub fn from_value(body: Value) -> Result<Self> {
        let Value::Object(mut map) = body else {
            return Err(UserVoiceError::not_found(NOT_A_COLLECTION));
        };
        if map.len() != 2 {
            return Err(UserVoiceError::not_found(NOT_A_COLLECTION));
        }

        let response_data = map
            .remove(RESPONSE_DATA_KEY)
            .filter(Value::is_object)
            .and_then(|data| serde_json::from_value::<ResponseData>(data).ok())
            .ok_or_else(|| UserVoiceError::not_found(NOT_A_COLLECTION))?;

        let (resource, items) = map
            .into_iter()
            .next()
            .ok_or_else(|| UserVoiceError::not_found(NOT_A_COLLECTION))?;
        let Value::Array(items) = items else {
            return Err(UserVoiceError::not_found(NOT_A_COLLECTION));
        };

        Ok(Self {
            response_data,
            resource,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_errors_success() {
        assert!(check_errors(&json!({"ticket": {"id": 1}})).is_ok());
        assert!(check_errors(&json!({"errors": null})).is_ok());
    }

    #[test]
    fn test_check_errors_classifies() {
        let err = check_errors(&json!({"errors": {"type": "unauthorized", "message": "m"}}))
            .unwrap_err();
        assert!(matches!(err, UserVoiceError::Unauthorized(ref m) if m == "m"));

        let err = check_errors(&json!({"errors": {"type": "record_not_found", "message": "m"}}))
            .unwrap_err();
        assert!(matches!(err, UserVoiceError::NotFound(ref m) if m == "m"));

        let err = check_errors(&json!({"errors": {"type": "application_error", "message": "m"}}))
            .unwrap_err();
        assert!(matches!(err, UserVoiceError::ApplicationError(ref m) if m == "m"));

        let err = check_errors(&json!({"errors": {"type": "weird", "message": "m"}})).unwrap_err();
        assert!(matches!(err, UserVoiceError::Api(ref m) if m == "m"));
    }

    #[test]
    fn test_check_errors_without_type() {
        let err = check_errors(&json!({"errors": {}})).unwrap_err();
        assert!(matches!(err, UserVoiceError::Api(ref m) if m.is_empty()));
    }

    #[test]
    fn test_page_from_value() {
        let page = Page::from_value(json!({
            "response_data": {"total_records": 250, "page": 1, "per_page": 100},
            "tickets": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();
        assert_eq!(page.response_data.total_records, 250);
        assert_eq!(page.resource, "tickets");
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn test_page_key_order_does_not_matter() {
        let page = Page::from_value(json!({
            "suggestions": [],
            "response_data": {"total_records": 0}
        }))
        .unwrap();
        assert_eq!(page.resource, "suggestions");
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_page_rejects_wrong_shapes() {
        let shapes = [
            json!({"ticket": {"id": 1}}),
            json!({"tickets": [], "other": []}),
            json!({"response_data": {"total_records": 1}, "tickets": [], "extra": 1}),
            json!({"response_data": {"total_records": 1}, "tickets": {"id": 1}}),
            json!({"response_data": null, "tickets": []}),
            json!({"response_data": {}, "tickets": []}),
            json!([1, 2, 3]),
        ];
        for shape in shapes {
            let err = Page::from_value(shape).unwrap_err();
            assert!(
                matches!(err, UserVoiceError::NotFound(ref m) if m == NOT_A_COLLECTION),
                "unexpected error: {err}"
            );
        }
    }
}

//! Routing inputs extracted from the inbound request.

use thiserror::Error;

/// The request body names a model in a way that can't be routed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementsError {
    #[error("'model' must be a string")]
    InvalidModelField,
}

/// Model id named by a request body, if any.
///
/// Bodies that are empty or not a JSON object carry no model and route to
/// the default backend. A `model` field that is present but not a string
/// (or null) is rejected.
pub fn requested_model(body: &[u8]) -> Result<Option<String>, RequirementsError> {
    if body.is_empty() {
        return Ok(None);
    }

    let Ok(serde_json::Value::Object(fields)) = serde_json::from_slice::<serde_json::Value>(body)
    else {
        return Ok(None);
    };

    match fields.get("model") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(model)) if model.is_empty() => Ok(None),
        Some(serde_json::Value::String(model)) => Ok(Some(model.clone())),
        Some(_) => Err(RequirementsError::InvalidModelField),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_chat_body() {
        let body = br#"{"model": "llama3:70b", "messages": [{"role": "user", "content": "Hi"}]}"#;
        assert_eq!(requested_model(body).unwrap().as_deref(), Some("llama3:70b"));
    }

    #[test]
    fn test_empty_body_has_no_model() {
        assert_eq!(requested_model(b"").unwrap(), None);
    }

    #[test]
    fn test_non_json_body_has_no_model() {
        assert_eq!(requested_model(b"--boundary\r\nbinary").unwrap(), None);
        assert_eq!(requested_model(b"[1, 2, 3]").unwrap(), None);
    }

    #[test]
    fn test_missing_or_null_model() {
        assert_eq!(requested_model(br#"{"input": "x"}"#).unwrap(), None);
        assert_eq!(requested_model(br#"{"model": null}"#).unwrap(), None);
        assert_eq!(requested_model(br#"{"model": ""}"#).unwrap(), None);
    }

    #[test]
    fn test_non_string_model_rejected() {
        assert_eq!(
            requested_model(br#"{"model": 42}"#),
            Err(RequirementsError::InvalidModelField)
        );
        assert_eq!(
            requested_model(br#"{"model": ["a"]}"#),
            Err(RequirementsError::InvalidModelField)
        );
    }
}

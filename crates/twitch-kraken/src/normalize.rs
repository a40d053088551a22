//! Turns raw HTTP responses into decoded JSON or an [`ApiError`].

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::HttpResponse;

const FALLBACK_STATUS: u16 = 500;
const UNKNOWN_ERROR: &str = "unknown error";

/// Decodes a response body, raising an [`ApiError`] for error payloads
///
/// A body that is not valid JSON decodes to an empty object. The response is
/// an error when the decoded value has a truthy `error` field, or when it is
/// empty and the HTTP status is 400 or above. An empty 2xx response is a
/// valid result.
pub fn normalize(response: &HttpResponse) -> Result<Value, ApiError> {
    let decoded = serde_json::from_str::<Value>(&response.body).unwrap_or_else(|e| {
        if !response.body.is_empty() {
            tracing::debug!("Response body is not JSON ({}), treating as empty", e);
        }
        Value::Object(Map::new())
    });

    let has_error_field = decoded.get("error").is_some_and(is_truthy);
    if has_error_field || (is_empty(&decoded) && response.status >= 400) {
        let err = ApiError::new(status_code(&decoded, response), message(&decoded, response));
        tracing::warn!("{}", err);
        return Err(err);
    }

    Ok(decoded)
}

fn status_code(decoded: &Value, response: &HttpResponse) -> u16 {
    let reported = decoded
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());
    match reported {
        Some(s) if s >= 400 => s,
        _ if response.status >= 400 => response.status,
        _ => FALLBACK_STATUS,
    }
}

fn message(decoded: &Value, response: &HttpResponse) -> String {
    match decoded.get("message").filter(|m| is_truthy(m)) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None if !response.status_text.is_empty() => response.status_text.clone(),
        None => UNKNOWN_ERROR.to_string(),
    }
}

/// JSON truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        other => !is_truthy(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_payload_uses_reported_status_and_message() {
        let response = HttpResponse::new(404, r#"{"error":"Not Found","status":404,"message":"missing"}"#);

        let err = normalize(&response).unwrap_err();

        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "missing");
    }

    #[test]
    fn error_payload_is_an_error_even_with_2xx_status() {
        let response = HttpResponse::new(200, r#"{"error":"Unprocessable Entity","status":422,"message":"bad length"}"#);

        let err = normalize(&response).unwrap_err();

        assert_eq!(err.status_code, 422);
        assert_eq!(err.message, "bad length");
    }

    #[test]
    fn unparsable_body_with_error_status() {
        let response = HttpResponse::new(500, "<html>oops</html>");

        let err = normalize(&response).unwrap_err();

        assert_eq!(err.status_code, 500);
        assert_eq!(err.message, "Internal Server Error");
    }

    #[test]
    fn unparsable_body_without_status_text() {
        let mut response = HttpResponse::new(502, "");
        response.status_text = String::new();

        let err = normalize(&response).unwrap_err();

        assert_eq!(err.status_code, 502);
        assert_eq!(err.message, "unknown error");
    }

    #[test]
    fn empty_object_with_2xx_is_a_result() {
        let response = HttpResponse::new(200, "{}");

        assert_eq!(normalize(&response).unwrap(), json!({}));
    }

    #[test]
    fn empty_body_with_204_is_an_empty_object() {
        let response = HttpResponse::new(204, "");

        assert_eq!(normalize(&response).unwrap(), json!({}));
    }

    #[test]
    fn error_payload_with_low_reported_status_falls_back_to_http_status() {
        let response = HttpResponse::new(401, r#"{"error":"Unauthorized","status":200}"#);

        let err = normalize(&response).unwrap_err();

        assert_eq!(err.status_code, 401);
        assert_eq!(err.message, "Unauthorized");
    }

    #[test]
    fn error_payload_without_any_status_falls_back_to_500() {
        let mut response = HttpResponse::new(200, r#"{"error":true}"#);
        response.status_text = String::new();

        let err = normalize(&response).unwrap_err();

        assert_eq!(err.status_code, 500);
        assert_eq!(err.message, "unknown error");
    }

    #[test]
    fn non_string_message_is_rendered() {
        let response = HttpResponse::new(400, r#"{"error":"Bad Request","message":1234}"#);

        let err = normalize(&response).unwrap_err();

        assert_eq!(err.status_code, 400);
        assert_eq!(err.message, "1234");
    }

    #[test]
    fn falsy_message_falls_back_to_status_text() {
        let response = HttpResponse::new(403, r#"{"error":"Forbidden","message":0}"#);

        assert_eq!(normalize(&response).unwrap_err().message, "Forbidden");
    }

    #[test]
    fn falsy_error_field_is_not_an_error() {
        let response = HttpResponse::new(200, r#"{"error":null,"_id":1}"#);

        assert_eq!(normalize(&response).unwrap()["_id"], 1);
    }

    #[test]
    fn non_empty_body_with_error_status_and_no_error_field_is_returned() {
        let response = HttpResponse::new(404, r#"{"stream":null}"#);

        assert_eq!(normalize(&response).unwrap(), json!({"stream": null}));
    }

    #[test]
    fn arrays_and_primitives_pass_through() {
        assert_eq!(normalize(&HttpResponse::new(200, "[1,2]")).unwrap(), json!([1, 2]));
        assert_eq!(normalize(&HttpResponse::new(200, "\"ok\"")).unwrap(), json!("ok"));
        assert!(normalize(&HttpResponse::new(400, "[]")).is_err());
    }
}

use crate::HttpResponse;

use http::status::StatusCode;
use serde_json::Value;
use thiserror::Error;

use std::borrow::Cow;

/// Code reported when the provider's `error` field is present but not numeric.
const PRESENT_ERROR_CODE: i64 = 1;

/// The caller supplied an unusable configuration or parameter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvalidArgument {
    /// One or more required options were missing or empty.
    #[error("Required option(s) not set: {}", .0.join(", "))]
    MissingOptions(Vec<String>),
    /// An option expected to hold an absolute URL could not be parsed.
    #[error("Option `{option}` is not a valid absolute URL")]
    InvalidUrl {
        /// Name of the offending option.
        option: &'static str,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The CPF used to look up linked companies was empty.
    #[error("CPF is required to look up the companies linked to it")]
    EmptyCpf,
}

/// The identity provider rejected a request or answered with an error payload.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct IdentityProviderError {
    message: String,
    code: i64,
    status: StatusCode,
    body: Vec<u8>,
}
impl IdentityProviderError {
    /// Human readable description, taken from `error_description` when the provider sent one.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Numeric error code. See [`check_response`] for how it is derived.
    pub fn code(&self) -> i64 {
        self.code
    }

    /// HTTP status of the failed response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw response body, attached verbatim for diagnostics.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Raw response body decoded lossily as UTF-8.
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Error performing a request against the identity provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RequestError<RE>
where
    RE: std::error::Error + 'static,
{
    /// The request could not be built from the supplied arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    /// The provider answered with an error.
    #[error("Identity provider error: {0}")]
    IdentityProvider(#[from] IdentityProviderError),
    /// Failed to parse server response. The raw body is kept for diagnostics.
    #[error("Failed to parse server response")]
    Parse(
        #[source] serde_path_to_error::Error<serde_json::Error>,
        Vec<u8>,
    ),
    /// An error occurred while sending the request or receiving the response (e.g., network
    /// connectivity failed).
    #[error("Request failed")]
    Request(#[source] RE),
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
}

/// Decides whether a provider response is a failure.
///
/// A response fails when its status is 400 or above, or when its JSON body carries a non-empty
/// `error` field. Bodies that are not JSON are treated as carrying no fields at all.
///
/// On failure the message is the body's `error_description` when present, and the status
/// reason phrase otherwise. The code is the `error` field itself when numeric, `1` when the field
/// is present with any other value, and the HTTP status code when the field is absent.
pub fn check_response(response: &HttpResponse) -> Result<(), IdentityProviderError> {
    let status = response.status();
    let data = serde_json::from_slice::<Value>(response.body()).ok();
    let error = data
        .as_ref()
        .and_then(|data| data.get("error"))
        .filter(|error| !error.is_null());

    if status.as_u16() < 400 && !error.map_or(false, |error| !is_empty(error)) {
        return Ok(());
    }

    let message = data
        .as_ref()
        .and_then(|data| data.get("error_description"))
        .and_then(|description| match description {
            Value::Null => None,
            Value::String(description) => Some(description.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    let code = match error {
        None => i64::from(status.as_u16()),
        Some(Value::Number(number)) => number.as_i64().unwrap_or(PRESENT_ERROR_CODE),
        Some(Value::String(code)) => code.trim().parse().unwrap_or(PRESENT_ERROR_CODE),
        Some(_) => PRESENT_ERROR_CODE,
    };

    log::debug!(
        "identity provider responded with an error (status={}, code={}): {}",
        status,
        code,
        message
    );

    Err(IdentityProviderError {
        message,
        code,
        status,
        body: response.body().to_owned(),
    })
}

// Mirrors the loose emptiness the provider's own clients use when testing the `error` field.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(values) => values.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_response, InvalidArgument};
    use crate::HttpResponse;

    use http::status::StatusCode;
    use pretty_assertions::assert_eq;

    fn response(status: StatusCode, body: &str) -> HttpResponse {
        http::Response::builder()
            .status(status)
            .body(body.to_string().into_bytes())
            .unwrap()
    }

    #[test]
    fn test_success_without_error_field() {
        check_response(&response(StatusCode::OK, r#"{"sub":"123"}"#)).unwrap();
        check_response(&response(StatusCode::OK, "not json")).unwrap();
        check_response(&response(StatusCode::OK, r#"{"error":""}"#)).unwrap();
        check_response(&response(StatusCode::OK, r#"{"error":null}"#)).unwrap();
        check_response(&response(StatusCode::OK, r#"[{"cnpj":"1"}]"#)).unwrap();
    }

    #[test]
    fn test_status_failure_without_description() {
        let err = check_response(&response(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"invalid_token"}"#,
        ))
        .unwrap_err();

        assert_eq!("Unauthorized", err.message());
        // Present but not numeric.
        assert_eq!(1, err.code());
        assert_eq!(StatusCode::UNAUTHORIZED, err.status());
        assert_eq!(r#"{"error":"invalid_token"}"#, err.body_str());
    }

    #[test]
    fn test_error_field_on_success_status() {
        let err = check_response(&response(
            StatusCode::OK,
            r#"{"error":"invalid_grant","error_description":"Code expired"}"#,
        ))
        .unwrap_err();

        assert_eq!("Code expired", err.message());
        assert_eq!(1, err.code());
        assert_eq!("Code expired (code 1)", err.to_string());
    }

    #[test]
    fn test_numeric_error_code() {
        let err =
            check_response(&response(StatusCode::BAD_REQUEST, r#"{"error":"4001"}"#)).unwrap_err();
        assert_eq!(4001, err.code());

        let err =
            check_response(&response(StatusCode::BAD_REQUEST, r#"{"error":403}"#)).unwrap_err();
        assert_eq!(403, err.code());
    }

    #[test]
    fn test_status_code_when_error_absent() {
        let err = check_response(&response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>upstream failure</html>",
        ))
        .unwrap_err();

        assert_eq!("Internal Server Error", err.message());
        assert_eq!(500, err.code());
        assert_eq!(b"<html>upstream failure</html>".to_vec(), err.body().to_vec());
    }

    #[test]
    fn test_invalid_argument_display() {
        assert_eq!(
            "Required option(s) not set: clientId, redirectUriLogout",
            InvalidArgument::MissingOptions(vec![
                "clientId".to_string(),
                "redirectUriLogout".to_string()
            ])
            .to_string()
        );
    }
}

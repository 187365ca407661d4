use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::method::Method;
use oauth2::{AccessToken, ClientId, ClientSecret};
use url::form_urlencoded;

use crate::HttpRequest;

pub const MIME_TYPE_JSON: &str = "application/json";
pub const MIME_TYPE_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

pub const BEARER: &str = "Bearer";
pub const BASIC: &str = "Basic";

pub fn auth_bearer(access_token: &AccessToken) -> String {
    format!("{} {}", BEARER, access_token.secret())
}

// Section 2.3.1 of RFC 6749 requires both the client identifier and secret to be
// form-urlencoded before being base64-encoded into the Basic credentials.
// See https://tools.ietf.org/html/rfc6749#section-2.3.1.
pub fn auth_basic(client_id: &ClientId, client_secret: &ClientSecret) -> String {
    let urlencoded_id: String = form_urlencoded::byte_serialize(client_id.as_bytes()).collect();
    let urlencoded_secret: String =
        form_urlencoded::byte_serialize(client_secret.secret().as_bytes()).collect();
    format!(
        "{} {}",
        BASIC,
        BASE64_STANDARD.encode(format!("{}:{}", urlencoded_id, urlencoded_secret))
    )
}

/// Builds a bearer-authenticated `GET` expecting a JSON response.
pub fn bearer_get_request(
    url: &url::Url,
    access_token: &AccessToken,
) -> Result<HttpRequest, http::Error> {
    http::Request::builder()
        .uri(url.as_str())
        .method(Method::GET)
        .header(ACCEPT, HeaderValue::from_static(MIME_TYPE_JSON))
        .header(AUTHORIZATION, auth_bearer(access_token))
        .body(Vec::new())
}

/// Builds a form-encoded `POST`, optionally carrying an `Authorization` header.
pub fn form_post_request(
    url: &url::Url,
    params: &[(&str, &str)],
    authorization: Option<String>,
) -> Result<HttpRequest, http::Error> {
    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
        .into_bytes();

    let mut builder = http::Request::builder()
        .uri(url.as_str())
        .method(Method::POST)
        .header(ACCEPT, HeaderValue::from_static(MIME_TYPE_JSON))
        .header(
            CONTENT_TYPE,
            HeaderValue::from_static(MIME_TYPE_FORM_URLENCODED),
        );
    if let Some(authorization) = authorization {
        builder = builder.header(AUTHORIZATION, authorization);
    }
    builder.body(body)
}

use crate::AuthorizationCode;

use url::{form_urlencoded, Url};

use std::fmt::{Debug, Formatter, Result as FormatterResult};

/// Query parameters received on the redirect URI after the user authenticates.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
}
impl CallbackParams {
    /// Wraps already-extracted `code` and `state` parameters.
    pub fn new(code: Option<String>, state: Option<String>) -> Self {
        CallbackParams { code, state }
    }

    /// Extracts `code` and `state` from a URL query string (without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        let mut params = CallbackParams::default();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Extracts `code` and `state` from the full redirect URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    /// Authorization code, present once the user has authenticated.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// CSRF state echoed back by the provider.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}
impl Debug for CallbackParams {
    fn fmt(&self, f: &mut Formatter) -> FormatterResult {
        f.debug_struct("CallbackParams")
            .field("code", &self.code.as_ref().map(|_| "[redacted]"))
            .field("state", &self.state)
            .finish()
    }
}

/// Why a callback's CSRF state was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateRejection {
    /// The callback did not carry a `state`, or it was empty.
    Missing,
    /// No flow was initiated in this session, or its state was already consumed.
    NotInitiated,
    /// The callback `state` differs from the one issued when the flow was initiated.
    Mismatch,
}

/// Result of validating an authorization callback.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// No authorization code was received; the caller should initiate the flow.
    NotAuthenticated,
    /// The CSRF state did not validate. The flow must be aborted and restarted from the
    /// beginning; nothing may be sent to the token endpoint.
    Rejected(StateRejection),
    /// The state matched and the authorization code may be exchanged.
    Authorized(AuthorizationCode),
}

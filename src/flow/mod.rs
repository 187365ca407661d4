use crate::{
    AuthenticateRequest, AuthorizationCode, AuthorizationRequest, CallbackOutcome, CallbackParams,
    CodeTokenRequest, CsrfToken, Nonce, Provider, ProviderTokenResponse, SessionStore,
    StateRejection, UserInfoRequest,
};

use subtle::ConstantTimeEq;
use url::Url;

use std::borrow::Cow;


/// Session key under which the CSRF state is kept unless overridden.
pub const DEFAULT_STATE_KEY: &str = "oauth2_state";

/// OAuth2 authorization code flow against a [`Provider`].
///
/// The flow runs in three strictly sequential phases:
///
///  1. [`initiate`](Self::initiate) builds the authorization URL and records a fresh CSRF state
///     in the user's session.
///  2. [`validate_callback`](Self::validate_callback) consumes that state and compares it with
///     the `state` received on the redirect URI.
///  3. [`authenticate`](Self::authenticate) (or [`exchange_code`](Self::exchange_code) followed
///     by [`user_info`](Self::user_info)) exchanges the authorization code and fetches the
///     resource owner.
///
/// The flow itself holds no per-user state, so a single instance may serve any number of
/// concurrent users as long as each one has its own session.
#[derive(Clone, Debug)]
pub struct AuthorizationCodeFlow<P>
where
    P: Provider,
{
    provider: P,
    state_key: Cow<'static, str>,
}
impl<P> AuthorizationCodeFlow<P>
where
    P: Provider,
{
    /// Creates a flow for the given provider.
    pub fn new(provider: P) -> Self {
        AuthorizationCodeFlow {
            provider,
            state_key: Cow::Borrowed(DEFAULT_STATE_KEY),
        }
    }

    /// Sets the session key under which the CSRF state is stored.
    pub fn set_state_key<K>(mut self, state_key: K) -> Self
    where
        K: Into<Cow<'static, str>>,
    {
        self.state_key = state_key.into();
        self
    }

    /// Session key under which the CSRF state is stored.
    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Starts building an authorization URL.
    ///
    /// `state_fn` produces the CSRF state; use [`CsrfToken::new_random`] unless a specific value
    /// is required. The nonce comes from [`Provider::authorization_nonce`]. No network call is
    /// made and no session is touched; see [`initiate`](Self::initiate) for the variant that
    /// records the state.
    pub fn authorize_url<SF>(&self, state_fn: SF) -> AuthorizationRequest<'_, P>
    where
        SF: FnOnce() -> CsrfToken,
    {
        AuthorizationRequest {
            provider: &self.provider,
            state: state_fn(),
            nonce: self.provider.authorization_nonce(),
            scopes: Vec::new(),
            pkce_challenge: None,
            extra_params: Vec::new(),
        }
    }

    /// Builds an authorization URL with the default scopes and a random CSRF state, and records
    /// that state in `session`.
    ///
    /// The user's browser should then be redirected to the returned URL.
    pub fn initiate<S>(&self, session: &S) -> (Url, CsrfToken, Option<Nonce>)
    where
        S: SessionStore + ?Sized,
    {
        self.persist(session, self.authorize_url(CsrfToken::new_random).url())
    }

    /// Records the CSRF state of an already built authorization request in `session`.
    ///
    /// Use this when the request was customized through [`authorize_url`](Self::authorize_url).
    pub fn persist<S>(
        &self,
        session: &S,
        authorization: (Url, CsrfToken, Option<Nonce>),
    ) -> (Url, CsrfToken, Option<Nonce>)
    where
        S: SessionStore + ?Sized,
    {
        session.set(&self.state_key, authorization.1.secret().to_string());
        authorization
    }

    /// Validates the callback received on the redirect URI.
    ///
    /// Without an authorization code the user has not authenticated yet and the session is left
    /// untouched. Otherwise the state recorded by [`initiate`](Self::initiate) is consumed, so any
    /// outcome other than [`CallbackOutcome::NotAuthenticated`] leaves the session without a
    /// pending state and a new flow must be initiated to try again.
    pub fn validate_callback<S>(&self, session: &S, callback: &CallbackParams) -> CallbackOutcome
    where
        S: SessionStore + ?Sized,
    {
        let code = match callback.code() {
            Some(code) => code,
            None => return CallbackOutcome::NotAuthenticated,
        };

        let expected_state = session.get(&self.state_key);
        session.clear(&self.state_key);

        let rejection = match (callback.state(), expected_state) {
            (None, _) | (Some(""), _) => Some(StateRejection::Missing),
            (Some(_), None) => Some(StateRejection::NotInitiated),
            (Some(state), Some(expected_state)) => {
                if bool::from(state.as_bytes().ct_eq(expected_state.as_bytes())) {
                    None
                } else {
                    Some(StateRejection::Mismatch)
                }
            }
        };

        match rejection {
            Some(rejection) => {
                log::warn!("rejected authorization callback: {:?}", rejection);
                CallbackOutcome::Rejected(rejection)
            }
            None => CallbackOutcome::Authorized(AuthorizationCode::new(code.to_string())),
        }
    }

    /// Creates a request to exchange an authorization code for an access token.
    pub fn exchange_code(&self, code: AuthorizationCode) -> CodeTokenRequest<'_, P> {
        CodeTokenRequest {
            provider: &self.provider,
            code,
            pkce_verifier: None,
        }
    }

    /// Creates a request for the resource owner associated with `token`.
    pub fn user_info(&self, token: ProviderTokenResponse<P>) -> UserInfoRequest<'_, P> {
        UserInfoRequest {
            provider: &self.provider,
            token,
        }
    }

    /// Creates a request that exchanges `code` and then fetches the resource owner.
    pub fn authenticate(&self, code: AuthorizationCode) -> AuthenticateRequest<'_, P> {
        AuthenticateRequest {
            provider: &self.provider,
            code,
            pkce_verifier: None,
        }
    }
}

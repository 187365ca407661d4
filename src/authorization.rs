use crate::{CsrfToken, Nonce, PkceCodeChallenge, Provider, Scope};

use itertools::Itertools;
use url::Url;

use std::borrow::Cow;

/// A request to the authorization endpoint.
///
/// When no scopes are added, the provider's default scopes are requested.
pub struct AuthorizationRequest<'a, P>
where
    P: Provider,
{
    pub(crate) provider: &'a P,
    pub(crate) state: CsrfToken,
    pub(crate) nonce: Option<Nonce>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) pkce_challenge: Option<PkceCodeChallenge>,
    pub(crate) extra_params: Vec<(Cow<'a, str>, Cow<'a, str>)>,
}
impl<'a, P> AuthorizationRequest<'a, P>
where
    P: Provider,
{
    /// Appends a new scope to the authorization URL.
    pub fn add_scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Appends a collection of scopes to the authorization URL.
    pub fn add_scopes<I>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = Scope>,
    {
        self.scopes.extend(scopes);
        self
    }

    /// Overrides the nonce generated by the provider.
    pub fn set_nonce(mut self, nonce: Nonce) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Enables the use of [Proof Key for Code Exchange](https://tools.ietf.org/html/rfc7636)
    /// (PKCE).
    ///
    /// The matching verifier must be passed to
    /// [`CodeTokenRequest::set_pkce_verifier`](crate::CodeTokenRequest::set_pkce_verifier) when
    /// exchanging the authorization code.
    pub fn set_pkce_challenge(mut self, pkce_code_challenge: PkceCodeChallenge) -> Self {
        self.pkce_challenge = Some(pkce_code_challenge);
        self
    }

    /// Appends an extra param to the authorization URL.
    ///
    /// Callers should avoid parameters already set by this request (`response_type`,
    /// `client_id`, `state`, `redirect_uri`, `scope`, `nonce`, `code_challenge` and
    /// `code_challenge_method`).
    pub fn add_extra_param<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<Cow<'a, str>>,
        V: Into<Cow<'a, str>>,
    {
        self.extra_params.push((name.into(), value.into()));
        self
    }

    /// Returns the full authorization URL and the CSRF state and nonce for this request.
    ///
    /// The CSRF state must be kept by the caller (typically in the user's session) and compared
    /// against the `state` parameter of the callback.
    pub fn url(self) -> (Url, CsrfToken, Option<Nonce>) {
        let scopes = if self.scopes.is_empty() {
            self.provider.default_scopes()
        } else {
            self.scopes
        };
        let scope = scopes
            .iter()
            .map(|scope| scope.as_str())
            .join(self.provider.scope_separator());

        let mut url = self.provider.authorization_url().url().to_owned();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", self.provider.client_id().as_str());
            query.append_pair("state", self.state.secret());
            if let Some(ref pkce_challenge) = self.pkce_challenge {
                query.append_pair("code_challenge", pkce_challenge.as_str());
                query.append_pair("code_challenge_method", pkce_challenge.method().as_str());
            }
            query.append_pair("redirect_uri", self.provider.redirect_uri().as_str());
            if !scope.is_empty() {
                query.append_pair("scope", &scope);
            }
            if let Some(ref nonce) = self.nonce {
                query.append_pair("nonce", nonce.secret());
            }
            for (name, value) in &self.extra_params {
                query.append_pair(name, value);
            }
        }

        log::debug!("built authorization URL for {}", self.provider.authorization_url().as_str());
        (url, self.state, self.nonce)
    }
}

use crate::http_utils::{auth_basic, form_post_request};
use crate::{
    AsyncHttpClient, AuthType, AuthorizationCode, HttpRequest, HttpResponse, PkceCodeVerifier,
    Provider, ProviderTokenResponse, RequestError, SyncHttpClient,
};

use std::future::Future;

/// A request to exchange an authorization code for an access token.
///
/// Authorization codes are single-use: a failed exchange is reported to the caller and never
/// retried.
pub struct CodeTokenRequest<'a, P>
where
    P: Provider,
{
    pub(crate) provider: &'a P,
    pub(crate) code: AuthorizationCode,
    pub(crate) pkce_verifier: Option<PkceCodeVerifier>,
}
impl<'a, P> CodeTokenRequest<'a, P>
where
    P: Provider,
{
    /// Completes the [Proof Key for Code Exchange](https://tools.ietf.org/html/rfc7636)
    /// started with
    /// [`AuthorizationRequest::set_pkce_challenge`](crate::AuthorizationRequest::set_pkce_challenge).
    pub fn set_pkce_verifier(mut self, pkce_verifier: PkceCodeVerifier) -> Self {
        self.pkce_verifier = Some(pkce_verifier);
        self
    }

    fn prepare_request(&self) -> Result<HttpRequest, http::Error> {
        let provider = self.provider;
        let mut params: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", self.code.secret().as_str()),
            ("redirect_uri", provider.redirect_uri().as_str()),
        ];
        if let Some(ref pkce_verifier) = self.pkce_verifier {
            params.push(("code_verifier", pkce_verifier.secret().as_str()));
        }

        let authorization = match provider.auth_type() {
            AuthType::RequestBody => {
                params.push(("client_id", provider.client_id().as_str()));
                params.push(("client_secret", provider.client_secret().secret().as_str()));
                None
            }
            _ => Some(auth_basic(provider.client_id(), provider.client_secret())),
        };

        log::debug!(
            "exchanging authorization code at {}",
            provider.token_url().as_str()
        );
        form_post_request(provider.token_url().url(), &params, authorization)
    }

    pub(crate) fn token_response<RE>(
        provider: &P,
        http_response: HttpResponse,
    ) -> Result<ProviderTokenResponse<P>, RequestError<RE>>
    where
        RE: std::error::Error + 'static,
    {
        provider.check_response(&http_response)?;

        let token = serde_path_to_error::deserialize::<_, ProviderTokenResponse<P>>(
            &mut serde_json::Deserializer::from_slice(http_response.body()),
        )
        .map_err(|err| RequestError::Parse(err, http_response.body().to_owned()))?;

        log::info!("obtained access token from {}", provider.token_url().as_str());
        Ok(token)
    }

    /// Synchronously sends the request to the token endpoint.
    pub fn request<C>(
        self,
        http_client: &C,
    ) -> Result<ProviderTokenResponse<P>, RequestError<<C as SyncHttpClient>::Error>>
    where
        C: SyncHttpClient,
    {
        let http_request = self
            .prepare_request()
            .map_err(|err| RequestError::Other(format!("failed to prepare request: {err}")))?;
        let http_response = http_client
            .call(http_request)
            .map_err(RequestError::Request)?;
        Self::token_response(self.provider, http_response)
    }

    /// Asynchronously sends the request to the token endpoint.
    pub fn request_async<'c, C>(
        self,
        http_client: &'c C,
    ) -> impl Future<
        Output = Result<ProviderTokenResponse<P>, RequestError<<C as AsyncHttpClient<'c>>::Error>>,
    > + 'c
    where
        Self: 'c,
        C: AsyncHttpClient<'c>,
    {
        Box::pin(async move {
            let http_request = self
                .prepare_request()
                .map_err(|err| RequestError::Other(format!("failed to prepare request: {err}")))?;
            let http_response = http_client
                .call(http_request)
                .await
                .map_err(RequestError::Request)?;
            Self::token_response(self.provider, http_response)
        })
    }
}

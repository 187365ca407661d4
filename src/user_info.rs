use crate::http_utils::bearer_get_request;
use crate::{
    AsyncHttpClient, AuthorizationCode, Claims, CodeTokenRequest, HttpRequest, HttpResponse,
    PkceCodeVerifier, Provider, ProviderTokenResponse, RequestError, SyncHttpClient,
    TokenResponse,
};

use std::future::Future;

/// A request to the user info endpoint, authenticated with a previously obtained token.
pub struct UserInfoRequest<'a, P>
where
    P: Provider,
{
    pub(crate) provider: &'a P,
    pub(crate) token: ProviderTokenResponse<P>,
}
impl<'a, P> UserInfoRequest<'a, P>
where
    P: Provider,
{
    fn prepare_request(&self) -> Result<HttpRequest, http::Error> {
        let access_token = self.token.access_token();
        let user_info_url = self.provider.user_info_url(access_token);
        log::debug!("fetching user info from {}", user_info_url.as_str());
        bearer_get_request(user_info_url.url(), access_token)
    }

    fn user_info_response<RE>(
        provider: &P,
        token: ProviderTokenResponse<P>,
        http_response: HttpResponse,
    ) -> Result<P::ResourceOwner, RequestError<RE>>
    where
        RE: std::error::Error + 'static,
    {
        provider.check_response(&http_response)?;

        let claims = serde_path_to_error::deserialize::<_, Claims>(
            &mut serde_json::Deserializer::from_slice(http_response.body()),
        )
        .map_err(|err| RequestError::Parse(err, http_response.body().to_owned()))?;

        Ok(provider.create_resource_owner(claims, token))
    }

    /// Synchronously fetches the user info claims.
    pub fn request<C>(
        self,
        http_client: &C,
    ) -> Result<P::ResourceOwner, RequestError<<C as SyncHttpClient>::Error>>
    where
        C: SyncHttpClient,
    {
        let http_request = self
            .prepare_request()
            .map_err(|err| RequestError::Other(format!("failed to prepare request: {err}")))?;
        let http_response = http_client
            .call(http_request)
            .map_err(RequestError::Request)?;
        Self::user_info_response(self.provider, self.token, http_response)
    }

    /// Asynchronously fetches the user info claims.
    pub fn request_async<'c, C>(
        self,
        http_client: &'c C,
    ) -> impl Future<Output = Result<P::ResourceOwner, RequestError<<C as AsyncHttpClient<'c>>::Error>>>
           + 'c
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
            Self::user_info_response(self.provider, self.token, http_response)
        })
    }
}

/// Exchanges an authorization code and immediately fetches the user info with the resulting
/// token.
///
/// The user info request is only sent once the token exchange has succeeded, and neither step is
/// retried.
pub struct AuthenticateRequest<'a, P>
where
    P: Provider,
{
    pub(crate) provider: &'a P,
    pub(crate) code: AuthorizationCode,
    pub(crate) pkce_verifier: Option<PkceCodeVerifier>,
}
impl<'a, P> AuthenticateRequest<'a, P>
where
    P: Provider,
{
    /// See [`CodeTokenRequest::set_pkce_verifier`].
    pub fn set_pkce_verifier(mut self, pkce_verifier: PkceCodeVerifier) -> Self {
        self.pkce_verifier = Some(pkce_verifier);
        self
    }

    fn split(self) -> (&'a P, CodeTokenRequest<'a, P>) {
        (
            self.provider,
            CodeTokenRequest {
                provider: self.provider,
                code: self.code,
                pkce_verifier: self.pkce_verifier,
            },
        )
    }

    /// Synchronously exchanges the code and fetches the user info.
    pub fn request<C>(
        self,
        http_client: &C,
    ) -> Result<P::ResourceOwner, RequestError<<C as SyncHttpClient>::Error>>
    where
        C: SyncHttpClient,
    {
        let (provider, token_request) = self.split();
        let token = token_request.request(http_client)?;
        UserInfoRequest { provider, token }.request(http_client)
    }

    /// Asynchronously exchanges the code and fetches the user info.
    pub fn request_async<'c, C>(
        self,
        http_client: &'c C,
    ) -> impl Future<Output = Result<P::ResourceOwner, RequestError<<C as AsyncHttpClient<'c>>::Error>>>
           + 'c
    where
        Self: 'c,
        C: AsyncHttpClient<'c>,
    {
        Box::pin(async move {
            let (provider, token_request) = self.split();
            let token = token_request.request_async(http_client).await?;
            UserInfoRequest { provider, token }
                .request_async(http_client)
                .await
        })
    }
}

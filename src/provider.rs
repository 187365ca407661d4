use crate::{
    AccessToken, AuthType, AuthUrl, Claims, ClientId, ClientSecret, ExtraTokenFields, HttpResponse,
    IdentityProviderError, Nonce, RedirectUrl, Scope, StandardTokenResponse, TokenUrl, UserInfoUrl,
};

use oauth2::basic::BasicTokenType;

/// Token response returned by the token endpoint of provider `P`.
pub type ProviderTokenResponse<P> =
    StandardTokenResponse<<P as Provider>::TokenFields, BasicTokenType>;

/// Capabilities an identity provider exposes to the generic
/// [`AuthorizationCodeFlow`](crate::AuthorizationCodeFlow).
///
/// A provider knows its endpoints, its client credentials, how it expects scopes to be encoded,
/// how to tell a failed response apart from a successful one, and how to turn the user info
/// claims into its own resource owner type. The flow owns the protocol sequencing.
pub trait Provider {
    /// Provider-specific fields returned alongside the access token.
    type TokenFields: ExtraTokenFields + Clone;
    /// Typed view over the user info claims.
    type ResourceOwner;

    /// Client identifier issued by the provider.
    fn client_id(&self) -> &ClientId;
    /// Client secret issued by the provider.
    fn client_secret(&self) -> &ClientSecret;
    /// Redirect URI registered with the provider for the authorization callback.
    fn redirect_uri(&self) -> &RedirectUrl;
    /// How client credentials are presented to the token endpoint.
    fn auth_type(&self) -> &AuthType;

    /// Authorization endpoint the user's browser is sent to.
    fn authorization_url(&self) -> &AuthUrl;
    /// Token endpoint used to exchange authorization codes.
    fn token_url(&self) -> &TokenUrl;
    /// User info endpoint for the given access token.
    fn user_info_url(&self, access_token: &AccessToken) -> &UserInfoUrl;

    /// Scopes requested when the caller does not add any.
    fn default_scopes(&self) -> Vec<Scope>;
    /// Separator used to join scopes into the `scope` parameter.
    fn scope_separator(&self) -> &str;

    /// Nonce sent with each authorization request, if the provider uses one.
    fn authorization_nonce(&self) -> Option<Nonce> {
        None
    }

    /// Classifies a response from any of the provider's endpoints.
    fn check_response(&self, response: &HttpResponse) -> Result<(), IdentityProviderError>;

    /// Projects the user info claims returned for `token`.
    fn create_resource_owner(
        &self,
        claims: Claims,
        token: ProviderTokenResponse<Self>,
    ) -> Self::ResourceOwner;
}

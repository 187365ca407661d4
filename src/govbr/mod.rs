use crate::config::{EndpointSet, Environment, GovBrOptions};
use crate::error::check_response;
use crate::{
    AccessToken, AuthType, AuthUrl, AuthorizationCodeFlow, Claims, ClientId, ClientSecret,
    CompaniesRequest, Cpf, ExtraTokenFields, GovBrResourceOwner, HttpResponse,
    IdentityProviderError, InvalidArgument, LogoutRequest, Nonce, PostLogoutRedirectUrl,
    Provider, RedirectUrl, Scope, StandardTokenResponse, TokenUrl, UserInfoUrl,
};

use oauth2::basic::BasicTokenType;
use serde::{Deserialize, Serialize};
use url::Url;


/// Scopes requested when none are added to the authorization request.
///
/// See the [scope reference](https://manual-roteiro-integracao-login-unico.servicos.gov.br/pt/stable/escopoatributos.html).
pub const DEFAULT_SCOPES: &[&str] = &[
    "openid",
    "email",
    "phone",
    "profile",
    "govbr_confiabilidades",
    "govbr_empresa",
];

/// Session key under which the CSRF state of a Gov.br flow is kept.
pub const GOVBR_STATE_KEY: &str = "auth_govbr";

const COMPANIES_PARTICIPANT_PARAM: &str = "filtrar-por-participante";

/// Extra fields returned by the Gov.br token endpoint.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct GovBrTokenFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
}
impl GovBrTokenFields {
    /// Raw (unverified) OpenID Connect ID token.
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }
}
impl ExtraTokenFields for GovBrTokenFields {}

/// Token response returned by the Gov.br token endpoint.
pub type GovBrTokenResponse = StandardTokenResponse<GovBrTokenFields, BasicTokenType>;

/// Authorization code flow against Gov.br.
pub type GovBrFlow = AuthorizationCodeFlow<GovBr>;

/// The Gov.br identity provider ("Login Único").
#[derive(Clone, Debug)]
pub struct GovBr {
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_uri: RedirectUrl,
    redirect_uri_logout: PostLogoutRedirectUrl,
    auth_type: AuthType,
    environment: Environment,
    endpoints: EndpointSet,
}
impl GovBr {
    /// Validates `options` and derives the endpoints of the selected environment.
    ///
    /// Fails with [`InvalidArgument::MissingOptions`] naming every required option that is
    /// missing or empty, or with [`InvalidArgument::InvalidUrl`] if a redirect URI is not an
    /// absolute URL.
    pub fn new(options: GovBrOptions) -> Result<Self, InvalidArgument> {
        options.assert_required()?;
        let environment = options.environment();

        let GovBrOptions {
            client_id,
            client_secret,
            redirect_uri,
            redirect_uri_logout,
            ..
        } = options;

        let redirect_uri = RedirectUrl::new(redirect_uri.unwrap_or_default()).map_err(|source| {
            InvalidArgument::InvalidUrl {
                option: "redirectUri",
                source,
            }
        })?;
        let redirect_uri_logout =
            PostLogoutRedirectUrl::new(redirect_uri_logout.unwrap_or_default()).map_err(
                |source| InvalidArgument::InvalidUrl {
                    option: "redirectUriLogout",
                    source,
                },
            )?;

        Ok(GovBr {
            client_id: ClientId::new(client_id.unwrap_or_default()),
            client_secret: ClientSecret::new(client_secret.unwrap_or_default()),
            redirect_uri,
            redirect_uri_logout,
            auth_type: AuthType::BasicAuth,
            environment,
            endpoints: EndpointSet::for_environment(environment),
        })
    }

    /// Configures how the client credentials are sent to the token endpoint. Defaults to
    /// [`AuthType::BasicAuth`].
    pub fn set_auth_type(mut self, auth_type: AuthType) -> Self {
        self.auth_type = auth_type;
        self
    }

    /// Overrides the derived endpoints, e.g. to point at a local test double.
    pub fn set_endpoints(mut self, endpoints: EndpointSet) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Environment the endpoints were derived from.
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Endpoints in use.
    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    /// Redirect URI registered for log out.
    pub fn redirect_uri_logout(&self) -> &PostLogoutRedirectUrl {
        &self.redirect_uri_logout
    }

    /// Wraps this provider in an authorization code flow that keeps its CSRF state under
    /// [`GOVBR_STATE_KEY`].
    pub fn into_flow(self) -> GovBrFlow {
        AuthorizationCodeFlow::new(self).set_state_key(GOVBR_STATE_KEY)
    }

    /// URL that logs the user out of Gov.br and then redirects to `redirectUriLogout`.
    ///
    /// The user's browser must follow this URL; it is not meant to be requested by the server.
    pub fn logout_url(&self) -> Url {
        LogoutRequest::from(self.endpoints.logout_url().clone())
            .set_post_logout_redirect_uri(self.redirect_uri_logout.clone())
            .http_get_url()
    }

    /// Creates a request for the companies linked to the CPF of `owner`, authenticated with the
    /// token the owner was fetched with.
    pub fn companies(
        &self,
        owner: &GovBrResourceOwner,
    ) -> Result<CompaniesRequest<'_>, InvalidArgument> {
        let cpf = owner.cpf().ok_or(InvalidArgument::EmptyCpf)?;
        self.companies_for(&cpf, owner.access_token().clone())
    }

    /// Creates a request for the companies linked to `cpf`.
    ///
    /// Fails with [`InvalidArgument::EmptyCpf`] before anything is sent if `cpf` is empty.
    pub fn companies_for(
        &self,
        cpf: &Cpf,
        access_token: AccessToken,
    ) -> Result<CompaniesRequest<'_>, InvalidArgument> {
        if cpf.is_empty() {
            return Err(InvalidArgument::EmptyCpf);
        }

        let mut url = self.endpoints.companies_url().url().to_owned();
        url.query_pairs_mut()
            .append_pair(COMPANIES_PARTICIPANT_PARAM, cpf);

        Ok(CompaniesRequest {
            provider: self,
            url,
            access_token,
        })
    }
}

impl Provider for GovBr {
    type TokenFields = GovBrTokenFields;
    type ResourceOwner = GovBrResourceOwner;

    fn client_id(&self) -> &ClientId {
        &self.client_id
    }
    fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }
    fn redirect_uri(&self) -> &RedirectUrl {
        &self.redirect_uri
    }
    fn auth_type(&self) -> &AuthType {
        &self.auth_type
    }

    fn authorization_url(&self) -> &AuthUrl {
        self.endpoints.authorize_url()
    }
    fn token_url(&self) -> &TokenUrl {
        self.endpoints.token_url()
    }
    fn user_info_url(&self, _access_token: &AccessToken) -> &UserInfoUrl {
        self.endpoints.user_info_url()
    }

    fn default_scopes(&self) -> Vec<Scope> {
        DEFAULT_SCOPES
            .iter()
            .map(|scope| Scope::new(scope.to_string()))
            .collect()
    }

    // Gov.br expects space-separated scopes.
    fn scope_separator(&self) -> &str {
        " "
    }

    fn authorization_nonce(&self) -> Option<Nonce> {
        Some(Nonce::new_random())
    }

    fn check_response(&self, response: &HttpResponse) -> Result<(), IdentityProviderError> {
        check_response(response)
    }

    fn create_resource_owner(
        &self,
        claims: Claims,
        token: GovBrTokenResponse,
    ) -> GovBrResourceOwner {
        GovBrResourceOwner::new(claims, token)
    }
}

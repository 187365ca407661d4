use crate::{CompaniesUrl, EndSessionUrl, InvalidArgument, UserInfoUrl};

use oauth2::{AuthUrl, TokenUrl};
use serde::{Deserialize, Serialize};

use std::env;
use std::fmt::{Debug, Formatter, Result as FormatterResult};


const DOMAIN_PRODUCTION: &str = "https://sso.acesso.gov.br";
const DOMAIN_STAGING: &str = "https://sso.staging.acesso.gov.br";
const DOMAIN_API_PRODUCTION: &str = "https://api.acesso.gov.br";
const DOMAIN_API_STAGING: &str = "https://api.staging.acesso.gov.br";

const AUTHORIZE_PATH: &str = "/authorize";
const TOKEN_PATH: &str = "/token";
const USER_INFO_PATH: &str = "/userinfo";
const LOGOUT_PATH: &str = "/logout";
const COMPANIES_PATH: &str = "/empresas/v2/empresas";

/// Gov.br deployment to authenticate against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    /// Homologation environment (`sso.staging.acesso.gov.br`).
    Staging,
    /// Production environment (`sso.acesso.gov.br`).
    #[default]
    Production,
}
impl Environment {
    /// Interprets the `clientEnv` option. Only `staging` selects the staging environment; any
    /// other value (or none at all) selects production.
    pub fn from_client_env(client_env: Option<&str>) -> Self {
        match client_env {
            Some("staging") => Environment::Staging,
            None | Some("production") => Environment::Production,
            Some(other) => {
                log::warn!(
                    "unrecognized clientEnv `{}`; falling back to production",
                    other
                );
                Environment::Production
            }
        }
    }

    /// Base URL of the single sign-on server.
    pub fn domain(self) -> &'static str {
        match self {
            Environment::Staging => DOMAIN_STAGING,
            Environment::Production => DOMAIN_PRODUCTION,
        }
    }

    /// Base URL of the Gov.br API server.
    pub fn api_domain(self) -> &'static str {
        match self {
            Environment::Staging => DOMAIN_API_STAGING,
            Environment::Production => DOMAIN_API_PRODUCTION,
        }
    }
}

/// Endpoint URLs derived from an [`Environment`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointSet {
    authorize_url: AuthUrl,
    token_url: TokenUrl,
    user_info_url: UserInfoUrl,
    logout_url: EndSessionUrl,
    companies_url: CompaniesUrl,
}
impl EndpointSet {
    /// Builds the endpoint URLs for the given environment.
    pub fn for_environment(environment: Environment) -> Self {
        let domain = environment.domain();
        let api_domain = environment.api_domain();
        log::debug!(
            "deriving Gov.br endpoints from {} (api {})",
            domain,
            api_domain
        );

        // The concatenated domains and paths are constants, so parsing cannot fail.
        EndpointSet {
            authorize_url: AuthUrl::new(format!("{}{}", domain, AUTHORIZE_PATH))
                .expect("authorize URL should be valid"),
            token_url: TokenUrl::new(format!("{}{}", domain, TOKEN_PATH))
                .expect("token URL should be valid"),
            user_info_url: UserInfoUrl::new(format!("{}{}", domain, USER_INFO_PATH))
                .expect("user info URL should be valid"),
            logout_url: EndSessionUrl::new(format!("{}{}", domain, LOGOUT_PATH))
                .expect("logout URL should be valid"),
            companies_url: CompaniesUrl::new(format!("{}{}", api_domain, COMPANIES_PATH))
                .expect("companies URL should be valid"),
        }
    }

    /// Replaces every endpoint, e.g. to point at a local test double.
    pub fn with_urls(
        authorize_url: AuthUrl,
        token_url: TokenUrl,
        user_info_url: UserInfoUrl,
        logout_url: EndSessionUrl,
        companies_url: CompaniesUrl,
    ) -> Self {
        EndpointSet {
            authorize_url,
            token_url,
            user_info_url,
            logout_url,
            companies_url,
        }
    }

    /// Authorization endpoint.
    pub fn authorize_url(&self) -> &AuthUrl {
        &self.authorize_url
    }
    /// Token endpoint.
    pub fn token_url(&self) -> &TokenUrl {
        &self.token_url
    }
    /// User info endpoint.
    pub fn user_info_url(&self) -> &UserInfoUrl {
        &self.user_info_url
    }
    /// End session endpoint.
    pub fn logout_url(&self) -> &EndSessionUrl {
        &self.logout_url
    }
    /// Linked companies API.
    pub fn companies_url(&self) -> &CompaniesUrl {
        &self.companies_url
    }
}

/// Options supplied by the host application, using the same keys Gov.br integrations
/// conventionally use (`clientEnv`, `clientId`, `clientSecret`, `redirectUri`,
/// `redirectUriLogout`).
#[derive(Clone, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovBrOptions {
    /// `staging` or `production` (default).
    pub client_env: Option<String>,
    /// Client identifier issued by Gov.br.
    pub client_id: Option<String>,
    /// Client secret issued by Gov.br.
    pub client_secret: Option<String>,
    /// Redirect URI registered for log in.
    pub redirect_uri: Option<String>,
    /// Redirect URI registered for log out.
    pub redirect_uri_logout: Option<String>,
}
impl Debug for GovBrOptions {
    fn fmt(&self, f: &mut Formatter) -> FormatterResult {
        f.debug_struct("GovBrOptions")
            .field("client_env", &self.client_env)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[redacted]"))
            .field("redirect_uri", &self.redirect_uri)
            .field("redirect_uri_logout", &self.redirect_uri_logout)
            .finish()
    }
}
impl GovBrOptions {
    /// Reads the options from `GOVBR_CLIENT_ENV`, `GOVBR_CLIENT_ID`, `GOVBR_CLIENT_SECRET`,
    /// `GOVBR_REDIRECT_URI` and `GOVBR_REDIRECT_URI_LOGOUT`.
    pub fn from_env() -> Self {
        GovBrOptions {
            client_env: env::var("GOVBR_CLIENT_ENV").ok(),
            client_id: env::var("GOVBR_CLIENT_ID").ok(),
            client_secret: env::var("GOVBR_CLIENT_SECRET").ok(),
            redirect_uri: env::var("GOVBR_REDIRECT_URI").ok(),
            redirect_uri_logout: env::var("GOVBR_REDIRECT_URI_LOGOUT").ok(),
        }
    }

    /// Selected environment.
    pub fn environment(&self) -> Environment {
        Environment::from_client_env(self.client_env.as_deref())
    }

    /// Fails with every required option that is missing or empty, in declaration order.
    pub(crate) fn assert_required(&self) -> Result<(), InvalidArgument> {
        let required = [
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("redirectUri", &self.redirect_uri),
            ("redirectUriLogout", &self.redirect_uri_logout),
        ];
        let missing = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(InvalidArgument::MissingOptions(missing))
        }
    }
}

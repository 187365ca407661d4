#![warn(missing_docs)]
#![allow(clippy::type_complexity)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! [OAuth2](https://tools.ietf.org/html/rfc6749) / [OpenID Connect](https://openid.net/specs/openid-connect-core-1_0.html)
//! client for [Gov.br](https://www.gov.br), the Brazilian federal government's single sign-on
//! ("Login Único").
//!
//! This library authenticates Brazilian citizens through the authorization code flow, projects
//! the returned claims into a [`GovBrResourceOwner`], looks up the legal entities linked to a
//! citizen's CPF, and builds the URL that logs the citizen out of Gov.br.
//!
//! # Contents
//!  * [Configuration](#configuration)
//!  * [Importing `govbr-oauth2`: selecting an HTTP client interface](#importing-govbr-oauth2-selecting-an-http-client-interface)
//!  * [Authorization code flow](#authorization-code-flow)
//!  * [Errors](#errors)
//!
//! # Configuration
//!
//! A [`GovBr`] provider is created from [`GovBrOptions`], which use the option names Gov.br
//! integrations conventionally use (`clientEnv`, `clientId`, `clientSecret`, `redirectUri` and
//! `redirectUriLogout`) and may also be read from `GOVBR_*` environment variables through
//! [`GovBrOptions::from_env`]. Every option except `clientEnv` is required. The `clientEnv`
//! option selects the staging environment when set to `staging`, and production otherwise.
//!
//! # Importing `govbr-oauth2`: selecting an HTTP client interface
//!
//! This library offers a flexible HTTP client interface with two modes:
//!  * **Synchronous (blocking)**
//!
//!    Requests are sent with `request()` and any type implementing [`SyncHttpClient`].
//!  * **Asynchronous**
//!
//!    Requests are sent with `request_async()` and any type implementing [`AsyncHttpClient`].
//!
//! For the HTTP client modes described above, the following HTTP client implementations can be
//! used:
//!  * **[`reqwest`](reqwest)**
//!
//!    The `reqwest` HTTP client supports both the synchronous and asynchronous modes and is enabled
//!    by default via the `reqwest` feature flag (the `reqwest-blocking` feature flag enables its
//!    blocking client).
//!  * **[`curl`](curl)**
//!
//!    The `curl` HTTP client only supports the synchronous HTTP client mode and can be enabled in
//!    `Cargo.toml` via the `curl` feature flag.
//!  * **[`ureq`](ureq)**
//!
//!    The `ureq` HTTP client is a simple HTTP client with minimal dependencies. It only supports
//!    the synchronous HTTP client mode and can be enabled in `Cargo.toml` via the `ureq` feature
//!    flag.
//!  * **Custom**
//!
//!    In addition to the clients above, users may define their own HTTP clients, which must accept
//!    an [`HttpRequest`] and return an [`HttpResponse`] or error. Closures of the form
//!    `Fn(HttpRequest) -> Result<HttpResponse, E>` implement [`SyncHttpClient`] out of the box.
//!
//! # Authorization code flow
//!
//! The flow is driven by a [`GovBrFlow`] and a [`SessionStore`] belonging to the user being
//! authenticated:
//!
//! ```rust,no_run
//! use govbr_oauth2::{CallbackOutcome, CallbackParams, GovBr, GovBrOptions, MemorySessionStore};
//! use url::Url;
//!
//! # #[cfg(feature = "reqwest-blocking")]
//! # fn err_wrapper() -> Result<(), anyhow::Error> {
//! let flow = GovBr::new(GovBrOptions {
//!     client_env: Some("staging".to_string()),
//!     client_id: Some("client_id".to_string()),
//!     client_secret: Some("client_secret".to_string()),
//!     redirect_uri: Some("https://app.example/login".to_string()),
//!     redirect_uri_logout: Some("https://app.example/logout".to_string()),
//! })?
//! .into_flow();
//!
//! let session = MemorySessionStore::new();
//!
//! // Redirect the user's browser to `authorize_url`.
//! let (authorize_url, _csrf_state, _nonce) = flow.initiate(&session);
//! println!("Browse to: {}", authorize_url);
//!
//! // Gov.br redirects back to `redirectUri` with a `code` and a `state`.
//! let redirect = Url::parse("https://app.example/login?code=some+code&state=some+state")?;
//!
//! let http_client = reqwest::blocking::ClientBuilder::new()
//!     // Following redirects opens the client up to SSRF vulnerabilities.
//!     .redirect(reqwest::redirect::Policy::none())
//!     .build()?;
//!
//! match flow.validate_callback(&session, &CallbackParams::from_url(&redirect)) {
//!     CallbackOutcome::NotAuthenticated => { /* initiate the flow */ }
//!     CallbackOutcome::Rejected(rejection) => {
//!         println!("Invalid state ({:?}); start over", rejection);
//!     }
//!     CallbackOutcome::Authorized(code) => {
//!         let owner = flow.authenticate(code).request(&http_client)?;
//!         println!("Logged in as {:?}", owner.name());
//!
//!         for company in flow.provider().companies(&owner)?.request(&http_client)? {
//!             println!("Linked to {:?}", company.razao_social());
//!         }
//!
//!         // Redirect the user's browser here to log out of Gov.br.
//!         println!("Log out at: {}", flow.provider().logout_url());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Configuration problems are reported as [`InvalidArgument`] when the provider is created.
//! Any response from Gov.br that carries an HTTP status of 400 or above, or a non-empty `error`
//! field, is converted into an [`IdentityProviderError`] carrying a message, a numeric code and
//! the raw response body. Network requests fail with a [`RequestError`].

#[macro_use]
mod macros;

mod authorization;
mod callback;
mod companies;
mod config;
mod error;
mod flow;
mod govbr;
pub(crate) mod http_utils;
mod logout;
mod provider;
mod resource_owner;
mod session;
mod token;
mod types;
mod user_info;

pub use oauth2::basic::BasicTokenType;
pub use oauth2::{
    AccessToken, AsyncHttpClient, AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret,
    CsrfToken, ExtraTokenFields, HttpRequest, HttpResponse, PkceCodeChallenge,
    PkceCodeChallengeMethod, PkceCodeVerifier, RedirectUrl, Scope, StandardTokenResponse,
    SyncHttpClient, TokenResponse, TokenUrl,
};

#[cfg(all(feature = "curl", not(target_arch = "wasm32")))]
pub use oauth2::{curl, CurlHttpClient};

#[cfg(feature = "reqwest")]
pub use oauth2::reqwest;

#[cfg(feature = "ureq")]
pub use oauth2::ureq;

pub use crate::authorization::AuthorizationRequest;
pub use crate::callback::{CallbackOutcome, CallbackParams, StateRejection};
pub use crate::companies::{CompaniesRequest, Company};
pub use crate::config::{EndpointSet, Environment, GovBrOptions};
pub use crate::error::{check_response, IdentityProviderError, InvalidArgument, RequestError};
pub use crate::flow::{AuthorizationCodeFlow, DEFAULT_STATE_KEY};
pub use crate::govbr::{
    GovBr, GovBrFlow, GovBrTokenFields, GovBrTokenResponse, DEFAULT_SCOPES, GOVBR_STATE_KEY,
};
pub use crate::logout::LogoutRequest;
pub use crate::provider::{Provider, ProviderTokenResponse};
pub use crate::resource_owner::{Claims, GovBrResourceOwner};
pub use crate::session::{MemorySessionStore, SessionStore};
pub use crate::token::CodeTokenRequest;
pub use crate::types::{
    AuthenticationMethodReference, Cnpj, CompaniesUrl, Cpf, EndSessionUrl, EndUserEmail,
    EndUserName, EndUserPhoneNumber, EndUserPictureUrl, Nonce, PostLogoutRedirectUrl,
    SubjectIdentifier, UserInfoUrl,
};
pub use crate::user_info::{AuthenticateRequest, UserInfoRequest};

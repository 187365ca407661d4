use crate::{EndSessionUrl, PostLogoutRedirectUrl};

use url::Url;

/// A request to the end session endpoint.
///
/// The resulting URL is meant to be followed by the user's browser (through a `GET` or `POST`),
/// not requested by the server.
pub struct LogoutRequest {
    end_session_endpoint: EndSessionUrl,
    post_logout_redirect_uri: Option<PostLogoutRedirectUrl>,
}

impl From<EndSessionUrl> for LogoutRequest {
    fn from(value: EndSessionUrl) -> Self {
        LogoutRequest {
            end_session_endpoint: value,
            post_logout_redirect_uri: None,
        }
    }
}

impl LogoutRequest {
    /// Provides the identity provider with a URI to redirect to after the logout has been
    /// performed.
    pub fn set_post_logout_redirect_uri(mut self, redirect_uri: PostLogoutRedirectUrl) -> Self {
        self.post_logout_redirect_uri = Some(redirect_uri);
        self
    }

    /// Returns the full logout URL.
    pub fn http_get_url(self) -> Url {
        let mut url = self.end_session_endpoint.url().to_owned();
        if let Some(post_logout_redirect_uri) = self.post_logout_redirect_uri {
            url.query_pairs_mut()
                .append_pair("post_logout_redirect_uri", post_logout_redirect_uri.as_str());
        }
        url
    }
}

use crate::{
    AccessToken, AuthenticationMethodReference, Cnpj, Cpf, EndUserEmail, EndUserName,
    EndUserPhoneNumber, EndUserPictureUrl, GovBrTokenResponse, SubjectIdentifier, TokenResponse,
};

use serde_json::Value;

/// Raw claims returned by the user info endpoint, keyed by claim name.
pub type Claims = serde_json::Map<String, Value>;

/// A user authenticated through Gov.br.
///
/// Every accessor is a total lookup: a claim that is absent (or of an unexpected type) is
/// reported as `None`, or `false` for the verification flags. No claim is required to be present.
///
/// See the [attribute reference](https://manual-roteiro-integracao-login-unico.servicos.gov.br/pt/stable/iniciarintegracao.html#passo-9)
/// for the claims Gov.br may return.
#[derive(Clone, Debug)]
pub struct GovBrResourceOwner {
    claims: Claims,
    token: GovBrTokenResponse,
}
impl GovBrResourceOwner {
    /// Wraps the claims fetched with `token`.
    pub fn new(claims: Claims, token: GovBrTokenResponse) -> Self {
        GovBrResourceOwner { claims, token }
    }

    /// Subject identifier (`sub`).
    pub fn id(&self) -> Option<SubjectIdentifier> {
        self.string_claim("sub").map(SubjectIdentifier::new)
    }

    /// CPF of the user. Gov.br uses the CPF as the subject identifier.
    pub fn cpf(&self) -> Option<Cpf> {
        self.string_claim("sub").map(Cpf::new)
    }

    /// Full name registered with Gov.br.
    pub fn name(&self) -> Option<EndUserName> {
        self.string_claim("name").map(EndUserName::new)
    }

    /// E-mail address.
    pub fn email(&self) -> Option<EndUserEmail> {
        self.string_claim("email").map(EndUserEmail::new)
    }

    /// Whether Gov.br has verified the e-mail address.
    pub fn email_verified(&self) -> bool {
        self.bool_claim("email_verified")
    }

    /// Phone number.
    pub fn phone_number(&self) -> Option<EndUserPhoneNumber> {
        self.string_claim("phone_number").map(EndUserPhoneNumber::new)
    }

    /// Whether Gov.br has verified the phone number.
    pub fn phone_number_verified(&self) -> bool {
        self.bool_claim("phone_number_verified")
    }

    /// URL of the profile picture. Fetching it requires the access token.
    pub fn avatar_url(&self) -> Option<EndUserPictureUrl> {
        self.string_claim("picture").map(EndUserPictureUrl::new)
    }

    /// Authentication factors used to log in (`amr`).
    ///
    /// Values include `app` (QR code through the Gov.br app), `passwd`, `x509` (digital
    /// certificate) and `bank` followed by the bank's clearing code.
    pub fn amr(&self) -> Option<Vec<AuthenticationMethodReference>> {
        match self.claims.get("amr")? {
            Value::Array(values) => Some(
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|amr| AuthenticationMethodReference::new(amr.to_string()))
                    .collect(),
            ),
            Value::String(amr) => Some(vec![AuthenticationMethodReference::new(amr.clone())]),
            _ => None,
        }
    }

    /// CNPJ linked to the user. Only present when the user authenticated with a company's
    /// digital certificate.
    pub fn cnpj(&self) -> Option<Cnpj> {
        self.string_claim("cnpj").map(Cnpj::new)
    }

    /// Value of an arbitrary claim.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// All claims, as returned by the provider.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// All claims plus a `cpf` entry holding the subject identifier.
    pub fn to_map(&self) -> Claims {
        let mut claims = self.claims.clone();
        let cpf = self.cpf().map_or(Value::Null, |cpf| Value::String(cpf.into()));
        claims.insert("cpf".to_string(), cpf);
        claims
    }

    /// Token response the claims were fetched with.
    pub fn token(&self) -> &GovBrTokenResponse {
        &self.token
    }

    /// Access token the claims were fetched with.
    pub fn access_token(&self) -> &AccessToken {
        self.token.access_token()
    }

    fn string_claim(&self, name: &str) -> Option<String> {
        match self.claims.get(name)? {
            Value::String(value) => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    fn bool_claim(&self, name: &str) -> bool {
        match self.claims.get(name) {
            Some(Value::Bool(value)) => *value,
            Some(Value::Number(value)) => value.as_f64().map_or(false, |value| value != 0.0),
            #[cfg(feature = "accept-string-booleans")]
            Some(Value::String(value)) => value.parse().unwrap_or(false),
            _ => false,
        }
    }
}

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};


new_type![
    /// Identifier for an authentication method (e.g., `passwd`, `app`, `x509` or `bank`).
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    AuthenticationMethodReference(String)
];

new_type![
    /// Cadastro Nacional da Pessoa Jurídica: the Brazilian business taxpayer identifier.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    Cnpj(String)
];

new_type![
    /// Cadastro de Pessoas Físicas: the Brazilian individual taxpayer identifier.
    ///
    /// Gov.br uses the CPF as the `sub` claim of every authenticated user.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    Cpf(String)
];

new_type![
    /// End-User's e-mail address.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    EndUserEmail(String)
];

new_type![
    /// End-User's full name in displayable form.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    EndUserName(String)
];

new_type![
    /// End-User's telephone number.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    EndUserPhoneNumber(String)
];

new_type![
    /// URL of the End-User's profile picture.
    ///
    /// The picture is protected and must be fetched with the user's access token.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    EndUserPictureUrl(String)
];

new_type![
    /// Locally unique and never reassigned identifier for the End-User.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    SubjectIdentifier(String)
];

new_type![
    /// String value used to associate a client session with an ID Token, and to mitigate replay
    /// attacks.
    #[derive(Deserialize, Hash, Serialize)]
    Nonce(String)
    impl {
        /// Generate a new random, base64-encoded 128-bit nonce.
        pub fn new_random() -> Self {
            Nonce::new_random_len(16)
        }
        /// Generate a new random, base64-encoded nonce of the specified length.
        ///
        /// # Arguments
        ///
        /// * `num_bytes` - Number of random bytes to generate, prior to base64-encoding.
        pub fn new_random_len(num_bytes: u32) -> Self {
            let random_bytes: Vec<u8> = (0..num_bytes).map(|_| thread_rng().gen::<u8>()).collect();
            Nonce::new(BASE64_URL_SAFE_NO_PAD.encode(random_bytes))
        }
        /// Return the nonce as a string slice.
        pub fn secret(&self) -> &str {
            &self.0
        }
    }
];

new_url_type![
    /// URL of the Gov.br API listing the legal entities linked to an individual.
    CompaniesUrl
];

new_url_type![
    /// URL of the end session (logout) endpoint.
    EndSessionUrl
];

new_url_type![
    /// URL of the user info endpoint.
    UserInfoUrl
];

new_url_type![
    /// URL to which the user is redirected after logging out.
    PostLogoutRedirectUrl
];

use crate::http_utils::bearer_get_request;
use crate::{
    AccessToken, AsyncHttpClient, Cnpj, GovBr, HttpRequest, HttpResponse, Provider, RequestError,
    SyncHttpClient,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use url::Url;

use std::future::Future;

const LINKED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A legal entity linked to an individual's CPF.
///
/// Only the documented fields are typed; anything else the API returns is preserved in
/// [`additional_fields`](Self::additional_fields).
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Company {
    cnpj: Option<Cnpj>,
    #[serde(rename = "razaoSocial")]
    razao_social: Option<String>,
    #[serde(rename = "dataCriacao")]
    data_criacao: Option<String>,
    #[serde(flatten)]
    additional_fields: serde_json::Map<String, Value>,
}
impl Company {
    /// CNPJ of the company.
    pub fn cnpj(&self) -> Option<&Cnpj> {
        self.cnpj.as_ref()
    }

    /// Legal name registered with the Receita Federal.
    pub fn razao_social(&self) -> Option<&str> {
        self.razao_social.as_deref()
    }

    /// When the CNPJ was linked to the user's account, as sent by the API
    /// (`YYYY-MM-DD HH:MM:SS`).
    pub fn data_criacao(&self) -> Option<&str> {
        self.data_criacao.as_deref()
    }

    /// [`data_criacao`](Self::data_criacao) parsed as a local date and time, if well formed.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.data_criacao
            .as_deref()
            .and_then(|value| NaiveDateTime::parse_from_str(value, LINKED_AT_FORMAT).ok())
    }

    /// Fields returned by the API beyond the documented ones.
    pub fn additional_fields(&self) -> &serde_json::Map<String, Value> {
        &self.additional_fields
    }
}

/// A request for the companies linked to a CPF.
///
/// Created by [`GovBr::companies`] or [`GovBr::companies_for`].
pub struct CompaniesRequest<'a> {
    pub(crate) provider: &'a GovBr,
    pub(crate) url: Url,
    pub(crate) access_token: AccessToken,
}
impl<'a> CompaniesRequest<'a> {
    /// Full URL the request is sent to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn prepare_request(&self) -> Result<HttpRequest, http::Error> {
        log::debug!("fetching linked companies from {}", self.url.path());
        bearer_get_request(&self.url, &self.access_token)
    }

    fn companies_response<RE>(
        provider: &GovBr,
        http_response: HttpResponse,
    ) -> Result<Vec<Company>, RequestError<RE>>
    where
        RE: std::error::Error + 'static,
    {
        provider.check_response(&http_response)?;

        serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(
            http_response.body(),
        ))
        .map_err(|err| RequestError::Parse(err, http_response.body().to_owned()))
    }

    /// Synchronously fetches the linked companies.
    pub fn request<C>(
        self,
        http_client: &C,
    ) -> Result<Vec<Company>, RequestError<<C as SyncHttpClient>::Error>>
    where
        C: SyncHttpClient,
    {
        let http_request = self
            .prepare_request()
            .map_err(|err| RequestError::Other(format!("failed to prepare request: {err}")))?;
        let http_response = http_client
            .call(http_request)
            .map_err(RequestError::Request)?;
        Self::companies_response(self.provider, http_response)
    }

    /// Asynchronously fetches the linked companies.
    pub fn request_async<'c, C>(
        self,
        http_client: &'c C,
    ) -> impl Future<Output = Result<Vec<Company>, RequestError<<C as AsyncHttpClient<'c>>::Error>>>
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
            Self::companies_response(self.provider, http_response)
        })
    }
}

#![allow(dead_code)]

use govbr_oauth2::{HttpRequest, HttpResponse};

use http::status::StatusCode;
use thiserror::Error;
use url::form_urlencoded;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Once;

static INIT_LOG: Once = Once::new();

pub fn init_log() {
    INIT_LOG.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[derive(Debug, Error)]
#[error("no route for {0}")]
pub struct FakeError(pub String);

pub fn json_response(status: StatusCode, body: serde_json::Value) -> HttpResponse {
    http::Response::builder()
        .status(status)
        .body(body.to_string().into_bytes())
        .unwrap()
}

pub fn form_params(request: &HttpRequest) -> HashMap<String, String> {
    form_urlencoded::parse(request.body()).into_owned().collect()
}

/// Canned Gov.br endpoints keyed by `METHOD path`, recording every request they receive.
#[derive(Default)]
pub struct FakeGovBr {
    routes: HashMap<String, HttpResponse>,
    requests: RefCell<Vec<HttpRequest>>,
}
impl FakeGovBr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, method: &str, path: &str, response: HttpResponse) -> Self {
        self.routes.insert(format!("{} {}", method, path), response);
        self
    }

    pub fn call(&self, request: HttpRequest) -> Result<HttpResponse, FakeError> {
        let key = format!("{} {}", request.method(), request.uri().path());
        let response = self.routes.get(&key).map(|response| {
            let mut builder = http::Response::builder().status(response.status());
            for (name, value) in response.headers() {
                builder = builder.header(name, value);
            }
            builder.body(response.body().clone()).unwrap()
        });
        self.requests.borrow_mut().push(request);
        response.ok_or(FakeError(key))
    }

    pub fn requests(&self) -> std::cell::Ref<'_, Vec<HttpRequest>> {
        self.requests.borrow()
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| format!("{} {}", request.method(), request.uri()))
            .collect()
    }
}

use govbr_oauth2::{
    check_response, AccessToken, AuthUrl, AuthorizationCode, CallbackOutcome, CallbackParams,
    CompaniesUrl, Cpf, EndSessionUrl, EndpointSet, GovBr, GovBrOptions, HttpRequest,
    HttpResponse, InvalidArgument, MemorySessionStore, RequestError, SessionStore,
    StateRejection, TokenUrl, UserInfoUrl, GOVBR_STATE_KEY,
};

use http::header::AUTHORIZATION;
use http::status::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;

mod common;

use common::{form_params, init_log, json_response, FakeGovBr};

fn options(client_env: Option<&str>) -> GovBrOptions {
    GovBrOptions {
        client_env: client_env.map(str::to_string),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        redirect_uri: Some("https://app.example/callback".to_string()),
        redirect_uri_logout: Some("https://app.example/bye".to_string()),
    }
}

fn fake_govbr() -> FakeGovBr {
    FakeGovBr::new()
        .route(
            "POST",
            "/token",
            json_response(
                StatusCode::OK,
                json!({
                    "access_token": "access-123",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                    "id_token": "header.payload.signature"
                }),
            ),
        )
        .route(
            "GET",
            "/userinfo",
            json_response(
                StatusCode::OK,
                json!({
                    "sub": "12345678909",
                    "name": "Ana Maria",
                    "email": "ana@example.com",
                    "email_verified": true,
                    "amr": ["passwd"]
                }),
            ),
        )
        .route(
            "GET",
            "/empresas/v2/empresas",
            json_response(
                StatusCode::OK,
                json!([{
                    "cnpj": "11222333000181",
                    "razaoSocial": "EMPRESA EXEMPLO LTDA",
                    "dataCriacao": "2021-03-04 10:20:30"
                }]),
            ),
        )
}

#[test]
fn test_full_flow() {
    init_log();

    let flow = GovBr::new(options(Some("staging"))).unwrap().into_flow();
    let session = MemorySessionStore::new();
    let fake = fake_govbr();
    let http_client = |request: HttpRequest| fake.call(request);

    // Initiate: no network, state recorded in the session.
    let (authorize_url, state, _nonce) = flow.initiate(&session);
    assert!(fake.requests().is_empty());
    assert_eq!(Some(state.secret().to_string()), session.get(GOVBR_STATE_KEY));
    assert!(authorize_url
        .as_str()
        .starts_with("https://sso.staging.acesso.gov.br/authorize?response_type=code&client_id=client-id&"));

    // Gov.br echoes the state back unchanged.
    let mut redirect = Url::parse("https://app.example/callback").unwrap();
    redirect
        .query_pairs_mut()
        .append_pair("code", "auth-code")
        .append_pair("state", state.secret());
    let code = match flow.validate_callback(&session, &CallbackParams::from_url(&redirect)) {
        CallbackOutcome::Authorized(code) => code,
        other => panic!("unexpected outcome: {:?}", other),
    };

    let owner = flow.authenticate(code).request(&http_client).unwrap();
    assert_eq!("12345678909", owner.cpf().unwrap().as_str());
    assert_eq!("Ana Maria", owner.name().unwrap().as_str());
    assert!(owner.email_verified());
    assert!(!owner.phone_number_verified());
    assert_eq!(
        json!("12345678909"),
        owner.to_map().get("cpf").cloned().unwrap()
    );

    let companies = flow
        .provider()
        .companies(&owner)
        .unwrap()
        .request(&http_client)
        .unwrap();
    assert_eq!(1, companies.len());
    assert_eq!(
        "11222333000181",
        companies[0].cnpj().unwrap().as_str()
    );

    assert_eq!(
        vec![
            "POST https://sso.staging.acesso.gov.br/token".to_string(),
            "GET https://sso.staging.acesso.gov.br/userinfo".to_string(),
            "GET https://api.staging.acesso.gov.br/empresas/v2/empresas?filtrar-por-participante=12345678909"
                .to_string(),
        ],
        fake.request_lines()
    );
    {
        let requests = fake.requests();
        let token_params = form_params(&requests[0]);
        assert_eq!("authorization_code", token_params["grant_type"]);
        assert_eq!("auth-code", token_params["code"]);
        for request in &requests[1..] {
            assert_eq!(
                "Bearer access-123",
                request.headers()[AUTHORIZATION].to_str().unwrap()
            );
        }
    }

    assert_eq!(
        "https://sso.staging.acesso.gov.br/logout?post_logout_redirect_uri=https%3A%2F%2Fapp.example%2Fbye",
        flow.provider().logout_url().as_str()
    );
}

#[test]
fn test_tampered_state_makes_no_network_call() {
    init_log();

    let flow = GovBr::new(options(None)).unwrap().into_flow();
    let session = MemorySessionStore::new();
    let fake = fake_govbr();

    let (_, state, _) = flow.initiate(&session);
    let mut tampered = state.secret().to_string();
    tampered.insert(0, 'x');

    let outcome = flow.validate_callback(
        &session,
        &CallbackParams::new(Some("auth-code".to_string()), Some(tampered)),
    );
    assert!(matches!(
        outcome,
        CallbackOutcome::Rejected(StateRejection::Mismatch)
    ));
    assert_eq!(None, session.get(GOVBR_STATE_KEY));
    assert!(fake.requests().is_empty());

    // Without a code the caller is told to initiate the flow.
    assert!(matches!(
        flow.validate_callback(&session, &CallbackParams::from_query("")),
        CallbackOutcome::NotAuthenticated
    ));
}

#[test]
fn test_missing_options() {
    for (options, expected) in [
        (
            GovBrOptions::default(),
            vec!["clientId", "clientSecret", "redirectUri", "redirectUriLogout"],
        ),
        (
            GovBrOptions {
                client_secret: None,
                ..options(Some("staging"))
            },
            vec!["clientSecret"],
        ),
        (
            GovBrOptions {
                client_id: Some(String::new()),
                redirect_uri_logout: Some(String::new()),
                ..options(None)
            },
            vec!["clientId", "redirectUriLogout"],
        ),
    ] {
        match GovBr::new(options) {
            Err(InvalidArgument::MissingOptions(missing)) => assert_eq!(expected, missing),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}

#[test]
fn test_endpoints_per_environment() {
    for (client_env, sso, api) in [
        (
            Some("staging"),
            "https://sso.staging.acesso.gov.br",
            "https://api.staging.acesso.gov.br",
        ),
        (Some("production"), "https://sso.acesso.gov.br", "https://api.acesso.gov.br"),
        (None, "https://sso.acesso.gov.br", "https://api.acesso.gov.br"),
    ] {
        let govbr = GovBr::new(options(client_env)).unwrap();
        let endpoints = govbr.endpoints();
        assert_eq!(format!("{}/authorize", sso), endpoints.authorize_url().as_str());
        assert_eq!(format!("{}/token", sso), endpoints.token_url().as_str());
        assert_eq!(format!("{}/userinfo", sso), endpoints.user_info_url().as_str());
        assert_eq!(format!("{}/logout", sso), endpoints.logout_url().as_str());
        assert_eq!(
            format!("{}/empresas/v2/empresas", api),
            endpoints.companies_url().as_str()
        );
    }
}

#[test]
fn test_error_classifier() {
    let unauthorized = http::Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .body(br#"{"error":"invalid_token"}"#.to_vec())
        .unwrap();
    let err = check_response(&unauthorized).unwrap_err();
    assert_eq!("Unauthorized", err.message());
    assert_eq!(br#"{"error":"invalid_token"}"#.to_vec(), err.body().to_vec());

    let ok = http::Response::builder()
        .status(StatusCode::OK)
        .body(br#"{"sub":"123"}"#.to_vec())
        .unwrap();
    check_response(&ok).unwrap();
}

#[test]
fn test_userinfo_rejected() {
    init_log();

    let flow = GovBr::new(options(None)).unwrap().into_flow();
    let fake = fake_govbr().route(
        "GET",
        "/userinfo",
        json_response(StatusCode::UNAUTHORIZED, json!({"error": "invalid_token"})),
    );

    let err = flow
        .authenticate(AuthorizationCode::new("auth-code".to_string()))
        .request(&|request: HttpRequest| fake.call(request))
        .unwrap_err();

    match err {
        RequestError::IdentityProvider(err) => {
            assert_eq!(StatusCode::UNAUTHORIZED, err.status());
            assert_eq!(1, err.code());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(2, fake.requests().len());
}

#[test]
fn test_companies_with_empty_cpf_sends_nothing() {
    let govbr = GovBr::new(options(None)).unwrap();
    let fake = FakeGovBr::new();

    let result = govbr.companies_for(
        &Cpf::new(String::new()),
        AccessToken::new("access-123".to_string()),
    );
    assert!(matches!(result, Err(InvalidArgument::EmptyCpf)));
    assert!(fake.requests().is_empty());

    // A transport failure surfaces unchanged.
    let err = govbr
        .companies_for(
            &Cpf::new("12345678909".to_string()),
            AccessToken::new("access-123".to_string()),
        )
        .unwrap()
        .request(&|request: HttpRequest| -> Result<HttpResponse, common::FakeError> {
            fake.call(request)
        })
        .unwrap_err();
    assert!(matches!(err, RequestError::Request(_)));
    assert_eq!(1, fake.requests().len());
}

#[test]
fn test_custom_endpoints() {
    init_log();

    let endpoints = EndpointSet::with_urls(
        AuthUrl::new("http://127.0.0.1:9000/authorize".to_string()).unwrap(),
        TokenUrl::new("http://127.0.0.1:9000/token".to_string()).unwrap(),
        UserInfoUrl::new("http://127.0.0.1:9000/userinfo".to_string()).unwrap(),
        EndSessionUrl::new("http://127.0.0.1:9000/logout".to_string()).unwrap(),
        CompaniesUrl::new("http://127.0.0.1:9001/empresas/v2/empresas".to_string()).unwrap(),
    );
    let flow = GovBr::new(options(Some("staging")))
        .unwrap()
        .set_endpoints(endpoints)
        .into_flow();
    let session = MemorySessionStore::new();
    let fake = fake_govbr();
    let http_client = |request: HttpRequest| fake.call(request);

    let (authorize_url, _, _) = flow.initiate(&session);
    assert!(authorize_url
        .as_str()
        .starts_with("http://127.0.0.1:9000/authorize?response_type=code&"));

    let owner = flow
        .authenticate(AuthorizationCode::new("auth-code".to_string()))
        .request(&http_client)
        .unwrap();
    flow.provider()
        .companies(&owner)
        .unwrap()
        .request(&http_client)
        .unwrap();

    assert_eq!(
        vec![
            "POST http://127.0.0.1:9000/token".to_string(),
            "GET http://127.0.0.1:9000/userinfo".to_string(),
            "GET http://127.0.0.1:9001/empresas/v2/empresas?filtrar-por-participante=12345678909"
                .to_string(),
        ],
        fake.request_lines()
    );
    assert_eq!(
        "http://127.0.0.1:9000/logout?post_logout_redirect_uri=https%3A%2F%2Fapp.example%2Fbye",
        flow.provider().logout_url().as_str()
    );
}

#[tokio::test]
async fn test_full_flow_async() {
    init_log();

    let flow = GovBr::new(options(Some("staging"))).unwrap().into_flow();
    let fake = fake_govbr();
    let http_client = |request: HttpRequest| {
        let response = fake.call(request);
        async move { response }
    };

    let owner = flow
        .authenticate(AuthorizationCode::new("auth-code".to_string()))
        .request_async(&http_client)
        .await
        .unwrap();
    assert_eq!("12345678909", owner.cpf().unwrap().as_str());
    assert_eq!("access-123", owner.access_token().secret().as_str());

    let companies = flow
        .provider()
        .companies(&owner)
        .unwrap()
        .request_async(&http_client)
        .await
        .unwrap();
    assert_eq!(1, companies.len());
    assert_eq!(
        "11222333000181",
        companies[0].cnpj().unwrap().as_str()
    );

    assert_eq!(
        vec![
            "POST https://sso.staging.acesso.gov.br/token".to_string(),
            "GET https://sso.staging.acesso.gov.br/userinfo".to_string(),
            "GET https://api.staging.acesso.gov.br/empresas/v2/empresas?filtrar-por-participante=12345678909"
                .to_string(),
        ],
        fake.request_lines()
    );
}

#[tokio::test]
async fn test_provider_errors_async() {
    init_log();

    let flow = GovBr::new(options(None)).unwrap().into_flow();
    let fake = fake_govbr()
        .route(
            "POST",
            "/token",
            json_response(
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid_grant", "error_description": "Code already used"}),
            ),
        )
        .route(
            "GET",
            "/empresas/v2/empresas",
            json_response(
                StatusCode::FORBIDDEN,
                json!({"error": "403", "error_description": "Acesso negado"}),
            ),
        );
    let http_client = |request: HttpRequest| {
        let response = fake.call(request);
        async move { response }
    };

    let err = flow
        .authenticate(AuthorizationCode::new("reused-code".to_string()))
        .request_async(&http_client)
        .await
        .unwrap_err();
    match err {
        RequestError::IdentityProvider(err) => {
            assert_eq!("Code already used", err.message());
            assert_eq!(1, err.code());
            assert_eq!(StatusCode::BAD_REQUEST, err.status());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    // The user info endpoint is never reached.
    assert_eq!(1, fake.requests().len());

    let err = flow
        .provider()
        .companies_for(
            &Cpf::new("12345678909".to_string()),
            AccessToken::new("expired".to_string()),
        )
        .unwrap()
        .request_async(&http_client)
        .await
        .unwrap_err();
    match err {
        RequestError::IdentityProvider(err) => {
            assert_eq!("Acesso negado", err.message());
            assert_eq!(403, err.code());
            assert_eq!(StatusCode::FORBIDDEN, err.status());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(2, fake.requests().len());
}

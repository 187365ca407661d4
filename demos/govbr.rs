//!
//! This example showcases the process of integrating with the
//! [Gov.br](https://manual-roteiro-integracao-login-unico.servicos.gov.br/) single sign-on.
//!
//! Before running it, you'll need a client registered with Gov.br whose redirect URIs point at
//! `http://localhost:8080` (log in) and `http://localhost:8080/logout` (log out). Registered
//! clients usually start out in the staging environment.
//!
//! In order to run the example call:
//!
//! ```sh
//! GOVBR_CLIENT_ENV=staging GOVBR_CLIENT_ID=xxx GOVBR_CLIENT_SECRET=yyy \
//! GOVBR_REDIRECT_URI=http://localhost:8080 GOVBR_REDIRECT_URI_LOGOUT=http://localhost:8080/logout \
//! cargo run --example govbr --features reqwest-blocking
//! ```
//!
//! ...and follow the instructions.
//!

use govbr_oauth2::{
    CallbackOutcome, CallbackParams, GovBr, GovBrOptions, MemorySessionStore, TokenResponse,
};
use url::Url;

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::exit;

fn handle_error<T: std::error::Error>(fail: &T, msg: &'static str) {
    let mut err_msg = format!("ERROR: {}", msg);
    let mut cur_fail: Option<&dyn std::error::Error> = Some(fail);
    while let Some(cause) = cur_fail {
        err_msg += &format!("\n    caused by: {}", cause);
        cur_fail = cause.source();
    }
    println!("{}", err_msg);
    exit(1);
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let govbr = GovBr::new(GovBrOptions::from_env()).unwrap_or_else(|err| {
        handle_error(&err, "Invalid Gov.br configuration");
        unreachable!();
    });
    println!("Using the {:?} environment", govbr.environment());
    let flow = govbr.into_flow();

    let http_client = reqwest::blocking::ClientBuilder::new()
        // Following redirects opens the client up to SSRF vulnerabilities.
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    // Stands in for the user's browser session.
    let session = MemorySessionStore::new();

    // Generate the authorization URL to which we'll redirect the user.
    let (authorize_url, _csrf_state, _nonce) = flow.initiate(&session);
    println!("Open this URL in your browser:\n{}\n", authorize_url);

    // A very naive implementation of the redirect server.
    let listener = TcpListener::bind("127.0.0.1:8080")?;

    // Accept one connection
    let (mut stream, _) = listener.accept()?;
    let callback = {
        let mut reader = BufReader::new(&stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line)?;

        let redirect_url = request_line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| anyhow::anyhow!("malformed request line"))?;
        let url = Url::parse(&("http://localhost".to_string() + redirect_url))?;
        CallbackParams::from_url(&url)
    };

    let message = "Go back to your terminal :)";
    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\n\r\n{}",
        message.len(),
        message
    );
    stream.write_all(response.as_bytes())?;

    let code = match flow.validate_callback(&session, &callback) {
        CallbackOutcome::Authorized(code) => code,
        CallbackOutcome::NotAuthenticated => {
            println!("Gov.br did not return an authorization code; start over.");
            exit(1);
        }
        CallbackOutcome::Rejected(rejection) => {
            println!("Rejected the callback state ({:?}); start over.", rejection);
            exit(1);
        }
    };

    // Exchange the code for a token and fetch the user's claims.
    let owner = flow
        .authenticate(code)
        .request(&http_client)
        .unwrap_or_else(|err| {
            handle_error(&err, "Failed to authenticate with Gov.br");
            unreachable!();
        });

    println!(
        "Gov.br returned scopes: {:?}",
        owner.token().scopes()
    );
    println!("Authenticated as {:?} (CPF {:?})", owner.name(), owner.cpf());
    println!("Authentication methods: {:?}", owner.amr());

    let companies = flow
        .provider()
        .companies(&owner)
        .unwrap_or_else(|err| {
            handle_error(&err, "Gov.br did not return a CPF");
            unreachable!();
        })
        .request(&http_client)
        .unwrap_or_else(|err| {
            handle_error(&err, "Failed to fetch linked companies");
            unreachable!();
        });
    for company in companies {
        println!(
            "Linked company: {:?} ({:?}), since {:?}",
            company.razao_social(),
            company.cnpj(),
            company.created_at()
        );
    }

    println!(
        "Open this URL in your browser to log out:\n{}\n",
        flow.provider().logout_url()
    );

    Ok(())
}

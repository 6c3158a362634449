//! Shared test infrastructure.
//!
//! The backend is stood in for by an `httpmock` server; tests point an
//! `ApiClient` at it and register the responses they need.
//!
//! # HTTP tests
//! - `test_app!(server)` - full app (session, auth gate, routes) over the mock
//! - `test_app!(server, api)` - same, with a client built by the test
//! - `session_cookie()` / `csrf_from()` - carry a session across requests

#![allow(dead_code, unused_macros, unused_imports)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use httpmock::MockServer;

use interventoria::backend::ApiClient;
use interventoria::config::AppConfig;

pub const TEST_CEDULA: &str = "1032456789";

pub fn api_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.base_url(), None).expect("client builds")
}

pub fn config_for(server: &MockServer) -> AppConfig {
    AppConfig { backend_url: server.base_url(), page_size: 10, ..AppConfig::default() }
}

/// Build the application the way `main` does, against `server`.
macro_rules! test_app {
    ($server:expr) => {
        crate::common::test_app!($server, crate::common::api_for($server))
    };
    ($server:expr, $api:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_web::middleware::from_fn(interventoria::auth::middleware::require_auth))
                .wrap(
                    actix_session::SessionMiddleware::builder(
                        actix_session::storage::CookieSessionStore::default(),
                        actix_web::cookie::Key::from(&[7u8; 64][..]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(actix_web::web::Data::new($api))
                .app_data(actix_web::web::Data::new(interventoria::backend::SnapshotStore::new()))
                .app_data(actix_web::web::Data::new(interventoria::auth::rate_limit::RateLimiter::new()))
                .app_data(actix_web::web::Data::new(crate::common::config_for($server)))
                .configure(interventoria::configure)
                .default_service(actix_web::web::to(interventoria::handlers::not_found)),
        )
        .await
    };
}
pub(crate) use test_app;

/// Session cookie set by a response, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
}

/// Pull the CSRF token out of a rendered form.
pub fn csrf_from(html: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker).expect("page has a csrf field") + marker.len();
    let end = html[start..].find('"').expect("csrf value is quoted");
    html[start..start + end].to_string()
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Url-encoded form body.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).expect("form encodes")
}

use actix_session::{SessionMiddleware, config::PersistentSession, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::time::Duration, middleware, web};

use interventoria::auth::middleware::require_auth;
use interventoria::auth::rate_limit::RateLimiter;
use interventoria::backend::{ApiClient, SnapshotStore};
use interventoria::config::AppConfig;
use interventoria::handlers::not_found;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    let api = ApiClient::new(&config.backend_url, config.backend_timeout)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let secret_key = config.cookie_key();
    let max_age = Duration::seconds(config.session_max_age_secs);
    let bind_addr = config.bind_addr.clone();

    let api = web::Data::new(api);
    let snapshots = web::Data::new(SnapshotStore::new());
    let limiter = web::Data::new(RateLimiter::new());
    let config = web::Data::new(config);

    log::info!("Backend at {}", api.base_url());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
            .cookie_secure(false)
            .cookie_http_only(true)
            .session_lifecycle(PersistentSession::default().session_ttl(max_age))
            .build();

        App::new()
            .wrap(middleware::from_fn(require_auth))
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(api.clone())
            .app_data(snapshots.clone())
            .app_data(limiter.clone())
            .app_data(config.clone())
            .service(actix_files::Files::new("/static", "./static"))
            .configure(interventoria::configure)
            .default_service(web::to(not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}

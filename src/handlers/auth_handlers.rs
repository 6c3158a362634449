use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::middleware::HOME_PATH;
use crate::auth::session::sign_in;
use crate::auth::{csrf, rate_limit::RateLimiter, validate};
use crate::backend::{ApiClient, ApiError};
use crate::errors::{AppError, redirect, render};
use crate::handlers::CsrfOnly;
use crate::templates_structs::{APP_NAME, LoginTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub cedula: String,
    pub csrf_token: String,
}

fn login_template(session: &Session, error: Option<String>, cedula: &str) -> Result<LoginTemplate, AppError> {
    Ok(LoginTemplate {
        error,
        app_name: APP_NAME.to_string(),
        csrf_token: csrf::get_or_create_token(session)?,
        cedula: cedula.to_string(),
    })
}

pub async fn index() -> HttpResponse {
    redirect(HOME_PATH)
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    render(login_template(&session, None, "")?)
}

pub async fn login_submit(
    req: HttpRequest,
    session: Session,
    form: web::Form<LoginForm>,
    api: web::Data<ApiClient>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check BEFORE calling the backend
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    let cedula = form.cedula.trim();

    if limiter.is_blocked(ip) {
        let msg = "Demasiados intentos fallidos. Intente de nuevo más tarde.".to_string();
        return render(login_template(&session, Some(msg), cedula)?);
    }

    if let Some(msg) = validate::validate_cedula(cedula) {
        return render(login_template(&session, Some(msg), cedula)?);
    }

    match api.login(cedula).await {
        Ok(login) => {
            limiter.clear(ip);
            sign_in(&session, cedula, &login)?;
            log::info!("Login for cedula {cedula} (rol {})", login.id_rol);
            Ok(redirect(HOME_PATH))
        }
        Err(ApiError::Status { status, .. }) if (400..500).contains(&status) => {
            limiter.record_failure(ip);
            log::warn!("Rejected login for cedula {cedula} ({status})");
            let msg = "Cédula no registrada o sin acceso".to_string();
            render(login_template(&session, Some(msg), cedula)?)
        }
        Err(e) => {
            log::error!("Login request failed: {e}");
            render(login_template(&session, Some(e.user_message()), cedula)?)
        }
    }
}

pub async fn logout(session: Session, form: web::Form<CsrfOnly>) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(redirect("/login"))
}

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use askama::Template;

use crate::backend::ApiError;

#[derive(Debug)]
pub enum AppError {
    Backend(ApiError),
    Template(askama::Error),
    Session(String),
    Csrf,
    Unauthorized,
    NotFound,
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Backend(e) => write!(f, "Backend error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::Unauthorized => write!(f, "Not signed in"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::BadRequest(e) => write!(f, "Bad request: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Backend(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Backend(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Csrf => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::SEE_OTHER,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Template(_) | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized => redirect("/login"),
            AppError::NotFound => HttpResponse::NotFound().body("No encontrado"),
            AppError::Backend(e) if e.is_not_found() => HttpResponse::NotFound().body("No encontrado"),
            AppError::Csrf => HttpResponse::Forbidden().body("Token CSRF inválido o ausente"),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().body(msg.clone()),
            AppError::Backend(e) => {
                log::error!("{self}");
                HttpResponse::build(self.status_code()).body(e.user_message())
            }
            _ => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Error interno del servidor")
            }
        }
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        AppError::Backend(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

/// Render a template into a 200 HTML response.
pub fn render<T: Template>(tmpl: T) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body))
}

/// 303 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(AppError::Csrf.status_code(), StatusCode::FORBIDDEN);
        let missing = AppError::Backend(ApiError::Status { status: 404, message: None });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        let down = AppError::Backend(ApiError::Network("refused".into()));
        assert_eq!(down.status_code(), StatusCode::BAD_GATEWAY);
        let slow = AppError::Backend(ApiError::Timeout("10s".into()));
        assert_eq!(slow.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_redirects_to_login() {
        let resp = AppError::Unauthorized.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get("Location").unwrap(), "/login");
    }
}

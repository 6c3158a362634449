use std::future::{Ready, ready};

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::errors::AppError;
use crate::models::entity::LoginResponse;

const KEY_CEDULA: &str = "cedula";
const KEY_ROLE: &str = "id_rol";
const KEY_NAME: &str = "nombre";
const KEY_FLASH: &str = "flash";
const KEY_ERROR: &str = "flash_error";

/// The signed-in user, taken from the session.
///
/// Handlers that need the user ask for it as an argument; a request without
/// a session user is rejected before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub cedula: String,
    pub role_id: i64,
    pub name: Option<String>,
}

impl CurrentUser {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.cedula)
    }

    pub fn from_session(session: &Session) -> Option<Self> {
        let cedula = session.get::<String>(KEY_CEDULA).unwrap_or(None)?;
        let role_id = session.get::<i64>(KEY_ROLE).unwrap_or(None)?;
        let name = session.get::<String>(KEY_NAME).unwrap_or(None);
        Some(Self { cedula, role_id, name })
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.get_session();
        ready(CurrentUser::from_session(&session).ok_or(AppError::Unauthorized))
    }
}

pub fn is_authenticated(session: &Session) -> bool {
    session.get::<String>(KEY_CEDULA).unwrap_or(None).is_some()
}

/// Store the login result. The session id is renewed first.
pub fn sign_in(session: &Session, cedula: &str, login: &LoginResponse) -> Result<(), AppError> {
    session.renew();
    session
        .insert(KEY_CEDULA, cedula)
        .and_then(|_| session.insert(KEY_ROLE, login.id_rol))
        .map_err(|e| AppError::Session(format!("Failed to store login: {e}")))?;
    if let Some(name) = &login.nombre {
        session
            .insert(KEY_NAME, name)
            .map_err(|e| AppError::Session(format!("Failed to store user name: {e}")))?;
    }
    Ok(())
}

pub fn set_flash(session: &Session, message: &str) -> Result<(), AppError> {
    session
        .insert(KEY_FLASH, message)
        .map_err(|e| AppError::Session(format!("Failed to store flash message: {e}")))
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(KEY_FLASH).unwrap_or(None);
    if flash.is_some() {
        session.remove(KEY_FLASH);
    }
    flash
}

/// Error banner shown once on the next page.
pub fn set_error(session: &Session, message: &str) -> Result<(), AppError> {
    session
        .insert(KEY_ERROR, message)
        .map_err(|e| AppError::Session(format!("Failed to store error message: {e}")))
}

pub fn take_error(session: &Session) -> Option<String> {
    let error = session.get::<String>(KEY_ERROR).unwrap_or(None);
    if error.is_some() {
        session.remove(KEY_ERROR);
    }
    error
}

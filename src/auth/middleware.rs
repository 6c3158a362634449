use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use super::session::is_authenticated;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/proyectos";

/// Where a request should go instead, if anywhere.
///
/// Anonymous users may only see the login page and static assets; signed-in
/// users are sent from `/` and `/login` to the project board.
pub fn redirect_for(path: &str, authenticated: bool) -> Option<&'static str> {
    let public = path == LOGIN_PATH || path.starts_with("/static/");
    match (authenticated, path) {
        (false, _) if public => None,
        (false, _) => Some(LOGIN_PATH),
        (true, "/" | LOGIN_PATH) => Some(HOME_PATH),
        (true, _) => None,
    }
}

/// Session gate applied to the whole app.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let authenticated = is_authenticated(&req.get_session());

    if let Some(location) = redirect_for(req.path(), authenticated) {
        let response = HttpResponse::SeeOther()
            .insert_header(("Location", location))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

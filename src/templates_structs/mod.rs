// Template context structures for Askama templates, organized by screen.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{CurrentUser, take_error, take_flash};
use crate::errors::AppError;
use crate::models::schema;

pub const APP_NAME: &str = "Interventoría";

pub struct NavLink {
    pub href: String,
    pub label: String,
    pub active: bool,
}

pub struct Crumb {
    pub label: String,
    pub href: String,
}

impl Crumb {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self { label: label.into(), href: href.into() }
    }
}

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.user_name`, `ctx.nav`, etc.
pub struct PageContext {
    pub app_name: String,
    pub user_name: String,
    pub avatar_initial: String,
    pub flash: Option<String>,
    pub error: Option<String>,
    pub csrf_token: String,
    pub nav: Vec<NavLink>,
    pub admin_nav: Vec<NavLink>,
    pub breadcrumbs: Vec<Crumb>,
    /// Reload the page after this many seconds.
    pub refresh_secs: Option<u32>,
}

impl PageContext {
    pub fn build(session: &Session, user: &CurrentUser, current_path: &str) -> Result<Self, AppError> {
        let user_name = user.display_name().to_string();
        let avatar_initial = user_name.chars().next().unwrap_or('?').to_uppercase().to_string();
        let link = |href: String, label: &str| NavLink {
            active: current_path == href || current_path.starts_with(&format!("{href}/")),
            href,
            label: label.to_string(),
        };
        let board = "/proyectos".to_string();
        let in_drill_down = ["/proyectos", "/conjuntos/", "/estructuras/", "/actividades/"]
            .iter()
            .any(|p| current_path.starts_with(p));
        Ok(Self {
            app_name: APP_NAME.to_string(),
            user_name,
            avatar_initial,
            flash: take_flash(session),
            error: take_error(session),
            csrf_token: csrf::get_or_create_token(session)?,
            nav: vec![NavLink { active: in_drill_down, href: board, label: "Proyectos".to_string() }],
            admin_nav: schema::all()
                .iter()
                .map(|s| link(format!("/admin/{}", s.slug), s.title))
                .collect(),
            breadcrumbs: Vec::new(),
            refresh_secs: None,
        })
    }

    pub fn with_breadcrumbs(mut self, crumbs: Vec<Crumb>) -> Self {
        self.breadcrumbs = crumbs;
        self
    }

    pub fn with_refresh(mut self, secs: u32) -> Self {
        self.refresh_secs = Some(secs);
        self
    }

    /// Show an error banner on this render (in addition to any carried over).
    pub fn with_error(mut self, message: String) -> Self {
        self.error = Some(match self.error.take() {
            Some(prev) => format!("{prev} · {message}"),
            None => message,
        });
        self
    }
}

mod common;
mod crud;
mod proyectos;

pub use self::common::{LoginTemplate, NotFoundTemplate};
pub use self::crud::{CrudFormTemplate, CrudListTemplate};
pub use self::proyectos::{LevelTemplate, ProgressSummary, ReportFormTemplate};

pub mod auth;
pub mod backend;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod table;
pub mod templates_structs;

use actix_web::web;

use crate::handlers::{auth_handlers, crud_handlers, proyecto_handlers};

/// Every route of the dashboard. `main` and the HTTP tests share this table.
///
/// Literal segments (`new`, `bulk-delete`) are registered before the `{id}`
/// patterns they would otherwise collide with.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(auth_handlers::index))
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/logout", web::post().to(auth_handlers::logout))
        // Project drill-down
        .route("/proyectos", web::get().to(proyecto_handlers::board))
        .route("/proyectos/{id}/conjuntos", web::get().to(proyecto_handlers::conjuntos))
        .route("/conjuntos/{id}/estructuras", web::get().to(proyecto_handlers::estructuras))
        .route("/estructuras/{id}/actividades", web::get().to(proyecto_handlers::actividades))
        .route("/actividades/{id}/reporte", web::get().to(proyecto_handlers::report_form))
        .route("/actividades/{id}/reporte", web::post().to(proyecto_handlers::report_submit))
        // Reference data
        .route("/admin/{slug}", web::get().to(crud_handlers::list))
        .route("/admin/{slug}/new", web::get().to(crud_handlers::new_form))
        .route("/admin/{slug}", web::post().to(crud_handlers::create))
        .route("/admin/{slug}/bulk-delete", web::post().to(crud_handlers::bulk_delete))
        .route("/admin/{slug}/{id}/edit", web::get().to(crud_handlers::edit_form))
        .route("/admin/{slug}/{id}", web::post().to(crud_handlers::update))
        .route("/admin/{slug}/{id}/delete", web::post().to(crud_handlers::delete));
}

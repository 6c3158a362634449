//! Generic list / form / mutation screens for every schema in the registry.

use std::collections::HashMap;

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;

use crate::auth::csrf;
use crate::auth::session::{CurrentUser, set_error, set_flash};
use crate::backend::{ApiClient, ApiError, SnapshotStore, id_of};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::{fetch_list, links_for, table_for, table_options};
use crate::models::form::{self, FieldView};
use crate::models::schema::{self, EntitySchema, PostCreate};
use crate::table::view::{RowAction, TableView};
use crate::templates_structs::{Crumb, CrudFormTemplate, CrudListTemplate, PageContext};

fn schema_for(slug: &str) -> Result<&'static EntitySchema, AppError> {
    schema::find(slug).ok_or(AppError::NotFound)
}

fn list_path(schema: &EntitySchema) -> String {
    format!("/admin/{}", schema.slug)
}

fn crumbs(schema: &EntitySchema, last: Option<&str>) -> Vec<Crumb> {
    let mut out = vec![Crumb::new(schema.title, list_path(schema))];
    if let Some(label) = last {
        out.push(Crumb::new(label, ""));
    }
    out
}

/// Lists every select field of the form needs; a failing list leaves its
/// select empty and raises the banner.
async fn select_lists(
    api: &ApiClient,
    snapshots: &SnapshotStore,
    schema: &EntitySchema,
    ctx: &mut PageContext,
) -> HashMap<&'static str, Vec<Value>> {
    let mut lists = HashMap::new();
    for endpoint in schema.select_endpoints() {
        let fetched = fetch_list(api, snapshots, endpoint).await;
        if let Some(msg) = fetched.error {
            ctx.error.get_or_insert(msg);
        }
        lists.insert(endpoint, fetched.items);
    }
    lists
}

/// Fetch one record through the list endpoint. Some resources list under a
/// different path than they write to, and the list rows carry the joined names.
async fn find_record(api: &ApiClient, schema: &EntitySchema, id: i64) -> Result<Value, AppError> {
    let items = api.list(schema.list_endpoint).await?;
    items
        .into_iter()
        .find(|item| id_of(item, "id") == Some(id))
        .ok_or(AppError::NotFound)
}

pub async fn list(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<String>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let schema = schema_for(&path)?;
    let fetched = fetch_list(&api, &snapshots, schema.list_endpoint).await;
    let ctx = fetched.annotate(PageContext::build(&session, &user, req.path())?);

    let links = links_for(&req);
    let mut options = table_options(schema.slug, config.page_size);
    options.selectable = true;
    let mut table = table_for(schema.table_columns(), &fetched.items, options, &links);
    fetched.mark(&mut table);

    let slug = schema.slug;
    let view = TableView::build(&table, &links, |_| None, |row| {
        vec![
            RowAction::link("Editar", "edit", format!("/admin/{slug}/{}/edit", row.id)),
            RowAction::destructive(
                "Eliminar",
                "trash",
                format!("/admin/{slug}/{}/delete", row.id),
                "¿Está seguro de que desea eliminar este registro?",
            ),
        ]
    });

    render(CrudListTemplate {
        ctx: ctx.with_breadcrumbs(crumbs(schema, None)),
        title: schema.title.to_string(),
        singular: schema.singular.to_string(),
        new_href: format!("/admin/{slug}/new"),
        bulk_delete_action: format!("/admin/{slug}/bulk-delete"),
        table: view,
    })
}

fn form_template(
    ctx: PageContext,
    schema: &EntitySchema,
    id: Option<i64>,
    fields: Vec<FieldView>,
    errors: Vec<String>,
) -> CrudFormTemplate {
    let (form_title, form_action, crumb) = match id {
        Some(id) => (
            format!("Editar {}", schema.singular),
            format!("/admin/{}/{id}", schema.slug),
            "Editar",
        ),
        None => (
            format!("Nuevo {}", schema.singular),
            list_path(schema),
            "Nuevo",
        ),
    };
    CrudFormTemplate {
        ctx: ctx.with_breadcrumbs(crumbs(schema, Some(crumb))),
        form_title,
        form_action,
        cancel_href: list_path(schema),
        fields,
        errors,
    }
}

/// Re-render a rejected submission with the values the user typed.
#[allow(clippy::too_many_arguments)]
async fn rerender(
    req: &HttpRequest,
    session: &Session,
    user: &CurrentUser,
    api: &ApiClient,
    snapshots: &SnapshotStore,
    schema: &EntitySchema,
    id: Option<i64>,
    pairs: &[(String, String)],
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let mut ctx = PageContext::build(session, user, req.path())?;
    let lists = select_lists(api, snapshots, schema, &mut ctx).await;
    let fields = form::field_views(schema, |name, _| form::value_of(pairs, name).to_string(), &lists);
    render(form_template(ctx, schema, id, fields, errors))
}

pub async fn new_form(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<String>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
) -> Result<HttpResponse, AppError> {
    let schema = schema_for(&path)?;
    let mut ctx = PageContext::build(&session, &user, req.path())?;
    let lists = select_lists(&api, &snapshots, schema, &mut ctx).await;
    let fields = form::field_views(schema, |_, _| String::new(), &lists);
    render(form_template(ctx, schema, None, fields, Vec::new()))
}

pub async fn create(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
) -> Result<HttpResponse, AppError> {
    let schema = schema_for(&path)?;
    let pairs = form.into_inner();
    csrf::validate_csrf(&session, form::value_of(&pairs, "csrf_token"))?;

    let body = match form::decode(schema, &pairs) {
        Ok(body) => body,
        Err(errors) => {
            return rerender(&req, &session, &user, &api, &snapshots, schema, None, &pairs, errors).await;
        }
    };

    match api.create(schema.write_endpoint, &body).await {
        Ok(created) => {
            let new_id = id_of(&created, "id");
            log::info!("Created {} {:?}", schema.slug, new_id);
            let mut msg = format!("{} creado exitosamente.", schema.singular);
            if schema.post_create == PostCreate::GenerateActivities {
                match new_id {
                    Some(id) => {
                        if let Err(e) = api.generate_activities(id).await {
                            log::error!("Generating activities for structure {id} failed: {e}");
                            msg.push_str(" No se pudieron generar las actividades.");
                        }
                    }
                    None => log::warn!("Created {} without an id; activities not generated", schema.slug),
                }
            }
            set_flash(&session, &msg)?;
            Ok(redirect(&list_path(schema)))
        }
        Err(e) => {
            log::error!("Creating {} failed: {e}", schema.slug);
            let errors = vec![mutation_error("crear", &e)];
            rerender(&req, &session, &user, &api, &snapshots, schema, None, &pairs, errors).await
        }
    }
}

pub async fn edit_form(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<(String, i64)>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
) -> Result<HttpResponse, AppError> {
    let (slug, id) = path.into_inner();
    let schema = schema_for(&slug)?;
    let record = find_record(&api, schema, id).await?;

    let mut ctx = PageContext::build(&session, &user, req.path())?;
    let lists = select_lists(&api, &snapshots, schema, &mut ctx).await;
    let fields = form::field_views(schema, |name, kind| form::value_from_record(&record, name, kind), &lists);
    render(form_template(ctx, schema, Some(id), fields, Vec::new()))
}

pub async fn update(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<(String, i64)>,
    form: web::Form<Vec<(String, String)>>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
) -> Result<HttpResponse, AppError> {
    let (slug, id) = path.into_inner();
    let schema = schema_for(&slug)?;
    let pairs = form.into_inner();
    csrf::validate_csrf(&session, form::value_of(&pairs, "csrf_token"))?;

    let body = match form::decode(schema, &pairs) {
        Ok(body) => body,
        Err(errors) => {
            return rerender(&req, &session, &user, &api, &snapshots, schema, Some(id), &pairs, errors).await;
        }
    };

    match api.update(schema.write_endpoint, id, &body).await {
        Ok(_) => {
            log::info!("Updated {} {id}", schema.slug);
            set_flash(&session, &format!("{} actualizado exitosamente.", schema.singular))?;
            Ok(redirect(&list_path(schema)))
        }
        Err(e) => {
            log::error!("Updating {} {id} failed: {e}", schema.slug);
            let errors = vec![mutation_error("actualizar", &e)];
            rerender(&req, &session, &user, &api, &snapshots, schema, Some(id), &pairs, errors).await
        }
    }
}

pub async fn delete(
    session: Session,
    path: web::Path<(String, i64)>,
    form: web::Form<crate::handlers::CsrfOnly>,
    api: web::Data<ApiClient>,
) -> Result<HttpResponse, AppError> {
    let (slug, id) = path.into_inner();
    let schema = schema_for(&slug)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    match api.delete(schema.write_endpoint, id).await {
        Ok(()) => {
            log::info!("Deleted {} {id}", schema.slug);
            set_flash(&session, &format!("{} eliminado exitosamente.", schema.singular))?;
        }
        Err(e) => {
            log::error!("Deleting {} {id} failed: {e}", schema.slug);
            set_error(&session, &mutation_error("eliminar", &e))?;
        }
    }
    Ok(redirect(&list_path(schema)))
}

/// Delete every checked row. Deletions run one after another; the ones that
/// fail are reported together and the rest stay deleted.
pub async fn bulk_delete(
    session: Session,
    path: web::Path<String>,
    form: web::Form<Vec<(String, String)>>,
    api: web::Data<ApiClient>,
) -> Result<HttpResponse, AppError> {
    let schema = schema_for(&path)?;
    let pairs = form.into_inner();
    csrf::validate_csrf(&session, form::value_of(&pairs, "csrf_token"))?;

    let ids = pairs
        .iter()
        .filter(|(k, _)| k == "ids")
        .map(|(_, v)| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("Identificador inválido: {v}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        set_error(&session, "No se seleccionó ningún registro.")?;
        return Ok(redirect(&list_path(schema)));
    }

    let mut failed = Vec::new();
    for id in &ids {
        if let Err(e) = api.delete(schema.write_endpoint, *id).await {
            log::error!("Deleting {} {id} failed: {e}", schema.slug);
            failed.push(id.to_string());
        }
    }
    let deleted = ids.len() - failed.len();
    log::info!("Bulk delete on {}: {deleted} of {} removed", schema.slug, ids.len());
    if deleted > 0 {
        set_flash(&session, &format!("{deleted} registro(s) eliminado(s)."))?;
    }
    if !failed.is_empty() {
        set_error(&session, &format!("No se pudieron eliminar: {}", failed.join(", ")))?;
    }
    Ok(redirect(&list_path(schema)))
}

fn mutation_error(verb: &str, e: &ApiError) -> String {
    format!("Error al {verb}: {}", e.user_message())
}

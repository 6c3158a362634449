//! Project board and the drill-down below it, down to the report form.

use std::collections::HashMap;

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::Value;

use crate::auth::csrf;
use crate::auth::session::{CurrentUser, set_flash};
use crate::backend::{ApiClient, ApiError, SnapshotStore};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::{fetch_children, fetch_list, links_for, table_for, table_options};
use crate::models::entity::{ActividadEstructura, Conjunto, Estructura, NamedRef, Proyecto, ReportInput, Reporte};
use crate::models::form::{self, FieldView};
use crate::models::schema::{self, status_chips};
use crate::progress::{Aggregator, DrillFocus, Level, Percentage, PercentageVariant, activity_result};
use crate::table::view::{RowAction, TableView};
use crate::table::{CellContent, Column, DataTable, Row};
use crate::templates_structs::{Crumb, LevelTemplate, PageContext, ProgressSummary, ReportFormTemplate};

const PROGRESS_KEY: &str = "avance";

fn progress_cell(row: &Row) -> CellContent {
    CellContent::Progress(row.get(PROGRESS_KEY).as_number().unwrap_or(0.0))
}

fn progress_column() -> Column {
    Column::new(PROGRESS_KEY, "Avance").numeric().render_with(progress_cell)
}

/// Copy each child's percentage into its row.
fn attach_progress(table: &mut DataTable, percentages: &HashMap<i64, Percentage>) {
    let rows = table
        .rows()
        .iter()
        .cloned()
        .map(|mut row| {
            let pct = row.id_number().and_then(|id| percentages.get(&id)).copied().unwrap_or_default();
            row.set(PROGRESS_KEY, pct.value());
            row
        })
        .collect();
    table.set_rows(rows);
}

fn edit_actions(slug: &'static str) -> impl Fn(&Row) -> Vec<RowAction> {
    move |row: &Row| {
        vec![
            RowAction::link("Editar", "edit", format!("/admin/{slug}/{}/edit", row.id)),
            RowAction::destructive(
                "Eliminar",
                "trash",
                format!("/admin/{slug}/{}/delete", row.id),
                "¿Está seguro de que desea eliminar este registro?",
            ),
        ]
    }
}

async fn get_or_not_found<T: serde::de::DeserializeOwned>(
    api: &ApiClient,
    endpoint: &str,
    id: i64,
) -> Result<T, AppError> {
    match api.get_as::<T>(endpoint, id).await {
        Ok(v) => Ok(v),
        Err(e) if e.is_not_found() => Err(AppError::NotFound),
        Err(e) => Err(e.into()),
    }
}

pub async fn board(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let fetched = fetch_list(&api, &snapshots, "proyecto").await;
    let ctx = fetched.annotate(PageContext::build(&session, &user, req.path())?);
    let items = &fetched.items;

    let agg = Aggregator::new(&api, config.completion_rule());
    let percentages = agg.compute_percentages(items, PercentageVariant::Project).await;

    let columns = vec![
        Column::new("id", "ID").numeric(),
        Column::new("nombre", "Nombre").bold(),
        Column::new("direccion", "Dirección"),
        Column::new("ciudad.nombre", "Ciudad"),
        Column::new("estado.nombre", "Estado").chip(status_chips()),
        progress_column(),
    ];
    let links = links_for(&req);
    let mut table = table_for(columns, items, table_options("proyectos", config.page_size), &links);
    attach_progress(&mut table, &percentages);
    fetched.mark(&mut table);

    let view = TableView::build(
        &table,
        &links,
        |row| Some(format!("/proyectos/{}/conjuntos", row.id)),
        edit_actions("proyecto"),
    );
    render(LevelTemplate {
        ctx: ctx.with_breadcrumbs(vec![Crumb::new("Proyectos", "/proyectos")]),
        title: "Proyectos".to_string(),
        subtitle: "Seleccione un proyecto para ver sus conjuntos".to_string(),
        back_href: String::new(),
        summary: None,
        table: view,
    })
}

pub async fn conjuntos(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let project_id = path.into_inner();
    let proyecto: Proyecto = get_or_not_found(&api, "proyecto", project_id).await?;

    let mut focus = DrillFocus::load(&session);
    focus.focus_project(project_id);
    focus.save(&session);

    let agg = Aggregator::new(&api, config.completion_rule());
    let fetched = fetch_children(&agg, &snapshots, project_id, Level::Conjuntos).await;
    let ctx = fetched.annotate(PageContext::build(&session, &user, req.path())?);
    let children = &fetched.items;
    let percentages = agg.compute_percentages(children, PercentageVariant::Conjunto).await;

    let columns = vec![
        Column::new("id", "ID").numeric(),
        Column::new("nombre", "Nombre").bold(),
        Column::new("residente_encargado.nombre", "Residente encargado"),
        Column::new("tipo_vivienda.nombre", "Tipo de vivienda"),
        Column::new("estado.nombre", "Estado").chip(status_chips()),
        progress_column(),
    ];
    let links = links_for(&req);
    let mut table = table_for(columns, children, table_options("conjuntos", config.page_size), &links);
    attach_progress(&mut table, &percentages);
    fetched.mark(&mut table);

    let view = TableView::build(
        &table,
        &links,
        |row| Some(format!("/conjuntos/{}/estructuras", row.id)),
        edit_actions("conjunto"),
    );
    render(LevelTemplate {
        ctx: ctx.with_breadcrumbs(vec![
            Crumb::new("Proyectos", "/proyectos"),
            Crumb::new(proyecto.nombre.clone(), format!("/proyectos/{project_id}/conjuntos")),
        ]),
        title: format!("Conjuntos de {}", proyecto.nombre),
        subtitle: NamedRef::name_or(&proyecto.ciudad, "").to_string(),
        back_href: "/proyectos".to_string(),
        summary: None,
        table: view,
    })
}

pub async fn estructuras(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let conjunto_id = path.into_inner();
    let conjunto: Conjunto = get_or_not_found(&api, "conjunto", conjunto_id).await?;

    let mut focus = DrillFocus::load(&session);
    focus.focus_conjunto(Some(conjunto.id_proyecto), conjunto_id);
    focus.save(&session);

    let agg = Aggregator::new(&api, config.completion_rule());
    let fetched = fetch_children(&agg, &snapshots, conjunto_id, Level::Structures).await;
    let ctx = fetched.annotate(PageContext::build(&session, &user, req.path())?);
    let children = &fetched.items;
    let percentages = agg.compute_percentages(children, PercentageVariant::Activities).await;

    let columns = vec![
        Column::new("id", "ID").numeric(),
        Column::new("nombre", "Nombre").bold(),
        Column::new("tipo_estructura.nombre", "Tipo de estructura"),
        Column::new("estado.nombre", "Estado").chip(status_chips()),
        progress_column(),
    ];
    let links = links_for(&req);
    let mut table = table_for(columns, children, table_options("estructuras", config.page_size), &links);
    attach_progress(&mut table, &percentages);
    fetched.mark(&mut table);

    let view = TableView::build(
        &table,
        &links,
        |row| Some(format!("/estructuras/{}/actividades", row.id)),
        edit_actions("estructura"),
    );
    let back = format!("/proyectos/{}/conjuntos", conjunto.id_proyecto);
    render(LevelTemplate {
        ctx: ctx.with_breadcrumbs(vec![
            Crumb::new("Proyectos", "/proyectos"),
            Crumb::new("Conjuntos", back.clone()),
            Crumb::new(conjunto.nombre.clone(), format!("/conjuntos/{conjunto_id}/estructuras")),
        ]),
        title: format!("Estructuras de {}", conjunto.nombre),
        subtitle: NamedRef::name_or(&conjunto.tipo_vivienda, "").to_string(),
        back_href: back,
        summary: None,
        table: view,
    })
}

const RESULT_KEY: &str = "reporte.resultado.nombre";
const NO_REPORT: &str = "Sin reporte";

/// Rows without a report show (and search and sort as) "Sin reporte".
fn mark_unreported(table: &mut DataTable) {
    let rows = table
        .rows()
        .iter()
        .cloned()
        .map(|mut row| {
            if row.get(RESULT_KEY).is_null() {
                row.set(RESULT_KEY, NO_REPORT);
            }
            row
        })
        .collect();
    table.set_rows(rows);
}

fn result_cell(row: &Row) -> CellContent {
    let text = row.get(RESULT_KEY).display();
    if text.is_empty() || text == NO_REPORT {
        return CellContent::Text(NO_REPORT.to_string());
    }
    CellContent::Chip { color: status_chips().color_for(&text), text }
}

pub async fn actividades(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    api: web::Data<ApiClient>,
    snapshots: web::Data<SnapshotStore>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let structure_id = path.into_inner();
    let estructura: Estructura = get_or_not_found(&api, "estructura", structure_id).await?;

    let mut focus = DrillFocus::load(&session);
    focus.focus_structure(Some(estructura.id_conjunto), structure_id);
    focus.save(&session);

    let rule = config.completion_rule();
    let agg = Aggregator::new(&api, rule);
    let fetched = fetch_children(&agg, &snapshots, structure_id, Level::Activities).await;
    let ctx = fetched.annotate(PageContext::build(&session, &user, req.path())?);
    let children = &fetched.items;
    let done = Aggregator::local_completion(children, &rule);
    let completed = children
        .iter()
        .filter(|a| activity_result(a).is_some_and(|r| rule.is_complete(r)))
        .count();

    let columns = vec![
        Column::new("id", "ID").numeric(),
        Column::new("actividad.nombre", "Actividad").bold(),
        Column::new("descripcion", "Descripción"),
        Column::new("fecha_inicio", "Inicio"),
        Column::new("fecha_fin", "Fin"),
        Column::new("estado.nombre", "Estado").chip(status_chips()),
        Column::new(RESULT_KEY, "Resultado").render_with(result_cell),
    ];
    let links = links_for(&req);
    let mut table = table_for(columns, children, table_options("actividades", config.page_size), &links);
    mark_unreported(&mut table);
    fetched.mark(&mut table);
    let view = TableView::build(
        &table,
        &links,
        |row| Some(format!("/actividades/{}/reporte", row.id)),
        |row| vec![RowAction::link("Reportar", "report", format!("/actividades/{}/reporte", row.id))],
    );

    let back = format!("/conjuntos/{}/estructuras", estructura.id_conjunto);
    render(LevelTemplate {
        ctx: ctx.with_breadcrumbs(vec![
            Crumb::new("Proyectos", "/proyectos"),
            Crumb::new("Estructuras", back.clone()),
            Crumb::new(estructura.nombre.clone(), format!("/estructuras/{structure_id}/actividades")),
        ]),
        title: format!("Actividades de {}", estructura.nombre),
        subtitle: NamedRef::name_or(&estructura.estado, "").to_string(),
        back_href: back,
        summary: Some(ProgressSummary::new(
            format!("{completed} de {} actividades completadas", children.len()),
            done,
        )),
        table: view,
    })
}

// --------------------------------------------------------------------
// Report form
// --------------------------------------------------------------------

const REPORT_SLUG: &str = "reporte";

async fn report_lists(api: &ApiClient, ctx: &mut PageContext) -> HashMap<&'static str, Vec<Value>> {
    let mut lists = HashMap::new();
    for endpoint in ["persona", "resultado"] {
        match api.list(endpoint).await {
            Ok(items) => {
                lists.insert(endpoint, items);
            }
            Err(e) => {
                log::error!("Listing {endpoint} for report form failed: {e}");
                ctx.error.get_or_insert_with(|| e.user_message());
            }
        }
    }
    lists
}

fn report_fields<F>(current: F, lists: &HashMap<&'static str, Vec<Value>>) -> Result<Vec<FieldView>, AppError>
where
    F: Fn(&str, schema::FieldKind) -> String,
{
    let schema = schema::find(REPORT_SLUG).ok_or(AppError::NotFound)?;
    Ok(form::field_views(schema, current, lists))
}

fn activity_title(activity: &ActividadEstructura) -> String {
    NamedRef::name_or(&activity.actividad, "Actividad").to_string()
}

pub async fn report_form(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    api: web::Data<ApiClient>,
) -> Result<HttpResponse, AppError> {
    let activity_id = path.into_inner();
    let activity: ActividadEstructura = get_or_not_found(&api, "actividades-estructura", activity_id).await?;
    let mut ctx = PageContext::build(&session, &user, req.path())?;
    let lists = report_lists(&api, &mut ctx).await;

    let existing: Option<Reporte> = match activity.id_reporte {
        Some(rid) => match api.get_as(REPORT_SLUG, rid).await {
            Ok(r) => Some(r),
            Err(e) => {
                log::warn!("Could not load report {rid}: {e}");
                None
            }
        },
        None => None,
    };
    let fields = report_fields(|name, _| existing.as_ref().map(|r| r.field(name)).unwrap_or_default(), &lists)?;

    let back = format!("/estructuras/{}/actividades", activity.id_estructura);
    render(ReportFormTemplate {
        ctx: ctx.with_breadcrumbs(vec![
            Crumb::new("Proyectos", "/proyectos"),
            Crumb::new("Actividades", back.clone()),
            Crumb::new("Reporte", req.path().to_string()),
        ]),
        activity_name: activity_title(&activity),
        form_action: format!("/actividades/{activity_id}/reporte"),
        cancel_href: back,
        is_update: activity.id_reporte.is_some(),
        fields,
        errors: Vec::new(),
    })
}

pub async fn report_submit(
    req: HttpRequest,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let activity_id = path.into_inner();
    let pairs = form.into_inner();
    csrf::validate_csrf(&session, form::value_of(&pairs, "csrf_token"))?;

    let schema = schema::find(REPORT_SLUG).ok_or(AppError::NotFound)?;
    let decoded = form::decode(schema, &pairs).and_then(|body| {
        serde_json::from_value::<ReportInput>(Value::Object(body)).map_err(|e| vec![e.to_string()])
    });

    let errors = match decoded {
        Ok(input) => {
            let agg = Aggregator::new(&api, config.completion_rule());
            match agg.submit_report(activity_id, &input).await {
                Ok(outcome) => {
                    let mut msg = format!(
                        "El reporte se guardó exitosamente. Actividad: {}.",
                        outcome.status.label()
                    );
                    if outcome.promoted {
                        msg.push_str(" La estructura quedó completada.");
                    }
                    set_flash(&session, &msg)?;
                    let focus = DrillFocus::load(&session);
                    let target = if focus.structure == Some(outcome.structure_id) {
                        focus.return_path()
                    } else {
                        format!("/estructuras/{}/actividades", outcome.structure_id)
                    };
                    return Ok(redirect(&target));
                }
                Err(e) if e.is_not_found() => return Err(AppError::NotFound),
                Err(e) => {
                    log::error!("Saving report for activity {activity_id} failed: {e}");
                    vec![save_error(&e)]
                }
            }
        }
        Err(errors) => errors,
    };

    // Re-render with what the user typed
    let activity: Option<ActividadEstructura> = api.get_as("actividades-estructura", activity_id).await.ok();
    let mut ctx = PageContext::build(&session, &user, req.path())?;
    let lists = report_lists(&api, &mut ctx).await;
    let fields = report_fields(|name, _| form::value_of(&pairs, name).to_string(), &lists)?;
    let back = activity
        .as_ref()
        .map(|a| format!("/estructuras/{}/actividades", a.id_estructura))
        .unwrap_or_else(|| "/proyectos".to_string());
    render(ReportFormTemplate {
        ctx,
        activity_name: activity.as_ref().map(activity_title).unwrap_or_default(),
        form_action: format!("/actividades/{activity_id}/reporte"),
        cancel_href: back,
        is_update: activity.as_ref().is_some_and(|a| a.id_reporte.is_some()),
        fields,
        errors,
    })
}

fn save_error(e: &ApiError) -> String {
    format!("Error al guardar el reporte: {}", e.user_message())
}

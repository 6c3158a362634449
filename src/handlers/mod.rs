pub mod auth_handlers;
pub mod crud_handlers;
pub mod proyecto_handlers;

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::session::CurrentUser;
use crate::backend::{ApiClient, ApiError, SnapshotStore};
use crate::progress::{Aggregator, Level};
use crate::errors::AppError;
use crate::templates_structs::{NotFoundTemplate, PageContext};
use crate::table::view::ViewLinks;
use crate::table::{Column, DataTable, TableOptions, TableState};

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

/// Seconds before a page whose list timed out reloads itself.
const RETRY_SECS: u32 = 5;

/// Outcome of loading one table's rows.
pub(crate) struct ListFetch {
    pub items: Vec<Value>,
    /// Banner text for a failed fetch.
    pub error: Option<String>,
    /// The backend timed out and nothing was shown before: the table renders
    /// its loading row and the page retries.
    pub pending: bool,
}

impl ListFetch {
    fn loaded(items: Vec<Value>) -> Self {
        Self { items, error: None, pending: false }
    }

    /// Last good copy under `key` (or nothing), plus the banner.
    fn fallback(snapshots: &SnapshotStore, key: &str, e: &ApiError) -> Self {
        let kept = snapshots.get(key);
        let pending = e.is_timeout() && kept.is_none();
        Self { items: kept.unwrap_or_default(), error: Some(e.user_message()), pending }
    }

    /// Carry the banner and retry onto the page.
    pub fn annotate(&self, ctx: PageContext) -> PageContext {
        let ctx = match &self.error {
            Some(msg) => ctx.with_error(msg.clone()),
            None => ctx,
        };
        if self.pending { ctx.with_refresh(RETRY_SECS) } else { ctx }
    }

    pub fn mark(&self, table: &mut DataTable) {
        table.set_loading(self.pending);
    }
}

/// Fetch a list, falling back to the last good copy when the backend fails.
pub(crate) async fn fetch_list(api: &ApiClient, snapshots: &SnapshotStore, endpoint: &str) -> ListFetch {
    match api.list(endpoint).await {
        Ok(items) => {
            snapshots.store(endpoint, &items);
            ListFetch::loaded(items)
        }
        Err(e) => {
            log::error!("Listing {endpoint} failed: {e}");
            ListFetch::fallback(snapshots, endpoint, &e)
        }
    }
}

/// Children of one parent, with the same fallback as `fetch_list`. Each
/// parent keeps its own snapshot.
pub(crate) async fn fetch_children(
    agg: &Aggregator<'_>,
    snapshots: &SnapshotStore,
    parent_id: i64,
    level: Level,
) -> ListFetch {
    let key = format!("{}?{}={parent_id}", level.children_endpoint(), level.parent_field());
    match agg.load_children(parent_id, level).await {
        Ok(items) => {
            snapshots.store(&key, &items);
            ListFetch::loaded(items)
        }
        Err(e) => {
            log::error!("Loading {} of {parent_id} failed: {e}", level.children_endpoint());
            ListFetch::fallback(snapshots, &key, &e)
        }
    }
}

pub(crate) fn links_for(req: &HttpRequest) -> ViewLinks {
    ViewLinks::new(req.path(), req.query_string())
}

/// Table over JSON items with its state restored from the request query.
pub(crate) fn table_for(
    columns: Vec<Column>,
    items: &[Value],
    options: TableOptions,
    links: &ViewLinks,
) -> DataTable {
    let prefix = options.url_prefix.clone();
    let mut table = DataTable::from_json(columns, items, "id").with_options(options);
    table.restore_state(TableState::from_query(&links.query, &prefix));
    table
}

pub(crate) fn table_options(prefix: &str, page_size: usize) -> TableOptions {
    TableOptions { page_size, url_prefix: prefix.to_string(), ..TableOptions::default() }
}

/// Fallback for unknown paths.
pub async fn not_found(
    req: HttpRequest,
    session: Session,
    user: Option<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let Some(user) = user else {
        return Ok(HttpResponse::NotFound().body("No encontrado"));
    };
    let body = askama::Template::render(&NotFoundTemplate {
        ctx: PageContext::build(&session, &user, req.path())?,
        message: format!("La página {} no existe.", req.path()),
    })?;
    Ok(HttpResponse::NotFound().content_type("text/html; charset=utf-8").body(body))
}

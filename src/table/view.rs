//! Flat render model for `templates/partials/table.html`.
//!
//! Everything the template needs is precomputed here as strings and flags,
//! including every link, so templates stay logic-free.

use super::state::{SortDir, TableState};
use super::{CellContent, ChipColor, DataTable, Row};

/// Where the table lives: request path plus the query it was rendered with.
#[derive(Debug, Clone, Default)]
pub struct ViewLinks {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl ViewLinks {
    pub fn new(path: &str, query_string: &str) -> Self {
        Self { path: path.to_string(), query: super::state::parse_query(query_string) }
    }

    /// Link to this page with the table's keys replaced by `state`.
    pub fn href(&self, state: &TableState, prefix: &str) -> String {
        let qs = state.merge_into_query(&self.query, prefix);
        if qs.is_empty() { self.path.clone() } else { format!("{}?{}", self.path, qs) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMethod {
    Get,
    Post,
}

/// Per-row action button.
#[derive(Debug, Clone)]
pub struct RowAction {
    pub label: String,
    pub icon: &'static str,
    pub href: String,
    pub method: ActionMethod,
    pub color: ChipColor,
    pub confirm: Option<String>,
}

impl RowAction {
    pub fn link(label: &str, icon: &'static str, href: String) -> Self {
        Self {
            label: label.to_string(),
            icon,
            href,
            method: ActionMethod::Get,
            color: ChipColor::Primary,
            confirm: None,
        }
    }

    /// POST form button with a confirmation prompt.
    pub fn destructive(label: &str, icon: &'static str, href: String, confirm: &str) -> Self {
        Self {
            label: label.to_string(),
            icon,
            href,
            method: ActionMethod::Post,
            color: ChipColor::Error,
            confirm: Some(confirm.to_string()),
        }
    }
}

pub struct HeaderView {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub sort_href: String,
    pub indicator: String,
    pub align: String,
}

pub struct CellView {
    pub kind: String,
    pub text: String,
    pub color_class: String,
    pub href: String,
    pub percent_label: String,
    pub percent_width: String,
    pub align: String,
    pub bold: bool,
}

pub struct ActionView {
    pub label: String,
    pub icon: String,
    pub href: String,
    pub is_post: bool,
    pub color_class: String,
    pub confirm: String,
}

pub struct RowView {
    pub id: String,
    pub href: String,
    pub selected: bool,
    pub cells: Vec<CellView>,
    pub actions: Vec<ActionView>,
}

pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
    pub gap: bool,
}

pub struct HiddenInput {
    pub name: String,
    pub value: String,
}

pub struct TableView {
    pub prefix: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub loading: bool,
    pub is_empty: bool,
    pub empty_message: String,
    pub colspan: usize,
    pub has_actions: bool,
    pub selectable: bool,
    pub searchable: bool,
    pub search_action: String,
    pub search_name: String,
    pub search_value: String,
    pub search_placeholder: String,
    pub hidden_inputs: Vec<HiddenInput>,
    pub paginated: bool,
    pub pages: Vec<PageLink>,
    pub prev_href: String,
    pub next_href: String,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

const PAGE_WINDOW: usize = 2;

impl TableView {
    /// Render model without row links or actions.
    pub fn plain(table: &DataTable, links: &ViewLinks) -> Self {
        Self::build(table, links, |_| None, |_| Vec::new())
    }

    pub fn build<H, A>(table: &DataTable, links: &ViewLinks, row_href: H, actions: A) -> Self
    where
        H: Fn(&Row) -> Option<String>,
        A: Fn(&Row) -> Vec<RowAction>,
    {
        let opts = table.options();
        let prefix = opts.url_prefix.as_str();
        let state = table.state();

        let headers = table
            .visible_columns()
            .map(|col| {
                let mut next = state.clone();
                next.toggle_sort(&col.key);
                let indicator = match &state.sort {
                    Some(s) if s.column == col.key => match s.dir {
                        SortDir::Asc => "▲",
                        SortDir::Desc => "▼",
                    },
                    _ => "",
                };
                HeaderView {
                    key: col.key.clone(),
                    label: col.header.clone(),
                    sortable: col.sortable,
                    sort_href: if col.sortable { links.href(&next, prefix) } else { String::new() },
                    indicator: indicator.to_string(),
                    align: col.effective_align().as_str().to_string(),
                }
            })
            .collect();

        let page_rows = table.page_rows();
        let rows: Vec<RowView> = page_rows
            .iter()
            .copied()
            .map(|row| RowView {
                id: row.id.clone(),
                href: row_href(row).unwrap_or_default(),
                selected: table.is_selected(&row.id),
                cells: table.visible_columns().map(|col| cell_view(col.content(row), col)).collect(),
                actions: actions(row).into_iter().map(action_view).collect(),
            })
            .collect();
        let has_actions = rows.iter().any(|r| !r.actions.is_empty());

        let page_count = table.page_count();
        let page = state.page.clamp(1, page_count);
        let page_href = |n: usize| {
            let mut st = state.clone();
            st.page = n;
            links.href(&st, prefix)
        };

        let search_name = format!("{prefix}_search");
        let page_name = format!("{prefix}_page");
        let hidden_inputs = links
            .query
            .iter()
            .filter(|(k, _)| *k != search_name && *k != page_name)
            .map(|(k, v)| HiddenInput { name: k.clone(), value: v.clone() })
            .collect();

        TableView {
            prefix: prefix.to_string(),
            headers,
            is_empty: rows.is_empty(),
            rows,
            loading: table.is_loading(),
            empty_message: opts.empty_message.clone(),
            colspan: table.colspan(has_actions),
            has_actions,
            selectable: opts.selectable,
            searchable: opts.searchable,
            search_action: links.path.clone(),
            search_name,
            search_value: state.search.clone(),
            search_placeholder: opts.search_placeholder.clone(),
            hidden_inputs,
            paginated: opts.paginated && page_count > 1,
            pages: page_window(page, page_count)
                .into_iter()
                .map(|n| match n {
                    Some(n) => PageLink { number: n, href: page_href(n), current: n == page, gap: false },
                    None => PageLink { number: 0, href: String::new(), current: false, gap: true },
                })
                .collect(),
            prev_href: if page > 1 { page_href(page - 1) } else { String::new() },
            next_href: if page < page_count { page_href(page + 1) } else { String::new() },
            page,
            page_count,
            total: table.filtered_count(),
        }
    }
}

fn cell_view(content: CellContent, col: &super::Column) -> CellView {
    let mut view = CellView {
        kind: "text".to_string(),
        text: String::new(),
        color_class: String::new(),
        href: String::new(),
        percent_label: String::new(),
        percent_width: String::new(),
        align: col.effective_align().as_str().to_string(),
        bold: col.bold,
    };
    match content {
        CellContent::Text(t) => view.text = t,
        CellContent::Chip { text, color } => {
            view.kind = "chip".to_string();
            view.text = text;
            view.color_class = color.css_class().to_string();
        }
        CellContent::Progress(p) => {
            let p = p.clamp(0.0, 100.0);
            view.kind = "progress".to_string();
            view.percent_label = format!("{}%", p.round() as i64);
            view.percent_width = format!("{p:.1}");
            view.color_class = progress_color(p).css_class().to_string();
        }
        CellContent::Link { text, href } => {
            view.kind = "link".to_string();
            view.text = text;
            view.href = href;
        }
    }
    view
}

pub fn progress_color(percent: f64) -> ChipColor {
    if percent >= 100.0 {
        ChipColor::Success
    } else if percent >= 50.0 {
        ChipColor::Info
    } else if percent > 0.0 {
        ChipColor::Warning
    } else {
        ChipColor::Default
    }
}

fn action_view(a: RowAction) -> ActionView {
    ActionView {
        label: a.label,
        icon: a.icon.to_string(),
        href: a.href,
        is_post: a.method == ActionMethod::Post,
        color_class: a.color.css_class().to_string(),
        confirm: a.confirm.unwrap_or_default(),
    }
}

/// Page numbers to show; `None` marks a gap.
fn page_window(current: usize, count: usize) -> Vec<Option<usize>> {
    if count <= 2 * PAGE_WINDOW + 3 {
        return (1..=count).map(Some).collect();
    }
    let lo = current.saturating_sub(PAGE_WINDOW).max(2);
    let hi = (current + PAGE_WINDOW).min(count - 1);
    let mut out = vec![Some(1)];
    if lo > 2 {
        out.push(None);
    }
    out.extend((lo..=hi).map(Some));
    if hi < count - 1 {
        out.push(None);
    }
    out.push(Some(count));
    out
}

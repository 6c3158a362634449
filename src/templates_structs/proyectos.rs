use askama::Template;

use super::PageContext;
use crate::models::form::FieldView;
use crate::progress::Percentage;
use crate::table::TableView;
use crate::table::view::progress_color;

/// Progress bar shown above a table.
pub struct ProgressSummary {
    pub label: String,
    pub percent_label: String,
    pub percent_width: String,
    pub color_class: String,
}

impl ProgressSummary {
    pub fn new(label: impl Into<String>, pct: Percentage) -> Self {
        Self {
            label: label.into(),
            percent_label: format!("{}%", pct.value().round() as i64),
            percent_width: format!("{:.1}", pct.value()),
            color_class: progress_color(pct.value()).css_class().to_string(),
        }
    }
}

/// One level of the project drill-down (board, conjuntos, structures, activities).
#[derive(Template)]
#[template(path = "proyectos/level.html")]
pub struct LevelTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub subtitle: String,
    pub back_href: String,
    pub summary: Option<ProgressSummary>,
    pub table: TableView,
}

#[derive(Template)]
#[template(path = "proyectos/report_form.html")]
pub struct ReportFormTemplate {
    pub ctx: PageContext,
    pub activity_name: String,
    pub form_action: String,
    pub cancel_href: String,
    pub is_update: bool,
    pub fields: Vec<FieldView>,
    pub errors: Vec<String>,
}

use askama::Template;

use super::PageContext;
use crate::models::form::FieldView;
use crate::table::TableView;

#[derive(Template)]
#[template(path = "crud/list.html")]
pub struct CrudListTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub singular: String,
    pub new_href: String,
    pub bulk_delete_action: String,
    pub table: TableView,
}

#[derive(Template)]
#[template(path = "crud/form.html")]
pub struct CrudFormTemplate {
    pub ctx: PageContext,
    pub form_title: String,
    pub form_action: String,
    pub cancel_href: String,
    pub fields: Vec<FieldView>,
    pub errors: Vec<String>,
}

pub mod entity;
pub mod form;
pub mod schema;

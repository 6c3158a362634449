//! Generic searchable / sortable / paginated table.
//!
//! The engine knows nothing about what the rows represent: callers describe
//! columns, hand over rows keyed by column, and get back filtered, sorted and
//! paginated slices plus a render model (`view::TableView`).

pub mod sort;
pub mod state;
pub mod view;

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

pub use self::state::{SortDir, SortSpec, TableState};
pub use self::view::TableView;

/// A single cell value as the engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

static NULL_CELL: CellValue = CellValue::Null;

impl CellValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::Text(s.clone()),
            // Joined references arrive as `{ "nombre": ... }`
            Value::Object(map) => match map.get("nombre") {
                Some(Value::String(s)) => CellValue::Text(s.clone()),
                _ => CellValue::Text(v.to_string()),
            },
            Value::Array(_) => CellValue::Text(v.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Numeric view of the value; text is parsed when it looks like a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => if *b { "Sí".to_string() } else { "No".to_string() },
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

/// Color of a status chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChipColor {
    #[default]
    Default,
    Primary,
    Secondary,
    Error,
    Info,
    Success,
    Warning,
}

impl ChipColor {
    pub fn css_class(self) -> &'static str {
        match self {
            ChipColor::Default => "chip-default",
            ChipColor::Primary => "chip-primary",
            ChipColor::Secondary => "chip-secondary",
            ChipColor::Error => "chip-error",
            ChipColor::Info => "chip-info",
            ChipColor::Success => "chip-success",
            ChipColor::Warning => "chip-warning",
        }
    }
}

/// Value → color table for chip columns. Unmapped values get `fallback`.
#[derive(Debug, Clone, Default)]
pub struct ChipMapping {
    pub colors: Vec<(String, ChipColor)>,
    pub fallback: ChipColor,
}

impl ChipMapping {
    pub fn new(colors: &[(&str, ChipColor)]) -> Self {
        Self {
            colors: colors.iter().map(|(v, c)| (v.to_string(), *c)).collect(),
            fallback: ChipColor::Default,
        }
    }

    pub fn color_for(&self, value: &str) -> ChipColor {
        self.colors
            .iter()
            .find(|(v, _)| v.eq_ignore_ascii_case(value))
            .map(|(_, c)| *c)
            .unwrap_or(self.fallback)
    }
}

/// What a custom renderer produces for one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Chip { text: String, color: ChipColor },
    Progress(f64),
    Link { text: String, href: String },
}

pub type CellRenderer = fn(&Row) -> CellContent;
pub type RowFilter = fn(&Row, &str) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub key: String,
    pub header: String,
    pub sortable: bool,
    pub numeric: bool,
    pub bold: bool,
    pub hidden: bool,
    pub align: Option<Align>,
    pub chip: Option<ChipMapping>,
    pub renderer: Option<CellRenderer>,
}

impl Column {
    pub fn new(key: &str, header: &str) -> Self {
        Self {
            key: key.to_string(),
            header: header.to_string(),
            sortable: true,
            numeric: false,
            bold: false,
            hidden: false,
            align: None,
            chip: None,
            renderer: None,
        }
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn chip(mut self, mapping: ChipMapping) -> Self {
        self.chip = Some(mapping);
        self
    }

    pub fn render_with(mut self, renderer: CellRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn effective_align(&self) -> Align {
        self.align.unwrap_or(if self.numeric { Align::Right } else { Align::Left })
    }

    /// Render one cell of `row` for this column.
    pub fn content(&self, row: &Row) -> CellContent {
        if let Some(render) = self.renderer {
            return render(row);
        }
        let text = row.get(&self.key).display();
        match &self.chip {
            Some(mapping) if !text.is_empty() => CellContent::Chip {
                color: mapping.color_for(&text),
                text,
            },
            _ => CellContent::Text(text),
        }
    }
}

/// One record: a unique id plus values keyed by column key.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub values: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), values: BTreeMap::new() }
    }

    pub fn with(mut self, key: &str, value: impl Into<CellValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<CellValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> &CellValue {
        self.values.get(key).unwrap_or(&NULL_CELL)
    }

    pub fn id_number(&self) -> Option<i64> {
        self.id.parse().ok()
    }

    /// Build a row from a JSON object. Column keys may be dotted paths
    /// (`ciudad.nombre`). Returns `None` when the id field is missing.
    pub fn from_json(obj: &Value, id_field: &str, columns: &[Column]) -> Option<Row> {
        let id = match lookup_path(obj, id_field)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let mut row = Row::new(id);
        for col in columns {
            let value = lookup_path(obj, &col.key)
                .map(CellValue::from_json)
                .unwrap_or(CellValue::Null);
            row.values.insert(col.key.clone(), value);
        }
        Some(row)
    }

    /// Default search predicate: any non-null value whose text contains `term`
    /// (case-insensitive).
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.values
            .values()
            .filter(|v| !v.is_null())
            .any(|v| v.display().to_lowercase().contains(&needle))
    }
}

pub fn lookup_path<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(obj, |cur, part| cur.get(part))
}

#[derive(Debug, Clone)]
pub struct TableOptions {
    pub page_size: usize,
    pub searchable: bool,
    pub selectable: bool,
    pub paginated: bool,
    pub url_prefix: String,
    pub empty_message: String,
    pub search_placeholder: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            searchable: true,
            selectable: false,
            paginated: true,
            url_prefix: "table".to_string(),
            empty_message: "No hay datos disponibles".to_string(),
            search_placeholder: "Buscar...".to_string(),
        }
    }
}

pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
    state: TableState,
    selected: BTreeSet<String>,
    options: TableOptions,
    custom_filter: Option<RowFilter>,
    loading: bool,
}

impl DataTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            state: TableState::default(),
            selected: BTreeSet::new(),
            options: TableOptions::default(),
            custom_filter: None,
            loading: false,
        }
    }

    /// Build from raw backend objects, skipping those without an id.
    pub fn from_json(columns: Vec<Column>, items: &[Value], id_field: &str) -> Self {
        let rows = items
            .iter()
            .filter_map(|obj| Row::from_json(obj, id_field, &columns))
            .collect();
        Self::new(columns, rows)
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self.state.page = self.state.page.clamp(1, self.page_count());
        self
    }

    pub fn with_custom_filter(mut self, filter: RowFilter) -> Self {
        self.custom_filter = Some(filter);
        self
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Replace the data. Selection does not survive a reload.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.selected.clear();
        self.state.page = self.state.page.clamp(1, self.page_count());
    }

    /// Adopt a state restored from the address, reconciled against the data:
    /// unknown or unsortable sort keys are dropped and the page is clamped.
    pub fn restore_state(&mut self, mut state: TableState) {
        if let Some(spec) = &state.sort {
            let sortable = self.columns.iter().any(|c| c.key == spec.column && c.sortable);
            if !sortable {
                state.sort = None;
            }
        }
        self.state = state;
        self.state.page = self.state.page.clamp(1, self.page_count());
    }

    pub fn search(&mut self, term: &str) {
        self.state.set_search(term);
    }

    pub fn sort(&mut self, key: &str) {
        if self.columns.iter().any(|c| c.key == key && c.sortable) {
            self.state.toggle_sort(key);
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.clamp(1, self.page_count());
    }

    pub fn filtered(&self) -> Vec<&Row> {
        let term = self.state.search.trim();
        if term.is_empty() {
            return self.rows.iter().collect();
        }
        match self.custom_filter {
            Some(filter) => self.rows.iter().filter(|r| filter(r, term)).collect(),
            None => self.rows.iter().filter(|r| r.matches(term)).collect(),
        }
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered().len()
    }

    /// Filtered rows in display order.
    pub fn sorted(&self) -> Vec<&Row> {
        let mut rows = self.filtered();
        if let Some(spec) = &self.state.sort {
            let numeric = self
                .columns
                .iter()
                .find(|c| c.key == spec.column)
                .is_some_and(|c| c.numeric);
            rows.sort_by(|a, b| {
                sort::compare_cells(a.get(&spec.column), b.get(&spec.column), spec.dir, numeric)
            });
        }
        rows
    }

    pub fn page_count(&self) -> usize {
        if !self.options.paginated {
            return 1;
        }
        page_count(self.filtered_count(), self.options.page_size)
    }

    /// Rows of the current page, or all sorted rows when pagination is off.
    pub fn page_rows(&self) -> Vec<&Row> {
        let rows = self.sorted();
        if !self.options.paginated {
            return rows;
        }
        let size = self.options.page_size.max(1);
        let start = (self.state.page.max(1) - 1) * size;
        rows.into_iter().skip(start).take(size).collect()
    }

    pub fn select(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Select every filtered row, or clear when they are all selected already.
    pub fn select_all(&mut self) {
        let ids: Vec<String> = self.filtered().iter().map(|r| r.id.clone()).collect();
        let all_selected = !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id));
        if all_selected {
            self.selected.clear();
        } else {
            self.selected.extend(ids);
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Columns spanned by a full-width body row (empty / loading).
    pub fn colspan(&self, has_actions: bool) -> usize {
        self.visible_columns().count()
            + usize::from(self.options.selectable)
            + usize::from(has_actions)
    }
}

/// `max(1, ceil(n / size))`
pub fn page_count(n: usize, size: usize) -> usize {
    n.div_ceil(size.max(1)).max(1)
}

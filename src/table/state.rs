//! Table view state and its round trip through the query string.
//!
//! Keys are namespaced by a caller prefix so several tables can share one
//! page: `{prefix}_search`, `{prefix}_page`, `{prefix}_sort_key`,
//! `{prefix}_sort_dir`. Defaults are never written (page 1, no search, no sort).

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDir::Asc),
            "desc" => Some(SortDir::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    pub column: String,
    pub dir: SortDir,
}

impl SortSpec {
    /// Both key and direction must be present and valid.
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Option<Self> {
        let column = sort.map(str::trim).filter(|s| !s.is_empty())?;
        let dir = SortDir::parse(dir?)?;
        Some(SortSpec { column: column.to_string(), dir })
    }

    pub fn dir_str(&self) -> &'static str {
        self.dir.as_str()
    }

    pub fn toggle_dir(&self) -> &'static str {
        match self.dir {
            SortDir::Asc => "desc",
            SortDir::Desc => "asc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub search: String,
    pub page: usize,
    pub sort: Option<SortSpec>,
}

impl Default for TableState {
    fn default() -> Self {
        Self { search: String::new(), page: 1, sort: None }
    }
}

impl TableState {
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.page = 1;
    }

    /// Same key ascending → descending; any other case restarts ascending.
    pub fn toggle_sort(&mut self, key: &str) {
        let dir = match &self.sort {
            Some(s) if s.column == key && s.dir == SortDir::Asc => SortDir::Desc,
            _ => SortDir::Asc,
        };
        self.sort = Some(SortSpec { column: key.to_string(), dir });
        self.page = 1;
    }

    /// Read the prefixed keys out of decoded query pairs.
    pub fn from_query(pairs: &[(String, String)], prefix: &str) -> Self {
        let get = |suffix: &str| {
            let key = format!("{prefix}_{suffix}");
            pairs.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
        };
        let page = get("page")
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        Self {
            search: get("search").unwrap_or("").to_string(),
            page,
            sort: SortSpec::from_params(get("sort_key"), get("sort_dir")),
        }
    }

    pub fn to_query_pairs(&self, prefix: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push((format!("{prefix}_search"), self.search.clone()));
        }
        if self.page > 1 {
            pairs.push((format!("{prefix}_page"), self.page.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push((format!("{prefix}_sort_key"), sort.column.clone()));
            pairs.push((format!("{prefix}_sort_dir"), sort.dir_str().to_string()));
        }
        pairs
    }

    /// Query string with this table's keys replaced and everything else kept.
    pub fn merge_into_query(&self, existing: &[(String, String)], prefix: &str) -> String {
        let mut pairs: Vec<(String, String)> = existing
            .iter()
            .filter(|(k, _)| !is_table_key(k, prefix))
            .cloned()
            .collect();
        pairs.extend(self.to_query_pairs(prefix));
        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }
}

pub fn is_table_key(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|suffix| matches!(suffix, "search" | "page" | "sort_key" | "sort_dir"))
}

/// Decode a raw query string into ordered pairs; malformed input yields none.
pub fn parse_query(qs: &str) -> Vec<(String, String)> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(qs).unwrap_or_default()
}

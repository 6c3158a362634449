use std::cmp::Ordering;

use super::CellValue;
use super::state::SortDir;

/// Compare two cells for display order.
///
/// Null cells go last in both directions. Numbers sort before text and
/// compare numerically (text is parsed first when the column is numeric);
/// text uses `locale_cmp`.
pub fn compare_cells(a: &CellValue, b: &CellValue, dir: SortDir, numeric: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = compare_values(a, b, numeric);
            match dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        }
    }
}

enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(v: &CellValue, numeric: bool) -> SortKey {
    match v {
        CellValue::Number(n) => SortKey::Number(*n),
        CellValue::Text(_) if numeric => match v.as_number() {
            Some(n) => SortKey::Number(n),
            None => SortKey::Text(v.display()),
        },
        _ => SortKey::Text(v.display()),
    }
}

fn compare_values(a: &CellValue, b: &CellValue, numeric: bool) -> Ordering {
    match (sort_key(a, numeric), sort_key(b, numeric)) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Text(x), SortKey::Text(y)) => locale_cmp(&x, &y),
    }
}

/// Spanish-friendly string collation: accents and case are ignored first,
/// then the raw text breaks ties so the order stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

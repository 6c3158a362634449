use chrono::NaiveDate;

/// Validate a national id (cédula): 5-12 digits.
pub fn validate_cedula(cedula: &str) -> Option<String> {
    let trimmed = cedula.trim();
    if trimmed.is_empty() {
        return Some("La cédula es obligatoria".to_string());
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some("La cédula solo puede contener números".to_string());
    }
    if !(5..=12).contains(&trimmed.len()) {
        return Some("La cédula debe tener entre 5 y 12 dígitos".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} es obligatorio"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} admite como máximo {max_len} caracteres"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} admite como máximo {max_len} caracteres"));
    }
    None
}

pub fn parse_integer(value: &str, field_name: &str) -> Result<i64, String> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("{field_name} debe ser un número entero"))
}

pub fn parse_number(value: &str, field_name: &str) -> Result<f64, String> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| format!("{field_name} debe ser un número"))
}

/// Dates come from `<input type="date">` as `YYYY-MM-DD`.
pub fn parse_date(value: &str, field_name: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{field_name} debe ser una fecha válida (AAAA-MM-DD)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cedula_rules() {
        assert!(validate_cedula("1032456789").is_none());
        assert!(validate_cedula(" 12345 ").is_none());
        assert!(validate_cedula("").is_some());
        assert!(validate_cedula("12a45").is_some());
        assert!(validate_cedula("1234").is_some());
        assert!(validate_cedula("1234567890123").is_some());
    }

    #[test]
    fn required_counts_characters_not_bytes() {
        assert!(validate_required("Ñandú", "Nombre", 5).is_none());
        assert!(validate_required("   ", "Nombre", 5).is_some());
        assert!(validate_required("abcdef", "Nombre", 5).is_some());
        assert!(validate_optional("", "Descripción", 3).is_none());
    }

    #[test]
    fn numbers_and_dates() {
        assert_eq!(parse_integer(" 42 ", "Índice"), Ok(42));
        assert!(parse_integer("4.2", "Índice").is_err());
        assert_eq!(parse_number("2,5", "Área"), Ok(2.5));
        assert!(parse_number("NaN", "Área").is_err());
        assert_eq!(
            parse_date("2024-02-29", "Inicio"),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(parse_date("2023-02-29", "Inicio").is_err());
        assert!(parse_date("29/02/2024", "Inicio").is_err());
    }
}

use std::fmt;

/// Failure talking to the backend REST service.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Connection refused, DNS failure, broken body stream.
    Network(String),
    /// No answer within the configured backend timeout.
    Timeout(String),
    /// Non-2xx response, with the optional JSON `message` the backend sent.
    Status { status: u16, message: Option<String> },
    /// The body did not have the expected shape (e.g. no array for a list).
    Shape(String),
    /// The request could not be built (payload not serializable).
    InvalidRequest(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout(_))
    }

    /// Text suitable for the dismissible error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "No se pudo conectar con el servidor. Verifique su conexión.".to_string()
            }
            ApiError::Timeout(_) => {
                "El servidor está tardando en responder. Se reintentará en unos segundos.".to_string()
            }
            ApiError::Status { message: Some(m), .. } if !m.trim().is_empty() => m.clone(),
            ApiError::Status { status, .. } => {
                let reason = reqwest::StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("error");
                format!("El servidor respondió {status} ({reason})")
            }
            ApiError::Shape(_) => "Respuesta inesperada del servidor".to_string(),
            ApiError::InvalidRequest(m) => m.clone(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "Backend unreachable: {e}"),
            ApiError::Timeout(e) => write!(f, "Backend timed out: {e}"),
            ApiError::Status { status, message: Some(m) } => write!(f, "Backend returned {status}: {m}"),
            ApiError::Status { status, message: None } => write!(f, "Backend returned {status}"),
            ApiError::Shape(e) => write!(f, "Unexpected backend response: {e}"),
            ApiError::InvalidRequest(e) => write!(f, "Invalid request: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(e.to_string())
        } else if e.is_decode() {
            ApiError::Shape(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status { status: status.as_u16(), message: None }
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Shape(e.to_string())
    }
}

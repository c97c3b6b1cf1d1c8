use thiserror::Error;

/// Failure of a single gateway call.
///
/// The display text is what ends up in error cards and panels, so it is
/// kept short and in the dashboard's language.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status. `label` prefixes the code in the message.
    #[error("{label} {code}")]
    Status { label: &'static str, code: u16 },

    #[error("Respuesta inválida: {0}")]
    Decode(#[from] serde_json::Error),

    /// The body parsed but lacks a block or series the caller needs.
    #[error("Respuesta incompleta: falta {0}")]
    Malformed(&'static str),

    #[error("No hay datos de clima")]
    MissingWeather,

    #[error("URL inválida: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    pub fn status(label: &'static str, status: reqwest::StatusCode) -> Self {
        Self::Status {
            label,
            code: status.as_u16(),
        }
    }

    /// HTTP status code, when the failure was a non-success response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_carries_code() {
        let err = GatewayError::status("HTTP", reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(err.status_code(), Some(500));

        let err = GatewayError::status("Error del servidor:", reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Error del servidor: 502");
    }

    #[test]
    fn non_status_errors_have_no_code() {
        assert_eq!(GatewayError::MissingWeather.status_code(), None);
    }
}

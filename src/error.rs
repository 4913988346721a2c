use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dataset not loaded. Please initialize the system.")]
    DatasetNotInitialized,

    #[error("Dataset is empty after cleaning")]
    EmptyDataset,

    /// Internal to the resolver chain: a tier's series was too small.
    /// Escalates to the next fallback tier and is never surfaced raw.
    #[error("Not enough data for {key}: {rows} rows, need {min}")]
    InsufficientData { key: String, rows: usize, min: usize },

    #[error("No price signal: no scraped, marketplace or historical price available")]
    MissingPriceSignal,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no column could be resolved as the text column")]
    Schema,

    #[error("file '{filename}' could not be decoded under any attempted encoding")]
    Encoding { filename: String },

    #[error("file extension '{extension}' is not in the accepted set")]
    UnsupportedFileType { extension: String },

    #[error("reviewer '{reviewer_id}' already reviewed item '{data_id}'")]
    DuplicateReview {
        data_id: String,
        reviewer_id: String,
    },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("operation requires the '{required}' role")]
    Permission { required: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl CoreError {
    /// Stable machine-checkable identifier for API payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Schema => "schema_error",
            CoreError::Encoding { .. } => "encoding_error",
            CoreError::UnsupportedFileType { .. } => "unsupported_file_type",
            CoreError::DuplicateReview { .. } => "duplicate_review",
            CoreError::NotFound { .. } => "not_found",
            CoreError::Permission { .. } => "permission_denied",
            CoreError::Database(_) => "database_error",
            CoreError::Migration(_) => "migration_error",
            CoreError::Json(_) => "json_error",
            CoreError::Csv(_) => "csv_error",
            CoreError::Spreadsheet(_) => "spreadsheet_error",
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        CoreError::NotFound { what: what.into() }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

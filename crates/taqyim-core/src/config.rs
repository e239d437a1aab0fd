//! Deployment configuration, resolved once at startup and passed explicitly
//! into the ingestion pipeline.

/// Knobs for one deployment's ingestion behavior.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// File extensions (lowercase, no dot) accepted for upload.
    pub allowed_extensions: Vec<String>,
    /// Minimum mean value length before the fallback text-column heuristic
    /// is allowed to pick a column.
    pub text_length_threshold: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["csv".into(), "xlsx".into(), "xls".into()],
            text_length_threshold: 20.0,
        }
    }
}

impl IngestConfig {
    pub fn allows(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.').to_lowercase();
        self.allowed_extensions.iter().any(|e| *e == extension)
    }
}

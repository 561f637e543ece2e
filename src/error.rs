use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;

#[derive(Debug, Error)]
pub enum SqlTemplateError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template contains no statement: {0}")]
    EmptyTemplate(String),

    #[error(
        "Statement execution failed in template '{template_id}': {message} (params: {params})"
    )]
    StatementExecutionFailed {
        /// Text of the backend error, unchanged
        message: String,
        template_id: String,
        /// JSON rendering of the bound parameter set
        params: String,
    },

    #[error("Hydration error: {0}")]
    HydrationError(String),

    #[error("Invalid pager configuration: {0}")]
    InvalidPagerConfiguration(String),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Parameter binding error: {0}")]
    ParameterError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl SqlTemplateError {
    /// Wrap a backend failure with the template id and the rendered parameter set.
    #[must_use]
    pub fn statement_failed(
        source: &SqlTemplateError,
        template_id: &str,
        params: &crate::types::ParamSet,
    ) -> Self {
        SqlTemplateError::StatementExecutionFailed {
            message: source.to_string(),
            template_id: template_id.to_string(),
            params: params.to_json_string(),
        }
    }

    /// True for errors callers should treat as programming/configuration mistakes.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SqlTemplateError::TemplateNotFound(_)
                | SqlTemplateError::EmptyTemplate(_)
                | SqlTemplateError::InvalidPagerConfiguration(_)
                | SqlTemplateError::ConfigError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParamSet, RowValues};

    #[test]
    fn statement_failed_keeps_backend_text_and_template() {
        let mut params = ParamSet::new();
        params.insert("id", RowValues::Int(7));
        let backend = SqlTemplateError::Other("no such table: widgets".into());
        let err = SqlTemplateError::statement_failed(&backend, "widgets/by_id", &params);

        let msg = err.to_string();
        assert!(msg.contains("no such table: widgets"));
        assert!(msg.contains("widgets/by_id"));
        assert!(msg.contains("\"id\":7"));
        assert!(!err.is_configuration_error());
    }
}

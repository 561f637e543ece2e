use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SqlTemplateError;
use crate::template::{FsTemplateSource, TemplateStore};

/// Options for wiring an engine to a template directory and a database.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineOptions {
    pub template_dir: PathBuf,
    pub template_extension: String,
    /// `None` or `":memory:"` for an in-memory database
    pub database_path: Option<String>,
    pub default_per_page: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("sql"),
            template_extension: "sql".to_string(),
            database_path: None,
            default_per_page: 10,
        }
    }
}

impl EngineOptions {
    #[must_use]
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            ..Self::default()
        }
    }

    /// Read options from a JSON file; missing keys take their defaults.
    ///
    /// # Errors
    /// `Io` when the file cannot be read, `ConfigError` when it is not valid JSON
    /// or the options fail validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SqlTemplateError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let opts: Self = serde_json::from_str(&text).map_err(|e| {
            SqlTemplateError::ConfigError(format!("{}: {e}", path.display()))
        })?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// `ConfigError` when `default_per_page` is zero.
    pub fn validate(&self) -> Result<(), SqlTemplateError> {
        if self.default_per_page == 0 {
            return Err(SqlTemplateError::ConfigError(
                "default_per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn template_store(&self) -> TemplateStore {
        TemplateStore::new(
            FsTemplateSource::new(self.template_dir.clone())
                .with_extension(self.template_extension.clone()),
        )
    }
}

/// Fluent builder for engine options.
#[derive(Debug, Clone)]
pub struct EngineOptionsBuilder {
    opts: EngineOptions,
}

impl EngineOptionsBuilder {
    #[must_use]
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            opts: EngineOptions::new(template_dir),
        }
    }

    #[must_use]
    pub fn from_options(opts: EngineOptions) -> Self {
        Self { opts }
    }

    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.opts.template_extension = extension.into();
        self
    }

    #[must_use]
    pub fn database(mut self, path: impl Into<String>) -> Self {
        self.opts.database_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn default_per_page(mut self, per_page: usize) -> Self {
        self.opts.default_per_page = per_page;
        self
    }

    #[must_use]
    pub fn finish(self) -> EngineOptions {
        self.opts
    }

    /// Open the SQLite database and return a ready executor.
    ///
    /// # Errors
    /// `ConfigError` for invalid options, `SqliteError` if the database cannot be opened.
    #[cfg(feature = "sqlite")]
    pub fn build(
        self,
    ) -> Result<crate::executor::QueryExecutor<crate::sqlite::SqliteBackend>, SqlTemplateError>
    {
        use crate::sqlite::SqliteBackend;

        let opts = self.finish();
        opts.validate()?;
        let backend = match opts.database_path.as_deref() {
            None | Some(":memory:") => SqliteBackend::open_in_memory()?,
            Some(path) => SqliteBackend::open(path)?,
        };
        tracing::debug!(
            template_dir = %opts.template_dir.display(),
            database = ?opts.database_path,
            "engine configured"
        );
        Ok(crate::executor::QueryExecutor::new(opts.template_store(), backend))
    }
}

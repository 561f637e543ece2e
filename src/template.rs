//! Template Store: resolves a template id to SQL text and splits it.
//!
//! Templates are read fresh on every call; nothing is cached here.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::SqlTemplateError;
use crate::statement::{Statement, split_statements, trim_single};

/// Where template text comes from.
pub trait TemplateSource: Send + Sync {
    /// Read the raw text for `template_id`, or `Ok(None)` when there is no such template.
    ///
    /// # Errors
    ///
    /// Returns `SqlTemplateError::Io` when the resource exists but cannot be read.
    fn read(&self, template_id: &str) -> Result<Option<String>, SqlTemplateError>;
}

/// Templates stored as files under a root directory: `<root>/<id>.<extension>`.
///
/// Ids may contain `/` to reach nested directories; parent (`..`) and absolute
/// components are refused.
#[derive(Debug, Clone)]
pub struct FsTemplateSource {
    root: PathBuf,
    extension: String,
}

impl FsTemplateSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "sql".to_string(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location for an id, or `None` if the id escapes the root.
    #[must_use]
    pub fn path_for(&self, template_id: &str) -> Option<PathBuf> {
        let relative = Path::new(template_id);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        let file = if self.extension.is_empty() {
            template_id.to_string()
        } else {
            format!("{template_id}.{}", self.extension)
        };
        Some(self.root.join(file))
    }
}

impl TemplateSource for FsTemplateSource {
    fn read(&self, template_id: &str) -> Result<Option<String>, SqlTemplateError> {
        let Some(path) = self.path_for(template_id) else {
            return Ok(None);
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SqlTemplateError::Io(e)),
        }
    }
}

/// Templates held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateSource {
    templates: HashMap<String, String>,
}

impl MemoryTemplateSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, template_id: impl Into<String>, sql: impl Into<String>) -> Self {
        self.insert(template_id, sql);
        self
    }

    pub fn insert(&mut self, template_id: impl Into<String>, sql: impl Into<String>) {
        self.templates.insert(template_id.into(), sql.into());
    }
}

impl TemplateSource for MemoryTemplateSource {
    fn read(&self, template_id: &str) -> Result<Option<String>, SqlTemplateError> {
        Ok(self.templates.get(template_id).cloned())
    }
}

/// Loads templates from a [`TemplateSource`].
pub struct TemplateStore {
    source: Box<dyn TemplateSource>,
}

impl fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateStore").finish_non_exhaustive()
    }
}

impl TemplateStore {
    #[must_use]
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    /// Shorthand for a filesystem store rooted at `root` with `.sql` files.
    #[must_use]
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(FsTemplateSource::new(root))
    }

    fn read(&self, template_id: &str) -> Result<String, SqlTemplateError> {
        self.source
            .read(template_id)?
            .ok_or_else(|| SqlTemplateError::TemplateNotFound(template_id.to_string()))
    }

    /// Load and split a template into its statements, in source order.
    ///
    /// # Errors
    ///
    /// * `TemplateNotFound` when the source has nothing for `template_id`
    /// * `EmptyTemplate` when the first statement is empty
    pub fn load(&self, template_id: &str) -> Result<Vec<Statement>, SqlTemplateError> {
        let text = self.read(template_id)?;
        let parts = split_statements(&text);
        if parts.first().is_none_or(String::is_empty) {
            return Err(SqlTemplateError::EmptyTemplate(template_id.to_string()));
        }
        Ok(parts.into_iter().map(Statement::new).collect())
    }

    /// Load a template as one statement, trimming terminators and whitespace at the edges.
    ///
    /// # Errors
    ///
    /// * `TemplateNotFound` when the source has nothing for `template_id`
    /// * `EmptyTemplate` when nothing but whitespace and terminators remain
    pub fn load_single(&self, template_id: &str) -> Result<String, SqlTemplateError> {
        let text = self.read(template_id)?;
        let trimmed = trim_single(&text);
        if trimmed.is_empty() {
            return Err(SqlTemplateError::EmptyTemplate(template_id.to_string()));
        }
        Ok(trimmed.to_string())
    }
}

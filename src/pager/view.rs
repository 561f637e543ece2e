use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use super::PerPage;
use crate::backend::Backend;
use crate::error::SqlTemplateError;
use crate::hydrate::{EntityRegistry, FetchMode, HydratedRow, Hydrator};
use crate::types::ParamSet;

lazy_static! {
    // trailing `LIMIT n [OFFSET m]` or `LIMIT m, n`; operands are integers or named parameters
    static ref TRAILING_LIMIT: Regex = Regex::new(
        r"(?is)\s+limit\s+(?:\d+|[:@$]\w+)(?:\s*(?:,|\s+offset\s+)\s*(?:\d+|[:@$]\w+))?\s*$"
    )
    .expect("valid regex");
}

/// Statement without its trailing `LIMIT ... [OFFSET ...]` clause.
fn without_limit(sql: &str) -> &str {
    match TRAILING_LIMIT.find(sql) {
        Some(m) => &sql[..m.start()],
        None => sql,
    }
}

/// Count of every row the statement matches, ignoring its own LIMIT/OFFSET.
///
/// The statement sits on its own lines so a trailing `--` comment cannot
/// swallow the closing parenthesis.
#[must_use]
pub fn count_sql(sql: &str) -> String {
    format!(
        "SELECT COUNT(*) AS pager_total FROM (\n{}\n) AS pager_count",
        without_limit(sql)
    )
}

/// Rows of the 1-based page `index`.
#[must_use]
pub fn slice_sql(sql: &str, index: usize, per_page: usize) -> String {
    let offset = index.saturating_sub(1).saturating_mul(per_page);
    format!(
        "SELECT * FROM (\n{}\n) AS pager_slice LIMIT {per_page} OFFSET {offset}",
        without_limit(sql)
    )
}

/// One page of hydrated rows plus its position.
#[derive(Debug)]
pub struct Page {
    rows: Vec<HydratedRow>,
    index: usize,
    per_page: usize,
    total_count: usize,
}

impl Page {
    #[must_use]
    pub fn rows(&self) -> &[HydratedRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HydratedRow> {
        self.rows.iter()
    }

    /// 1-based page index
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.per_page)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.index.saturating_mul(self.per_page) < self.total_count
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.index > 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'p> IntoIterator for &'p Page {
    type Item = &'p HydratedRow;
    type IntoIter = std::slice::Iter<'p, HydratedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Lazily evaluated, index-addressable pages over a SELECT statement.
///
/// `count()` and each `page(i)` hit the backend at most once; later calls are
/// served from the caches. The view is meant for one thread at a time.
pub struct Pager<'a> {
    sql: String,
    backend: &'a mut dyn Backend,
    registry: &'a EntityRegistry,
    params: ParamSet,
    per_page: usize,
    mode: FetchMode,
    template_id: String,
    total: Option<usize>,
    pages: HashMap<usize, Page>,
}

impl fmt::Debug for Pager<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("template_id", &self.template_id)
            .field("per_page", &self.per_page)
            .field("total", &self.total)
            .field("cached_pages", &self.pages.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Pager<'a> {
    /// Build a view over `sql`. No query runs until `count` or `page` is called.
    ///
    /// # Errors
    /// `InvalidPagerConfiguration` when `per_page` cannot be resolved from `params`.
    pub fn new(
        sql: impl Into<String>,
        backend: &'a mut dyn Backend,
        registry: &'a EntityRegistry,
        params: ParamSet,
        per_page: &PerPage,
        mode: FetchMode,
    ) -> Result<Self, SqlTemplateError> {
        let per_page = per_page.resolve(&params)?;
        Ok(Self {
            sql: sql.into(),
            backend,
            registry,
            params,
            per_page,
            mode,
            template_id: "<inline>".to_string(),
            total: None,
            pages: HashMap::new(),
        })
    }

    /// Name used in error messages.
    #[must_use]
    pub fn with_template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = template_id.into();
        self
    }

    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Total rows the statement matches, computed once by the backend.
    ///
    /// # Errors
    /// `StatementExecutionFailed` when the count query fails or returns no integer.
    pub fn count(&mut self) -> Result<usize, SqlTemplateError> {
        if let Some(total) = self.total {
            return Ok(total);
        }
        let sql = count_sql(&self.sql);
        tracing::debug!(template_id = %self.template_id, sql = %sql, "pager count query");
        let cursor = self.run(&sql)?;
        let total = cursor
            .results
            .first()
            .and_then(|row| row.get_by_index(0))
            .and_then(|v| v.as_usize())
            .ok_or_else(|| {
                SqlTemplateError::statement_failed(
                    &SqlTemplateError::Other("count query returned no row count".to_string()),
                    &self.template_id,
                    &self.params,
                )
            })?;
        self.total = Some(total);
        Ok(total)
    }

    /// Number of pages, at least 0.
    ///
    /// # Errors
    /// Same as [`Pager::count`].
    pub fn total_pages(&mut self) -> Result<usize, SqlTemplateError> {
        Ok(self.count()?.div_ceil(self.per_page))
    }

    /// The 1-based page `index`, hydrated with the view's fetch mode.
    ///
    /// Pages past the end are empty. A cached page is returned as is.
    ///
    /// # Errors
    ///
    /// * `InvalidPagerConfiguration` for index 0
    /// * `StatementExecutionFailed` when the count or slice query fails
    /// * `HydrationError` from the fetch mode
    pub fn page(&mut self, index: usize) -> Result<&Page, SqlTemplateError> {
        if index == 0 {
            return Err(SqlTemplateError::InvalidPagerConfiguration(
                "page indexes start at 1".to_string(),
            ));
        }
        if !self.pages.contains_key(&index) {
            let total_count = self.count()?;
            let sql = slice_sql(&self.sql, index, self.per_page);
            tracing::debug!(template_id = %self.template_id, index, sql = %sql, "pager slice query");
            let cursor = self.run(&sql)?;
            let rows = Hydrator::new(self.registry).hydrate(&cursor, &self.mode)?;
            self.pages.insert(
                index,
                Page {
                    rows,
                    index,
                    per_page: self.per_page,
                    total_count,
                },
            );
        }
        self.pages.get(&index).ok_or_else(|| {
            SqlTemplateError::Other(format!("page {index} missing from cache"))
        })
    }

    /// Whether page `index` is already cached.
    #[must_use]
    pub fn is_cached(&self, index: usize) -> bool {
        self.pages.contains_key(&index)
    }

    fn run(&mut self, sql: &str) -> Result<crate::results::ResultSet, SqlTemplateError> {
        self.backend.run(sql, &self.params).map_err(|err| {
            tracing::warn!(template_id = %self.template_id, error = %err, "pager query failed");
            SqlTemplateError::statement_failed(&err, &self.template_id, &self.params)
        })
    }
}

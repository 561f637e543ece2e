use crate::backend::Backend;
use crate::error::SqlTemplateError;
use crate::hydrate::{EntityRegistry, FetchMode, HydratedRow, Hydrator};
use crate::normalizer::{NoopNormalizer, ParamNormalizer};
use crate::pager::{Pager, PerPage};
use crate::profiler::{Profiler, TracingProfiler};
use crate::results::ResultSet;
use crate::template::TemplateStore;
use crate::type_resolver::{MethodDescriptor, resolve};
use crate::types::ParamSet;

/// What one template execution hands back.
#[derive(Debug)]
pub enum ExecutionResult {
    /// The last statement was not a SELECT/WITH
    Empty { rows_affected: usize },
    /// Every hydrated row, possibly none
    RowList(Vec<HydratedRow>),
    /// First hydrated row; `None` when the query matched nothing
    Row(Option<HydratedRow>),
}

impl ExecutionResult {
    /// Hydrated rows; empty for `Empty` and for `Row(None)`.
    #[must_use]
    pub fn into_rows(self) -> Vec<HydratedRow> {
        match self {
            ExecutionResult::Empty { .. } | ExecutionResult::Row(None) => Vec::new(),
            ExecutionResult::RowList(rows) => rows,
            ExecutionResult::Row(Some(row)) => vec![row],
        }
    }

    /// First row, if any.
    #[must_use]
    pub fn into_first(self) -> Option<HydratedRow> {
        match self {
            ExecutionResult::Empty { .. } => None,
            ExecutionResult::RowList(rows) => rows.into_iter().next(),
            ExecutionResult::Row(row) => row,
        }
    }

    #[must_use]
    pub fn is_data(&self) -> bool {
        !matches!(self, ExecutionResult::Empty { .. })
    }

    #[must_use]
    pub fn rows_affected(&self) -> usize {
        match self {
            ExecutionResult::Empty { rows_affected } => *rows_affected,
            ExecutionResult::RowList(rows) => rows.len(),
            ExecutionResult::Row(row) => usize::from(row.is_some()),
        }
    }
}

/// Runs named templates against a backend and hydrates what they return.
///
/// One call runs to completion before returning. The backend is borrowed for
/// that call only; the cursor of the last statement stays readable through
/// [`QueryExecutor::last_cursor`] until the next call starts.
pub struct QueryExecutor<B: Backend> {
    store: TemplateStore,
    backend: B,
    registry: EntityRegistry,
    normalizer: Box<dyn ParamNormalizer>,
    profiler: Box<dyn Profiler>,
    last_cursor: Option<ResultSet>,
}

impl<B: Backend> QueryExecutor<B> {
    #[must_use]
    pub fn new(store: TemplateStore, backend: B) -> Self {
        Self {
            store,
            backend,
            registry: EntityRegistry::new(),
            normalizer: Box::new(NoopNormalizer),
            profiler: Box::new(TracingProfiler::default()),
            last_cursor: None,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: EntityRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: impl ParamNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    #[must_use]
    pub fn with_profiler(mut self, profiler: impl Profiler + 'static) -> Self {
        self.profiler = Box::new(profiler);
        self
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Raw cursor of the last statement of the most recent call whose
    /// statements all succeeded, hydration failures included.
    #[must_use]
    pub fn last_cursor(&self) -> Option<&ResultSet> {
        self.last_cursor.as_ref()
    }

    /// Run every statement of `template_id` in order and hydrate the final one.
    ///
    /// Only the last executed statement decides whether rows come back: its
    /// comment-stripped text must start with `SELECT` or `WITH`. Blank
    /// fragments between terminators are skipped.
    ///
    /// # Errors
    ///
    /// * `TemplateNotFound` / `EmptyTemplate` from the template store
    /// * `StatementExecutionFailed` for the first statement the backend rejects;
    ///   later statements are not run
    /// * `HydrationError` when `mode` cannot build a row
    pub fn execute(
        &mut self,
        template_id: &str,
        params: &ParamSet,
        mode: &FetchMode,
    ) -> Result<ExecutionResult, SqlTemplateError> {
        self.last_cursor = None;
        let statements = self.store.load(template_id)?;
        let mut params = params.clone();
        self.normalizer.normalize(&mut params);

        self.profiler.start();
        let mut last = None;
        for statement in statements.iter().filter(|s| !s.is_blank()) {
            tracing::trace!(template_id, sql = statement.raw(), "running statement");
            match self.backend.run(statement.raw(), &params) {
                Ok(cursor) => last = Some((statement, cursor)),
                Err(err) => {
                    tracing::warn!(template_id, error = %err, "statement failed");
                    return Err(SqlTemplateError::statement_failed(&err, template_id, &params));
                }
            }
        }
        self.profiler.log(template_id, &params);

        let Some((statement, cursor)) = last else {
            return Ok(ExecutionResult::Empty { rows_affected: 0 });
        };
        // the cursor stays readable even when hydration fails
        let cursor = self.last_cursor.insert(cursor);
        if statement.is_data_returning() {
            Ok(ExecutionResult::RowList(
                Hydrator::new(&self.registry).hydrate(cursor, mode)?,
            ))
        } else {
            Ok(ExecutionResult::Empty {
                rows_affected: cursor.rows_affected,
            })
        }
    }

    /// Like [`QueryExecutor::execute`], keeping only the first row.
    ///
    /// # Errors
    /// Same as [`QueryExecutor::execute`].
    pub fn execute_one(
        &mut self,
        template_id: &str,
        params: &ParamSet,
        mode: &FetchMode,
    ) -> Result<ExecutionResult, SqlTemplateError> {
        Ok(match self.execute(template_id, params, mode)? {
            ExecutionResult::RowList(rows) => ExecutionResult::Row(rows.into_iter().next()),
            other => other,
        })
    }

    /// Execute with the fetch mode the type resolver derives for `method`.
    ///
    /// # Errors
    /// Same as [`QueryExecutor::execute`].
    pub fn execute_method(
        &mut self,
        template_id: &str,
        method: &MethodDescriptor,
        params: &ParamSet,
    ) -> Result<ExecutionResult, SqlTemplateError> {
        let mode = resolve(method, &self.registry).fetch_mode();
        self.execute(template_id, params, &mode)
    }

    /// Wrap a SELECT template in a lazily evaluated [`Pager`].
    ///
    /// Nothing runs against the backend here; `per_page` is resolved eagerly.
    ///
    /// # Errors
    ///
    /// * `TemplateNotFound` / `EmptyTemplate` from the template store
    /// * `InvalidPagerConfiguration` when `per_page` cannot be resolved
    pub fn paginate(
        &mut self,
        template_id: &str,
        params: &ParamSet,
        per_page: &PerPage,
        mode: FetchMode,
    ) -> Result<Pager<'_>, SqlTemplateError> {
        let sql = self.store.load_single(template_id)?;
        let mut params = params.clone();
        self.normalizer.normalize(&mut params);
        self.last_cursor = None;
        Ok(
            Pager::new(sql, &mut self.backend, &self.registry, params, per_page, mode)?
                .with_template_id(template_id),
        )
    }
}

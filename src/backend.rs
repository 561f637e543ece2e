use crate::error::SqlTemplateError;
use crate::results::ResultSet;
use crate::types::ParamSet;

/// A connection able to run one statement with named parameters.
///
/// Implementations materialize rows for statements that produce columns and
/// report `rows_affected` for the rest. The engine borrows the backend for the
/// duration of a call and never retries.
pub trait Backend {
    /// Run `sql`, binding every placeholder it references from `params`.
    ///
    /// # Errors
    ///
    /// Any driver failure: malformed SQL, constraint violation, missing parameter.
    fn run(&mut self, sql: &str, params: &ParamSet) -> Result<ResultSet, SqlTemplateError>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn run(&mut self, sql: &str, params: &ParamSet) -> Result<ResultSet, SqlTemplateError> {
        (**self).run(sql, params)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn run(&mut self, sql: &str, params: &ParamSet) -> Result<ResultSet, SqlTemplateError> {
        (**self).run(sql, params)
    }
}

use std::fmt;
use std::path::Path;

use rusqlite::Connection;

use super::params::bind_named;
use super::query::build_result_set;
use crate::backend::Backend;
use crate::error::SqlTemplateError;
use crate::results::ResultSet;
use crate::types::ParamSet;

/// `Backend` over a single rusqlite connection.
pub struct SqliteBackend {
    conn: Connection,
}

impl fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteBackend {
    /// Open (or create) a database file.
    ///
    /// # Errors
    /// Returns `SqlTemplateError::SqliteError` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqlTemplateError> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns `SqlTemplateError::SqliteError` if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqlTemplateError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Run a batch of setup SQL outside the template path (schema, fixtures).
    ///
    /// # Errors
    /// Returns `SqlTemplateError::SqliteError` if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlTemplateError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

impl Backend for SqliteBackend {
    fn run(&mut self, sql: &str, params: &ParamSet) -> Result<ResultSet, SqlTemplateError> {
        let mut stmt = self.conn.prepare(sql)?;
        bind_named(&mut stmt, params)?;
        build_result_set(&mut stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowValues;

    fn backend() -> SqliteBackend {
        let b = SqliteBackend::open_in_memory().unwrap();
        b.execute_batch("CREATE TABLE todo (id INTEGER PRIMARY KEY, title TEXT, done BOOLEAN);")
            .unwrap();
        b
    }

    #[test]
    fn dml_reports_rows_affected() {
        let mut b = backend();
        let params = ParamSet::new().with("title", "run").with("done", false);
        let res = b
            .run("INSERT INTO todo (title, done) VALUES (:title, :done)", &params)
            .unwrap();
        assert_eq!(res.rows_affected, 1);
        assert!(res.is_empty());
    }

    #[test]
    fn select_keeps_column_order() {
        let mut b = backend();
        b.execute_batch("INSERT INTO todo (title, done) VALUES ('walk', 1);").unwrap();
        let res = b
            .run("SELECT done, title, id FROM todo WHERE title = @title", &ParamSet::new().with("title", "walk"))
            .unwrap();
        assert_eq!(
            res.get_column_names().unwrap().as_slice(),
            &["done".to_string(), "title".to_string(), "id".to_string()]
        );
        assert_eq!(res.results[0].rows[1], RowValues::Text("walk".into()));
        assert_eq!(res.results[0].get("done").and_then(RowValues::as_bool), Some(&true));
    }

    #[test]
    fn missing_parameter_is_a_binding_error() {
        let mut b = backend();
        let err = b.run("SELECT * FROM todo WHERE id = :id", &ParamSet::new()).unwrap_err();
        assert!(matches!(err, SqlTemplateError::ParameterError(msg) if msg.contains(":id")));
    }

    #[test]
    fn anonymous_placeholder_is_rejected() {
        let mut b = backend();
        let err = b.run("SELECT * FROM todo WHERE id = ?", &ParamSet::new()).unwrap_err();
        assert!(matches!(err, SqlTemplateError::ParameterError(_)));
    }
}

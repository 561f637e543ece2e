//! Run named SQL templates and get rows back as records, entities, or a lazily
//! evaluated paginated view.
//!
//! ```rust,no_run
//! use sql_template::prelude::*;
//!
//! # fn demo() -> Result<(), SqlTemplateError> {
//! let mut exec = EngineOptionsBuilder::new("sql").database("app.db").build()?;
//! let params = ParamSet::new().with("done", false);
//! let rows = exec.execute("todo/open", &params, &FetchMode::Default)?.into_rows();
//!
//! let mut pager = exec.paginate("todo/open", &params, &PerPage::Fixed(20), FetchMode::Default)?;
//! let page = pager.page(1)?;
//! # let _ = (rows, page.has_next());
//! # Ok(()) }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
pub mod hydrate;
pub mod normalizer;
pub mod pager;
pub mod prelude;
pub mod profiler;
pub mod results;
pub mod statement;
pub mod template;
pub mod type_resolver;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::Backend;
pub use error::SqlTemplateError;
pub use executor::{ExecutionResult, QueryExecutor};
pub use hydrate::{FetchMode, HydratedRow};
pub use pager::{Page, Pager, PerPage};
pub use results::{CustomDbRow, ResultSet};
pub use template::TemplateStore;
pub use types::{ParamSet, RowValues, ToParam};

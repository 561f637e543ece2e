//! Pagination View over a SELECT statement.
//!
//! The count and the slice of each page are separate queries that only run
//! when first asked for, and are then kept for the life of the [`Pager`].

pub mod render;
pub mod view;

pub use render::render_navigation;
pub use view::{Page, Pager, count_sql, slice_sql};

use crate::error::SqlTemplateError;
use crate::types::ParamSet;

/// Items per page: a literal, or the name of a parameter holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerPage {
    Fixed(usize),
    Param(String),
}

impl PerPage {
    /// Resolve to a positive count against the call's parameters.
    ///
    /// # Errors
    /// `InvalidPagerConfiguration` when the parameter is missing, not an
    /// integer, or the count is zero.
    pub fn resolve(&self, params: &ParamSet) -> Result<usize, SqlTemplateError> {
        let n = match self {
            PerPage::Fixed(n) => *n,
            PerPage::Param(name) => {
                let value = params.get(name).ok_or_else(|| {
                    SqlTemplateError::InvalidPagerConfiguration(format!(
                        "per-page parameter {name} is not in the parameter set"
                    ))
                })?;
                value.as_usize().ok_or_else(|| {
                    SqlTemplateError::InvalidPagerConfiguration(format!(
                        "per-page parameter {name} is not a non-negative integer: {value:?}"
                    ))
                })?
            }
        };
        if n == 0 {
            return Err(SqlTemplateError::InvalidPagerConfiguration(
                "items per page must be at least 1".to_string(),
            ));
        }
        Ok(n)
    }
}

impl From<usize> for PerPage {
    fn from(n: usize) -> Self {
        PerPage::Fixed(n)
    }
}

impl From<&str> for PerPage {
    fn from(name: &str) -> Self {
        PerPage::Param(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowValues;

    #[test]
    fn param_reference_resolves() {
        let params = ParamSet::new().with("limit", 10_i64).with("text", "25");
        assert_eq!(PerPage::from("limit").resolve(&params).unwrap(), 10);
        assert_eq!(PerPage::from(":text").resolve(&params).unwrap(), 25);
        assert_eq!(PerPage::from(5).resolve(&params).unwrap(), 5);
    }

    #[test]
    fn absent_or_bad_reference_is_rejected() {
        let params = ParamSet::new().with("word", "ten").with("none", RowValues::Null);
        for per_page in [PerPage::from("missing"), PerPage::from("word"), PerPage::from("none"), PerPage::Fixed(0)] {
            assert!(matches!(
                per_page.resolve(&params),
                Err(SqlTemplateError::InvalidPagerConfiguration(_))
            ));
        }
    }
}

use std::fmt;
use std::sync::Arc;

use super::HydratedRow;
use super::entity::{DependencyResolver, FactoryObject};
use crate::error::SqlTemplateError;
use crate::types::RowValues;

pub type RowFactoryFn = Arc<dyn Fn(&[RowValues]) -> Result<HydratedRow, String> + Send + Sync>;

/// How raw rows become return values. Exactly one strategy per execution.
#[derive(Clone, Default)]
pub enum FetchMode {
    /// One associative record per row
    #[default]
    Default,
    /// One instance of the named, registered class per row
    ClassHydration(String),
    /// A free function called with the row's columns
    FunctionFactory(RowFactoryFn),
    /// A method on a prepared factory instance, called with the row's columns
    MethodFactory {
        instance: Arc<dyn FactoryObject>,
        method: String,
    },
}

impl fmt::Debug for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Default => f.write_str("Default"),
            FetchMode::ClassHydration(name) => f.debug_tuple("ClassHydration").field(name).finish(),
            FetchMode::FunctionFactory(_) => f.write_str("FunctionFactory(..)"),
            FetchMode::MethodFactory { method, .. } => f
                .debug_struct("MethodFactory")
                .field("method", method)
                .finish_non_exhaustive(),
        }
    }
}

impl FetchMode {
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        FetchMode::ClassHydration(name.into())
    }

    pub fn function<F>(factory: F) -> Self
    where
        F: Fn(&[RowValues]) -> Result<HydratedRow, String> + Send + Sync + 'static,
    {
        FetchMode::FunctionFactory(Arc::new(factory))
    }

    #[must_use]
    pub fn method(instance: Arc<dyn FactoryObject>, method: impl Into<String>) -> Self {
        FetchMode::MethodFactory {
            instance,
            method: method.into(),
        }
    }

    /// Resolve the factory instance through `resolver`, then bind `method` on it.
    ///
    /// # Errors
    /// `HydrationError` when the resolver has no instance for `type_name`.
    pub fn method_from(
        resolver: &dyn DependencyResolver,
        type_name: &str,
        method: impl Into<String>,
    ) -> Result<Self, SqlTemplateError> {
        let instance = resolver.resolve(type_name).ok_or_else(|| {
            SqlTemplateError::HydrationError(format!("no factory instance for {type_name}"))
        })?;
        Ok(Self::method(instance, method))
    }
}

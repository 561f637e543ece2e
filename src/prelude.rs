//! Convenient imports for common functionality.

pub use crate::backend::Backend;
pub use crate::config::{EngineOptions, EngineOptionsBuilder};
pub use crate::error::SqlTemplateError;
pub use crate::executor::{ExecutionResult, QueryExecutor};
pub use crate::hydrate::{
    DependencyResolver, EntityClass, EntityRegistry, FactoryContainer, FactoryObject, FetchMode,
    FieldValues, HydratedRow,
};
pub use crate::normalizer::{
    DefaultsNormalizer, NormalizerChain, ParamDefault, ParamNormalizer, TimestampNormalizer,
};
pub use crate::pager::{Page, Pager, PerPage, render_navigation};
pub use crate::profiler::{NoopProfiler, Profiler, TracingProfiler};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::template::{FsTemplateSource, MemoryTemplateSource, TemplateSource, TemplateStore};
pub use crate::type_resolver::{HydrationTarget, MethodDescriptor};
pub use crate::types::{ParamSet, RowValues, ToParam};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteBackend;

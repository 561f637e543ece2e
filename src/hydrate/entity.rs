use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::mapping::{FieldValues, constructor_arguments, field_assignments};
use super::HydratedRow;
use crate::error::SqlTemplateError;
use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Any value a hydration strategy can produce.
///
/// Implemented for every `Debug + Send + Sync + 'static` type; hydrated rows
/// carry entities boxed and callers downcast them back.
pub trait Entity: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + fmt::Debug + Send + Sync> Entity for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

pub type ConstructorFn =
    Arc<dyn Fn(&[RowValues]) -> Result<Box<dyn Entity>, String> + Send + Sync>;
pub type FieldBuilderFn =
    Arc<dyn Fn(&FieldValues) -> Result<Box<dyn Entity>, String> + Send + Sync>;

/// How instances of a class are built from a row.
#[derive(Clone)]
pub enum Construction {
    /// Columns are passed positionally; only the first `arity` are used.
    Constructor { arity: usize, build: ConstructorFn },
    /// Columns are assigned to fields by name.
    Fields {
        fields: Vec<String>,
        /// Also map `snake_case` columns onto `camelCase` fields
        snake_case_columns: bool,
        build: FieldBuilderFn,
    },
}

/// A named, constructible entity type.
#[derive(Clone)]
pub struct EntityClass {
    name: String,
    construction: Construction,
}

impl fmt::Debug for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("EntityClass");
        d.field("name", &self.name);
        match &self.construction {
            Construction::Constructor { arity, .. } => d.field("arity", arity),
            Construction::Fields {
                fields,
                snake_case_columns,
                ..
            } => d
                .field("fields", fields)
                .field("snake_case_columns", snake_case_columns),
        };
        d.finish()
    }
}

impl EntityClass {
    /// A class whose constructor takes `arity` positional arguments.
    pub fn with_constructor<T, F>(name: impl Into<String>, arity: usize, build: F) -> Self
    where
        T: Entity,
        F: Fn(&[RowValues]) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            construction: Construction::Constructor {
                arity,
                build: Arc::new(move |args: &[RowValues]| {
                    build(args).map(|e| Box::new(e) as Box<dyn Entity>)
                }),
            },
        }
    }

    /// A class populated by field assignment.
    pub fn with_fields<T, F>(name: impl Into<String>, fields: &[&str], build: F) -> Self
    where
        T: Entity,
        F: Fn(&FieldValues) -> Result<T, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            construction: Construction::Fields {
                fields: fields.iter().map(|f| (*f).to_string()).collect(),
                snake_case_columns: false,
                build: Arc::new(move |values: &FieldValues| {
                    build(values).map(|e| Box::new(e) as Box<dyn Entity>)
                }),
            },
        }
    }

    /// Opt into mapping `snake_case` columns onto `camelCase` fields.
    /// No effect on constructor classes.
    #[must_use]
    pub fn snake_case_columns(mut self) -> Self {
        if let Construction::Fields {
            snake_case_columns, ..
        } = &mut self.construction
        {
            *snake_case_columns = true;
        }
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn construction(&self) -> &Construction {
        &self.construction
    }

    /// Build one instance from a row.
    ///
    /// # Errors
    ///
    /// `HydrationError` when the row has fewer columns than the constructor
    /// arity, when no column matches a field, or when the builder fails.
    pub fn construct(&self, row: &CustomDbRow) -> Result<Box<dyn Entity>, SqlTemplateError> {
        let built = match &self.construction {
            Construction::Constructor { arity, build } => {
                let args = constructor_arguments(row, *arity).map_err(|e| self.error(&e))?;
                build(args)
            }
            Construction::Fields {
                fields,
                snake_case_columns,
                build,
            } => {
                let values = field_assignments(row, fields, *snake_case_columns);
                if values.is_empty() {
                    return Err(self.error(&format!(
                        "no column of [{}] matches a field",
                        row.column_names.join(", ")
                    )));
                }
                build(&values)
            }
        };
        built.map_err(|e| self.error(&e))
    }

    fn error(&self, detail: &str) -> SqlTemplateError {
        SqlTemplateError::HydrationError(format!("cannot construct {}: {detail}", self.name))
    }
}

/// Type lookup used by the type resolver.
pub trait TypeLookup {
    fn type_exists(&self, name: &str) -> bool;
}

/// Named entity classes available to `ClassHydration`.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    classes: HashMap<String, Arc<EntityClass>>,
}

impl EntityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, replacing any previous class with the same name.
    pub fn register(&mut self, class: EntityClass) {
        self.classes.insert(class.name.clone(), Arc::new(class));
    }

    #[must_use]
    pub fn with(mut self, class: EntityClass) -> Self {
        self.register(class);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<EntityClass>> {
        self.classes.get(name)
    }

    /// Look up a class or fail with `HydrationError`.
    ///
    /// # Errors
    /// `HydrationError` when `name` is not registered.
    pub fn require(&self, name: &str) -> Result<&Arc<EntityClass>, SqlTemplateError> {
        self.get(name)
            .ok_or_else(|| SqlTemplateError::HydrationError(format!("unknown entity class {name}")))
    }
}

impl TypeLookup for EntityRegistry {
    fn type_exists(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }
}

/// An object exposing named factory methods.
pub trait FactoryObject: Send + Sync {
    /// Call `method` with the row's columns in order.
    /// `None` means the object has no such method.
    fn invoke(&self, method: &str, args: &[RowValues]) -> Option<Result<HydratedRow, String>>;
}

/// Supplies ready-to-use factory instances by type name.
pub trait DependencyResolver {
    fn resolve(&self, type_name: &str) -> Option<Arc<dyn FactoryObject>>;
}

/// Map-backed [`DependencyResolver`].
#[derive(Default)]
pub struct FactoryContainer {
    instances: HashMap<String, Arc<dyn FactoryObject>>,
}

impl FactoryContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, type_name: impl Into<String>, instance: Arc<dyn FactoryObject>) {
        self.instances.insert(type_name.into(), instance);
    }
}

impl DependencyResolver for FactoryContainer {
    fn resolve(&self, type_name: &str) -> Option<Arc<dyn FactoryObject>> {
        self.instances.get(type_name).cloned()
    }
}

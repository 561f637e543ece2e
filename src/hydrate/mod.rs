//! Result Hydrator: turns a raw [`ResultSet`] into the representation a
//! [`FetchMode`] asks for.
//!
//! Factory strategies receive columns positionally in SELECT order. Field
//! class hydration maps by column name.

pub mod entity;
pub mod fetch_mode;
pub mod mapping;

use std::any::Any;

pub use entity::{
    Construction, DependencyResolver, Entity, EntityClass, EntityRegistry, FactoryContainer,
    FactoryObject, TypeLookup,
};
pub use fetch_mode::FetchMode;
pub use mapping::FieldValues;

use crate::error::SqlTemplateError;
use crate::results::{CustomDbRow, ResultSet};

/// One hydrated row.
#[derive(Debug)]
pub enum HydratedRow {
    Record(CustomDbRow),
    Entity(Box<dyn Entity>),
}

impl HydratedRow {
    /// Wrap any value as an entity row.
    pub fn entity<T: Entity>(value: T) -> Self {
        HydratedRow::Entity(Box::new(value))
    }

    #[must_use]
    pub fn as_record(&self) -> Option<&CustomDbRow> {
        match self {
            HydratedRow::Record(row) => Some(row),
            HydratedRow::Entity(_) => None,
        }
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            HydratedRow::Entity(e) => <dyn Entity as Entity>::as_any(e.as_ref()).downcast_ref(),
            HydratedRow::Record(_) => None,
        }
    }

    /// Take the entity out as `T`, or get the row back if it is something else.
    ///
    /// # Errors
    /// Returns `self` unchanged when the row is a record or a different type.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self {
            HydratedRow::Entity(e) if <dyn Entity as Entity>::as_any(e.as_ref()).is::<T>() => {
                match <dyn Entity as Entity>::into_any(e).downcast::<T>() {
                    Ok(value) => Ok(*value),
                    Err(_) => unreachable!("type checked above"),
                }
            }
            other => Err(other),
        }
    }
}

/// Applies fetch modes, resolving class names against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Hydrator<'r> {
    registry: &'r EntityRegistry,
}

impl<'r> Hydrator<'r> {
    #[must_use]
    pub fn new(registry: &'r EntityRegistry) -> Self {
        Self { registry }
    }

    /// Hydrate every row of `result_set`, preserving row order.
    ///
    /// The result set is only read, so hydrating it again yields equal output.
    ///
    /// # Errors
    /// `HydrationError` for an unknown class, an arity or field mismatch, an
    /// undefined factory method, or a factory that reports failure.
    pub fn hydrate(
        &self,
        result_set: &ResultSet,
        mode: &FetchMode,
    ) -> Result<Vec<HydratedRow>, SqlTemplateError> {
        let rows = &result_set.results;
        match mode {
            FetchMode::Default => Ok(rows.iter().cloned().map(HydratedRow::Record).collect()),
            FetchMode::ClassHydration(name) => {
                let class = self.registry.require(name)?;
                rows.iter()
                    .map(|row| class.construct(row).map(HydratedRow::Entity))
                    .collect()
            }
            FetchMode::FunctionFactory(factory) => rows
                .iter()
                .map(|row| {
                    factory(row.rows.as_slice()).map_err(|e| {
                        SqlTemplateError::HydrationError(format!("row factory failed: {e}"))
                    })
                })
                .collect(),
            FetchMode::MethodFactory { instance, method } => rows
                .iter()
                .map(|row| match instance.invoke(method, row.rows.as_slice()) {
                    Some(result) => result.map_err(|e| {
                        SqlTemplateError::HydrationError(format!(
                            "factory method {method} failed: {e}"
                        ))
                    }),
                    None => Err(SqlTemplateError::HydrationError(format!(
                        "factory method {method} is not defined"
                    ))),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::types::RowValues;

    #[derive(Debug, PartialEq)]
    struct Todo {
        id: String,
        title: String,
    }

    #[derive(Debug, PartialEq)]
    struct Person {
        id: i64,
        first_name: String,
    }

    fn registry() -> EntityRegistry {
        EntityRegistry::new()
            .with(EntityClass::with_constructor("Todo", 2, |args| {
                Ok(Todo {
                    id: args[0].as_text().ok_or("id must be text")?.to_string(),
                    title: args[1].as_text().ok_or("title must be text")?.to_string(),
                })
            }))
            .with(
                EntityClass::with_fields("Person", &["id", "firstName"], |v| {
                    Ok(Person {
                        id: v.int("id").ok_or("missing id")?,
                        first_name: v.text("firstName").unwrap_or_default(),
                    })
                })
                .snake_case_columns(),
            )
    }

    fn todo_rows() -> ResultSet {
        ResultSet::from_rows(
            &["id", "title"],
            vec![vec![RowValues::Text("1".into()), RowValues::Text("run".into())]],
        )
    }

    #[test]
    fn default_mode_keeps_every_column_in_order() {
        let set = ResultSet::from_rows(
            &["b", "a", "c"],
            vec![
                vec![RowValues::Int(1), RowValues::Int(2), RowValues::Null],
                vec![RowValues::Int(3), RowValues::Int(4), RowValues::Null],
            ],
        );
        let reg = registry();
        let hydrator = Hydrator::new(&reg);
        let first = hydrator.hydrate(&set, &FetchMode::Default).unwrap();
        let second = hydrator.hydrate(&set, &FetchMode::Default).unwrap();
        assert_eq!(first.len(), 2);
        for (a, b) in first.iter().zip(second.iter()) {
            let rec = a.as_record().unwrap();
            assert_eq!(rec.len(), 3);
            let cols: Vec<&str> = rec.iter().map(|(c, _)| c).collect();
            assert_eq!(cols, vec!["b", "a", "c"]);
            assert_eq!(Some(rec), b.as_record());
        }
    }

    #[test]
    fn class_hydration_uses_positional_constructor() {
        let reg = registry();
        let rows = Hydrator::new(&reg)
            .hydrate(&todo_rows(), &FetchMode::class("Todo"))
            .unwrap();
        assert_eq!(
            rows.into_iter().next().unwrap().downcast::<Todo>().unwrap(),
            Todo {
                id: "1".into(),
                title: "run".into()
            }
        );
    }

    #[test]
    fn class_hydration_maps_snake_case_fields() {
        let set = ResultSet::from_rows(
            &["id", "first_name", "ignored"],
            vec![vec![RowValues::Int(4), RowValues::Text("Ada".into()), RowValues::Null]],
        );
        let reg = registry();
        let rows = Hydrator::new(&reg).hydrate(&set, &FetchMode::class("Person")).unwrap();
        assert_eq!(
            rows[0].downcast_ref::<Person>(),
            Some(&Person {
                id: 4,
                first_name: "Ada".into()
            })
        );
    }

    #[test]
    fn unknown_class_is_a_hydration_error() {
        let reg = registry();
        let err = Hydrator::new(&reg)
            .hydrate(&todo_rows(), &FetchMode::class("Nope"))
            .unwrap_err();
        assert!(matches!(err, SqlTemplateError::HydrationError(msg) if msg.contains("Nope")));
    }

    #[test]
    fn narrow_row_fails_constructor() {
        let set = ResultSet::from_rows(&["id"], vec![vec![RowValues::Text("1".into())]]);
        let reg = registry();
        let err = Hydrator::new(&reg).hydrate(&set, &FetchMode::class("Todo")).unwrap_err();
        assert!(matches!(err, SqlTemplateError::HydrationError(_)));
    }

    #[test]
    fn function_factory_gets_columns_in_select_order() {
        let reg = registry();
        let mode = FetchMode::function(|args| {
            Ok(HydratedRow::entity(format!(
                "{}:{}",
                args[0].as_text().unwrap_or_default(),
                args[1].as_text().unwrap_or_default()
            )))
        });
        let rows = Hydrator::new(&reg).hydrate(&todo_rows(), &mode).unwrap();
        assert_eq!(rows[0].downcast_ref::<String>().map(String::as_str), Some("1:run"));
    }

    struct Shelf {
        prefix: String,
    }

    impl FactoryObject for Shelf {
        fn invoke(
            &self,
            method: &str,
            args: &[RowValues],
        ) -> Option<Result<HydratedRow, String>> {
            match method {
                "label" => Some(
                    args.get(1)
                        .and_then(RowValues::as_text)
                        .map(|t| HydratedRow::entity(format!("{}{t}", self.prefix)))
                        .ok_or_else(|| "title missing".to_string()),
                ),
                _ => None,
            }
        }
    }

    #[test]
    fn method_factory_uses_instance_state() {
        let reg = registry();
        let mut container = FactoryContainer::new();
        container.bind("Shelf", Arc::new(Shelf { prefix: "#".into() }));
        let mode = FetchMode::method_from(&container, "Shelf", "label").unwrap();
        let rows = Hydrator::new(&reg).hydrate(&todo_rows(), &mode).unwrap();
        assert_eq!(rows[0].downcast_ref::<String>().map(String::as_str), Some("#run"));
    }

    #[test]
    fn undefined_factory_method_is_a_hydration_error() {
        let reg = registry();
        let mode = FetchMode::method(Arc::new(Shelf { prefix: String::new() }), "missing");
        let err = Hydrator::new(&reg).hydrate(&todo_rows(), &mode).unwrap_err();
        assert!(matches!(err, SqlTemplateError::HydrationError(msg) if msg.contains("not defined")));
    }

    #[test]
    fn unresolvable_factory_type_is_a_hydration_error() {
        let container = FactoryContainer::new();
        assert!(FetchMode::method_from(&container, "Shelf", "label").is_err());
    }
}

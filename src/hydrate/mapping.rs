//! Column-to-argument mapping for class hydration.
//!
//! Constructor classes take columns positionally, in SELECT order. Field
//! classes take columns by name: exact matches first, then `snake_case`
//! columns onto `camelCase` fields when the class opts in.

use std::collections::BTreeMap;

use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Positional constructor arguments: the first `arity` columns.
///
/// # Errors
/// Returns a description when the row is narrower than the constructor.
pub fn constructor_arguments(row: &CustomDbRow, arity: usize) -> Result<&[RowValues], String> {
    row.rows.get(..arity).ok_or_else(|| {
        format!(
            "constructor expects {arity} arguments but the row has {} columns",
            row.rows.len()
        )
    })
}

/// Values assigned to fields, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    values: BTreeMap<String, RowValues>,
}

impl FieldValues {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&RowValues> {
        self.values.get(field)
    }

    /// The field's value, or `Null` when no column mapped to it.
    #[must_use]
    pub fn get_or_null(&self, field: &str) -> RowValues {
        self.values.get(field).cloned().unwrap_or(RowValues::Null)
    }

    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(RowValues::as_text).map(str::to_string)
    }

    #[must_use]
    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(RowValues::as_int).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RowValues)> {
        self.values.iter()
    }
}

/// Assign row columns to the declared `fields`.
///
/// Columns with no matching field are skipped. An exact-name column always
/// wins over a converted `snake_case` one.
#[must_use]
pub fn field_assignments(row: &CustomDbRow, fields: &[String], snake_case: bool) -> FieldValues {
    let mut values = BTreeMap::new();
    for (column, value) in row.iter() {
        if fields.iter().any(|f| f == column) {
            values.insert(column.to_string(), value.clone());
        }
    }
    if snake_case {
        for (column, value) in row.iter() {
            let camel = snake_to_camel(column);
            if camel != column && fields.contains(&camel) {
                values.entry(camel).or_insert_with(|| value.clone());
            }
        }
    }
    FieldValues { values }
}

/// `created_at` -> `createdAt`. Leading underscores are kept.
#[must_use]
pub fn snake_to_camel(name: &str) -> String {
    let leading = name.len() - name.trim_start_matches('_').len();
    let mut out = String::with_capacity(name.len());
    out.push_str(&name[..leading]);
    let mut upper = false;
    for c in name[leading..].chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

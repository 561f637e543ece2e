use rusqlite::types::Value;

use crate::error::SqlTemplateError;
use crate::types::{ParamSet, RowValues, strip_sigil};

/// Convert a single `RowValue` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Bind every placeholder the statement references, by name, from `params`.
///
/// `:name`, `@name` and `$name` all look up `name`. Extra entries in `params`
/// are ignored.
///
/// # Errors
///
/// Returns `SqlTemplateError::ParameterError` for anonymous `?` placeholders or
/// names missing from `params`, and `SqliteError` if the driver rejects a value.
pub fn bind_named(
    stmt: &mut rusqlite::Statement<'_>,
    params: &ParamSet,
) -> Result<(), SqlTemplateError> {
    for idx in 1..=stmt.parameter_count() {
        let name = stmt.parameter_name(idx).map(str::to_owned).ok_or_else(|| {
            SqlTemplateError::ParameterError(format!(
                "anonymous placeholder at position {idx}; templates bind by name"
            ))
        })?;
        let value = params.get(&name).ok_or_else(|| {
            SqlTemplateError::ParameterError(format!(
                "no value supplied for placeholder {name} ({})",
                strip_sigil(&name)
            ))
        })?;
        stmt.raw_bind_parameter(idx, row_value_to_sqlite_value(value))?;
    }
    Ok(())
}

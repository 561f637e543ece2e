use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values that can be stored in a database row or bound as template parameters.
///
/// The same enum is used for both directions so hydration strategies and
/// parameter normalizers never need to know about driver types:
/// ```rust
/// use sql_template::prelude::*;
///
/// let mut params = ParamSet::new();
/// params.insert("id", RowValues::Int(1));
/// params.insert("name", RowValues::Text("alice".into()));
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RowValues::Float(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            RowValues::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Interpret the value as a count or size: integers, or text holding an integer.
    #[must_use]
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            RowValues::Int(i) => usize::try_from(*i).ok(),
            RowValues::Text(s) => s.trim().parse::<usize>().ok(),
            _ => None,
        }
    }

    /// JSON view used for diagnostics and the CLI output.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => JsonValue::from(*f),
            RowValues::Text(s) => JsonValue::from(s.as_str()),
            RowValues::Bool(b) => JsonValue::from(*b),
            RowValues::Timestamp(dt) => JsonValue::from(dt.format("%F %T%.f").to_string()),
            RowValues::Null => JsonValue::Null,
            RowValues::JSON(v) => v.clone(),
            RowValues::Blob(bytes) => {
                JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect())
            }
        }
    }
}

/// Conversion of a domain value into a bind-ready scalar.
pub trait ToParam {
    fn to_param(&self) -> RowValues;
}

impl ToParam for RowValues {
    fn to_param(&self) -> RowValues {
        self.clone()
    }
}

macro_rules! int_to_param {
    ($($t:ty),*) => {
        $(impl ToParam for $t {
            fn to_param(&self) -> RowValues {
                RowValues::Int(i64::from(*self))
            }
        })*
    };
}

int_to_param!(i8, i16, i32, i64, u8, u16, u32);

impl ToParam for f64 {
    fn to_param(&self) -> RowValues {
        RowValues::Float(*self)
    }
}

impl ToParam for bool {
    fn to_param(&self) -> RowValues {
        RowValues::Bool(*self)
    }
}

impl ToParam for str {
    fn to_param(&self) -> RowValues {
        RowValues::Text(self.to_string())
    }
}

impl ToParam for String {
    fn to_param(&self) -> RowValues {
        RowValues::Text(self.clone())
    }
}

impl ToParam for NaiveDateTime {
    fn to_param(&self) -> RowValues {
        RowValues::Timestamp(*self)
    }
}

impl ToParam for JsonValue {
    fn to_param(&self) -> RowValues {
        RowValues::JSON(self.clone())
    }
}

impl<T: ToParam + ?Sized> ToParam for &T {
    fn to_param(&self) -> RowValues {
        (**self).to_param()
    }
}

impl<T: ToParam> ToParam for Option<T> {
    fn to_param(&self) -> RowValues {
        match self {
            Some(v) => v.to_param(),
            None => RowValues::Null,
        }
    }
}

/// Named parameters bound to a template, keyed without the placeholder sigil.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    values: BTreeMap<String, RowValues>,
}

impl ParamSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter. A leading `:`, `@` or `$` on the name is ignored.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl ToParam) {
        self.values
            .insert(strip_sigil(name.as_ref()).to_string(), value.to_param());
    }

    /// Builder-style variant of [`ParamSet::insert`].
    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, value: impl ToParam) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        self.values.get(strip_sigil(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RowValues> {
        self.values.get_mut(strip_sigil(name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(strip_sigil(name))
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

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut RowValues)> {
        self.values.iter_mut()
    }

    /// JSON object view of the parameters, for diagnostics.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

impl<K: AsRef<str>, V: ToParam> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParamSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

pub(crate) fn strip_sigil(name: &str) -> &str {
    name.strip_prefix([':', '@', '$']).unwrap_or(name)
}

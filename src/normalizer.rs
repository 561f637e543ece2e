//! Parameter normalization ahead of binding.
//!
//! Normalizers run once per `execute`/`paginate` call, before any statement is
//! bound. They reduce domain values to scalars the backend understands and fill
//! in defaults for parameters the caller left out.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

use crate::types::{ParamSet, RowValues};

/// In-place transform of a parameter set.
pub trait ParamNormalizer: Send + Sync {
    fn normalize(&self, params: &mut ParamSet);
}

/// Leaves parameters untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNormalizer;

impl ParamNormalizer for NoopNormalizer {
    fn normalize(&self, _params: &mut ParamSet) {}
}

/// Renders timestamps and JSON values as text.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    format: String,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self {
            format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

impl TimestampNormalizer {
    #[must_use]
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl ParamNormalizer for TimestampNormalizer {
    fn normalize(&self, params: &mut ParamSet) {
        for (_, value) in params.iter_mut() {
            match value {
                RowValues::Timestamp(dt) => {
                    *value = RowValues::Text(dt.format(&self.format).to_string());
                }
                RowValues::JSON(json) => {
                    *value = RowValues::Text(json.to_string());
                }
                _ => {}
            }
        }
    }
}

/// Value substituted when a parameter is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    /// The local wall-clock time at normalization
    CurrentTime,
    /// A fresh random UUID, as hyphenated text
    GeneratedId,
    Value(RowValues),
}

impl ParamDefault {
    fn produce(&self) -> RowValues {
        match self {
            ParamDefault::CurrentTime => RowValues::Timestamp(now()),
            ParamDefault::GeneratedId => RowValues::Text(Uuid::new_v4().to_string()),
            ParamDefault::Value(v) => v.clone(),
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Fills absent parameters from a table of defaults. Present keys, even `NULL`, win.
#[derive(Debug, Clone, Default)]
pub struct DefaultsNormalizer {
    defaults: BTreeMap<String, ParamDefault>,
}

impl DefaultsNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, default: ParamDefault) -> Self {
        self.defaults.insert(name.into(), default);
        self
    }
}

impl ParamNormalizer for DefaultsNormalizer {
    fn normalize(&self, params: &mut ParamSet) {
        for (name, default) in &self.defaults {
            if !params.contains(name) {
                params.insert(name, default.produce());
            }
        }
    }
}

/// Runs several normalizers in order.
#[derive(Default)]
pub struct NormalizerChain {
    steps: Vec<Box<dyn ParamNormalizer>>,
}

impl NormalizerChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, step: impl ParamNormalizer + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }
}

impl ParamNormalizer for NormalizerChain {
    fn normalize(&self, params: &mut ParamSet) {
        for step in &self.steps {
            step.normalize(params);
        }
    }
}

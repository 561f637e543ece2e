//! Type Resolver: decides the hydration target of a query method from its
//! declared return type or, failing that, its documented collection element type.
//!
//! This is a pure function over a [`MethodDescriptor`]; it is meant to run once
//! when a query method is bound, not on every call.

use lazy_static::lazy_static;
use regex::Regex;

use crate::hydrate::{FetchMode, TypeLookup};

lazy_static! {
    static ref RETURN_TAG: Regex = Regex::new(r"@returns?\s+([^\s*]+)").expect("valid regex");
}

/// What the resolver knows about a query method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    /// Declared return type, e.g. `Todo` or `Vec<Todo>`
    pub return_type: Option<String>,
    /// Return documentation: either a bare type (`Todo[]`) or a doc block with `@return`
    pub return_doc: Option<String>,
}

impl MethodDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    #[must_use]
    pub fn documented(mut self, return_doc: impl Into<String>) -> Self {
        self.return_doc = Some(return_doc.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationTarget {
    /// Rows come back as associative records
    NoEntity,
    NamedEntity(String),
}

impl HydrationTarget {
    #[must_use]
    pub fn fetch_mode(&self) -> FetchMode {
        match self {
            HydrationTarget::NoEntity => FetchMode::Default,
            HydrationTarget::NamedEntity(name) => FetchMode::class(name.clone()),
        }
    }
}

/// Resolve the hydration target for `method`.
///
/// 1. A declared return type naming a known type wins.
/// 2. Otherwise the element type of a documented collection, if known.
/// 3. Otherwise [`HydrationTarget::NoEntity`].
#[must_use]
pub fn resolve(method: &MethodDescriptor, types: &dyn TypeLookup) -> HydrationTarget {
    if let Some(declared) = method.return_type.as_deref().map(str::trim) {
        if types.type_exists(declared) {
            return HydrationTarget::NamedEntity(declared.to_string());
        }
    }

    method
        .return_doc
        .as_deref()
        .and_then(documented_type)
        .and_then(|doc| collection_element(&doc))
        .filter(|element| types.type_exists(element))
        .map_or(HydrationTarget::NoEntity, HydrationTarget::NamedEntity)
}

/// The documented return type: the `@return` tag if present, else the whole text.
#[must_use]
pub fn documented_type(doc: &str) -> Option<String> {
    let text = match RETURN_TAG.captures(doc) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => doc.trim(),
    };
    (!text.is_empty()).then(|| text.to_string())
}

/// Element type of a collection type expression.
///
/// Understands `T[]`, generic wrappers such as `Vec<T>`, `list<T>` or
/// `array<int, T>` (last argument), nesting, and `|null` unions.
#[must_use]
pub fn collection_element(ty: &str) -> Option<String> {
    let ty = ty
        .split('|')
        .map(str::trim)
        .find(|part| !part.is_empty() && !part.eq_ignore_ascii_case("null"))?;
    let ty = ty.trim_start_matches('?');

    if let Some(inner) = ty.strip_suffix("[]") {
        let inner = inner.trim();
        return (!inner.is_empty()).then(|| inner.to_string());
    }

    let open = ty.find('<')?;
    let inner = ty[open + 1..].strip_suffix('>')?;
    let last = last_generic_argument(inner)?;
    if last.contains('<') || last.ends_with("[]") {
        collection_element(last)
    } else {
        Some(last.to_string())
    }
}

fn last_generic_argument(args: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => start = i + 1,
            _ => {}
        }
    }
    let last = args[start..].trim();
    (!last.is_empty()).then_some(last)
}

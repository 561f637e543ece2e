// SQLite module - provides the rusqlite-backed `Backend`
//
// - params: conversion of middleware values into SQLite values and named binding
// - query: result extraction and building
// - backend: the `Backend` implementation over a `rusqlite::Connection`

pub mod backend;
pub mod params;
pub mod query;

pub use backend::SqliteBackend;
pub use params::{bind_named, row_value_to_sqlite_value};
pub use query::{build_result_set, sqlite_extract_value_sync};

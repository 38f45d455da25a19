pub mod backend;
pub mod queries;
pub mod schema;
pub mod source_impl;
pub mod website;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `plotline_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;

//! qs-db - DuckDB backend for Quackstep
//!
//! This crate implements the qs-core connection traits over an embedded
//! DuckDB database file.

pub mod duckdb;

pub use duckdb::DuckDbBackend;

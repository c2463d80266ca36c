//! # taskgate Shared Library
//!
//! Domain types and storage used by the taskgate API server.
//!
//! ## Module Organization
//!
//! - `db`: database facade, PostgreSQL and in-memory adapters, pool and migrations
//! - `models`: users and tasks
//! - `auth`: passwords, JWTs, bearer authentication and role policies
//! - `validation`: task title/description validators

pub mod auth;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the taskgate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

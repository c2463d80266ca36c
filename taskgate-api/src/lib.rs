//! # taskgate API Server Library
//!
//! This library provides the core functionality for the taskgate API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and bearer authentication layer
//! - `cli`: Command-line entry points (serve, migrate, seed, hash-password)
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod routes;

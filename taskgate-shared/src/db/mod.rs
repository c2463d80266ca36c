/// Database layer for taskgate
///
/// # Modules
///
/// - `adapter`: the [`DatabaseAdapter`](adapter::DatabaseAdapter) facade and its value types
/// - `postgres`: facade implementation over sqlx
/// - `memory`: in-process facade implementation
/// - `pool`: PostgreSQL connection pool management
/// - `migrations`: embedded schema migrations

pub mod adapter;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;

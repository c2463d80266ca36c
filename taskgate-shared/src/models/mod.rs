/// Database models for taskgate
///
/// Models decode facade [`Record`](crate::db::adapter::Record)s into typed
/// structs and expose CRUD helpers that take a `&dyn DatabaseAdapter`.
///
/// # Models
///
/// - `user`: accounts, roles and credentials
/// - `task`: to-do items with a pending/done status

pub mod task;
pub mod user;

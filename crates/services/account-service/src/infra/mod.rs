//! Infrastructure layer - database bootstrap.

mod db;

pub use db::Database;

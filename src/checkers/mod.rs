//! Ready-made [`Checker`](crate::health::Checker) implementations.

mod postgres;
mod simple;

pub use postgres::PostgresChecker;
pub use simple::{FnChecker, StaticChecker};

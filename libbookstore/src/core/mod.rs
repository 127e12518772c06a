//! Core infrastructure for managing and accessing the book collection.
pub mod database;
pub mod error;
pub mod loadable;
pub mod query;

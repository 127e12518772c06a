//! This is a library that provides objects and functionality to seed and query a
//! collection of books that is stored in the `plp_bookstore` database.
//!
//! The database engine does all of the real work: this library models the
//! [book::Book] record, translates filters, sorts, updates and aggregations into
//! engine queries, and manages the advisory indexes of the collection.

pub mod aggregate;
pub mod book;
pub mod core;
pub mod explain;
pub mod index;
pub mod seed;

pub use crate::core::database::Database;
pub use crate::core::error::Error;
pub use crate::core::error::Result;

//! Changes that can be applied to a stored [Book](super::Book)
use super::{Field, validate_pages, validate_price, validate_text, validate_year};
use crate::core::error::Result;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

/// Sets a single field of a book to a new value
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    Title(String),
    Author(String),
    Genre(String),
    PublishedYear(i32),
    Price(f64),
    InStock(bool),
    Pages(i32),
    Publisher(String),
}

impl Change {
    /// The field that this change sets
    pub fn field(&self) -> Field {
        match self {
            Change::Title(_) => Field::Title,
            Change::Author(_) => Field::Author,
            Change::Genre(_) => Field::Genre,
            Change::PublishedYear(_) => Field::PublishedYear,
            Change::Price(_) => Field::Price,
            Change::InStock(_) => Field::InStock,
            Change::Pages(_) => Field::Pages,
            Change::Publisher(_) => Field::Publisher,
        }
    }

    /// Check the new value with the same rules that apply when inserting a book
    pub fn validate(&self) -> Result<()> {
        match self {
            Change::Title(s) | Change::Author(s) | Change::Genre(s) | Change::Publisher(s) => {
                validate_text(self.field(), s)
            }
            Change::PublishedYear(year) => validate_year(*year),
            Change::Price(price) => validate_price(*price),
            Change::Pages(pages) => validate_pages(*pages),
            Change::InStock(_) => Ok(()),
        }
    }

    pub(crate) fn push_value(&self, builder: &mut QueryBuilder<Sqlite>) {
        match self {
            Change::Title(s) | Change::Author(s) | Change::Genre(s) | Change::Publisher(s) => {
                builder.push_bind(s.clone())
            }
            Change::PublishedYear(year) => builder.push_bind(*year),
            Change::Price(price) => builder.push_bind(*price),
            Change::InStock(val) => builder.push_bind(*val),
            Change::Pages(pages) => builder.push_bind(*pages),
        };
    }
}

/// The outcome of an update of a single book
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    /// The number of books that matched the filter (zero or one)
    pub matched: u64,
    /// The number of books whose stored values actually changed
    pub modified: u64,
}

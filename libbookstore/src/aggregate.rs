//! Summaries of the book collection. Each function here is a small pipeline:
//! an optional filter stage, a grouping stage and a sort stage, all of which
//! are executed by the database engine.
use crate::{Database, Result, core::query::DynFilterPart};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};
use tracing::debug;

/// The average price of the books in a single genre
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct GenrePrice {
    pub genre: String,
    pub average_price: f64,
}

/// The number of books written by a single author
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AuthorCount {
    pub author: String,
    pub book_count: i64,
}

/// The number of books published in a single decade
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DecadeCount {
    /// e.g. "1960s"
    pub decade: String,
    pub count: i64,
}

fn grouped_query<'q>(
    select: &str,
    filter: Option<DynFilterPart>,
    group_and_sort: &str,
) -> QueryBuilder<'q, Sqlite> {
    let mut builder = QueryBuilder::new(select);
    builder.push(" FROM books");
    if let Some(f) = filter {
        builder.push(" WHERE ");
        f.add_to_query(&mut builder);
    }
    builder.push(" ");
    builder.push(group_and_sort);
    builder
}

/// Group books by genre and compute the average price of each genre. Genres are
/// returned in alphabetical order.
pub async fn average_price_by_genre(
    filter: Option<DynFilterPart>,
    db: &Database,
) -> Result<Vec<GenrePrice>> {
    let mut builder = grouped_query(
        "SELECT genre, AVG(price) AS average_price",
        filter,
        "GROUP BY genre ORDER BY genre ASC",
    );
    debug!(sql = builder.sql(), "average price by genre");
    builder
        .build_query_as()
        .fetch_all(db.pool())
        .await
        .map_err(Into::into)
}

/// Group books by author and count the books of each author. Authors with the
/// most books come first; authors with the same number of books are sorted by
/// name.
pub async fn author_counts(
    filter: Option<DynFilterPart>,
    limit: Option<u32>,
    db: &Database,
) -> Result<Vec<AuthorCount>> {
    let mut builder = grouped_query(
        "SELECT author, COUNT(*) AS book_count",
        filter,
        "GROUP BY author ORDER BY book_count DESC, author ASC",
    );
    if let Some(limit) = limit {
        builder.push(" LIMIT ").push_bind(limit);
    }
    debug!(sql = builder.sql(), "books per author");
    builder
        .build_query_as()
        .fetch_all(db.pool())
        .await
        .map_err(Into::into)
}

/// The author with the most books. When several authors have the same number
/// of books, the one whose name sorts first wins. Returns `None` when no books
/// match the filter.
pub async fn top_author(filter: Option<DynFilterPart>, db: &Database) -> Result<Option<AuthorCount>> {
    Ok(author_counts(filter, Some(1), db).await?.into_iter().next())
}

/// Group books by the decade they were published in and count the books of
/// each decade. The decade label is the first three digits of the year followed
/// by "0s", so 1965 becomes "1960s". Decades are returned in ascending order of
/// their label.
pub async fn count_by_decade(
    filter: Option<DynFilterPart>,
    db: &Database,
) -> Result<Vec<DecadeCount>> {
    let mut builder = grouped_query(
        "SELECT substr(CAST(published_year AS TEXT), 1, 3) || '0s' AS decade, COUNT(*) AS count",
        filter,
        "GROUP BY decade ORDER BY decade ASC",
    );
    debug!(sql = builder.sql(), "books per decade");
    builder
        .build_query_as()
        .fetch_all(db.pool())
        .await
        .map_err(Into::into)
}

//! Lazily evaluated queries for books
use super::{Field, ProjectedBook, Projection};
use crate::core::{
    database::Database,
    error::{Error, Result},
    query::{DynFilterPart, LimitSpec, SortSpecs, ToSql},
};
use futures::{Stream, TryStreamExt};
use sqlx::{FromRow, QueryBuilder, Sqlite, sqlite::SqliteRow};
use std::marker::PhantomData;
use tracing::trace;

/// A query for books that has not been sent to the database yet. Sort, skip,
/// limit and projection stages can be added to it before it is consumed with
/// [Cursor::stream()], [Cursor::to_vec()] or [Cursor::first()].
///
/// Without a sort stage, books come back in the order they were inserted. When
/// a sort stage is given, the insertion order is used to break ties so that
/// consecutive pages never overlap.
pub struct Cursor<T> {
    columns: String,
    filter: Option<DynFilterPart>,
    sort: Option<SortSpecs<Field>>,
    limit: LimitSpec,
    builder: Option<QueryBuilder<'static, Sqlite>>,
    row: PhantomData<fn() -> T>,
}

impl<T> Cursor<T> {
    pub(crate) fn new(columns: String, filter: Option<DynFilterPart>) -> Self {
        Self {
            columns,
            filter,
            sort: None,
            limit: LimitSpec::default(),
            builder: None,
            row: PhantomData,
        }
    }

    /// Sort the results by the given fields
    pub fn sort<S: Into<SortSpecs<Field>>>(mut self, sort: S) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Skip the first `n` results
    pub fn skip(mut self, n: u32) -> Self {
        self.limit.offset = Some(n);
        self
    }

    /// Return at most `n` results
    pub fn limit(mut self, n: u32) -> Self {
        self.limit.count = Some(n);
        self
    }

    /// Replace the skip and limit stages with the given spec
    pub fn paginate(mut self, limit: LimitSpec) -> Self {
        self.limit = limit;
        self
    }

    /// Only return the given fields of each book
    pub fn project(self, projection: &Projection) -> Cursor<ProjectedBook> {
        Cursor {
            columns: projection.columns(),
            filter: self.filter,
            sort: self.sort,
            limit: self.limit,
            builder: None,
            row: PhantomData,
        }
    }

    /// Build the query for this cursor. `prefix` is put in front of the
    /// `SELECT` statement, e.g. to ask the engine to explain the query.
    pub(crate) fn query_builder(&self, prefix: &str) -> QueryBuilder<'static, Sqlite> {
        let mut builder = QueryBuilder::new(prefix.to_string());
        builder.push("SELECT ");
        builder.push(&self.columns);
        builder.push(" FROM books");
        if let Some(f) = &self.filter {
            builder.push(" WHERE ");
            f.add_to_query(&mut builder);
        }
        match &self.sort {
            Some(sort) => {
                builder.push(sort.to_sql());
                builder.push(", bookid ASC");
            }
            None => {
                builder.push(" ORDER BY bookid ASC");
            }
        }
        builder.push(self.limit.to_sql());
        builder
    }

    /// The SQL statement that this cursor sends to the database
    pub fn sql(&self) -> String {
        self.query_builder("").into_sql()
    }
}

impl<T> Cursor<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static,
{
    /// Send the query to the database and return a stream of results. Results
    /// are fetched from the database as the stream is polled.
    pub fn stream<'a>(&'a mut self, db: &'a Database) -> impl Stream<Item = Result<T>> + 'a {
        let builder = self.query_builder("");
        trace!(sql = builder.sql(), "fetching books");
        self.builder
            .insert(builder)
            .build_query_as::<T>()
            .fetch(db.pool())
            .map_err(Error::from)
    }

    /// Collect all results of this query
    pub async fn to_vec(&mut self, db: &Database) -> Result<Vec<T>> {
        self.stream(db).try_collect().await
    }

    /// Fetch only the first result of this query, if there is one
    pub async fn first(&mut self, db: &Database) -> Result<Option<T>> {
        let mut stream = self.stream(db);
        stream.try_next().await
    }

    /// Fetch exactly one result. If the query has no results, this returns
    /// [sqlx::Error::RowNotFound]
    pub async fn fetch_one(&mut self, db: &Database) -> Result<T> {
        self.first(db)
            .await?
            .ok_or(Error::DatabaseError(sqlx::Error::RowNotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        book::{Book, Filter},
        core::query::{SortOrder, SortSpec, filter::Cmp},
    };
    use futures::StreamExt;
    use sqlx::Pool;
    use test_log::test;

    #[test]
    fn test_cursor_sql() {
        let cursor = Book::find(Filter::Genre(Cmp::Equal, "Fiction".to_string()).into())
            .sort(SortSpec::new(Field::Price, SortOrder::Descending))
            .skip(5)
            .limit(5);
        assert_eq!(
            cursor.sql(),
            "SELECT bookid, title, author, genre, published_year, price, in_stock, pages, publisher \
             FROM books WHERE  genre IS ? ORDER BY price DESC, bookid ASC LIMIT 5 OFFSET 5"
        );

        let cursor = Book::find(None).project(
            &Projection::new([Field::Title, Field::Author, Field::Price]).unwrap(),
        );
        assert_eq!(
            cursor.sql(),
            "SELECT title, author, price FROM books ORDER BY bookid ASC"
        );
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../../db/fixtures", scripts("books"))
    ))]
    async fn test_stream_is_lazy(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let mut cursor = Book::find(Filter::InStock(true).into());
        let mut stream = cursor.stream(&db);
        let first = stream
            .next()
            .await
            .expect("stream was empty")
            .expect("Failed to fetch book");
        assert_eq!(first.title, "The Silent Patient");
        let rest: Vec<Book> = stream.try_collect().await.expect("Failed to fetch rest");
        assert_eq!(rest.len(), 6);
        assert!(rest.iter().all(|b| b.in_stock));
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../../db/fixtures", scripts("books"))
    ))]
    async fn test_cursor_reuse(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let mut cursor = Book::find(None).limit(3);
        let a = cursor.to_vec(&db).await.expect("Failed to fetch");
        let b = cursor.to_vec(&db).await.expect("Failed to fetch again");
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);

        let none = Book::find(Filter::Title(Cmp::Equal, "Missing".to_string()).into())
            .fetch_one(&db)
            .await;
        assert!(matches!(
            none,
            Err(Error::DatabaseError(sqlx::Error::RowNotFound))
        ));
    }
}

//! Objects to manage the books in the collection. A [Book] is a flat record
//! with eight attributes. The database engine assigns each stored book an id
//! which is only used internally and never shown as part of the book's data.
use crate::core::{
    database::Database,
    error::{Error, Result},
    loadable::Loadable,
    query::{
        DynFilterPart, LimitSpec, SortSpecs, ToSql,
        filter::{Cmp, FilterPart, text_operand},
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Row, Sqlite};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

pub use change::{Change, UpdateResult};
pub use cursor::Cursor;
pub use projection::{ProjectedBook, Projection};

pub mod change;
pub mod cursor;
pub mod projection;

/// The columns that hold the data of a full [Book] record
pub(crate) const BOOK_COLUMNS: &str =
    "bookid, title, author, genre, published_year, price, in_stock, pages, publisher";

/// sqlite limits the number of bound parameters per statement, so bulk inserts
/// are split into chunks of this many rows
const INSERT_CHUNK_SIZE: usize = 500;

/// The attributes of a [Book]. The name of each variant in snake_case is both the
/// public field name and the name of the column in the database.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    EnumIter,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Title,
    Author,
    Genre,
    PublishedYear,
    Price,
    InStock,
    Pages,
    Publisher,
}

impl ToSql for Field {
    fn to_sql(&self) -> String {
        self.as_ref().to_string()
    }
}

/// A type for specifying fields that can be used for filtering a database query
/// for books
#[derive(Clone, Debug)]
pub enum Filter {
    /// Match the engine-assigned id of the book
    Id(i64),

    /// Compare the title of the book to the given value
    Title(Cmp, String),

    /// Compare the author of the book to the given value
    Author(Cmp, String),

    /// Compare the genre of the book to the given value
    Genre(Cmp, String),

    /// Compare the publisher of the book to the given value
    Publisher(Cmp, String),

    /// Compare the year the book was published to the given value
    PublishedYear(Cmp, i32),

    /// Compare the price of the book to the given value
    Price(Cmp, f64),

    /// Compare the number of pages to the given value
    Pages(Cmp, i32),

    /// Match books that are (or are not) in stock
    InStock(bool),
}

impl From<Filter> for Option<DynFilterPart> {
    fn from(value: Filter) -> Self {
        Some(value.into())
    }
}

impl FilterPart for Filter {
    fn add_to_query(&self, builder: &mut sqlx::QueryBuilder<sqlx::Sqlite>) {
        match self {
            Self::Id(id) => _ = builder.push(" bookid = ").push_bind(*id),
            Self::Title(cmp, s) => push_text(builder, Field::Title, *cmp, s),
            Self::Author(cmp, s) => push_text(builder, Field::Author, *cmp, s),
            Self::Genre(cmp, s) => push_text(builder, Field::Genre, *cmp, s),
            Self::Publisher(cmp, s) => push_text(builder, Field::Publisher, *cmp, s),
            Self::PublishedYear(cmp, year) => {
                _ = builder.push(" published_year").push(cmp).push_bind(*year)
            }
            Self::Price(cmp, price) => _ = builder.push(" price").push(cmp).push_bind(*price),
            Self::Pages(cmp, pages) => _ = builder.push(" pages").push(cmp).push_bind(*pages),
            Self::InStock(val) => _ = builder.push(" in_stock = ").push_bind(*val),
        }
    }
}

fn push_text(builder: &mut QueryBuilder<Sqlite>, field: Field, cmp: Cmp, value: &str) {
    builder
        .push(" ")
        .push(field.as_ref())
        .push(cmp)
        .push_bind(text_operand(cmp, value));
}

/// A data type that represents a single book in the collection
#[derive(Debug, sqlx::FromRow, Deserialize, Serialize, PartialEq, Clone)]
pub struct Book {
    /// The id that the database engine assigned to this book. It is never
    /// serialized.
    #[sqlx(rename = "bookid")]
    #[serde(skip, default = "invalid_book_id")]
    id: i64,

    pub title: String,

    pub author: String,

    /// A free-form category label such as "Fiction" or "Memoir"
    pub genre: String,

    pub published_year: i32,

    pub price: f64,

    pub in_stock: bool,

    pub pages: i32,

    pub publisher: String,
}

fn invalid_book_id() -> i64 {
    <Book as Loadable>::invalid_id()
}

pub(crate) fn validate_text(field: Field, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidBook {
            field: field.into(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_year(year: i32) -> Result<()> {
    if !(1..=9999).contains(&year) {
        return Err(Error::InvalidBook {
            field: Field::PublishedYear.into(),
            reason: format!("must be between 1 and 9999, got {year}"),
        });
    }
    Ok(())
}

pub(crate) fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidBook {
            field: Field::Price.into(),
            reason: format!("must be a non-negative number, got {price}"),
        });
    }
    Ok(())
}

pub(crate) fn validate_pages(pages: i32) -> Result<()> {
    if pages <= 0 {
        return Err(Error::InvalidBook {
            field: Field::Pages.into(),
            reason: format!("must be positive, got {pages}"),
        });
    }
    Ok(())
}

#[async_trait]
impl Loadable for Book {
    type Id = i64;

    type Sort = Field;

    fn invalid_id() -> Self::Id {
        -1
    }

    fn id(&self) -> Self::Id {
        self.id
    }

    fn set_invalid(&mut self) {
        self.id = Self::invalid_id()
    }

    async fn insert(&mut self, db: &Database) -> Result<&Self::Id> {
        if self.exists() {
            return Err(Error::InvalidInsertObjectAlreadyExists(self.id));
        }
        self.validate()?;
        let mut builder = Self::insert_builder();
        builder.push_values(std::iter::once(&*self), Self::push_row);
        builder.push(" RETURNING bookid");
        self.id = builder
            .build_query_scalar()
            .fetch_one(db.pool())
            .await?;
        debug!(id = self.id, title = %self.title, "inserted book");
        Ok(&self.id)
    }

    async fn load(id: Self::Id, db: &Database) -> Result<Self> {
        Self::find(Filter::Id(id).into()).fetch_one(db).await
    }

    async fn load_all(
        filter: Option<DynFilterPart>,
        sort: Option<SortSpecs<Self::Sort>>,
        limit: Option<LimitSpec>,
        db: &Database,
    ) -> Result<Vec<Self>> {
        let mut cursor = Self::find(filter);
        if let Some(sort) = sort {
            cursor = cursor.sort(sort);
        }
        if let Some(limit) = limit {
            cursor = cursor.paginate(limit);
        }
        cursor.to_vec(db).await
    }

    async fn count(filter: Option<DynFilterPart>, db: &Database) -> Result<u64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) AS count FROM books");
        if let Some(f) = filter {
            builder.push(" WHERE ");
            f.add_to_query(&mut builder);
        }
        let count: i64 = builder.build().fetch_one(db.pool()).await?.try_get("count")?;
        Ok(count as u64)
    }

    async fn delete_id(id: &Self::Id, db: &Database) -> Result<()> {
        sqlx::query("DELETE FROM books WHERE bookid = ?")
            .bind(id)
            .execute(db.pool())
            .await
            .map(|_| ())
            .map_err(Into::into)
    }

    async fn update(&self, db: &Database) -> Result<()> {
        if !self.exists() {
            return Err(Error::InvalidUpdateObjectNotFound);
        }
        self.validate()?;
        sqlx::query(
            "UPDATE books
                SET
                    title=?,
                    author=?,
                    genre=?,
                    published_year=?,
                    price=?,
                    in_stock=?,
                    pages=?,
                    publisher=?
                WHERE bookid=?",
        )
        .bind(&self.title)
        .bind(&self.author)
        .bind(&self.genre)
        .bind(self.published_year)
        .bind(self.price)
        .bind(self.in_stock)
        .bind(self.pages)
        .bind(&self.publisher)
        .bind(self.id)
        .execute(db.pool())
        .await
        .map(|_| ())
        .map_err(Into::into)
    }
}

impl Book {
    /// Creates a new book object with the given data. It will initially have
    /// an invalid ID until it is inserted into the database
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        author: String,
        genre: String,
        published_year: i32,
        price: f64,
        in_stock: bool,
        pages: i32,
        publisher: String,
    ) -> Self {
        Self {
            id: Self::invalid_id(),
            title,
            author,
            genre,
            published_year,
            price,
            in_stock,
            pages,
            publisher,
        }
    }

    /// Check that every attribute of this book holds a sensible value
    pub fn validate(&self) -> Result<()> {
        validate_text(Field::Title, &self.title)?;
        validate_text(Field::Author, &self.author)?;
        validate_text(Field::Genre, &self.genre)?;
        validate_text(Field::Publisher, &self.publisher)?;
        validate_year(self.published_year)?;
        validate_price(self.price)?;
        validate_pages(self.pages)
    }

    /// Start a query for all books that match the given filter. Nothing is sent
    /// to the database until the returned [Cursor] is consumed.
    pub fn find(filter: Option<DynFilterPart>) -> Cursor<Book> {
        Cursor::new(BOOK_COLUMNS.to_string(), filter)
    }

    /// Load the first book with exactly the given title, if any
    pub async fn find_by_title(title: &str, db: &Database) -> Result<Option<Book>> {
        Self::find(Filter::Title(Cmp::Equal, title.to_string()).into())
            .limit(1)
            .first(db)
            .await
    }

    /// Insert all of the given books into the database as a single bulk
    /// operation. Every book is validated first: if any of them is invalid, no
    /// books are inserted. Returns the number of books that were inserted.
    pub async fn insert_many(books: &[Book], db: &Database) -> Result<u64> {
        for book in books {
            if book.exists() {
                return Err(Error::InvalidInsertObjectAlreadyExists(book.id));
            }
            book.validate()?;
        }
        if books.is_empty() {
            return Ok(0);
        }

        let mut tx = db.pool().begin().await?;
        let mut inserted = 0;
        for chunk in books.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = Self::insert_builder();
            builder.push_values(chunk, Self::push_row);
            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        debug!(inserted, "bulk inserted books");
        Ok(inserted)
    }

    /// Apply the given changes to the first book (in insertion order) that
    /// matches `filter`. If no book matches, nothing happens and both counts of
    /// the result are zero.
    pub async fn update_one(
        filter: DynFilterPart,
        changes: &[Change],
        db: &Database,
    ) -> Result<UpdateResult> {
        if changes.is_empty() {
            return Err(Error::InvalidOperation(
                "an update needs at least one change".to_string(),
            ));
        }
        for change in changes {
            change.validate()?;
        }

        let mut tx = db.pool().begin().await?;
        let mut select = QueryBuilder::new("SELECT bookid FROM books WHERE ");
        filter.add_to_query(&mut select);
        select.push(" ORDER BY bookid ASC LIMIT 1");
        let target: Option<i64> = select.build_query_scalar().fetch_optional(&mut *tx).await?;
        let Some(id) = target else {
            debug!("no book matched the update filter");
            return Ok(UpdateResult::default());
        };

        let mut builder = QueryBuilder::new("UPDATE books SET ");
        for (i, change) in changes.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(change.field().as_ref()).push(" = ");
            change.push_value(&mut builder);
        }
        // only count the book as modified when a value actually changes
        builder.push(" WHERE bookid = ").push_bind(id).push(" AND NOT (");
        for (i, change) in changes.iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            builder.push(change.field().as_ref()).push(" IS ");
            change.push_value(&mut builder);
        }
        builder.push(")");
        let modified = builder.build().execute(&mut *tx).await?.rows_affected();
        tx.commit().await?;
        debug!(id, modified, "updated book");
        Ok(UpdateResult {
            matched: 1,
            modified,
        })
    }

    /// Remove the first book (in insertion order) that matches `filter`.
    /// Returns the number of removed books, which is zero when nothing matched.
    pub async fn delete_one(filter: DynFilterPart, db: &Database) -> Result<u64> {
        let mut builder = QueryBuilder::new(
            "DELETE FROM books WHERE bookid IN (SELECT bookid FROM books WHERE ",
        );
        filter.add_to_query(&mut builder);
        builder.push(" ORDER BY bookid ASC LIMIT 1)");
        let deleted = builder.build().execute(db.pool()).await?.rows_affected();
        debug!(deleted, "deleted book");
        Ok(deleted)
    }

    fn insert_builder<'q>() -> QueryBuilder<'q, Sqlite> {
        QueryBuilder::new(
            "INSERT INTO books
            (title, author, genre, published_year, price, in_stock, pages, publisher) ",
        )
    }

    fn push_row(mut row: sqlx::query_builder::Separated<'_, '_, Sqlite, &'static str>, book: &Book) {
        row.push_bind(book.title.clone())
            .push_bind(book.author.clone())
            .push_bind(book.genre.clone())
            .push_bind(book.published_year)
            .push_bind(book.price)
            .push_bind(book.in_stock)
            .push_bind(book.pages)
            .push_bind(book.publisher.clone());
    }
}

//! Queries that only return a subset of the fields of each book
use super::Field;
use crate::core::error::{Error, Result};
use serde::Serialize;
use sqlx::{Decode, FromRow, Row, Sqlite, Type, sqlite::SqliteRow};

/// The set of fields that a projected query returns. The engine-assigned id of
/// a book is never part of a projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection(Vec<Field>);

impl Projection {
    /// Create a projection of the given fields. Duplicate fields are ignored.
    /// At least one field must be given.
    pub fn new<I: IntoIterator<Item = Field>>(fields: I) -> Result<Self> {
        let mut selected: Vec<Field> = Vec::new();
        for field in fields {
            if !selected.contains(&field) {
                selected.push(field);
            }
        }
        if selected.is_empty() {
            return Err(Error::InvalidProjection);
        }
        Ok(Self(selected))
    }

    /// The selected fields in the order they were given
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub(crate) fn columns(&self) -> String {
        self.0
            .iter()
            .map(|f| f.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A book that only contains the fields of a [Projection]. Fields that were not
/// selected are `None` and are left out when serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProjectedBook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl ProjectedBook {
    /// A display string for the given field, or `None` if it was not selected
    pub fn display(&self, field: Field) -> Option<String> {
        match field {
            Field::Title => self.title.clone(),
            Field::Author => self.author.clone(),
            Field::Genre => self.genre.clone(),
            Field::PublishedYear => self.published_year.map(|v| v.to_string()),
            Field::Price => self.price.map(|v| format!("{v:.2}")),
            Field::InStock => self.in_stock.map(|v| v.to_string()),
            Field::Pages => self.pages.map(|v| v.to_string()),
            Field::Publisher => self.publisher.clone(),
        }
    }
}

/// get a column from the row, or `None` if the query didn't select it
fn optional_column<'r, T>(row: &'r SqliteRow, name: &str) -> sqlx::Result<Option<T>>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    match row.try_get(name) {
        Ok(value) => Ok(Some(value)),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

impl FromRow<'_, SqliteRow> for ProjectedBook {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            title: optional_column(row, "title")?,
            author: optional_column(row, "author")?,
            genre: optional_column(row, "genre")?,
            published_year: optional_column(row, "published_year")?,
            price: optional_column(row, "price")?,
            in_stock: optional_column(row, "in_stock")?,
            pages: optional_column(row, "pages")?,
            publisher: optional_column(row, "publisher")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, book::Book};
    use sqlx::Pool;
    use test_log::test;

    #[test]
    fn test_projection_new() {
        assert!(matches!(
            Projection::new(Vec::new()),
            Err(Error::InvalidProjection)
        ));
        let p = Projection::new([Field::Price, Field::Title, Field::Price]).unwrap();
        assert_eq!(p.fields(), &[Field::Price, Field::Title]);
        assert_eq!(p.columns(), "price, title");
    }

    #[test(sqlx::test(
        migrations = "../db/migrations/",
        fixtures(path = "../../../db/fixtures", scripts("books"))
    ))]
    async fn test_projection_fields(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let projection = Projection::new([Field::Title, Field::Author, Field::Price]).unwrap();
        let books = Book::find(None)
            .project(&projection)
            .to_vec(&db)
            .await
            .expect("Failed to load projected books");
        assert_eq!(books.len(), 10);
        for book in &books {
            assert!(book.title.is_some());
            assert!(book.author.is_some());
            assert!(book.price.is_some());
            assert_eq!(book.genre, None);
            assert_eq!(book.published_year, None);
            assert_eq!(book.in_stock, None);
            assert_eq!(book.pages, None);
            assert_eq!(book.publisher, None);
        }
        assert_eq!(books[3].title.as_deref(), Some("1984"));
        assert_eq!(books[3].display(Field::Price).as_deref(), Some("6.89"));
        assert_eq!(books[3].display(Field::Genre), None);

        let json = serde_json::to_value(&books[3]).expect("Failed to serialize");
        let keys: Vec<&String> = json
            .as_object()
            .expect("not an object")
            .keys()
            .collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("_id").is_none() && json.get("id").is_none());
    }
}

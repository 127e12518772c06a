//! Index declarations for the book collection. Indexes only make lookups and
//! sorts faster; they never change the results of a query. They are declared
//! here as plain metadata and are applied to the collection on request, so
//! nothing in the query code depends on them.
use crate::{
    Database, Error, Result,
    book::Field,
    core::{
        database::COLLECTION,
        query::{SortOrder, ToSql},
    },
};
use serde::Serialize;
use tracing::{debug, info};

/// One key of an index: a field and the order in which it is indexed
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IndexKey {
    pub field: Field,
    pub order: SortOrder,
}

/// The declaration of an index on the book collection
#[derive(Clone, Debug, PartialEq)]
pub struct IndexSpec {
    keys: Vec<IndexKey>,
}

impl IndexSpec {
    /// Declare an index on the given keys, in order
    pub fn new<I: IntoIterator<Item = (Field, SortOrder)>>(keys: I) -> Result<Self> {
        let keys: Vec<IndexKey> = keys
            .into_iter()
            .map(|(field, order)| IndexKey { field, order })
            .collect();
        if keys.is_empty() {
            return Err(Error::InvalidOperation(
                "an index needs at least one key".to_string(),
            ));
        }
        Ok(Self { keys })
    }

    /// An ascending index on the title of the book
    pub fn title() -> Self {
        Self {
            keys: vec![IndexKey {
                field: Field::Title,
                order: SortOrder::Ascending,
            }],
        }
    }

    /// A compound index on the author (ascending) and the publication year
    /// (descending)
    pub fn author_published_year() -> Self {
        Self {
            keys: vec![
                IndexKey {
                    field: Field::Author,
                    order: SortOrder::Ascending,
                },
                IndexKey {
                    field: Field::PublishedYear,
                    order: SortOrder::Descending,
                },
            ],
        }
    }

    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    /// The name of the index, made of each key's field name followed by `1`
    /// for ascending or `-1` for descending, e.g. `author_1_published_year_-1`
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|k| format!("{}_{}", k.field, k.order.direction()))
            .collect::<Vec<_>>()
            .join("_")
    }

    fn create_sql(&self) -> String {
        let columns = self
            .keys
            .iter()
            .map(|k| format!("{} {}", k.field.as_ref(), k.order.to_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {COLLECTION} ({columns})",
            quote_identifier(&self.name())
        )
    }
}

/// The indexes that the bookstore declares for its collection
pub fn standard_indexes() -> Vec<IndexSpec> {
    vec![IndexSpec::title(), IndexSpec::author_published_year()]
}

/// An index as it currently exists in the database
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct IndexInfo {
    pub name: String,
    /// The statement that created the index
    #[sqlx(rename = "sql")]
    pub definition: String,
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Create the given index unless an index with the same name already exists.
/// Returns the name of the index.
pub async fn create(spec: &IndexSpec, db: &Database) -> Result<String> {
    let sql = spec.create_sql();
    debug!(sql = %sql, "creating index");
    sqlx::query(&sql).execute(db.pool()).await?;
    let name = spec.name();
    info!(name = %name, "index is in place");
    Ok(name)
}

/// Create all of the [standard_indexes()]. Returns their names.
pub async fn create_standard(db: &Database) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for spec in standard_indexes() {
        names.push(create(&spec, db).await?);
    }
    Ok(names)
}

/// List the indexes of the book collection, sorted by name
pub async fn list(db: &Database) -> Result<Vec<IndexInfo>> {
    sqlx::query_as(
        "SELECT name, sql FROM sqlite_master
        WHERE type = 'index' AND tbl_name = ? AND sql IS NOT NULL
        ORDER BY name ASC",
    )
    .bind(COLLECTION)
    .fetch_all(db.pool())
    .await
    .map_err(Into::into)
}

/// Remove the index with the given name. Returns [Error::IndexNotFound] if the
/// collection has no such index.
pub async fn drop(name: &str, db: &Database) -> Result<()> {
    let exists = list(db).await?.iter().any(|idx| idx.name == name);
    if !exists {
        return Err(Error::IndexNotFound(name.to_string()));
    }
    let sql = format!("DROP INDEX {}", quote_identifier(name));
    debug!(sql = %sql, "dropping index");
    sqlx::query(&sql).execute(db.pool()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{Pool, Sqlite};
    use test_log::test;

    #[test]
    fn test_index_names() {
        assert_eq!(IndexSpec::title().name(), "title_1");
        assert_eq!(
            IndexSpec::author_published_year().name(),
            "author_1_published_year_-1"
        );
        assert_eq!(
            IndexSpec::author_published_year().create_sql(),
            "CREATE INDEX IF NOT EXISTS \"author_1_published_year_-1\" ON books (author ASC, published_year DESC)"
        );
        assert!(IndexSpec::new(Vec::new()).is_err());
        let spec = IndexSpec::new([(Field::Price, SortOrder::Descending)]).unwrap();
        assert_eq!(spec.name(), "price_-1");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_create_list_drop(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        assert!(list(&db).await.unwrap().is_empty());

        let names = create_standard(&db).await.expect("Failed to create indexes");
        assert_eq!(names, vec!["title_1", "author_1_published_year_-1"]);
        // creating them again is a no-op
        create_standard(&db).await.expect("Failed to re-create indexes");

        let indexes = list(&db).await.unwrap();
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].name, "author_1_published_year_-1");
        assert!(indexes[0].definition.contains("published_year DESC"));
        assert_eq!(indexes[1].name, "title_1");

        drop("title_1", &db).await.expect("Failed to drop index");
        assert_eq!(list(&db).await.unwrap().len(), 1);
        assert!(matches!(
            drop("title_1", &db).await,
            Err(Error::IndexNotFound(name)) if name == "title_1"
        ));
    }
}

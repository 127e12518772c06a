//! Populating the collection with the sample books or with books from a file
use crate::cli::ImportFormat;
use anyhow::{Context, Result};
use libbookstore::{Database, book::Book, seed};
use std::{io::Read, path::Path};
use tracing::debug;

/// Handle the `bookctl seed` command
pub(crate) async fn handle_command(
    file: Option<&Path>,
    format: Option<ImportFormat>,
    db: &Database,
) -> Result<()> {
    let inserted = match file {
        None => seed::seed(db).await?,
        Some(path) => {
            let format = format.unwrap_or_else(|| guess_format(path));
            debug!(?path, ?format, "importing books");
            let contents = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read '{}'", path.display()))?;
            let books = read_books(contents.as_slice(), format)
                .with_context(|| format!("Failed to parse books from '{}'", path.display()))?;
            Book::insert_many(&books, db).await?
        }
    };
    println!("Inserted {inserted} books into the collection");
    Ok(())
}

/// Files ending in `.csv` are read as CSV, anything else as JSON
fn guess_format(path: &Path) -> ImportFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => ImportFormat::Csv,
        _ => ImportFormat::Json,
    }
}

/// Parse a list of books. JSON input is an array of objects and CSV input has
/// a header row; both use the field names of a book.
fn read_books<R: Read>(reader: R, format: ImportFormat) -> Result<Vec<Book>> {
    match format {
        ImportFormat::Json => serde_json::from_reader(reader).map_err(Into::into),
        ImportFormat::Csv => {
            let mut rdr = csv::Reader::from_reader(reader);
            rdr.deserialize()
                .collect::<Result<Vec<Book>, _>>()
                .map_err(Into::into)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libbookstore::core::loadable::Loadable;

    #[test]
    fn test_guess_format() {
        assert_eq!(guess_format(Path::new("books.CSV")), ImportFormat::Csv);
        assert_eq!(guess_format(Path::new("books.json")), ImportFormat::Json);
        assert_eq!(guess_format(Path::new("books")), ImportFormat::Json);
    }

    #[test]
    fn test_read_books_json() {
        let json = r#"[{
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "Science Fiction",
            "published_year": 1965,
            "price": 12.5,
            "in_stock": true,
            "pages": 412,
            "publisher": "Chilton Books"
        }]"#;
        let books = read_books(json.as_bytes(), ImportFormat::Json).expect("Failed to parse");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].pages, 412);
        assert!(!books[0].exists());

        let missing_field = r#"[{"title": "Dune"}]"#;
        assert!(read_books(missing_field.as_bytes(), ImportFormat::Json).is_err());
    }

    #[test]
    fn test_read_books_csv() {
        let csv = "title,author,genre,published_year,price,in_stock,pages,publisher\n\
                   The Hobbit,J.R.R. Tolkien,Fantasy,1937,8.99,false,310,George Allen & Unwin\n\
                   Becoming,Michelle Obama,Biography,2018,14.99,true,448,Crown Publishing Group\n";
        let books = read_books(csv.as_bytes(), ImportFormat::Csv).expect("Failed to parse");
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "The Hobbit");
        assert!(!books[0].in_stock);
        assert_eq!(books[1].price, 14.99);

        let bad = "title,author\nDune,Frank Herbert\n";
        assert!(read_books(bad.as_bytes(), ImportFormat::Csv).is_err());
    }
}

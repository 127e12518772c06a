//! The sample data set that is used to populate an empty collection
use crate::{Database, Result, book::Book};
use tracing::info;

/// (title, author, genre, published_year, price, in_stock, pages, publisher)
type SeedRecord = (
    &'static str,
    &'static str,
    &'static str,
    i32,
    f64,
    bool,
    i32,
    &'static str,
);

const SAMPLE_BOOKS: [SeedRecord; 10] = [
    (
        "The Silent Patient",
        "Alex Michaelides",
        "Thriller",
        2019,
        15.99,
        true,
        336,
        "Celadon Books",
    ),
    (
        "Atomic Habits",
        "James Clear",
        "Self-help",
        2018,
        11.98,
        true,
        320,
        "Penguin Random House",
    ),
    (
        "To Kill a Mockingbird",
        "Harper Lee",
        "Fiction",
        1960,
        7.19,
        false,
        281,
        "J.B. Lippincott & Co.",
    ),
    (
        "1984",
        "George Orwell",
        "Dystopian",
        1949,
        6.89,
        true,
        328,
        "Secker & Warburg",
    ),
    (
        "Educated",
        "Tara Westover",
        "Memoir",
        2018,
        13.99,
        true,
        352,
        "Random House",
    ),
    (
        "The Hobbit",
        "J.R.R. Tolkien",
        "Fantasy",
        1937,
        8.99,
        false,
        310,
        "George Allen & Unwin",
    ),
    (
        "Becoming",
        "Michelle Obama",
        "Biography",
        2018,
        14.99,
        true,
        448,
        "Crown Publishing Group",
    ),
    (
        "The Great Gatsby",
        "F. Scott Fitzgerald",
        "Fiction",
        1925,
        10.29,
        false,
        180,
        "Charles Scribner's Sons",
    ),
    (
        "The Alchemist",
        "Paulo Coelho",
        "Adventure",
        1988,
        9.49,
        true,
        208,
        "HarperTorch",
    ),
    (
        "Dune",
        "Frank Herbert",
        "Science Fiction",
        1965,
        12.50,
        true,
        412,
        "Chilton Books",
    ),
];

/// The ten sample books, in the order they are inserted
pub fn sample_books() -> Vec<Book> {
    SAMPLE_BOOKS
        .iter()
        .map(
            |&(title, author, genre, published_year, price, in_stock, pages, publisher)| {
                Book::new(
                    title.to_string(),
                    author.to_string(),
                    genre.to_string(),
                    published_year,
                    price,
                    in_stock,
                    pages,
                    publisher.to_string(),
                )
            },
        )
        .collect()
}

/// Insert the sample books into the collection with a single bulk insert.
/// Nothing is checked about the existing contents of the collection, so running
/// this twice stores every sample book twice. Returns the number of inserted
/// books.
pub async fn seed(db: &Database) -> Result<u64> {
    let inserted = Book::insert_many(&sample_books(), db).await?;
    info!(inserted, "seeded the book collection");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        book::Filter,
        core::{loadable::Loadable, query::filter::Cmp},
    };
    use sqlx::{Pool, Sqlite};
    use test_log::test;

    #[test]
    fn test_sample_books_are_valid() {
        let books = sample_books();
        assert_eq!(books.len(), 10);
        for book in &books {
            book.validate().expect("sample book is invalid");
            assert!(!book.exists());
        }
        let mut titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), 10);
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_seed(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        let before = Book::count(None, &db).await.expect("Failed to count");
        assert_eq!(seed(&db).await.expect("Failed to seed"), 10);
        assert_eq!(Book::count(None, &db).await.unwrap(), before + 10);

        for book in sample_books() {
            let n = Book::count(Filter::Title(Cmp::Equal, book.title.clone()).into(), &db)
                .await
                .unwrap();
            assert_eq!(n, 1, "'{}' should be stored exactly once", book.title);
        }

        let stored = Book::find(None).to_vec(&db).await.unwrap();
        let expected = sample_books();
        for (stored, expected) in stored.iter().zip(expected.iter()) {
            assert_eq!(stored.title, expected.title);
            assert_eq!(stored.price, expected.price);
            assert_eq!(stored.in_stock, expected.in_stock);
        }
    }

    #[test(sqlx::test(migrations = "../db/migrations/"))]
    async fn test_seed_twice_duplicates(pool: Pool<Sqlite>) {
        let db = Database::from(pool);
        seed(&db).await.expect("Failed to seed");
        seed(&db).await.expect("Failed to seed again");
        assert_eq!(Book::count(None, &db).await.unwrap(), 20);
        let dune = Book::count(Filter::Title(Cmp::Equal, "Dune".to_string()).into(), &db)
            .await
            .unwrap();
        assert_eq!(dune, 2);
    }
}

use libbookstore::{
    aggregate::{AuthorCount, DecadeCount, GenrePrice},
    book::Book,
    index::IndexInfo,
};
use serde::Serialize;
use tabled::Tabled;

fn display_price(price: &f64) -> String {
    format!("{price:.2}")
}

fn display_in_stock(in_stock: &bool) -> String {
    match in_stock {
        true => "yes".to_string(),
        false => "no".to_string(),
    }
}

#[derive(Clone, Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct BookRow {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) genre: String,
    #[serde(rename = "published_year")]
    pub(crate) year: i32,
    #[tabled(display = "display_price")]
    pub(crate) price: f64,
    #[tabled(display = "display_in_stock", rename = "In Stock")]
    pub(crate) in_stock: bool,
}

impl BookRow {
    pub(crate) fn new(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            year: book.published_year,
            price: book.price,
            in_stock: book.in_stock,
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct BookRowFull {
    title: String,
    author: String,
    genre: String,
    #[tabled(rename = "Published")]
    published_year: i32,
    #[tabled(display = "display_price")]
    price: f64,
    #[tabled(display = "display_in_stock", rename = "In Stock")]
    in_stock: bool,
    pages: i32,
    publisher: String,
}

impl BookRowFull {
    pub(crate) fn new(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            published_year: book.published_year,
            price: book.price,
            in_stock: book.in_stock,
            pages: book.pages,
            publisher: book.publisher.clone(),
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct GenrePriceRow {
    pub(crate) genre: String,
    #[tabled(display = "display_price", rename = "Average Price")]
    pub(crate) average_price: f64,
}

impl From<GenrePrice> for GenrePriceRow {
    fn from(value: GenrePrice) -> Self {
        Self {
            genre: value.genre,
            average_price: value.average_price,
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct AuthorCountRow {
    author: String,
    books: i64,
}

impl From<AuthorCount> for AuthorCountRow {
    fn from(value: AuthorCount) -> Self {
        Self {
            author: value.author,
            books: value.book_count,
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct DecadeRow {
    decade: String,
    books: i64,
}

impl From<DecadeCount> for DecadeRow {
    fn from(value: DecadeCount) -> Self {
        Self {
            decade: value.decade,
            books: value.count,
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct IndexRow {
    name: String,
    definition: String,
}

impl From<IndexInfo> for IndexRow {
    fn from(value: IndexInfo) -> Self {
        Self {
            name: value.name,
            definition: value.definition,
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct ConfigRow {
    pub(crate) file: String,
    pub(crate) database: String,
    #[tabled(rename = "Busy Timeout (ms)", display("tabled::derive::display::option", ""))]
    pub(crate) busy_timeout: Option<u64>,
    #[tabled(rename = "Acquire Timeout (ms)", display("tabled::derive::display::option", ""))]
    pub(crate) acquire_timeout: Option<u64>,
    #[tabled(rename = "Max Connections", display("tabled::derive::display::option", ""))]
    pub(crate) max_connections: Option<u32>,
}

//! Utilities for exporting data from the collection
use anyhow::anyhow;
use clap::ValueEnum;
use libbookstore::book::{Field, ProjectedBook, Projection};
use serde::Serialize;
use table::BookctlTable;
use tabled::{Table, Tabled, builder::Builder};

pub(crate) mod rows;
pub(crate) mod table;

/// Data format for exporting data from the collection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub(crate) enum OutputFormat {
    /// Human readable table of data
    Table,
    /// Comma-separated values for importing into a spreadsheet
    Csv,
    /// JSON-formatted objects
    Json,
    /// YAML-formatted objects
    Yaml,
}

/// Serialize a single object into the given data format
pub(crate) fn format_one<T>(item: T, fmt: OutputFormat) -> anyhow::Result<String>
where
    T: Tabled + Serialize + 'static,
{
    match fmt {
        OutputFormat::Table => {
            let tbuilder = Table::builder(vec![item]).index().column(0).transpose();
            Ok(format!("{}", tbuilder.build().styled()))
        }
        OutputFormat::Csv => Err(anyhow!("CSV format is not valid for single items")),
        OutputFormat::Json => serde_json::to_string(&item).map_err(|e| e.into()),
        OutputFormat::Yaml => serde_yaml::to_string(&item).map_err(|e| e.into()),
    }
}

/// Serialize a sequence of objects into the given data format
pub(crate) fn format_seq<I>(items: I, fmt: OutputFormat) -> anyhow::Result<String>
where
    I: IntoIterator,
    <I as IntoIterator>::Item: Tabled + Serialize + 'static,
{
    let iter = items.into_iter();
    match fmt {
        OutputFormat::Table => {
            let mut table = Table::new(iter);
            let n = table.count_rows() - 1;
            Ok(format!("{}\n{} records found", table.styled(), n))
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            iter.map(|item| writer.serialize(item))
                .collect::<Result<Vec<_>, _>>()?;
            writer.flush()?;
            String::from_utf8(writer.into_inner()?).map_err(|e| e.into())
        }
        OutputFormat::Json => {
            serde_json::to_string(&iter.collect::<Vec<_>>()).map_err(|e| e.into())
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&iter.collect::<Vec<_>>()).map_err(|e| e.into())
        }
    }
}

fn projection_header(projection: &Projection) -> Vec<String> {
    projection
        .fields()
        .iter()
        .map(|f| f.to_string())
        .collect()
}

fn projection_record(projection: &Projection, book: &ProjectedBook) -> Vec<String> {
    projection
        .fields()
        .iter()
        .map(|f: &Field| book.display(*f).unwrap_or_default())
        .collect()
}

/// Serialize books that only contain the fields of `projection`. The columns
/// are the projected fields, in the order they were requested.
pub(crate) fn format_projection(
    books: &[ProjectedBook],
    projection: &Projection,
    fmt: OutputFormat,
) -> anyhow::Result<String> {
    match fmt {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(projection_header(projection));
            for book in books {
                builder.push_record(projection_record(projection, book));
            }
            let mut table = builder.build();
            Ok(format!("{}\n{} records found", table.styled(), books.len()))
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer.write_record(projection_header(projection))?;
            for book in books {
                writer.write_record(projection_record(projection, book))?;
            }
            writer.flush()?;
            String::from_utf8(writer.into_inner()?).map_err(|e| e.into())
        }
        OutputFormat::Json => serde_json::to_string(books).map_err(|e| e.into()),
        OutputFormat::Yaml => serde_yaml::to_string(books).map_err(|e| e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rows::{BookRow, GenrePriceRow};

    fn hobbit() -> ProjectedBook {
        ProjectedBook {
            title: Some("The Hobbit".to_string()),
            price: Some(8.99),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_seq() {
        let rows = vec![
            BookRow {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                genre: "Science Fiction".to_string(),
                year: 1965,
                price: 12.5,
                in_stock: true,
            },
            BookRow {
                title: "1984".to_string(),
                author: "George Orwell".to_string(),
                genre: "Dystopian".to_string(),
                year: 1949,
                price: 6.89,
                in_stock: true,
            },
        ];
        let csv = format_seq(rows.clone(), OutputFormat::Csv).expect("Failed to format");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("title,author,genre,published_year,price,in_stock")
        );
        assert_eq!(
            lines.next(),
            Some("Dune,Frank Herbert,Science Fiction,1965,12.5,true")
        );

        let table = format_seq(rows.clone(), OutputFormat::Table).expect("Failed to format");
        assert!(table.ends_with("2 records found"));
        assert!(table.contains("George Orwell"));

        let json = format_seq(rows, OutputFormat::Json).expect("Failed to format");
        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid json");
        assert_eq!(value[1]["title"], "1984");
    }

    #[test]
    fn test_format_one_rejects_csv() {
        let row = GenrePriceRow {
            genre: "Memoir".to_string(),
            average_price: 13.99,
        };
        assert!(format_one(row, OutputFormat::Csv).is_err());
    }

    #[test]
    fn test_format_projection() {
        let projection = Projection::new([Field::Title, Field::Price]).unwrap();
        let books = vec![hobbit()];

        let csv = format_projection(&books, &projection, OutputFormat::Csv).unwrap();
        assert_eq!(csv, "title,price\nThe Hobbit,8.99\n");

        let json = format_projection(&books, &projection, OutputFormat::Json).unwrap();
        assert_eq!(json, r#"[{"title":"The Hobbit","price":8.99}]"#);

        let table = format_projection(&books, &projection, OutputFormat::Table).unwrap();
        assert!(table.contains("The Hobbit"));
        assert!(!table.contains("author"));
        assert!(table.ends_with("1 records found"));
    }
}

//! Commands related to [Book]s
use super::{apply_sort, build_filter};
use crate::{
    cli::BookCommands,
    output::{
        self,
        rows::{BookRow, BookRowFull},
    },
    prompt,
};
use anyhow::{Result, anyhow};
use libbookstore::{
    Database,
    book::{Book, Change, Filter, Projection},
    core::{loadable::Loadable, query::filter::Cmp},
};

/// Handle the `bookctl books` command and its subcommands
pub(crate) async fn handle_command(command: BookCommands, db: &Database) -> Result<()> {
    match command {
        BookCommands::List {
            filter,
            sort,
            fields,
            full,
            output,
        } => {
            let mut cursor = apply_sort(Book::find(build_filter(&filter)), &sort);
            let str = if !fields.is_empty() {
                let projection = Projection::new(fields)?;
                let books = cursor.project(&projection).to_vec(db).await?;
                output::format_projection(&books, &projection, output)?
            } else {
                let books = cursor.to_vec(db).await?;
                match full {
                    true => output::format_seq(books.iter().map(BookRowFull::new), output)?,
                    false => output::format_seq(books.iter().map(BookRow::new), output)?,
                }
            };
            println!("{str}");
            Ok(())
        }
        BookCommands::Show { title, output } => match Book::find_by_title(&title, db).await? {
            Some(book) => {
                let str = output::format_one(BookRowFull::new(&book), output)?;
                println!("{str}");
                Ok(())
            }
            None => {
                println!("Book '{title}' not found");
                Ok(())
            }
        },
        BookCommands::Count { filter } => {
            let n = Book::count(build_filter(&filter), db).await?;
            println!("{n}");
            Ok(())
        }
        BookCommands::Add {
            title,
            author,
            genre,
            year,
            price,
            out_of_stock,
            pages,
            publisher,
        } => {
            let mut book = if title.is_none()
                && author.is_none()
                && genre.is_none()
                && year.is_none()
                && price.is_none()
                && !out_of_stock
                && pages.is_none()
                && publisher.is_none()
            {
                prompt::prompt_book()?
            } else {
                Book::new(
                    title.ok_or_else(|| anyhow!("No title specified"))?,
                    author.ok_or_else(|| anyhow!("No author specified"))?,
                    genre.ok_or_else(|| anyhow!("No genre specified"))?,
                    year.ok_or_else(|| anyhow!("No publication year specified"))?,
                    price.ok_or_else(|| anyhow!("No price specified"))?,
                    !out_of_stock,
                    pages.ok_or_else(|| anyhow!("Number of pages not specified"))?,
                    publisher.ok_or_else(|| anyhow!("No publisher specified"))?,
                )
            };
            book.insert(db).await?;
            println!("Added '{}' to the collection", book.title);
            Ok(())
        }
        BookCommands::SetPrice { title, price } => {
            let res = Book::update_one(
                Filter::Title(Cmp::Equal, title.clone()).into(),
                &[Change::Price(price)],
                db,
            )
            .await?;
            match (res.matched, res.modified) {
                (0, _) => println!("Book '{title}' not found"),
                (_, 0) => println!("'{title}' already costs {price:.2}"),
                _ => println!("Changed the price of '{title}' to {price:.2}"),
            }
            Ok(())
        }
        BookCommands::Remove { title, yes } => {
            if !yes && !prompt::confirm(&format!("Remove '{title}' from the collection?"))? {
                return Err(anyhow!("Aborted"));
            }
            let removed = Book::delete_one(Filter::Title(Cmp::Equal, title.clone()).into(), db).await?;
            match removed {
                0 => println!("Book '{title}' not found"),
                _ => println!("Removed '{title}' from the collection"),
            }
            Ok(())
        }
    }
}

//! Commands that summarize the collection
use super::build_filter;
use crate::{
    cli::{FilterArgs, StatsCommands},
    output::{
        self, OutputFormat,
        rows::{AuthorCountRow, DecadeRow, GenrePriceRow},
    },
};
use anyhow::Result;
use libbookstore::{Database, aggregate};

/// Handle the `bookctl stats` command and its subcommands
pub(crate) async fn handle_command(
    command: StatsCommands,
    filter: FilterArgs,
    output: OutputFormat,
    db: &Database,
) -> Result<()> {
    let filter = build_filter(&filter);
    let str = match command {
        StatsCommands::Genres => {
            let averages = aggregate::average_price_by_genre(filter, db).await?;
            output::format_seq(averages.into_iter().map(GenrePriceRow::from), output)?
        }
        StatsCommands::TopAuthor => match aggregate::top_author(filter, db).await? {
            Some(top) => output::format_one(AuthorCountRow::from(top), output)?,
            None => "No books found".to_string(),
        },
        StatsCommands::Authors { limit } => {
            let counts = aggregate::author_counts(filter, limit, db).await?;
            output::format_seq(counts.into_iter().map(AuthorCountRow::from), output)?
        }
        StatsCommands::Decades => {
            let decades = aggregate::count_by_decade(filter, db).await?;
            output::format_seq(decades.into_iter().map(DecadeRow::from), output)?
        }
    };
    println!("{str}");
    Ok(())
}

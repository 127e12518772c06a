//! Commands that manage the indexes of the collection
use crate::{
    cli::IndexCommands,
    output::{self, rows::IndexRow},
};
use anyhow::Result;
use libbookstore::{
    Database,
    index::{self, IndexSpec},
};

/// The indexes that `bookctl index create` should create for the given options
fn selected_indexes(title: bool, author_year: bool) -> Vec<IndexSpec> {
    if !title && !author_year {
        return index::standard_indexes();
    }
    let mut specs = Vec::new();
    if title {
        specs.push(IndexSpec::title());
    }
    if author_year {
        specs.push(IndexSpec::author_published_year());
    }
    specs
}

/// Handle the `bookctl index` command and its subcommands
pub(crate) async fn handle_command(command: IndexCommands, db: &Database) -> Result<()> {
    match command {
        IndexCommands::Create { title, author_year } => {
            for spec in selected_indexes(title, author_year) {
                let name = index::create(&spec, db).await?;
                println!("Index '{name}' is in place");
            }
            Ok(())
        }
        IndexCommands::List { output } => {
            let indexes = index::list(db).await?;
            let str = output::format_seq(indexes.into_iter().map(IndexRow::from), output)?;
            println!("{str}");
            Ok(())
        }
        IndexCommands::Drop { name } => {
            index::drop(&name, db).await?;
            println!("Removed index '{name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_indexes() {
        let names = |specs: Vec<IndexSpec>| specs.iter().map(IndexSpec::name).collect::<Vec<_>>();
        assert_eq!(
            names(selected_indexes(false, false)),
            vec!["title_1", "author_1_published_year_-1"]
        );
        assert_eq!(names(selected_indexes(true, false)), vec!["title_1"]);
        assert_eq!(
            names(selected_indexes(false, true)),
            vec!["author_1_published_year_-1"]
        );
    }
}

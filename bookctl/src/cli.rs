use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use libbookstore::book::Field;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage the books of the plp_bookstore database")]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Path to the database file (overrides the config file)"
    )]
    pub database: Option<PathBuf>,
    #[arg(
        short,
        long,
        global = true,
        help = "Path to the config file (defaults to the user's config directory)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Insert the sample books (or books from a file) into the collection")]
    Seed {
        #[arg(short, long, help = "Import books from this file instead of the samples")]
        file: Option<PathBuf>,
        #[arg(
            long,
            value_enum,
            help = "Format of the import file (guessed from the file extension by default)"
        )]
        format: Option<ImportFormat>,
    },
    #[command(about = "Query and modify books")]
    Books {
        #[command(subcommand)]
        command: BookCommands,
    },
    #[command(about = "Summaries of the book collection")]
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
        #[command(subcommand)]
        command: StatsCommands,
    },
    #[command(about = "Manage the indexes of the book collection")]
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },
    #[command(about = "Show how the database would run a query for books")]
    Explain {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,
        #[arg(long, help = "Also run the query and report execution statistics")]
        stats: bool,
    },
    #[command(about = "Manage the configuration file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    #[command(about = "Generate shell completions")]
    Completions { shell: clap_complete::Shell },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ImportFormat {
    Json,
    Csv,
}

/// Options that narrow down which books a command applies to. All given
/// options must match.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    #[arg(long, help = "Only books with exactly this title")]
    pub title: Option<String>,
    #[arg(long, help = "Only books by exactly this author")]
    pub author: Option<String>,
    #[arg(long, help = "Only books in exactly this genre")]
    pub genre: Option<String>,
    #[arg(long, help = "Only books from exactly this publisher")]
    pub publisher: Option<String>,
    #[arg(long, help = "Only books published after this year")]
    pub published_after: Option<i32>,
    #[arg(long, help = "Only books published before this year")]
    pub published_before: Option<i32>,
    #[arg(long, conflicts_with = "out_of_stock", help = "Only books that are in stock")]
    pub in_stock: bool,
    #[arg(long, help = "Only books that are out of stock")]
    pub out_of_stock: bool,
    #[arg(long, help = "Only books that cost at least this much")]
    pub min_price: Option<f64>,
    #[arg(long, help = "Only books that cost at most this much")]
    pub max_price: Option<f64>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SortArgs {
    #[arg(long, value_enum, help = "Sort by this field (may be repeated)")]
    pub sort: Vec<SortField>,
    #[arg(long, requires = "sort", help = "Sort in descending order")]
    pub reverse: bool,
    #[arg(long, help = "Skip this many books")]
    pub skip: Option<u32>,
    #[arg(long, help = "Show at most this many books")]
    pub limit: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum SortField {
    Title,
    Author,
    Genre,
    Year,
    Price,
    Pages,
    Publisher,
}

impl From<SortField> for Field {
    fn from(value: SortField) -> Self {
        match value {
            SortField::Title => Field::Title,
            SortField::Author => Field::Author,
            SortField::Genre => Field::Genre,
            SortField::Year => Field::PublishedYear,
            SortField::Price => Field::Price,
            SortField::Pages => Field::Pages,
            SortField::Publisher => Field::Publisher,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum BookCommands {
    #[command(about = "List books")]
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        sort: SortArgs,
        #[arg(
            long,
            value_delimiter = ',',
            conflicts_with = "full",
            help = "Only show these fields (e.g. title,author,price)"
        )]
        fields: Vec<Field>,
        #[arg(short, long, help = "Show all fields of each book")]
        full: bool,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    #[command(about = "Show all details about a book")]
    Show {
        title: String,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    #[command(about = "Count books")]
    Count {
        #[command(flatten)]
        filter: FilterArgs,
    },
    #[command(about = "Add a new book to the collection")]
    Add {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        out_of_stock: bool,
        #[arg(long)]
        pages: Option<i32>,
        #[arg(long)]
        publisher: Option<String>,
    },
    #[command(about = "Change the price of the first book with the given title")]
    SetPrice { title: String, price: f64 },
    #[command(about = "Remove the first book with the given title")]
    Remove {
        title: String,
        #[arg(short, long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    #[command(about = "Average price of the books in each genre")]
    Genres,
    #[command(about = "The author with the most books")]
    TopAuthor,
    #[command(about = "Number of books by each author")]
    Authors {
        #[arg(short, long, help = "Only show this many authors")]
        limit: Option<u32>,
    },
    #[command(about = "Number of books published in each decade")]
    Decades,
}

#[derive(Subcommand, Debug)]
pub enum IndexCommands {
    #[command(about = "Create indexes (all standard indexes when no option is given)")]
    Create {
        #[arg(long, help = "Index the title of each book")]
        title: bool,
        #[arg(long, help = "Index the author and publication year of each book")]
        author_year: bool,
    },
    #[command(about = "List the indexes of the book collection")]
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    #[command(about = "Remove an index")]
    Drop { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    #[command(about = "Show the configuration that is in effect")]
    Show,
    #[command(about = "Write a new configuration file (the database is taken from --database)")]
    Init {
        #[arg(long, help = "Milliseconds to wait for a locked database")]
        busy_timeout: Option<u64>,
        #[arg(long, help = "Milliseconds to wait for a free connection")]
        acquire_timeout: Option<u64>,
        #[arg(long, help = "Maximum number of database connections")]
        max_connections: Option<u32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from([
            "bookctl",
            "-d",
            "books.sqlite",
            "books",
            "list",
            "--genre",
            "Fiction",
            "--sort",
            "price",
            "--reverse",
            "--skip",
            "5",
            "--limit",
            "5",
            "--fields",
            "title,author,price",
            "-o",
            "json",
        ])
        .expect("Failed to parse");
        assert_eq!(cli.database, Some(PathBuf::from("books.sqlite")));
        let Commands::Books {
            command:
                BookCommands::List {
                    filter,
                    sort,
                    fields,
                    full,
                    output,
                },
        } = cli.command
        else {
            panic!("wrong command");
        };
        assert_eq!(filter.genre.as_deref(), Some("Fiction"));
        assert_eq!(sort.sort, vec![SortField::Price]);
        assert!(sort.reverse);
        assert_eq!((sort.skip, sort.limit), (Some(5), Some(5)));
        assert_eq!(fields, vec![Field::Title, Field::Author, Field::Price]);
        assert!(!full);
        assert_eq!(output, OutputFormat::Json);
    }

    #[test]
    fn test_parse_rejects_conflicts() {
        assert!(
            Cli::try_parse_from(["bookctl", "books", "count", "--in-stock", "--out-of-stock"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["bookctl", "books", "list", "--full", "--fields", "title"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["bookctl", "books", "list", "--fields", "_id"]).is_err());
        assert!(Cli::try_parse_from(["bookctl", "books", "set-price", "1984"]).is_err());
    }

    #[test]
    fn test_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "bookctl",
            "stats",
            "--in-stock",
            "authors",
            "--limit",
            "3",
            "--config",
            "/tmp/bookctl.json",
        ])
        .expect("Failed to parse");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/bookctl.json")));
        assert!(matches!(
            cli.command,
            Commands::Stats {
                filter: FilterArgs { in_stock: true, .. },
                command: StatsCommands::Authors { limit: Some(3) },
                ..
            }
        ));
    }
}

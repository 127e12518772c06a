//! Handlers for the bookctl subcommands
use crate::cli::{FilterArgs, SortArgs};
use libbookstore::{
    book::{Cursor, Field, Filter},
    core::query::{DynFilterPart, SortOrder, SortSpec, SortSpecs, filter::Cmp, filter::and},
};

pub(crate) mod books;
pub(crate) mod config;
pub(crate) mod explain;
pub(crate) mod indexes;
pub(crate) mod seed;
pub(crate) mod stats;

/// Combine all of the given filter options into a single filter. Returns `None`
/// when no options were given, so that every book matches.
pub(crate) fn build_filter(args: &FilterArgs) -> Option<DynFilterPart> {
    let mut builder = and();
    if let Some(title) = &args.title {
        builder = builder.push(Filter::Title(Cmp::Equal, title.clone()));
    }
    if let Some(author) = &args.author {
        builder = builder.push(Filter::Author(Cmp::Equal, author.clone()));
    }
    if let Some(genre) = &args.genre {
        builder = builder.push(Filter::Genre(Cmp::Equal, genre.clone()));
    }
    if let Some(publisher) = &args.publisher {
        builder = builder.push(Filter::Publisher(Cmp::Equal, publisher.clone()));
    }
    if let Some(year) = args.published_after {
        builder = builder.push(Filter::PublishedYear(Cmp::GreaterThan, year));
    }
    if let Some(year) = args.published_before {
        builder = builder.push(Filter::PublishedYear(Cmp::LessThan, year));
    }
    if args.in_stock {
        builder = builder.push(Filter::InStock(true));
    }
    if args.out_of_stock {
        builder = builder.push(Filter::InStock(false));
    }
    if let Some(price) = args.min_price {
        builder = builder.push(Filter::Price(Cmp::NotLessThan, price));
    }
    if let Some(price) = args.max_price {
        builder = builder.push(Filter::Price(Cmp::NotGreaterThan, price));
    }
    match builder.is_empty() {
        true => None,
        false => Some(builder.build()),
    }
}

/// The sort stage for the given options, if any sort field was given
pub(crate) fn build_sort(args: &SortArgs) -> Option<SortSpecs<Field>> {
    if args.sort.is_empty() {
        return None;
    }
    let order = match args.reverse {
        true => SortOrder::Descending,
        false => SortOrder::Ascending,
    };
    Some(SortSpecs(
        args.sort
            .iter()
            .map(|field| SortSpec::new(Field::from(*field), order))
            .collect(),
    ))
}

/// Add the sort, skip and limit stages of the given options to a cursor
pub(crate) fn apply_sort<T>(mut cursor: Cursor<T>, args: &SortArgs) -> Cursor<T> {
    if let Some(sort) = build_sort(args) {
        cursor = cursor.sort(sort);
    }
    if let Some(n) = args.skip {
        cursor = cursor.skip(n);
    }
    if let Some(n) = args.limit {
        cursor = cursor.limit(n);
    }
    cursor
}

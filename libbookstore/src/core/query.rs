//! utilities related to database queries
//!
use serde::{
    Deserialize, Serialize,
    de::{IntoDeserializer, value},
};
use std::{ops::Deref, str::FromStr, sync::Arc};

pub mod filter {
    use super::DynFilterPart;

    /// An operator for combining filter parts to form a more complex filter expression
    #[derive(Clone, Debug)]
    pub enum Op {
        Or,
        And,
    }

    #[derive(Clone)]
    /// An object that allows you easily build compound filters that can be applied to SQL queries
    pub struct CompoundFilterBuilder {
        pub(crate) top: CompoundFilter,
    }

    pub fn and() -> CompoundFilterBuilder {
        CompoundFilterBuilder::new(Op::And)
    }

    pub fn or() -> CompoundFilterBuilder {
        CompoundFilterBuilder::new(Op::Or)
    }

    impl CompoundFilterBuilder {
        /// Create a new [CompoundFilterBuilder] object that will combine all filter
        /// expressions using the given operator
        pub fn new(op: Op) -> Self {
            Self {
                top: CompoundFilter::new(op),
            }
        }

        /// Add a new filter expression to this compound filter. It will be combined
        /// with all existing filter expressions using the operator that was specified in
        /// the constructor.
        pub fn push<F: Into<DynFilterPart>>(mut self, filter: F) -> Self {
            self.top.add_filter(filter.into());
            self
        }

        /// Whether any filter expressions have been added to this builder yet
        pub fn is_empty(&self) -> bool {
            self.top.conditions.is_empty()
        }

        /// Generate a new [CompoundFilter] object from this builder object
        pub fn build(self) -> DynFilterPart {
            self.top.into()
        }
    }

    /// A Trait implemented by anything that can be a filter. It could be a single field or a
    /// multi-level compound filter condition.
    pub trait FilterPart: Send {
        /// convert the given filter part to SQL syntax and add it to the given [sqlx::QueryBuilder] object
        fn add_to_query(&self, builder: &mut sqlx::QueryBuilder<sqlx::Sqlite>);
    }

    #[derive(Clone)]
    /// An object that represents one or more filter conditions that are combined by a single logical
    /// operator ([Op]). Multiple compound filters can be combined together into larger filter
    /// conditions
    pub struct CompoundFilter {
        pub(crate) conditions: Vec<DynFilterPart>,
        pub(crate) op: Op,
    }

    impl CompoundFilter {
        /// Create a new compound filter object
        pub fn new(op: Op) -> Self {
            Self {
                conditions: Default::default(),
                op,
            }
        }

        /// Add a new filter expression to the current filter. It will be combined
        /// with the operator [Op] that was specified in [CompoundFilter::new()]
        pub fn add_filter(&mut self, filter: DynFilterPart) {
            self.conditions.push(filter);
        }
    }

    impl FilterPart for CompoundFilter {
        fn add_to_query(&self, builder: &mut sqlx::QueryBuilder<sqlx::Sqlite>) {
            if self.conditions.is_empty() {
                builder.push("TRUE");
                return;
            }

            let mut first = true;
            builder.push(" (");
            let separator = match self.op {
                Op::And => " AND ",
                Op::Or => " OR ",
            };

            for cond in &self.conditions {
                if first {
                    first = false;
                } else {
                    builder.push(separator);
                }
                cond.add_to_query(builder);
            }
            builder.push(")");
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    /// An object representing the comparison operator that is used in a filter expression
    pub enum Cmp {
        Equal,
        NotEqual,
        Like,
        LessThan,
        GreaterThan,
        NotGreaterThan,
        NotLessThan,
    }

    impl std::fmt::Display for Cmp {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            match self {
                Cmp::Equal => write!(f, " IS "),
                Cmp::NotEqual => write!(f, " IS NOT "),
                Cmp::Like => write!(f, " LIKE "),
                Cmp::LessThan => write!(f, " < "),
                Cmp::GreaterThan => write!(f, " > "),
                Cmp::NotGreaterThan => write!(f, " <= "),
                Cmp::NotLessThan => write!(f, " >= "),
            }
        }
    }

    /// Wraps a text value in wildcards when it is compared with [Cmp::Like]
    pub(crate) fn text_operand(cmp: Cmp, value: &str) -> String {
        match cmp {
            Cmp::Like => format!("%{value}%"),
            _ => value.to_string(),
        }
    }
}

/// A type for specifying which rows of an SQL query to return. This is the
/// equivalent of a `skip` and `limit` stage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LimitSpec {
    /// The number of items to return. `None` returns every remaining row.
    pub count: Option<u32>,
    /// An optional offset of rows to return. For example, if this value is
    /// `Some(10)`, it means to start returning items starting with the 10th
    /// row.
    pub offset: Option<u32>,
}

impl LimitSpec {
    /// skip the first `skip` rows and return at most `count` rows after that
    pub fn page(skip: u32, count: u32) -> Self {
        Self {
            count: Some(count),
            offset: Some(skip),
        }
    }
}

impl From<u32> for LimitSpec {
    fn from(count: u32) -> Self {
        LimitSpec {
            count: Some(count),
            offset: None,
        }
    }
}

impl ToSql for LimitSpec {
    fn to_sql(&self) -> String {
        // sqlite only accepts OFFSET after a LIMIT, and a negative limit means "no limit"
        match (self.count, self.offset) {
            (None, None) => String::new(),
            (Some(count), None) => format!(" LIMIT {count}"),
            (Some(count), Some(offset)) => format!(" LIMIT {count} OFFSET {offset}"),
            (None, Some(offset)) => format!(" LIMIT -1 OFFSET {offset}"),
        }
    }
}

/// A type for specifying the sort order of an SQL query
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    #[default]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    /// The numeric direction that document databases use in sort and index
    /// specifications: `1` for ascending and `-1` for descending
    pub fn direction(&self) -> i8 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

impl FromStr for SortOrder {
    type Err = value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let deserializer = s.into_deserializer();
        Deserialize::deserialize(deserializer)
    }
}

impl ToSql for SortOrder {
    fn to_sql(&self) -> String {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
        .into()
    }
}

/// a trait that generates an sql respresentation of the implementing type
pub trait ToSql {
    fn to_sql(&self) -> String;
}

/// A type for specifying how the results from an SQL query should be sorted
#[derive(Clone, Debug, PartialEq)]
pub struct SortSpec<T: ToSql> {
    /// The field that the sql query should be sorted on. The type must be
    /// convertible to an SQL representation via [ToSql]
    pub field: T,
    /// The direction to sort results
    pub order: SortOrder,
}

impl<T: ToSql> ToSql for SortSpec<T> {
    fn to_sql(&self) -> String {
        format!("{} {}", self.field.to_sql(), self.order.to_sql())
    }
}

impl<T: ToSql> SortSpec<T> {
    pub fn new(field: T, order: SortOrder) -> Self {
        Self { field, order }
    }
}

/// A type representing an ordered list of multiple sort specifications. The
/// purpose of this type is merely to facilitate various convienience conversion
/// functions by implementing [From]
#[derive(Clone, Debug, PartialEq)]
pub struct SortSpecs<T: ToSql>(pub Vec<SortSpec<T>>);

impl<T: ToSql> From<SortSpec<T>> for SortSpecs<T> {
    fn from(value: SortSpec<T>) -> Self {
        SortSpecs(vec![value])
    }
}

impl<T: ToSql> ToSql for SortSpecs<T> {
    fn to_sql(&self) -> String {
        " ORDER BY ".to_string()
            + &self
                .0
                .iter()
                .map(ToSql::to_sql)
                .collect::<Vec<String>>()
                .join(", ")
    }
}

impl<T: ToSql> From<T> for SortSpecs<T> {
    fn from(value: T) -> Self {
        SortSpecs(vec![SortSpec {
            field: value,
            order: SortOrder::default(),
        }])
    }
}

impl<T: ToSql> From<Vec<T>> for SortSpecs<T> {
    fn from(value: Vec<T>) -> Self {
        Self(
            value
                .into_iter()
                .map(|field| SortSpec::new(field, SortOrder::default()))
                .collect(),
        )
    }
}

#[derive(Clone)]
pub struct DynFilterPart(Arc<dyn filter::FilterPart + Sync>);

impl Deref for DynFilterPart {
    type Target = Arc<dyn filter::FilterPart + Sync>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<F> From<F> for DynFilterPart
where
    F: filter::FilterPart + Send + Sync + 'static,
{
    fn from(value: F) -> Self {
        DynFilterPart(Arc::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::filter::FilterPart;
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct MockSortField(String);

    impl ToSql for MockSortField {
        fn to_sql(&self) -> String {
            self.0.clone()
        }
    }

    #[derive(Clone)]
    struct MockFilter {
        sql: String,
    }

    impl filter::FilterPart for MockFilter {
        fn add_to_query(&self, builder: &mut sqlx::QueryBuilder<sqlx::Sqlite>) {
            builder.push(&self.sql);
        }
    }

    #[test]
    fn test_limit_spec_to_sql() {
        assert_eq!(LimitSpec::from(10).to_sql(), " LIMIT 10");
        assert_eq!(LimitSpec::page(20, 5).to_sql(), " LIMIT 5 OFFSET 20");
        let skip_only = LimitSpec {
            count: None,
            offset: Some(5),
        };
        assert_eq!(skip_only.to_sql(), " LIMIT -1 OFFSET 5");
        assert_eq!(LimitSpec::default().to_sql(), "");
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!(SortOrder::from_str("asc").unwrap(), SortOrder::Ascending);
        assert_eq!(SortOrder::from_str("desc").unwrap(), SortOrder::Descending);
        assert!(SortOrder::from_str("invalid").is_err());
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
    }

    #[test]
    fn test_sort_order_direction() {
        assert_eq!(SortOrder::Ascending.direction(), 1);
        assert_eq!(SortOrder::Descending.direction(), -1);
    }

    #[test]
    fn test_sort_specs_to_sql() {
        let specs = SortSpecs(vec![
            SortSpec::new(MockSortField("price".to_string()), SortOrder::Ascending),
            SortSpec::new(
                MockSortField("published_year".to_string()),
                SortOrder::Descending,
            ),
        ]);
        assert_eq!(specs.to_sql(), " ORDER BY price ASC, published_year DESC");
    }

    #[test]
    fn test_cmp_display() {
        assert_eq!(filter::Cmp::GreaterThan.to_string(), " > ");
        assert_eq!(filter::Cmp::Equal.to_string(), " IS ");
        assert_eq!(filter::text_operand(filter::Cmp::Like, "Tolk"), "%Tolk%");
        assert_eq!(filter::text_operand(filter::Cmp::Equal, "Dune"), "Dune");
    }

    #[test]
    fn test_compound_filter_add_to_query_empty() {
        let filter = filter::CompoundFilter::new(filter::Op::And);
        let mut builder = sqlx::QueryBuilder::new("SELECT * WHERE ");
        filter.add_to_query(&mut builder);
        assert_eq!(builder.sql(), "SELECT * WHERE TRUE");
    }

    #[test]
    fn test_compound_filter_nested() {
        let inner = filter::or()
            .push(MockFilter {
                sql: "genre = 'Fiction'".to_string(),
            })
            .push(MockFilter {
                sql: "genre = 'Memoir'".to_string(),
            })
            .build();
        let outer = filter::and()
            .push(MockFilter {
                sql: "in_stock = 1".to_string(),
            })
            .push(inner)
            .build();

        let mut builder = sqlx::QueryBuilder::new("SELECT * FROM books WHERE");
        outer.add_to_query(&mut builder);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM books WHERE (in_stock = 1 AND  (genre = 'Fiction' OR genre = 'Memoir'))"
        );
    }
}

//! Showing how the database runs a query
use super::{apply_sort, build_filter};
use crate::cli::{FilterArgs, SortArgs};
use anyhow::Result;
use libbookstore::{
    Database,
    book::Book,
    explain::{ExplainReport, Verbosity},
};

fn format_report(report: &ExplainReport) -> String {
    let mut lines = vec![format!("Query: {}", report.query), "Plan:".to_string()];
    lines.extend(report.plan_lines().into_iter().map(|l| format!("  {l}")));
    if let Some(stats) = &report.stats {
        lines.push(format!(
            "Returned {} books in {:.3} ms",
            stats.returned,
            stats.elapsed.as_secs_f64() * 1000.0
        ));
    }
    lines.join("\n")
}

/// Handle the `bookctl explain` command
pub(crate) async fn handle_command(
    filter: FilterArgs,
    sort: SortArgs,
    stats: bool,
    db: &Database,
) -> Result<()> {
    let verbosity = match stats {
        true => Verbosity::ExecutionStats,
        false => Verbosity::QueryPlanner,
    };
    let mut cursor = apply_sort(Book::find(build_filter(&filter)), &sort);
    let report = cursor.explain(verbosity, db).await?;
    println!("{}", format_report(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libbookstore::explain::{ExecutionStats, PlanStep};
    use std::time::Duration;

    #[test]
    fn test_format_report() {
        let report = ExplainReport {
            query: "SELECT title FROM books ORDER BY bookid ASC".to_string(),
            plan: vec![PlanStep {
                id: 2,
                parent: 0,
                detail: "SCAN books".to_string(),
            }],
            stats: Some(ExecutionStats {
                returned: 10,
                elapsed: Duration::from_micros(1500),
            }),
        };
        assert_eq!(
            format_report(&report),
            "Query: SELECT title FROM books ORDER BY bookid ASC\n\
             Plan:\n  SCAN books\n\
             Returned 10 books in 1.500 ms"
        );
    }
}

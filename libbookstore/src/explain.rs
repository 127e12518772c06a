//! Diagnostics for book queries. The database engine reports how it intends to
//! run a query, and optionally the query is executed to collect statistics.
//! None of this changes what a query returns.
use crate::{Database, Result, book::Cursor};
use serde::Serialize;
use sqlx::{FromRow, sqlite::SqliteRow};
use std::time::{Duration, Instant};
use tracing::debug;

/// How much detail to collect when explaining a query
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Only ask the engine for its query plan
    #[default]
    QueryPlanner,
    /// Also run the query and measure it
    ExecutionStats,
}

/// A single step of the engine's query plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromRow)]
pub struct PlanStep {
    pub id: i64,
    /// The id of the step that this step belongs to, or 0 for top-level steps
    pub parent: i64,
    /// e.g. "SCAN books" or "SEARCH books USING INDEX title_1 (title=?)"
    pub detail: String,
}

/// Measurements taken while running a query
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExecutionStats {
    /// The number of results the query returned
    pub returned: usize,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExplainReport {
    /// The SQL statement that was explained
    pub query: String,
    pub plan: Vec<PlanStep>,
    /// Only present with [Verbosity::ExecutionStats]
    pub stats: Option<ExecutionStats>,
}

impl ExplainReport {
    /// Whether any step of the plan reads through the index with the given name
    pub fn uses_index(&self, name: &str) -> bool {
        self.plan.iter().any(|step| {
            step.detail
                .split_whitespace()
                .any(|word| word.trim_matches('"') == name)
        })
    }

    /// The plan as indented lines, one per step, with child steps nested
    /// beneath their parent
    pub fn plan_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.push_children(0, 0, &mut lines);
        lines
    }

    fn push_children(&self, parent: i64, depth: usize, lines: &mut Vec<String>) {
        for step in self.plan.iter().filter(|s| s.parent == parent) {
            lines.push(format!("{}{}", "  ".repeat(depth), step.detail));
            // the root step has id 0 and parent 0
            if step.id != parent {
                self.push_children(step.id, depth + 1, lines);
            }
        }
    }
}

impl<T> Cursor<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static,
{
    /// Ask the engine how it would run this query. With
    /// [Verbosity::ExecutionStats], the query is also run to completion and
    /// the number of results and the time it took are reported.
    pub async fn explain(&mut self, verbosity: Verbosity, db: &Database) -> Result<ExplainReport> {
        let query = self.sql();
        let mut builder = self.query_builder("EXPLAIN QUERY PLAN ");
        let plan: Vec<PlanStep> = builder.build_query_as().fetch_all(db.pool()).await?;
        debug!(query = %query, steps = plan.len(), "explained query");

        let stats = match verbosity {
            Verbosity::QueryPlanner => None,
            Verbosity::ExecutionStats => {
                let start = Instant::now();
                let returned = self.to_vec(db).await?.len();
                Some(ExecutionStats {
                    returned,
                    elapsed: start.elapsed(),
                })
            }
        };
        Ok(ExplainReport { query, plan, stats })
    }
}

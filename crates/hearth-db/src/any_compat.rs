//! AnyPool query helpers.
//!
//! `sqlx::Any` has no placeholder rewriting and `QueryBuilder` emits `?` for
//! it, which PostgreSQL rejects. Filtered listings are therefore assembled here
//! with explicit `$N` placeholders, which both PostgreSQL and SQLite accept.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{AnyPool, FromRow, any::AnyRow};
use uuid::Uuid;

/// Timestamp in the stored text form. Fixed-width so text order is time order.
pub fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now() -> String {
    timestamp(Utc::now())
}

/// Lowercased name and email as stored in `users.search_key`.
///
/// Folding happens here rather than in SQL because SQLite's `LOWER()` only
/// folds ASCII.
pub fn search_key(name: &str, email: &str) -> String {
    format!("{}\n{}", name.to_lowercase(), email.to_lowercase())
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern and wrap it
/// as a case-folded substring match.
pub fn contains_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// A bound argument.
#[derive(Debug, Clone)]
pub enum Arg {
    Text(String),
    Int(i64),
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Uuid> for Arg {
    fn from(id: Uuid) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// A `SELECT` with optional `AND` clauses and numbered placeholders.
#[derive(Debug)]
pub struct Select {
    sql: String,
    args: Vec<Arg>,
}

impl Select {
    /// `base` must end in a placeholder-free `WHERE` clause (e.g. `WHERE 1 = 1`)
    /// so every filter can `AND` onto it.
    pub fn new(base: &str) -> Self {
        Self {
            sql: base.to_string(),
            args: Vec::new(),
        }
    }

    fn next_placeholder(&mut self, value: Arg) -> String {
        self.args.push(value);
        format!("${}", self.args.len())
    }

    /// Append ` AND {column} = $N`.
    pub fn and_eq(self, column: &str, value: impl Into<Arg>) -> Self {
        self.and_clause(&format!("{column} = ?"), value)
    }

    /// Append ` AND {clause}`; every `?` in `clause` refers to the same new argument.
    pub fn and_clause(mut self, clause: &str, value: impl Into<Arg>) -> Self {
        let placeholder = self.next_placeholder(value.into());
        self.sql.push_str(" AND ");
        self.sql.push_str(&clause.replace('?', &placeholder));
        self
    }

    /// Append ordering and pagination.
    pub fn page(mut self, order_by: &str, limit: i64, offset: i64) -> Self {
        let limit_ph = self.next_placeholder(Arg::Int(limit));
        let offset_ph = self.next_placeholder(Arg::Int(offset));
        self.sql
            .push_str(&format!(" ORDER BY {order_by} LIMIT {limit_ph} OFFSET {offset_ph}"));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub async fn fetch_all<T>(self, pool: &AnyPool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        let mut query = sqlx::query_as::<_, T>(&self.sql);
        for arg in self.args {
            query = match arg {
                Arg::Text(s) => query.bind(s),
                Arg::Int(n) => query.bind(n),
            };
        }
        query.fetch_all(pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_numbers_placeholders() {
        let select = Select::new("SELECT * FROM pulses WHERE 1 = 1")
            .and_eq("community_id", Uuid::nil())
            .and_eq("status", "approved")
            .page("created_at DESC", 10, 0);
        assert_eq!(
            select.sql(),
            "SELECT * FROM pulses WHERE 1 = 1 AND community_id = $1 AND status = $2 \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
    }

    #[test]
    fn test_clause_reuses_placeholder() {
        let select = Select::new("SELECT * FROM t WHERE 1 = 1")
            .and_clause("(a LIKE ? OR b LIKE ?)", "%x%");
        assert_eq!(select.sql(), "SELECT * FROM t WHERE 1 = 1 AND (a LIKE $1 OR b LIKE $1)");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Ann"), "%ann%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("ÉLISE"), "%élise%");
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let a = Utc::now();
        let b = a + chrono::Duration::milliseconds(5);
        assert!(timestamp(a) < timestamp(b));
        assert!(timestamp(a).ends_with('Z'));
    }
}

use crate::{register_functions, Error, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter, types::Value, OptionalExtension, Row};
use sqlhist_core::db::{
    AggregateQuery, BoundKind, BucketRow, QueryOps, RowSet, SqlValue, Statement, BUCKET_COL,
    FREQUENCY_COL,
};
use std::time::Duration;
use tracing::debug;

#[derive(Debug)]
struct SqliteConnectionCustomizer;

impl r2d2::CustomizeConnection<rusqlite::Connection, rusqlite::Error>
    for SqliteConnectionCustomizer
{
    fn on_acquire(
        &self,
        conn: &mut rusqlite::Connection,
    ) -> std::result::Result<(), rusqlite::Error> {
        // WAL lets histogram reads run alongside writers on the same file.
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        register_functions(conn)?;
        Ok(())
    }
}

fn sql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(v) => Value::Integer(*v),
        SqlValue::Real(v) => Value::Real(*v),
        SqlValue::Text(v) => Value::Text(v.to_owned()),
    }
}

#[derive(Clone)]
pub struct SqliteDb {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteDb {
    pub fn from_file(file: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(file);
        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(Duration::from_secs(30))
            .connection_customizer(Box::new(SqliteConnectionCustomizer))
            .build(manager)?;
        Ok(Self { pool })
    }

    /// A private in-memory database. The pool holds a single connection so
    /// every query sees the same data.
    pub fn new_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .connection_customizer(Box::new(SqliteConnectionCustomizer))
            .build(manager)?;
        Ok(Self { pool })
    }

    fn get_pool(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Runs one or more parameterless statements, e.g. schema setup or a data load.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.get_pool()?.execute_batch(sql)?;
        Ok(())
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let exists = self
            .get_pool()?
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
                params![table_name],
                |_| Ok(true),
            )
            .optional()?;
        Ok(exists.unwrap_or(false))
    }

    fn query_row<T, F>(&self, stmt: &Statement, with_row: F) -> Result<T>
    where
        F: FnOnce(&Row<'_>) -> std::result::Result<T, rusqlite::Error>,
    {
        debug!("executing query: {}", stmt.sql);
        Ok(self.get_pool()?.query_row(
            &stmt.sql,
            params_from_iter(stmt.params.iter().map(sql_value)),
            with_row,
        )?)
    }

    fn query_map<T, F>(&self, stmt: &Statement, f: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> std::result::Result<T, rusqlite::Error>,
    {
        debug!("executing query: {}", stmt.sql);
        let conn = self.get_pool()?;
        let mut prepared = conn.prepare(&stmt.sql)?;
        let rows = prepared.query_map(params_from_iter(stmt.params.iter().map(sql_value)), f)?;
        let res = rows
            .map(|r| r.map_err(|e| e.into()))
            .collect::<Result<Vec<T>>>()?;
        Ok(res)
    }
}

impl QueryOps for SqliteDb {
    type Error = Error;

    fn observe_bound(
        &self,
        expression: &str,
        rows: &RowSet,
        kind: BoundKind,
    ) -> Result<Option<f64>> {
        self.query_row(&rows.bound_statement(expression, kind), |row| row.get(0))
    }

    /// Both bounds in a single round trip.
    fn observe_bounds(
        &self,
        expression: &str,
        rows: &RowSet,
    ) -> Result<(Option<f64>, Option<f64>)> {
        self.query_row(&rows.bounds_statement(expression), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
    }

    fn execute_aggregate(&self, query: &AggregateQuery) -> Result<Vec<BucketRow>> {
        self.query_map(&query.statement(), |row| {
            Ok(BucketRow {
                bucket: row.get(BUCKET_COL)?,
                frequency: row.get(FREQUENCY_COL)?,
            })
        })
    }

    fn execute_equality_count(
        &self,
        expression: &str,
        rows: &RowSet,
        value: f64,
    ) -> Result<u64> {
        self.query_row(&rows.equality_count_statement(expression, value), |row| {
            row.get(0)
        })
    }

    fn render_subquery(&self, rows: &RowSet, selected: &str) -> Result<Statement> {
        Ok(rows.subquery(selected))
    }
}

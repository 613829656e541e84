//! In-memory [`DatabaseHandle`] for unit tests.
//!
//! Records every SQL statement issued so tests can assert on statement
//! content and ordering, and can inject a failure on a chosen statement.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::{FixtureError, Result};

use super::{DatabaseHandle, QueryRows};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTable {
    pub name: String,
    pub columns: Vec<String>,
    pub primary_key: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl FakeTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_primary_key(mut self, pk: &[&str]) -> Self {
        self.primary_key = pk.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_row(mut self, cells: &[Option<&str>]) -> Self {
        self.rows
            .push(cells.iter().map(|c| c.map(str::to_string)).collect());
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeDb {
    pub tables: Vec<FakeTable>,
    pub fks: Vec<(String, String)>,

    /// Every statement sent through `execute`, `begin`, `commit`,
    /// `rollback`, in order.
    pub executed: Vec<String>,
    /// Every SELECT sent through `query`, in order.
    pub queried: Vec<String>,
    /// How many metadata calls (`list_tables`/`list_columns`/
    /// `count_rows`) were made.
    pub metadata_calls: usize,

    /// When set, `execute` fails on the first statement containing this
    /// substring.
    pub fail_execute_on: Option<String>,
    /// Overrides for `execute` affected-row results, consumed in order.
    /// Statements beyond the queue report 1 affected row.
    pub execute_results: VecDeque<u64>,
}

impl FakeDb {
    pub fn with_tables(tables: Vec<FakeTable>) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    fn find(&self, name: &str) -> Option<&FakeTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[async_trait]
impl DatabaseHandle for FakeDb {
    async fn list_tables(&mut self) -> Result<Vec<String>> {
        self.metadata_calls += 1;
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn list_columns(&mut self, table: &str) -> Result<Vec<String>> {
        self.metadata_calls += 1;
        Ok(self
            .find(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn primary_key(&mut self, table: &str) -> Result<Vec<String>> {
        Ok(self
            .find(table)
            .map(|t| t.primary_key.clone())
            .unwrap_or_default())
    }

    async fn foreign_keys(&mut self) -> Result<Vec<(String, String)>> {
        Ok(self.fks.clone())
    }

    async fn count_rows(&mut self, table: &str) -> Result<i64> {
        self.metadata_calls += 1;
        self.find(table)
            .map(|t| t.rows.len() as i64)
            .ok_or_else(|| FixtureError::Metadata(format!("no such table: {}", table)))
    }

    async fn query(&mut self, sql: &str) -> Result<QueryRows> {
        self.queried.push(sql.to_string());

        let name = sql
            .split(" FROM ")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .map(|token| token.trim_end_matches(';'))
            .unwrap_or_default()
            .to_string();

        let table = self
            .find(&name)
            .ok_or_else(|| FixtureError::Metadata(format!("no such table: {}", name)))?;

        Ok(QueryRows {
            columns: table.columns.clone(),
            rows: table.rows.clone(),
        })
    }

    async fn execute(&mut self, sql: &str) -> Result<u64> {
        self.executed.push(sql.to_string());
        if let Some(needle) = &self.fail_execute_on {
            if sql.contains(needle.as_str()) {
                return Err(FixtureError::Metadata(format!(
                    "injected failure on: {}",
                    sql
                )));
            }
        }
        Ok(self.execute_results.pop_front().unwrap_or(1))
    }

    async fn begin(&mut self) -> Result<()> {
        self.executed.push("BEGIN".to_string());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.executed.push("COMMIT".to_string());
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.executed.push("ROLLBACK".to_string());
        Ok(())
    }
}

//! PostgreSQL implementation of the connection provider.
//!
//! Data travels over the simple-query (text) protocol so result cells
//! arrive as strings, which is exactly what dataset files store.

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{NoTls, SimpleQueryMessage};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::Result;

use super::{DatabaseHandle, QueryRows};

/// A live PostgreSQL connection scoped to one command run.
pub struct PgHandle {
    client: tokio_postgres::Client,
    driver: JoinHandle<()>,
    schema: String,
}

impl PgHandle {
    /// Open a connection from configuration. The connection driver task
    /// is spawned here and aborted when the handle drops, so release is
    /// guaranteed on every exit path.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host);
        pg.port(config.port);
        pg.dbname(&config.database);
        pg.user(&config.user);
        pg.password(&config.password);
        pg.application_name("dbfixture");

        let (client, connection) = pg.connect(NoTls).await?;
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("PostgreSQL connection error: {}", e);
            }
        });

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            client,
            driver,
            schema: config.schema.clone(),
        })
    }
}

impl Drop for PgHandle {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[async_trait]
impl DatabaseHandle for PgHandle {
    async fn list_tables(&mut self) -> Result<Vec<String>> {
        let query = r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE'
              AND table_schema = $1
            ORDER BY table_name
        "#;

        let rows = self.client.query(query, &[&self.schema]).await?;
        let tables: Vec<String> = rows.iter().map(|r| r.get::<_, String>(0)).collect();

        debug!("Found {} tables in schema '{}'", tables.len(), self.schema);
        Ok(tables)
    }

    async fn list_columns(&mut self, table: &str) -> Result<Vec<String>> {
        let query = r#"
            SELECT column_name
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = self.client.query(query, &[&self.schema, &table]).await?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    async fn primary_key(&mut self, table: &str) -> Result<Vec<String>> {
        let query = r#"
            SELECT a.attname
            FROM pg_catalog.pg_constraint c
            JOIN pg_catalog.pg_class t ON t.oid = c.conrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
            JOIN pg_catalog.pg_attribute a ON a.attrelid = t.oid
            WHERE n.nspname = $1
              AND t.relname = $2
              AND c.contype = 'p'
              AND a.attnum = ANY(c.conkey)
            ORDER BY array_position(c.conkey, a.attnum)
        "#;

        let rows = self.client.query(query, &[&self.schema, &table]).await?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    async fn foreign_keys(&mut self) -> Result<Vec<(String, String)>> {
        let query = r#"
            SELECT DISTINCT t.relname, rt.relname
            FROM pg_catalog.pg_constraint c
            JOIN pg_catalog.pg_class t ON t.oid = c.conrelid
            JOIN pg_catalog.pg_class rt ON rt.oid = c.confrelid
            JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
            WHERE c.contype = 'f'
              AND n.nspname = $1
            ORDER BY 1, 2
        "#;

        let rows = self.client.query(query, &[&self.schema]).await?;
        Ok(rows
            .iter()
            .map(|r| (r.get::<_, String>(0), r.get::<_, String>(1)))
            .collect())
    }

    async fn count_rows(&mut self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let row = self.client.query_one(&sql, &[]).await?;
        Ok(row.get::<_, i64>(0))
    }

    async fn query(&mut self, sql: &str) -> Result<QueryRows> {
        let messages = self.client.simple_query(sql).await?;

        let mut result = QueryRows::default();
        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    result.columns = columns.iter().map(|c| c.name().to_string()).collect();
                }
                SimpleQueryMessage::Row(row) => {
                    if result.columns.is_empty() {
                        result.columns = row
                            .columns()
                            .iter()
                            .map(|c| c.name().to_string())
                            .collect();
                    }
                    let cells = (0..row.len())
                        .map(|i| row.get(i).map(str::to_string))
                        .collect();
                    result.rows.push(cells);
                }
                SimpleQueryMessage::CommandComplete(_) => {}
                _ => {}
            }
        }

        Ok(result)
    }

    async fn execute(&mut self, sql: &str) -> Result<u64> {
        let messages = self.client.simple_query(sql).await?;
        let affected = messages
            .iter()
            .filter_map(|m| match m {
                SimpleQueryMessage::CommandComplete(n) => Some(*n),
                _ => None,
            })
            .sum();
        Ok(affected)
    }

    async fn begin(&mut self) -> Result<()> {
        self.client.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }
}

/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

use log::debug;
use sea_query::{DeleteStatement, InsertStatement, PostgresQueryBuilder, SelectStatement, SqliteQueryBuilder, UpdateStatement};
use sea_query_sqlx::{SqlxBinder, SqlxValues};
use sqlx::any::{AnyRow, install_default_drivers};
use sqlx::pool::PoolOptions;
use sqlx::{Any, AnyPool, Error};
use tokio::runtime::Runtime;

pub mod example;
pub mod model;

pub use sqlx::Error as DbError;

enum Backend {
    Postgres,
    Sqlite,
}
impl From<&str> for Backend {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Backend::Postgres,
            "sqlite" | "sqlite3" => Backend::Sqlite,
            _ => panic!("Unsupported database backend {}", s),
        }
    }
}
impl Backend {
    fn build_insert(&self, query: &InsertStatement) -> (String, SqlxValues) {
        match self {
            Backend::Postgres => query.build_sqlx(PostgresQueryBuilder),
            Backend::Sqlite => query.build_sqlx(SqliteQueryBuilder),
        }
    }
    fn build_select(&self, query: &SelectStatement) -> (String, SqlxValues) {
        match self {
            Backend::Postgres => query.build_sqlx(PostgresQueryBuilder),
            Backend::Sqlite => query.build_sqlx(SqliteQueryBuilder),
        }
    }
    fn build_update(&self, query: &UpdateStatement) -> (String, SqlxValues) {
        match self {
            Backend::Postgres => query.build_sqlx(PostgresQueryBuilder),
            Backend::Sqlite => query.build_sqlx(SqliteQueryBuilder),
        }
    }
    fn build_delete(&self, query: &DeleteStatement) -> (String, SqlxValues) {
        match self {
            Backend::Postgres => query.build_sqlx(PostgresQueryBuilder),
            Backend::Sqlite => query.build_sqlx(SqliteQueryBuilder),
        }
    }
}

/// Synchronous session over an sqlx connection pool. Scheduler code is
/// single-threaded; async database calls run on a private current-thread
/// runtime.
pub struct Session {
    /// sqlx connection pool.
    pub(crate) pool: AnyPool,
    /// Database backend type (Postgres or Sqlite).
    pub(crate) backend: Backend,
    /// Tokio runtime used to run async database operations in a sync context.
    pub(crate) runtime: Runtime,
}

impl Session {
    pub fn new(database_url: &str) -> Session {
        let max_connections = 1; // Only one connection is needed since we are using a single-threaded runtime.
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();

        let (pool, backend) = runtime.block_on(async {
            install_default_drivers();

            let pool = PoolOptions::<Any>::new()
                .max_connections(max_connections)
                .connect(database_url)
                .await
                .expect("Failed to create connection pool");

            let conn = pool.acquire().await.expect("Failed to acquire connection");
            let backend = conn.backend_name().into();
            conn.close().await.unwrap();
            (pool, backend)
        });
        Session { pool, backend, runtime }
    }

    /// Create the schema of the selected backend if it does not exist yet.
    pub fn create_schema(&self) {
        let sql = match self.backend {
            Backend::Postgres => include_str!("sql/up-postgres.sql"),
            Backend::Sqlite => include_str!("sql/up-sqlite.sql"),
        };
        self.runtime.block_on(async {
            for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                sqlx::query(statement).execute(&self.pool).await.expect("Failed to create schema");
            }
        });
    }
}

pub(crate) trait SessionInsertStatement {
    async fn execute<'q>(&'q self, session: &Session) -> Result<u64, Error>;
}
impl SessionInsertStatement for InsertStatement {
    async fn execute<'q>(&'q self, session: &Session) -> Result<u64, Error> {
        let (sql, values) = session.backend.build_insert(self);
        debug!("SQL: {}   VALUES: {:?}", sql, values);
        let result = sqlx::query_with(sql.as_str(), values).execute(&session.pool).await?;
        Ok(result.rows_affected())
    }
}
pub(crate) trait SessionSelectStatement {
    async fn fetch_all<'q>(&'q self, session: &Session) -> Result<Vec<AnyRow>, Error>;
}
impl SessionSelectStatement for SelectStatement {
    async fn fetch_all<'q>(&'q self, session: &Session) -> Result<Vec<AnyRow>, Error> {
        let (sql, values) = session.backend.build_select(self);
        debug!("SQL: {}   VALUES: {:?}", sql, values);
        sqlx::query_with(sql.as_str(), values).fetch_all(&session.pool).await
    }
}
pub(crate) trait SessionUpdateStatement {
    async fn execute<'q>(&'q self, session: &Session) -> Result<u64, Error>;
}
impl SessionUpdateStatement for UpdateStatement {
    async fn execute<'q>(&'q self, session: &Session) -> Result<u64, Error> {
        let (sql, values) = session.backend.build_update(self);
        debug!("SQL: {}   VALUES: {:?}", sql, values);
        let result = sqlx::query_with(sql.as_str(), values).execute(&session.pool).await?;
        Ok(result.rows_affected())
    }
}
pub(crate) trait SessionDeleteStatement {
    async fn execute<'q>(&'q self, session: &Session) -> Result<u64, Error>;
}
impl SessionDeleteStatement for DeleteStatement {
    async fn execute<'q>(&'q self, session: &Session) -> Result<u64, Error> {
        let (sql, values) = session.backend.build_delete(self);
        debug!("SQL: {}   VALUES: {:?}", sql, values);
        let result = sqlx::query_with(sql.as_str(), values).execute(&session.pool).await?;
        Ok(result.rows_affected())
    }
}

// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Connection pooling, TLS setup and embedded migrations for PostgreSQL.

use diesel::{ConnectionError, ConnectionResult};
use diesel_async::{
    pooled_connection::{
        bb8::{Pool, PooledConnection},
        AsyncDieselConnectionManager, ManagerConfig, PoolError,
    },
    AsyncPgConnection,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use field_count::FieldCount;
use std::{future::Future, pin::Pin, sync::Arc};
use tracing::{info, warn};

pub type Backend = diesel::pg::Pg;
pub type MyDbConnection = AsyncPgConnection;
pub type DbPool = Pool<MyDbConnection>;
pub type ArcDbPool = Arc<DbPool>;
pub type DbPoolConnection<'a> = PooledConnection<'a, MyDbConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub const DEFAULT_MAX_POOL_SIZE: u32 = 150;

/// Postgres rejects statements with more bind parameters than this.
pub const MAX_DIESEL_PARAM_SIZE: usize = u16::MAX as usize;

/// Rows of `T` that fit into one insert statement.
pub fn get_config_table_chunk_size<T: FieldCount>() -> usize {
    (MAX_DIESEL_PARAM_SIZE / T::field_count()).max(1)
}

/// Split `sslrootcert` out of the connection string: tokio-postgres does not
/// understand it, the TLS connector does.
fn parse_and_clean_db_url(url: &str) -> ConnectionResult<(String, Option<String>, bool)> {
    let mut db_url = url::Url::parse(url)
        .map_err(|e| ConnectionError::InvalidConnectionUrl(e.to_string()))?;

    let mut cert_path = None;
    let mut require_tls = false;
    let mut kept: Vec<(String, String)> = Vec::new();
    for (key, value) in db_url.query_pairs() {
        match key.as_ref() {
            "sslrootcert" => cert_path = Some(value.into_owned()),
            "sslmode" => {
                require_tls = matches!(value.as_ref(), "require" | "verify-ca" | "verify-full");
                kept.push((key.into_owned(), value.into_owned()));
            },
            _ => kept.push((key.into_owned(), value.into_owned())),
        }
    }

    if kept.is_empty() {
        db_url.set_query(None);
    } else {
        db_url.query_pairs_mut().clear().extend_pairs(kept);
    }
    let require_tls = require_tls || cert_path.is_some();
    Ok((db_url.to_string(), cert_path, require_tls))
}

fn establish_connection(
    database_url: &str,
) -> Pin<Box<dyn Future<Output = ConnectionResult<AsyncPgConnection>> + Send + '_>> {
    use native_tls::{Certificate, TlsConnector};
    use postgres_native_tls::MakeTlsConnector;

    Box::pin(async move {
        let (url, cert_path, _) = parse_and_clean_db_url(database_url)?;

        let mut builder = TlsConnector::builder();
        if let Some(cert_path) = cert_path {
            let cert = std::fs::read(&cert_path).map_err(|e| {
                ConnectionError::BadConnection(format!("Could not read certificate: {}", e))
            })?;
            let cert = Certificate::from_pem(&cert).map_err(|e| {
                ConnectionError::BadConnection(format!("Could not parse certificate: {}", e))
            })?;
            builder.add_root_certificate(cert);
        }
        let connector = builder
            .build()
            .map_err(|e| ConnectionError::BadConnection(format!("Could not build TLS connector: {}", e)))?;
        let connector = MakeTlsConnector::new(connector);

        let (client, connection) = tokio_postgres::connect(&url, connector)
            .await
            .map_err(|e| ConnectionError::BadConnection(format!("Could not connect to database: {}", e)))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("❌ Database connection error: {}", e);
            }
        });
        AsyncPgConnection::try_from(client).await
    })
}

pub async fn new_db_pool(
    database_url: &str,
    max_pool_size: Option<u32>,
) -> Result<ArcDbPool, PoolError> {
    let (_, _, require_tls) =
        parse_and_clean_db_url(database_url).map_err(PoolError::ConnectionError)?;

    let manager = if require_tls {
        let mut config = ManagerConfig::<MyDbConnection>::default();
        config.custom_setup = Box::new(establish_connection);
        AsyncDieselConnectionManager::<MyDbConnection>::new_with_config(database_url, config)
    } else {
        AsyncDieselConnectionManager::<MyDbConnection>::new(database_url)
    };

    let pool = Pool::builder()
        .max_size(max_pool_size.unwrap_or(DEFAULT_MAX_POOL_SIZE))
        .build(manager)
        .await?;
    Ok(Arc::new(pool))
}

pub async fn run_migrations(postgres_connection_string: String) -> anyhow::Result<()> {
    use diesel::Connection;
    use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;

    info!("🔄 Running database migrations");
    let started = std::time::Instant::now();

    let applied = tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let mut conn =
            AsyncConnectionWrapper::<AsyncPgConnection>::establish(&postgres_connection_string)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("Migrations failed: {}", e))?;
        Ok(applied.len())
    })
    .await??;

    info!(
        "✅ Applied {} migrations in {:.2}s",
        applied,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(FieldCount)]
    #[allow(dead_code)]
    struct FourColumns {
        a: i64,
        b: i64,
        c: i64,
        d: i64,
    }

    #[test]
    fn test_chunk_size_respects_param_limit() {
        let chunk = get_config_table_chunk_size::<FourColumns>();
        assert_eq!(chunk, 16383);
        assert!(chunk * 4 <= MAX_DIESEL_PARAM_SIZE);
    }

    #[test]
    fn test_parse_db_url_strips_root_cert() {
        let (url, cert, tls) = parse_and_clean_db_url(
            "postgres://user:pw@localhost:5432/indexer?sslrootcert=/tmp/ca.pem&application_name=x",
        )
        .unwrap();
        assert_eq!(url, "postgres://user:pw@localhost:5432/indexer?application_name=x");
        assert_eq!(cert.as_deref(), Some("/tmp/ca.pem"));
        assert!(tls);
    }

    #[test]
    fn test_parse_db_url_plain() {
        let (url, cert, tls) =
            parse_and_clean_db_url("postgres://user:pw@localhost:5432/indexer").unwrap();
        assert_eq!(url, "postgres://user:pw@localhost:5432/indexer");
        assert!(cert.is_none());
        assert!(!tls);

        let (_, _, tls) =
            parse_and_clean_db_url("postgres://localhost/indexer?sslmode=require").unwrap();
        assert!(tls);
    }
}

use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgConnection, PgPool};

/// One table per collection. Every table carries a `BIGSERIAL id` so list
/// queries can order by insertion rather than by any business timestamp.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id          BIGSERIAL PRIMARY KEY,
    message     JSONB,
    language    JSONB,
    kind        TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS tasks (
    id          BIGSERIAL PRIMARY KEY,
    fields      JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS notifications (
    id          BIGSERIAL PRIMARY KEY,
    fields      JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS prediction_requests (
    id          BIGSERIAL PRIMARY KEY,
    crop        TEXT NOT NULL,
    status      TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS actions (
    id          BIGSERIAL PRIMARY KEY,
    kind        TEXT NOT NULL,
    fields      JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS alerts (
    id          BIGSERIAL PRIMARY KEY,
    kind        TEXT NOT NULL,
    fields      JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS field_analyses (
    id          BIGSERIAL PRIMARY KEY,
    status      TEXT NOT NULL,
    started_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS settings (
    key         TEXT PRIMARY KEY,
    location    JSONB,
    updated_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS analyses (
    id            BIGSERIAL PRIMARY KEY,
    image_length  BIGINT NOT NULL,
    status        TEXT NOT NULL,
    healthy       BOOLEAN NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Databases created before these columns held arbitrary JSON.
DO $$
BEGIN
    IF EXISTS (
        SELECT 1 FROM information_schema.columns
        WHERE table_name = 'messages' AND column_name = 'message' AND data_type = 'text'
    ) THEN
        ALTER TABLE messages
            ALTER COLUMN message TYPE JSONB USING to_jsonb(message),
            ALTER COLUMN language TYPE JSONB USING to_jsonb(language);
    END IF;
    IF EXISTS (
        SELECT 1 FROM information_schema.columns
        WHERE table_name = 'settings' AND column_name = 'location' AND data_type = 'text'
    ) THEN
        ALTER TABLE settings
            ALTER COLUMN location TYPE JSONB USING to_jsonb(location);
    END IF;
END $$;
"#;

/// Connect to `config.url`, switching to the database named by `config.name`.
///
/// Exactly one connection attempt is made up front and its error is returned
/// as is; callers treat it as fatal. `PgPoolOptions::connect_with` would keep
/// retrying with backoff until `acquire_timeout`, so the pool is built lazily
/// only after that attempt succeeds. `connect_timeout_seconds` then bounds
/// later acquisitions.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(&config.url)?.database(&config.name);
    PgConnection::connect_with(&options).await?.close().await?;
    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect_lazy_with(options))
}

/// Idempotent; safe to run on every boot.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::debug!("Collection tables ensured");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_unreachable_fails() {
        let config = DatabaseConfig {
            url: "postgres://127.0.0.1:1".to_string(),
            connect_timeout_seconds: 2,
            ..DatabaseConfig::default()
        };
        let result = create_pool(&config).await;
        assert!(result.is_err(), "connecting to a closed port must fail");
    }

    #[tokio::test]
    async fn test_create_pool_does_not_retry_until_timeout() {
        let config = DatabaseConfig {
            url: "postgres://127.0.0.1:1".to_string(),
            connect_timeout_seconds: 30,
            ..DatabaseConfig::default()
        };
        let started = std::time::Instant::now();
        let err = create_pool(&config).await.unwrap_err();
        assert!(
            !matches!(err, sqlx::Error::PoolTimedOut),
            "expected the connect error itself, got {:?}",
            err
        );
        assert!(
            started.elapsed() < Duration::from_secs(10),
            "refused connection took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_schema_covers_every_collection() {
        for table in [
            "messages",
            "tasks",
            "notifications",
            "prediction_requests",
            "actions",
            "alerts",
            "field_analyses",
            "settings",
            "analyses",
        ] {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "missing table {}",
                table
            );
        }
    }
}

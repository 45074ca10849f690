// Path: crates/storage/src/postgres.rs
//! The sqlx-based Postgres adapter.

use async_trait::async_trait;
use axon_api::MetadataStore;
use axon_types::app::agent::{
    AgentRecord, AgentUpsert, CapabilityRecord, NewCapability, DEFAULT_PRICE_CENTS,
};
use axon_types::error::RegistryError;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

/// Statements run in order at startup. Every statement is idempotent:
/// `CREATE TABLE IF NOT EXISTS`, `ADD COLUMN IF NOT EXISTS` for each column
/// so that databases created by older builds pick up later additions, and
/// a partial index on non-null wallets.
const MIGRATIONS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS agents (
        did TEXT PRIMARY KEY,
        name TEXT,
        endpoint TEXT NOT NULL,
        public_key TEXT,
        wallet_address TEXT,
        reputation DOUBLE PRECISION NOT NULL DEFAULT 0,
        availability_score DOUBLE PRECISION NOT NULL DEFAULT 0,
        last_seen TIMESTAMPTZ,
        card_version INTEGER,
        card_lineage TEXT,
        card_signature TEXT,
        card_raw JSONB,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS capabilities (
        id BIGSERIAL PRIMARY KEY,
        agent_did TEXT NOT NULL REFERENCES agents(did) ON DELETE CASCADE,
        capability_id TEXT NOT NULL,
        description TEXT NOT NULL,
        tags TEXT[] NOT NULL DEFAULT '{}',
        output_schema JSONB,
        price_cents INTEGER NOT NULL DEFAULT 10,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (agent_did, capability_id)
    )"#,
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS name TEXT",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS public_key TEXT",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS wallet_address TEXT",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS reputation DOUBLE PRECISION NOT NULL DEFAULT 0",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS availability_score DOUBLE PRECISION NOT NULL DEFAULT 0",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS last_seen TIMESTAMPTZ",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS card_version INTEGER",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS card_lineage TEXT",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS card_signature TEXT",
    "ALTER TABLE agents ADD COLUMN IF NOT EXISTS card_raw JSONB",
    "ALTER TABLE capabilities ADD COLUMN IF NOT EXISTS tags TEXT[] NOT NULL DEFAULT '{}'",
    "ALTER TABLE capabilities ADD COLUMN IF NOT EXISTS output_schema JSONB",
    "ALTER TABLE capabilities ADD COLUMN IF NOT EXISTS price_cents INTEGER NOT NULL DEFAULT 10",
    "CREATE INDEX IF NOT EXISTS agents_wallet_idx
        ON agents (wallet_address) WHERE wallet_address IS NOT NULL",
    "CREATE INDEX IF NOT EXISTS capabilities_agent_did_idx ON capabilities (agent_did)",
];

/// Upper bound on lexical keyword matches returned by the adapter. The
/// discovery pipeline caps the merged hybrid result separately.
const KEYWORD_MATCH_LIMIT: i64 = 100;

/// The Postgres metadata store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

fn store_err(e: sqlx::Error) -> RegistryError {
    RegistryError::Store(e.to_string())
}

/// Escapes `LIKE` metacharacters so user input matches literally.
fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn agent_from_row(row: &PgRow) -> Result<AgentRecord, sqlx::Error> {
    Ok(AgentRecord {
        did: row.try_get("did")?,
        name: row.try_get("name")?,
        endpoint: row.try_get("endpoint")?,
        public_key: row.try_get("public_key")?,
        wallet_address: row.try_get("wallet_address")?,
        reputation: row.try_get("reputation")?,
        availability_score: row.try_get("availability_score")?,
        last_seen: row.try_get("last_seen")?,
        card_version: row.try_get("card_version")?,
        card_lineage: row.try_get("card_lineage")?,
        card_signature: row.try_get("card_signature")?,
        card_raw: row.try_get("card_raw")?,
        created_at: row.try_get("created_at")?,
    })
}

fn capability_from_row(row: &PgRow) -> Result<CapabilityRecord, sqlx::Error> {
    Ok(CapabilityRecord {
        agent_did: row.try_get("agent_did")?,
        capability_id: row.try_get("capability_id")?,
        description: row.try_get("description")?,
        tags: row.try_get("tags")?,
        output_schema: row.try_get("output_schema")?,
        price_cents: row.try_get("price_cents")?,
        created_at: row.try_get("created_at")?,
    })
}

impl PostgresStore {
    /// Connects a pool to the given Postgres URL.
    pub async fn connect(url: &str) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(store_err)?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the idempotent startup migration.
    pub async fn migrate(&self) -> Result<(), RegistryError> {
        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(store_err)?;
        }
        tracing::debug!(target: "storage", statements = MIGRATIONS.len(), "schema migration complete");
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn upsert_agent(&self, agent: &AgentUpsert) -> Result<(), RegistryError> {
        sqlx::query(
            r#"INSERT INTO agents
                (did, name, endpoint, public_key, wallet_address,
                 card_version, card_lineage, card_signature, card_raw)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               ON CONFLICT (did) DO UPDATE SET
                 name = EXCLUDED.name,
                 endpoint = EXCLUDED.endpoint,
                 public_key = EXCLUDED.public_key,
                 wallet_address = COALESCE(EXCLUDED.wallet_address, agents.wallet_address),
                 card_version = EXCLUDED.card_version,
                 card_lineage = EXCLUDED.card_lineage,
                 card_signature = EXCLUDED.card_signature,
                 card_raw = EXCLUDED.card_raw"#,
        )
        .bind(&agent.did)
        .bind(&agent.name)
        .bind(&agent.endpoint)
        .bind(&agent.public_key)
        .bind(&agent.wallet_address)
        .bind(agent.card_version)
        .bind(&agent.card_lineage)
        .bind(&agent.card_signature)
        .bind(&agent.card_raw)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn delete_capabilities(&self, did: &str) -> Result<(), RegistryError> {
        sqlx::query("DELETE FROM capabilities WHERE agent_did = $1")
            .bind(did)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn insert_capability(
        &self,
        did: &str,
        capability: &NewCapability,
    ) -> Result<(), RegistryError> {
        sqlx::query(
            r#"INSERT INTO capabilities
                (agent_did, capability_id, description, tags, output_schema, price_cents)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(did)
        .bind(&capability.capability_id)
        .bind(&capability.description)
        .bind(&capability.tags)
        .bind(&capability.output_schema)
        .bind(DEFAULT_PRICE_CENTS)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn find_agents_by_dids(
        &self,
        dids: &[String],
    ) -> Result<Vec<AgentRecord>, RegistryError> {
        if dids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query("SELECT * FROM agents WHERE did = ANY($1)")
            .bind(dids)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        rows.iter()
            .map(|row| agent_from_row(row).map_err(store_err))
            .collect()
    }

    async fn search_capabilities_by_keyword(
        &self,
        pattern: &str,
    ) -> Result<Vec<CapabilityRecord>, RegistryError> {
        let like = format!("%{}%", escape_like(pattern));
        let rows = sqlx::query(
            r#"SELECT agent_did, capability_id, description, tags,
                      output_schema, price_cents, created_at
               FROM capabilities
               WHERE capability_id ILIKE $1 OR description ILIKE $1
               ORDER BY created_at
               LIMIT $2"#,
        )
        .bind(&like)
        .bind(KEYWORD_MATCH_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.iter()
            .map(|row| capability_from_row(row).map_err(store_err))
            .collect()
    }

    async fn update_reputation(&self, did: &str, reputation: f64) -> Result<(), RegistryError> {
        sqlx::query("UPDATE agents SET reputation = $2 WHERE did = $1")
            .bind(did)
            .bind(reputation)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn update_availability(
        &self,
        did: &str,
        availability: f64,
        last_seen: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        sqlx::query("UPDATE agents SET availability_score = $2, last_seen = $3 WHERE did = $1")
            .bind(did)
            .bind(availability)
            .bind(last_seen)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn get_capability_output_schema(
        &self,
        capability_id: &str,
    ) -> Result<Option<serde_json::Value>, RegistryError> {
        let row = sqlx::query("SELECT output_schema FROM capabilities WHERE capability_id = $1 LIMIT 1")
            .bind(capability_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let schema: Option<serde_json::Value> =
                    row.try_get("output_schema").map_err(store_err)?;
                Ok(Some(schema.unwrap_or(serde_json::Value::Null)))
            }
        }
    }

    async fn iterate_all_capabilities(&self) -> Result<Vec<CapabilityRecord>, RegistryError> {
        let rows = sqlx::query(
            r#"SELECT agent_did, capability_id, description, tags,
                      output_schema, price_cents, created_at
               FROM capabilities
               ORDER BY agent_did, created_at"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.iter()
            .map(|row| capability_from_row(row).map_err(store_err))
            .collect()
    }

    async fn ping(&self) -> Result<(), RegistryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_metacharacters() {
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn migrations_are_idempotent_statements() {
        for statement in MIGRATIONS {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "non-idempotent migration: {statement}"
            );
        }
    }
}

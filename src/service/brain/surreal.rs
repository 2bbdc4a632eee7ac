//! SurrealDB implementation of the brain.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::{debug, info, instrument};

use crate::base::{
    config::Config,
    types::{Res, Void},
};

use super::{BrainClient, GenericBrainClient};

/// Table that holds every brain record; the record ID is the brain key.
const BRAIN_TABLE: &str = "brain";

// Extra methods on `BrainClient` applied by the surreal implementation.

impl BrainClient {
    /// Creates a brain backed by the configured SurrealDB endpoint.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealBrainClient::new(&config.brain_endpoint, config.brain_username.as_deref(), config.brain_password.as_deref()).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates a brain backed by an in-memory SurrealDB instance.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealBrainClient::new("mem://", None, None).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// A single brain record.
///
/// The value is kept as serialized JSON so that arbitrary shapes round-trip
/// through the store unchanged.
#[derive(Debug, Serialize, Deserialize)]
struct BrainRecord {
    value: String,
}

/// SurrealDB brain client.
struct SurrealBrainClient {
    db: Surreal<Any>,
}

impl SurrealBrainClient {
    #[instrument(name = "SurrealBrainClient::new", skip(username, password))]
    async fn new(endpoint: &str, username: Option<&str>, password: Option<&str>) -> Res<Self> {
        let db = any::connect(endpoint).await?;

        if let (Some(username), Some(password)) = (username, password) {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns("crew").use_db("brain").await?;

        info!("Brain initialized at `{}`.", endpoint);

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericBrainClient for SurrealBrainClient {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Res<Option<Value>> {
        let record: Option<BrainRecord> = self.db.select((BRAIN_TABLE, key)).await?;

        debug!("Brain key `{}` found: {}", key, record.is_some());

        match record {
            Some(record) => Ok(Some(serde_json::from_str(&record.value)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: Value) -> Void {
        let record = BrainRecord {
            value: serde_json::to_string(&value)?,
        };

        let _: Option<BrainRecord> = self.db.upsert((BRAIN_TABLE, key)).content(record).await?;

        Ok(())
    }
}

// Tests.

pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::base::types::{Res, Void};

// Traits.

/// Generic "brain" trait that key-value stores must implement.
///
/// The brain is the only shared mutable state in the bot. Values are stored
/// and retrieved wholesale under a key; there is no locking, and concurrent
/// writes to the same key are last-write-wins.
#[async_trait]
pub trait GenericBrainClient: Send + Sync + 'static {
    /// Get the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Res<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Void;
}

// Structs.

/// Brain client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct BrainClient {
    inner: Arc<dyn GenericBrainClient>,
}

impl Deref for BrainClient {
    type Target = dyn GenericBrainClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl BrainClient {
    pub fn new(inner: Arc<dyn GenericBrainClient>) -> Self {
        Self { inner }
    }

    /// Get the value under `key`, deserialized into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Res<Option<T>> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`.
    pub async fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Void {
        self.set(key, serde_json::to_value(value)?).await
    }
}

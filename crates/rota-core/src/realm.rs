//! Realms - independent job stores addressed by name.
//!
//! Each realm is its own `JobStore` with its own lock; operations in one realm
//! never wait on another. Realms exist only in memory.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::config::StoreConfig;
use crate::domain::{Result, StoreError, StoreStatus};
use crate::ports::{Clock, SystemClock};
use crate::store::JobStore;

pub struct Realms {
    /// Config given to every newly created realm.
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    realms: Mutex<BTreeMap<String, JobStore>>,
}

impl Realms {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            realms: Mutex::new(BTreeMap::new()),
        }
    }

    /// The store for `name`, created on first use.
    pub async fn get(&self, name: &str) -> JobStore {
        let mut realms = self.realms.lock().await;
        if let Some(store) = realms.get(name) {
            return store.clone();
        }
        info!(realm = name, "creating realm");
        let store = JobStore::with_clock(self.config.clone(), Arc::clone(&self.clock));
        realms.insert(name.to_string(), store.clone());
        store
    }

    /// Forget a realm and everything in it. Handles already given out keep
    /// working but are no longer reachable by name.
    pub async fn delete(&self, name: &str) -> Result<()> {
        match self.realms.lock().await.remove(name) {
            Some(_) => {
                info!(realm = name, "realm deleted");
                Ok(())
            }
            None => Err(StoreError::UnknownRealm(name.to_string())),
        }
    }

    pub async fn names(&self) -> Vec<String> {
        self.realms.lock().await.keys().cloned().collect()
    }

    /// Status of every realm. Each entry is consistent on its own; entries
    /// are not taken at one common instant.
    pub async fn status(&self) -> BTreeMap<String, StoreStatus> {
        let stores: Vec<(String, JobStore)> = self
            .realms
            .lock()
            .await
            .iter()
            .map(|(name, store)| (name.clone(), store.clone()))
            .collect();

        let mut status = BTreeMap::new();
        for (name, store) in stores {
            status.insert(name, store.status().await);
        }
        status
    }
}

impl Default for Realms {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

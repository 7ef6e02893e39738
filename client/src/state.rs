//! Client state management
//!
//! `ClientState` bundles the collaborators every service call needs: the
//! backend, the persisted state store and the configuration. It is built
//! once at startup and cloned freely; all fields are behind `Arc`.

use crate::api::{Backend, HttpBackend};
use crate::config::{ClientConfig, TrackingConfig};
use crate::error::ClientResult;
use crate::storage::{FileStore, StateStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct ClientState {
    backend: Arc<dyn Backend>,
    store: Arc<dyn StateStore>,
    config: Arc<ClientConfig>,
}

impl ClientState {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<dyn StateStore>, config: ClientConfig) -> Self {
        Self {
            backend,
            store,
            config: Arc::new(config),
        }
    }

    /// HTTP backend and file store as configured
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let backend = HttpBackend::new(&config.api)?;
        let store = FileStore::new(config.storage.state_file.clone());
        Ok(Self::new(Arc::new(backend), Arc::new(store), config))
    }

    #[inline]
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    #[inline]
    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[inline]
    pub fn tracking(&self) -> &TrackingConfig {
        &self.config.tracking
    }
}

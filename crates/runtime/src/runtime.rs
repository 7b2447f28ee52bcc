//! High-level runtime orchestrator.
//!
//! The runtime owns the session worker, wires up command/event
//! channels, and exposes a builder-based API for clients to drive one
//! combat session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use encounter_core::{CombatConfig, MapBounds, SessionState};

use crate::api::{IntentProvider, Result, RuntimeError, SessionHandle};
use crate::events::EventBus;
use crate::providers::ai::EnemyAiProvider;
use crate::repository::{InMemorySessionRepo, SessionRepository};
use crate::workers::SessionWorker;

/// Runtime configuration shared across the orchestrator and worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub combat: CombatConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Pause between an enemy action and the turn advance, so the table
    /// can watch the move land. Zero is valid and used by tests.
    pub turn_preview_delay: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            turn_preview_delay: Duration::from_millis(600),
        }
    }
}

/// Main runtime that orchestrates one combat session.
///
/// Design: the runtime owns the worker; [`SessionHandle`] provides a
/// cloneable façade for clients.
pub struct Runtime {
    handle: SessionHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this session
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully.
    ///
    /// The worker drains once every handle clone is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder wiring repository, provider, and configuration together.
pub struct RuntimeBuilder {
    session_id: String,
    seed: u64,
    map: MapBounds,
    config: RuntimeConfig,
    repository: Option<Arc<dyn SessionRepository>>,
    provider: Option<Arc<dyn IntentProvider>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            session_id: "session".to_string(),
            seed: 0,
            map: MapBounds::new(26, 20),
            config: RuntimeConfig::default(),
            repository: None,
            provider: None,
        }
    }

    /// Session id the document is stored under.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// RNG seed for a fresh session document. Ignored when the
    /// repository already holds a document for this session id.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Map bounds for a fresh session document.
    pub fn map(mut self, map: MapBounds) -> Self {
        self.map = map;
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Persistence backend; defaults to in-memory.
    pub fn repository(mut self, repository: Arc<dyn SessionRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Enemy decision source; defaults to the behavior-profile AI.
    pub fn provider(mut self, provider: Arc<dyn IntentProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the runtime: resume the persisted session document when
    /// one exists, otherwise start fresh, then spawn the worker.
    pub fn build(self) -> Result<Runtime> {
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(InMemorySessionRepo::new()));
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(EnemyAiProvider::new()));

        let state = repository
            .load(&self.session_id)?
            .unwrap_or_else(|| SessionState::with_seed(self.seed, self.map));

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);

        let worker = SessionWorker::new(
            self.session_id,
            state,
            repository,
            provider,
            self.config,
            command_rx,
            event_bus.clone(),
        );
        let worker_handle = tokio::spawn(worker.run());

        Ok(Runtime {
            handle: SessionHandle::new(command_tx, event_bus),
            worker_handle,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

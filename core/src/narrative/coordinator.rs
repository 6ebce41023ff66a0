use super::{NarrativeBoard, NarrativePayload, NarrativeRequest, NarrativeState, Subject};
use crate::{
    config::NarrativeConfig,
    error::{DeskError, DeskResult},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::task::{AbortHandle, JoinHandle};

/// A text-generation backend. Returns raw text; shape parsing happens here.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> DeskResult<String>;
}

/// Backend for sessions without network access. Always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _request: &NarrativeRequest) -> DeskResult<String> {
        Err(DeskError::NarrativeUnavailable { reason: "offline".into() })
    }
}

/// Runs narrative requests as tokio tasks, one live task per subject.
pub struct NarrativeCoordinator {
    generator: Arc<dyn TextGenerator>,
    board:     Arc<Mutex<NarrativeBoard>>,
    in_flight: Mutex<HashMap<Subject, AbortHandle>>,
    timeout:   Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicked writer leaves plain data behind; keep serving it.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NarrativeCoordinator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &NarrativeConfig) -> Self {
        Self {
            generator,
            board:     Arc::new(Mutex::new(NarrativeBoard::new())),
            in_flight: Mutex::new(HashMap::new()),
            timeout:   Duration::from_millis(config.timeout_ms),
        }
    }

    /// Start a request for `subject`, superseding any request still in flight
    /// for it. Must be called from within a tokio runtime.
    ///
    /// The handle resolves to whether the response was applied.
    pub fn request(&self, subject: Subject, request: NarrativeRequest) -> JoinHandle<bool> {
        // Held until the handle is recorded, so tickets and in-flight
        // entries for a subject are issued in the same order.
        let mut in_flight = lock(&self.in_flight);
        let ticket = lock(&self.board).begin(subject.clone());
        let generator = Arc::clone(&self.generator);
        let board = Arc::clone(&self.board);
        let timeout = self.timeout;

        let handle = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, generator.generate(&request)).await {
                Ok(Ok(raw)) => NarrativePayload::parse(&raw, request.shape),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(DeskError::NarrativeTimeout {
                    after_ms: timeout.as_millis() as u64,
                }),
            };
            if let Err(e) = &outcome {
                log::warn!("narrative for {:?} unavailable: {e}", ticket.subject);
            }
            lock(&board).complete(&ticket, outcome)
        });

        if let Some(previous) = in_flight.insert(subject, handle.abort_handle()) {
            previous.abort();
        }
        handle
    }

    pub fn state(&self, subject: &Subject) -> NarrativeState {
        lock(&self.board).state(subject)
    }

    /// Shared board, for callers that render narrative alongside scores.
    pub fn board(&self) -> Arc<Mutex<NarrativeBoard>> {
        Arc::clone(&self.board)
    }
}

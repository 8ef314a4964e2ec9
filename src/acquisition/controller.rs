//! Acquisition controller.
//!
//! Owns the attempt budget for each user-triggered acquisition, enforces a
//! single in-flight operation, and records successes in the history.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::retry::acquire_observed;
use crate::history::HistoryStore;
use crate::models::ObjectRecord;
use crate::museum::{AcquisitionError, AttemptBudget, MuseumApiClient};

/// Attempts per acquisition when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const EVENT_CAPACITY: usize = 32;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Searching,
    /// A term failed and another is being tried.
    Retrying,
    Success,
    Exhausted,
}

impl Phase {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Searching | Self::Retrying)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Retrying => "retrying",
            Self::Success => "success",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionEvent {
    Searching,
    Retrying { term: String, error: AcquisitionError },
    Acquired(ObjectRecord),
    Exhausted(AcquisitionError),
}

/// Result of a trigger that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquireOutcome {
    Acquired(ObjectRecord),
    /// Another acquisition was already in flight; nothing was done.
    Ignored,
    /// The controller was reset while this acquisition ran.
    Discarded,
}

#[derive(Debug)]
struct ControllerState {
    phase: Phase,
    generation: u64,
}

/// Drives acquisitions against one museum client.
///
/// Triggers that arrive while an acquisition is in flight are ignored.
pub struct AcquisitionController {
    client: Arc<dyn MuseumApiClient>,
    history: Arc<HistoryStore>,
    max_attempts: u32,
    state: Mutex<ControllerState>,
    events: broadcast::Sender<AcquisitionEvent>,
}

impl AcquisitionController {
    pub fn new(client: Arc<dyn MuseumApiClient>, history: Arc<HistoryStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            history,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            state: Mutex::new(ControllerState {
                phase: Phase::Idle,
                generation: 0,
            }),
            events,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn client(&self) -> &Arc<dyn MuseumApiClient> {
        &self.client
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Receive events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AcquisitionEvent> {
        self.events.subscribe()
    }

    /// Return to `Idle` and orphan any acquisition in flight.
    ///
    /// An orphaned acquisition finishes normally but its result is dropped:
    /// no history entry, no event.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.phase = Phase::Idle;
        debug!("Controller reset to generation {}", state.generation);
    }

    /// Acquire one random object with a fresh attempt budget.
    ///
    /// Only `MaxAttemptsReached` is returned as an error; every other
    /// failure is retried with a different term.
    pub async fn acquire(&self) -> Result<AcquireOutcome, AcquisitionError> {
        let generation = {
            let mut state = self.lock();
            if state.phase.is_busy() {
                debug!("Acquisition already in flight, ignoring trigger");
                return Ok(AcquireOutcome::Ignored);
            }
            state.phase = Phase::Searching;
            state.generation
        };
        self.emit(AcquisitionEvent::Searching);

        let mut budget = AttemptBudget::new(self.max_attempts);
        let result = acquire_observed(self.client.as_ref(), &mut budget, |term, err| {
            self.note_retry(generation, term, err)
        })
        .await;

        {
            let mut state = self.lock();
            if state.generation != generation {
                debug!(
                    "Discarding result from generation {} (now {})",
                    generation, state.generation
                );
                return Ok(AcquireOutcome::Discarded);
            }
            state.phase = if result.is_ok() {
                Phase::Success
            } else {
                Phase::Exhausted
            };
        }

        match result {
            Ok(record) => {
                info!(
                    "Acquired {} '{}' after {} attempt(s)",
                    record.id,
                    record.title,
                    budget.used()
                );
                // A reset can land while the history lock is awaited
                let current = self
                    .history
                    .add_entry_if(&record, || self.generation() == generation)
                    .await;
                if !current && self.generation() != generation {
                    debug!("Discarding result reset during history write");
                    return Ok(AcquireOutcome::Discarded);
                }
                self.emit(AcquisitionEvent::Acquired(record.clone()));
                Ok(AcquireOutcome::Acquired(record))
            }
            Err(err) => {
                error!("Acquisition failed: {}", err);
                self.emit(AcquisitionEvent::Exhausted(err.clone()));
                Err(err)
            }
        }
    }

    fn note_retry(&self, generation: u64, term: &str, err: &AcquisitionError) {
        {
            let mut state = self.lock();
            if state.generation != generation {
                return;
            }
            state.phase = Phase::Retrying;
        }
        self.emit(AcquisitionEvent::Retrying {
            term: term.to_string(),
            error: err.clone(),
        });
    }

    fn emit(&self, event: AcquisitionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Semaphore;

    use crate::models::{RawSearchResult, SearchParams};
    use crate::museum::{AcquisitionStrategy, ClientOptions, VamClient};
    use crate::proxy::{ProxyError, RequestProxy, ScriptedProxy};
    use crate::storage::{KeyValueStore, Namespace, StorageResult};

    /// Store whose writes wait for a permit.
    struct GatedStore {
        gate: Semaphore,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for GatedStore {
        async fn get(&self, _: Namespace, _: &str) -> StorageResult<Option<serde_json::Value>> {
            Ok(None)
        }

        async fn set(&self, _: Namespace, _: &str, _: serde_json::Value) -> StorageResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
            Ok(())
        }

        async fn remove(&self, _: Namespace, _: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    /// Proxy that holds every request until a permit is released.
    struct GatedProxy {
        gate: Semaphore,
    }

    #[async_trait]
    impl RequestProxy for GatedProxy {
        fn name(&self) -> &str {
            "gated"
        }

        async fn search(&self, _: &SearchParams) -> Result<RawSearchResult, ProxyError> {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| ProxyError::Http(e.to_string()))?;
            permit.forget();
            Ok(RawSearchResult::new(
                1,
                vec![json!({"systemNumber": "O7", "_primaryImageId": "img7"})],
            ))
        }
    }

    fn native(proxy: Arc<dyn RequestProxy>) -> Arc<dyn MuseumApiClient> {
        Arc::new(VamClient::new(proxy).with_options(ClientOptions {
            strategy: AcquisitionStrategy::Native,
            ..ClientOptions::default()
        }))
    }

    async fn wait_until_busy(controller: &AcquisitionController) {
        for _ in 0..100 {
            if controller.phase().is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("acquisition never started");
    }

    #[tokio::test]
    async fn test_success_records_history() {
        let proxy = Arc::new(ScriptedProxy::new());
        proxy.push_ok(RawSearchResult::new(
            1,
            vec![json!({"systemNumber": "O1", "_primaryImageId": "img1"})],
        ));
        let history = Arc::new(HistoryStore::in_memory(10));
        let controller = AcquisitionController::new(native(proxy), history.clone());
        let mut events = controller.subscribe();

        let record = match controller.acquire().await.unwrap() {
            AcquireOutcome::Acquired(record) => record,
            other => panic!("expected a record, got {:?}", other),
        };
        assert_eq!(record.id, "O1");
        assert_eq!(controller.phase(), Phase::Success);
        assert_eq!(history.list().await[0].id, "O1");

        assert_eq!(events.recv().await.unwrap(), AcquisitionEvent::Searching);
        assert_eq!(
            events.recv().await.unwrap(),
            AcquisitionEvent::Acquired(record)
        );
    }

    #[tokio::test]
    async fn test_exhaustion_and_fresh_budget() {
        let proxy = Arc::new(ScriptedProxy::always_failing("offline"));
        let history = Arc::new(HistoryStore::in_memory(10));
        let controller =
            AcquisitionController::new(native(proxy.clone()), history.clone()).with_max_attempts(3);
        let mut events = controller.subscribe();

        let err = controller.acquire().await.unwrap_err();
        assert_eq!(err, AcquisitionError::MaxAttemptsReached { attempts: 3 });
        assert_eq!(controller.phase(), Phase::Exhausted);
        assert_eq!(proxy.call_count(), 3);
        assert!(history.is_empty().await);

        assert_eq!(events.recv().await.unwrap(), AcquisitionEvent::Searching);
        for _ in 0..2 {
            assert!(matches!(
                events.recv().await.unwrap(),
                AcquisitionEvent::Retrying { .. }
            ));
        }
        assert_eq!(events.recv().await.unwrap(), AcquisitionEvent::Exhausted(err));

        // A new trigger starts over with a full budget
        assert!(controller.acquire().await.is_err());
        assert_eq!(proxy.call_count(), 6);
    }

    #[tokio::test]
    async fn test_trigger_while_busy_is_ignored() {
        let proxy = Arc::new(GatedProxy {
            gate: Semaphore::new(0),
        });
        let history = Arc::new(HistoryStore::in_memory(10));
        let controller = Arc::new(AcquisitionController::new(
            native(proxy.clone()),
            history.clone(),
        ));

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.acquire().await }
        });
        wait_until_busy(&controller).await;

        assert_eq!(controller.acquire().await.unwrap(), AcquireOutcome::Ignored);

        proxy.gate.add_permits(1);
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, AcquireOutcome::Acquired(_)));
        assert_eq!(history.len().await, 1);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_result() {
        let proxy = Arc::new(GatedProxy {
            gate: Semaphore::new(0),
        });
        let history = Arc::new(HistoryStore::in_memory(10));
        let controller = Arc::new(AcquisitionController::new(
            native(proxy.clone()),
            history.clone(),
        ));

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.acquire().await }
        });
        wait_until_busy(&controller).await;

        controller.reset();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.generation(), 1);

        proxy.gate.add_permits(1);
        assert_eq!(first.await.unwrap().unwrap(), AcquireOutcome::Discarded);
        assert!(history.is_empty().await);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_reset_during_history_write_discards_result() {
        let store = Arc::new(GatedStore {
            gate: Semaphore::new(0),
            writes: AtomicUsize::new(0),
        });
        let history = Arc::new(HistoryStore::new(10, Some(store.clone())));
        history.load().await;

        // Hold the history lock with a write stuck in storage
        let earlier = tokio::spawn({
            let history = history.clone();
            async move {
                history
                    .add_entry(&ObjectRecord {
                        id: "O0".to_string(),
                        ..Default::default()
                    })
                    .await
            }
        });
        for _ in 0..100 {
            if store.writes.load(Ordering::SeqCst) > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);

        let proxy = Arc::new(ScriptedProxy::new());
        proxy.push_ok(RawSearchResult::new(
            1,
            vec![json!({"systemNumber": "O1", "_primaryImageId": "img1"})],
        ));
        let controller = Arc::new(AcquisitionController::new(native(proxy), history.clone()));
        let mut events = controller.subscribe();

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.acquire().await }
        });
        for _ in 0..100 {
            if controller.phase() == Phase::Success {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(controller.phase(), Phase::Success);

        controller.reset();
        store.gate.add_permits(2);

        assert_eq!(pending.await.unwrap().unwrap(), AcquireOutcome::Discarded);
        earlier.await.unwrap();

        let ids: Vec<String> = history.list().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["O0"]);
        assert_eq!(events.recv().await.unwrap(), AcquisitionEvent::Searching);
        assert!(events.try_recv().is_err());
    }
}
